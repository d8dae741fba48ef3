//! tally-core - Core library for Tally
//!
//! This crate contains the shared models, local store, offline write path,
//! and sync engine used by all Tally interfaces. Writes always land locally
//! first; the sync engine reconciles them with the remote inventory API
//! when connectivity allows.

#![allow(async_fn_in_trait)]

pub mod db;
pub mod error;
pub mod models;
pub mod net;
pub mod offline;
pub mod remote;
pub mod sync;

pub use error::{Error, Result};
pub use models::{Branch, Product, ProductDraft, Stock, StockLog, StockView};
