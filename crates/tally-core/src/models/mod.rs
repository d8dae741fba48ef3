//! Data models for Tally

mod branch;
mod product;
mod stock;
mod stock_log;

pub use branch::Branch;
pub use product::{Product, ProductDraft};
pub use stock::{Stock, StockView};
pub use stock_log::{StockAction, StockLog};

/// Current wall-clock time as unix milliseconds
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
