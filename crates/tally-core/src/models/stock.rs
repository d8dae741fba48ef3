//! Stock models

use serde::{Deserialize, Serialize};

/// A stock row: on-hand quantity of one product batch in one branch
///
/// The tuple `(product_id, branch_id, batch)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Local row identifier
    pub id: i64,
    /// Owning product (local id)
    pub product_id: i64,
    /// Branch holding the stock; not locally owned
    pub branch_id: i64,
    /// Lot identifier
    pub batch: String,
    /// On-hand quantity, never negative
    pub quantity: i64,
    /// Creation timestamp (unix ms)
    pub created_at: i64,
    /// Last update timestamp (unix ms)
    pub updated_at: i64,
    /// Whether the remote has confirmed this row
    pub synced: bool,
}

/// Canonical product/stock read shape
///
/// Both the local product × stock join and the remote branch listing
/// normalize into this view, so shape differences between the two sources
/// are resolved once at the boundary instead of at every call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockView {
    /// Product identifier; local id when read from the store, server id
    /// when read from the remote listing
    pub product_id: i64,
    /// Product code
    pub code: String,
    /// Product name
    pub name: String,
    /// Product description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Stock row identifier in the same source as `product_id`
    pub stock_id: i64,
    /// Branch holding the stock
    pub branch_id: i64,
    /// Lot identifier
    pub batch: String,
    /// On-hand quantity
    pub quantity: i64,
    /// Whether the row is confirmed on the server; remote listings are
    /// always confirmed
    pub synced: bool,
}
