//! Product model

use serde::{Deserialize, Serialize};

/// A product known to the device
///
/// `id` is the local surrogate assigned by the store at insert time;
/// `server_id` is recorded once the remote accepts the row. A row with
/// `synced == false` has not yet been confirmed by the remote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Local row identifier (surrogate until the server assigns its own)
    pub id: i64,
    /// Server-assigned identifier, set at first successful sync
    pub server_id: Option<i64>,
    /// Unique business identifier
    pub code: String,
    /// Display name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Creation timestamp (unix ms)
    pub created_at: i64,
    /// Last update timestamp (unix ms)
    pub updated_at: i64,
    /// Whether the remote has confirmed this row
    pub synced: bool,
}

/// Attributes for a product about to be saved offline
///
/// Carries the stock fields alongside the product fields because a product
/// is never created without its stock row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    /// Unique business identifier
    pub code: String,
    /// Display name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Initial on-hand quantity
    pub quantity: i64,
    /// Lot identifier for the stock row
    pub batch: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_description_defaults_empty() {
        let draft: ProductDraft =
            serde_json::from_str(r#"{"code":"000111","name":"Widget","price":9.99,"quantity":5,"batch":"B1"}"#)
                .unwrap();
        assert_eq!(draft.description, "");
        assert_eq!(draft.quantity, 5);
    }
}
