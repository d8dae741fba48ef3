//! Stock log model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of quantity change recorded in a stock log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockAction {
    /// Quantity went up
    Increment,
    /// Quantity went down
    Decrement,
    /// Quantity was set without a net change (e.g. floored at zero)
    Adjustment,
}

impl StockAction {
    /// Classify a change from old to new quantity
    #[must_use]
    pub const fn classify(old_quantity: i64, new_quantity: i64) -> Self {
        if new_quantity > old_quantity {
            Self::Increment
        } else if new_quantity < old_quantity {
            Self::Decrement
        } else {
            Self::Adjustment
        }
    }

    /// Stable string form stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increment => "increment",
            Self::Decrement => "decrement",
            Self::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for StockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increment" => Ok(Self::Increment),
            "decrement" => Ok(Self::Decrement),
            "adjustment" => Ok(Self::Adjustment),
            other => Err(format!("unknown stock action: {other}")),
        }
    }
}

/// Append-only audit record of a quantity change
///
/// Created only as a side effect of a quantity adjustment, never updated
/// afterwards, and never uploaded to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLog {
    /// Local row identifier
    pub id: i64,
    /// User who made the change, when known
    pub user_id: Option<i64>,
    /// Branch the change happened in
    pub branch_id: i64,
    /// Product whose stock changed (local id)
    pub product_id: i64,
    /// Quantity before the change
    pub old_quantity: i64,
    /// Quantity after the change
    pub new_quantity: i64,
    /// Exactly `new_quantity - old_quantity`
    pub quantity_change: i64,
    /// What kind of change this was
    pub action: StockAction,
    /// Creation timestamp (unix ms)
    pub created_at: i64,
    /// Same as `created_at`; logs are immutable
    pub updated_at: i64,
}
