//! Branch model

use serde::{Deserialize, Serialize};

/// A store branch
///
/// Read-mostly on the device: rows are written only by the bulk refresh
/// from the server and served locally when the branch list cannot be
/// fetched online.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Server-assigned identifier
    pub id: i64,
    /// Branch code
    pub code: String,
    /// Human-readable description
    pub description: String,
}
