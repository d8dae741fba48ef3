//! Error types for tally-core

use thiserror::Error;

/// Result type alias using tally-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tally-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local database could not be opened; fatal at startup
    #[error("Local storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Uniqueness invariant broken (duplicate product code, duplicate
    /// product/branch/batch stock row); surfaced as a field-level error
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Update/delete target missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote call failed (timeout, DNS, non-2xx)
    #[error("Network error: {0}")]
    Network(String),

    /// Remote rejected credentials (HTTP 401); caller must re-authenticate
    #[error("Unauthorized: remote rejected credentials")]
    Unauthorized,

    /// A sync pass was invoked while another is still in flight
    #[error("A sync pass is already in flight")]
    SyncInFlight,

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

/// Map a libSQL failure to `ConstraintViolation` when it reports a broken
/// uniqueness constraint, passing everything else through untouched.
pub(crate) fn map_unique_violation(error: libsql::Error, context: &str) -> Error {
    let message = error.to_string();
    if message.contains("UNIQUE constraint failed") {
        Error::ConstraintViolation(context.to_string())
    } else {
        Error::LibSql(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_violation_is_field_level() {
        let error = Error::ConstraintViolation("products.code".to_string());
        assert_eq!(error.to_string(), "Constraint violation: products.code");
    }

    #[test]
    fn sync_in_flight_message() {
        assert_eq!(
            Error::SyncInFlight.to_string(),
            "A sync pass is already in flight"
        );
    }
}
