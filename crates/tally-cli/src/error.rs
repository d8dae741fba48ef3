use std::io;

use tally_core::offline::ConflictSource;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] tally_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("{}: product code {code} is already in use", conflict_label(.origin))]
    CodeTaken {
        code: String,
        origin: ConflictSource,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Sync is not configured. Set TALLY_API_URL and TALLY_API_TOKEN (a .env file works too)."
    )]
    SyncNotConfigured,
}

pub const fn conflict_label(origin: &ConflictSource) -> &'static str {
    match origin {
        ConflictSource::Local => "code_taken_local",
        ConflictSource::Remote => "code_taken_remote",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_taken_names_the_conflict_source() {
        let local = CliError::CodeTaken {
            code: "123456".to_string(),
            origin: ConflictSource::Local,
        };
        assert_eq!(
            local.to_string(),
            "code_taken_local: product code 123456 is already in use"
        );

        let remote = CliError::CodeTaken {
            code: "123456".to_string(),
            origin: ConflictSource::Remote,
        };
        assert!(remote.to_string().starts_with("code_taken_remote"));
    }
}
