//! Runtime configuration for the CLI
//!
//! The API endpoint and bearer token come from the environment (or a .env
//! file); credential storage itself is outside this tool.

use std::env;
use std::path::PathBuf;

/// Environment-derived settings
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Inventory API base URL (`TALLY_API_URL`)
    pub api_url: Option<String>,
    /// Bearer token for the API (`TALLY_API_TOKEN`)
    pub api_token: Option<String>,
}

impl CliConfig {
    /// Read configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("TALLY_API_URL").ok().filter(|v| !v.trim().is_empty()),
            api_token: env::var("TALLY_API_TOKEN").ok().filter(|v| !v.trim().is_empty()),
        }
    }

    /// Whether enough configuration exists to talk to the server
    #[must_use]
    pub const fn has_remote(&self) -> bool {
        self.api_url.is_some() && self.api_token.is_some()
    }
}

/// Resolve the local database path: CLI flag, then `TALLY_DB_PATH`, then
/// the platform data directory
#[must_use]
pub fn resolve_db_path(cli_override: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_override {
        return path;
    }
    if let Ok(path) = env::var("TALLY_DB_PATH") {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    dirs::data_dir().map_or_else(
        || PathBuf::from("tally.db"),
        |dir| dir.join("tally").join("tally.db"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_override_wins() {
        let path = resolve_db_path(Some(PathBuf::from("/tmp/custom.db")));
        assert_eq!(path, PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn empty_config_has_no_remote() {
        assert!(!CliConfig::default().has_remote());
    }
}
