//! Connectivity probe
//!
//! Answers "can we reach the backend right now?". Link-layer state alone is
//! not enough (Wi-Fi without internet must count as offline), so the probe
//! performs a real request against the API origin.

use std::time::Duration;

use crate::error::Result;

const PROBE_TIMEOUT_SECS: u64 = 4;

/// Point-in-time reachability check against the API origin
///
/// Callers must re-probe before every operation that depends on
/// connectivity; no result is cached.
#[derive(Clone)]
pub struct Connectivity {
    client: reqwest::Client,
    probe_url: String,
}

impl Connectivity {
    /// Create a probe against the given API base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            probe_url: base_url.into(),
        })
    }

    /// Whether the backend is reachable right now
    ///
    /// Never fails: any probe error reads as offline. An HTTP response with
    /// any status, 401 included, proves the origin is reachable.
    pub async fn is_online(&self) -> bool {
        match self.client.head(&self.probe_url).send().await {
            Ok(_) => true,
            Err(error) => {
                tracing::debug!("Connectivity probe failed: {error}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unreachable_origin_reads_offline() {
        // Port 9 (discard) is not listening; connection is refused quickly
        let probe = Connectivity::new("http://127.0.0.1:9").unwrap();
        assert!(!probe.is_online().await);
    }
}
