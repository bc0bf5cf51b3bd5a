//! Engine configuration.

use std::future::Future;
use std::time::Duration;

use buildwatch_backend::BackendError;
use serde::{Deserialize, Serialize};

/// Configuration shared by the resolver, attributor and catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on any single backend or directory call, in milliseconds
    pub call_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 10_000,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Set the call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// The call timeout.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Run one backend call under the call timeout.
    pub async fn bounded<T, F>(&self, call: F) -> Result<T, BackendError>
    where
        F: Future<Output = Result<T, BackendError>>,
    {
        let timeout = self.call_timeout();
        tokio::time::timeout(timeout, call)
            .await
            .unwrap_or(Err(BackendError::Timeout(timeout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.call_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_call_timeout_from_json() {
        let config = EngineConfig::from_json(r#"{"call_timeout_ms": 250}"#).unwrap();
        assert_eq!(config.call_timeout(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_bounded_passes_results_through() {
        let config = EngineConfig::default();
        let value = config.bounded(async { Ok::<_, BackendError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let config = EngineConfig::default().with_call_timeout(Duration::from_millis(10));
        let err = config
            .bounded(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, BackendError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Timeout(_)));
    }
}
