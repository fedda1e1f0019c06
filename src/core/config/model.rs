use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::proxy::chain::DEFAULT_MAX_CHAIN_DEPTH;
use crate::core::proxy::env_resolver::DEFAULT_PROXY_ENV_KEYS;
use crate::core::proxy::patterns::{DEFAULT_HTTP2_FINGERPRINTS, DEFAULT_REFUSAL_PHRASES};

/// Tunables for proxy diagnostics
///
/// Every field has a default so a partial JSON file is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsConfig {
    /// Environment variables holding the proxy URL, highest priority first
    #[serde(default = "default_env_keys")]
    pub env_keys: Vec<String>,

    /// Phrases meaning "connection refused", any language
    #[serde(default = "default_refusal_phrases")]
    pub refusal_phrases: Vec<String>,

    /// Error text fingerprints of an HTTP/2 response leaking through the proxy
    #[serde(default = "default_http2_fingerprints")]
    pub http2_fingerprints: Vec<String>,

    /// Connectivity probe budget in milliseconds (default: 500)
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Maximum number of error chain nodes inspected (default: 32)
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_env_keys() -> Vec<String> {
    to_owned_list(DEFAULT_PROXY_ENV_KEYS)
}

fn default_refusal_phrases() -> Vec<String> {
    to_owned_list(DEFAULT_REFUSAL_PHRASES)
}

fn default_http2_fingerprints() -> Vec<String> {
    to_owned_list(DEFAULT_HTTP2_FINGERPRINTS)
}

fn default_probe_timeout_ms() -> u64 {
    500
}

fn default_max_chain_depth() -> usize {
    DEFAULT_MAX_CHAIN_DEPTH
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            env_keys: default_env_keys(),
            refusal_phrases: default_refusal_phrases(),
            http2_fingerprints: default_http2_fingerprints(),
            probe_timeout_ms: default_probe_timeout_ms(),
            max_chain_depth: default_max_chain_depth(),
        }
    }
}

impl DiagnosticsConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.env_keys.iter().all(|k| k.trim().is_empty()) {
            anyhow::bail!("envKeys must name at least one environment variable");
        }
        if self.probe_timeout_ms == 0 {
            anyhow::bail!("probeTimeoutMs must be greater than 0");
        }
        if self.max_chain_depth == 0 {
            anyhow::bail!("maxChainDepth must be greater than 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let cfg = DiagnosticsConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.env_keys, vec!["HTTPS_PROXY", "HTTP_PROXY", "ALL_PROXY"]);
        assert_eq!(cfg.probe_timeout(), Duration::from_millis(500));
        assert_eq!(cfg.max_chain_depth, 32);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg: DiagnosticsConfig =
            serde_json::from_str(r#"{"refusalPhrases":["connexion refusée"],"probeTimeoutMs":250}"#)
                .unwrap();
        assert_eq!(cfg.refusal_phrases, vec!["connexion refusée"]);
        assert_eq!(cfg.probe_timeout_ms, 250);
        assert_eq!(cfg.http2_fingerprints.len(), 3);
        assert_eq!(cfg.env_keys.len(), 3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = DiagnosticsConfig::default();
        cfg.env_keys = vec!["  ".into()];
        assert!(cfg.validate().is_err());

        let mut cfg = DiagnosticsConfig::default();
        cfg.probe_timeout_ms = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = DiagnosticsConfig::default();
        cfg.max_chain_depth = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(DiagnosticsConfig::default()).unwrap();
        assert!(json.get("envKeys").is_some());
        assert!(json.get("http2Fingerprints").is_some());
        assert!(json.get("maxChainDepth").is_some());
    }
}
