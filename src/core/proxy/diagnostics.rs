//! Entry point tying environment resolution to the two classifiers
//!
//! ```no_run
//! use proxy_diagnostics::core::proxy::ProxyDiagnostics;
//!
//! fn handle(err: anyhow::Error) -> anyhow::Result<()> {
//!     let diagnostics = ProxyDiagnostics::default();
//!     let err = diagnostics.classify_connection_refused(err)?;
//!     let err = diagnostics.classify_http2_incompatibility(err)?;
//!     Err(err)
//! }
//! ```

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use super::env_resolver::{EnvSource, ProcessEnv, ProxyEnvResolver};
use super::errors::ProxyDiagnosticError;
use super::http2::Http2IncompatibilityClassifier;
use super::patterns::PhraseSet;
use super::prober;
use super::refused::ConnectionRefusedClassifier;
use crate::core::config::DiagnosticsConfig;

/// Proxy failure diagnostics bound to one environment source
///
/// Holds no mutable state; share freely across threads.
#[derive(Clone)]
pub struct ProxyDiagnostics {
    env: Arc<dyn EnvSource>,
    resolver: ProxyEnvResolver,
    refused: ConnectionRefusedClassifier,
    http2: Http2IncompatibilityClassifier,
    probe_timeout: Duration,
}

impl Default for ProxyDiagnostics {
    fn default() -> Self {
        Self::from_config(&DiagnosticsConfig::default())
    }
}

impl std::fmt::Debug for ProxyDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyDiagnostics")
            .field("resolver", &self.resolver)
            .field("refused", &self.refused)
            .field("http2", &self.http2)
            .field("probe_timeout", &self.probe_timeout)
            .finish_non_exhaustive()
    }
}

impl ProxyDiagnostics {
    /// Build from configuration, reading the process environment
    ///
    /// An invalid configuration is logged and replaced by defaults.
    pub fn from_config(config: &DiagnosticsConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config.clone(),
            Err(e) => {
                tracing::warn!(target = "config", "invalid diagnostics config, using defaults: {}", e);
                DiagnosticsConfig::default()
            }
        };
        let depth = config.max_chain_depth;
        Self {
            env: Arc::new(ProcessEnv),
            resolver: ProxyEnvResolver::with_keys(config.env_keys.iter().cloned()),
            refused: ConnectionRefusedClassifier::new(
                PhraseSet::from_phrases(config.refusal_phrases.iter().cloned()),
                depth,
            ),
            http2: Http2IncompatibilityClassifier::new(
                PhraseSet::from_phrases(config.http2_fingerprints.iter().cloned()),
                depth,
            ),
            probe_timeout: config.probe_timeout(),
        }
    }

    /// Replace the environment source, e.g. with a `MapEnv` in tests
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Proxy URL currently configured in the environment
    pub fn proxy_url(&self) -> Option<String> {
        self.resolver.resolve(self.env.as_ref())
    }

    /// Pass `error` back, or raise `ProxyNotRunning` when a configured proxy refused the connection
    pub fn classify_connection_refused(
        &self,
        error: anyhow::Error,
    ) -> Result<anyhow::Error, ProxyDiagnosticError> {
        self.refused.classify(self.proxy_url(), error)
    }

    /// Pass `error` back, or raise `Http2Incompatible` when the proxy leaked an HTTP/2 response
    pub fn classify_http2_incompatibility(
        &self,
        error: anyhow::Error,
    ) -> Result<anyhow::Error, ProxyDiagnosticError> {
        self.http2.classify(self.proxy_url(), error)
    }

    /// Run both classifiers, connection refusal first
    pub fn classify(&self, error: anyhow::Error) -> Result<anyhow::Error, ProxyDiagnosticError> {
        let error = self.classify_connection_refused(error)?;
        self.classify_http2_incompatibility(error)
    }

    /// Borrowing check: would `classify_connection_refused` fire for this error?
    pub fn is_proxy_down(&self, error: &(dyn Error + 'static)) -> bool {
        self.proxy_url().is_some() && self.refused.is_connection_refused(error)
    }

    /// Borrowing check: would `classify_http2_incompatibility` fire for this error?
    pub fn is_proxy_http2_issue(&self, error: &(dyn Error + 'static)) -> bool {
        self.proxy_url().is_some() && self.http2.looks_like_http2_leak(error)
    }

    /// Probe the configured proxy with the configured budget
    ///
    /// Returns `None` when no proxy is configured.
    pub fn probe_proxy(&self) -> Option<bool> {
        let url = self.proxy_url()?;
        Some(prober::probe(&url, self.probe_timeout))
    }

    pub async fn probe_proxy_async(&self) -> Option<bool> {
        let url = self.proxy_url()?;
        Some(prober::probe_async(&url, self.probe_timeout).await)
    }
}

/// Classify against the process environment with default settings
pub fn classify_connection_refused(
    error: anyhow::Error,
) -> Result<anyhow::Error, ProxyDiagnosticError> {
    ProxyDiagnostics::default().classify_connection_refused(error)
}

/// Classify against the process environment with default settings
pub fn classify_http2_incompatibility(
    error: anyhow::Error,
) -> Result<anyhow::Error, ProxyDiagnosticError> {
    ProxyDiagnostics::default().classify_http2_incompatibility(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::proxy::env_resolver::MapEnv;
    use std::io;

    fn with_proxy(url: &str) -> ProxyDiagnostics {
        ProxyDiagnostics::default().with_env(MapEnv::new().with("HTTPS_PROXY", url))
    }

    #[test]
    fn test_classify_prefers_refusal() {
        let diagnostics = with_proxy("http://127.0.0.1:8080");
        let err = anyhow::anyhow!("connection refused while reading invalid status line");
        let diag = diagnostics.classify(err).unwrap_err();
        assert_eq!(diag.category(), "proxy_not_running");
    }

    #[test]
    fn test_classify_falls_through_to_http2() {
        let diagnostics = with_proxy("http://127.0.0.1:8080");
        let diag = diagnostics
            .classify(anyhow::anyhow!("Received an invalid status line: HTTP/2 200 OK"))
            .unwrap_err();
        assert_eq!(diag.category(), "proxy_http2_incompatible");
        assert_eq!(diag.proxy_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_borrowing_checks() {
        let diagnostics = with_proxy("http://127.0.0.1:8080");
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert!(diagnostics.is_proxy_down(&refused));
        assert!(!diagnostics.is_proxy_http2_issue(&refused));

        let no_proxy = ProxyDiagnostics::default().with_env(MapEnv::new());
        assert!(!no_proxy.is_proxy_down(&refused));
        assert_eq!(no_proxy.probe_proxy(), None);
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let mut cfg = DiagnosticsConfig::default();
        cfg.probe_timeout_ms = 0;
        cfg.refusal_phrases = vec!["only this".into()];
        let diagnostics = ProxyDiagnostics::from_config(&cfg);
        assert_eq!(diagnostics.probe_timeout(), Duration::from_millis(500));
        assert_eq!(diagnostics.refused.phrases().len(), 2);
    }

    #[test]
    fn test_config_key_list_is_honoured() {
        let mut cfg = DiagnosticsConfig::default();
        cfg.env_keys = vec!["DEBUG_PROXY".into()];
        let diagnostics = ProxyDiagnostics::from_config(&cfg).with_env(
            MapEnv::new()
                .with("HTTPS_PROXY", "http://ignored:1")
                .with("DEBUG_PROXY", "http://burp:8080"),
        );
        assert_eq!(diagnostics.proxy_url().as_deref(), Some("http://burp:8080"));
    }
}
