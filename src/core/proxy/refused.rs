//! Connection-refused classification
//!
//! A refused TCP connection while a proxy is configured almost always means
//! the proxy itself is not listening.

use std::error::Error;
use std::io;

use super::chain::{ErrorChain, DEFAULT_MAX_CHAIN_DEPTH};
use super::errors::ProxyDiagnosticError;
use super::patterns::PhraseSet;

/// Detects connection refusal anywhere in an error chain
#[derive(Debug, Clone)]
pub struct ConnectionRefusedClassifier {
    phrases: PhraseSet,
    max_depth: usize,
}

impl Default for ConnectionRefusedClassifier {
    fn default() -> Self {
        Self::new(PhraseSet::refusal_defaults(), DEFAULT_MAX_CHAIN_DEPTH)
    }
}

impl ConnectionRefusedClassifier {
    pub fn new(phrases: PhraseSet, max_depth: usize) -> Self {
        Self { phrases, max_depth }
    }

    pub fn phrases(&self) -> &PhraseSet {
        &self.phrases
    }

    /// True when any node carries a refused socket error or a refusal phrase
    pub fn is_connection_refused(&self, error: &(dyn Error + 'static)) -> bool {
        ErrorChain::with_max_depth(error, self.max_depth).any(|node| self.node_matches(node))
    }

    fn node_matches(&self, node: &(dyn Error + 'static)) -> bool {
        if let Some(io_err) = node.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::ConnectionRefused {
                tracing::debug!(target = "proxy", "connection refused by socket error kind");
                return true;
            }
        }
        match self.phrases.find_in(&node.to_string()) {
            Some(phrase) => {
                tracing::debug!(target = "proxy", phrase, "connection refused by message text");
                true
            }
            None => false,
        }
    }

    /// Hand the error back untouched, or wrap it as a proxy-not-running diagnosis
    ///
    /// `proxy_url` is the already resolved proxy; `None` means no proxy is in
    /// play and the error is always passed through.
    pub fn classify(
        &self,
        proxy_url: Option<String>,
        error: anyhow::Error,
    ) -> Result<anyhow::Error, ProxyDiagnosticError> {
        let Some(proxy_url) = proxy_url else {
            return Ok(error);
        };
        if !self.is_connection_refused(error.as_ref()) {
            return Ok(error);
        }
        tracing::info!(target = "proxy", proxy = %proxy_url, "request failed because the proxy is not running");
        Err(ProxyDiagnosticError::proxy_not_running(proxy_url, error))
    }
}
