//! HTTP/2 incompatibility classification
//!
//! Intercepting proxies that negotiate HTTP/2 with the upstream server can
//! forward an `HTTP/2 200 OK` status line to a client that only speaks
//! HTTP/1.1. The client then reports a parse failure or a truncated
//! response, which is what the fingerprints look for.

use std::error::Error;

use super::chain::{render_node, ErrorChain, DEFAULT_MAX_CHAIN_DEPTH};
use super::errors::ProxyDiagnosticError;
use super::patterns::PhraseSet;

#[derive(Debug, Clone)]
pub struct Http2IncompatibilityClassifier {
    fingerprints: PhraseSet,
    max_depth: usize,
}

impl Default for Http2IncompatibilityClassifier {
    fn default() -> Self {
        Self::new(PhraseSet::http2_defaults(), DEFAULT_MAX_CHAIN_DEPTH)
    }
}

impl Http2IncompatibilityClassifier {
    pub fn new(fingerprints: PhraseSet, max_depth: usize) -> Self {
        Self {
            fingerprints,
            max_depth,
        }
    }

    pub fn fingerprints(&self) -> &PhraseSet {
        &self.fingerprints
    }

    /// True when any node's rendered text contains an HTTP/2 leak fingerprint
    pub fn looks_like_http2_leak(&self, error: &(dyn Error + 'static)) -> bool {
        ErrorChain::with_max_depth(error, self.max_depth).any(|node| {
            match self.fingerprints.find_in(&render_node(node)) {
                Some(fingerprint) => {
                    tracing::debug!(target = "proxy", fingerprint, "http/2 leak fingerprint found");
                    true
                }
                None => false,
            }
        })
    }

    /// Hand the error back untouched, or wrap it with HTTP/2 remediation steps
    pub fn classify(
        &self,
        proxy_url: Option<String>,
        error: anyhow::Error,
    ) -> Result<anyhow::Error, ProxyDiagnosticError> {
        let Some(proxy_url) = proxy_url else {
            return Ok(error);
        };
        if !self.looks_like_http2_leak(error.as_ref()) {
            return Ok(error);
        }
        tracing::info!(target = "proxy", proxy = %proxy_url, "request failed on an HTTP/2 response relayed by the proxy");
        Err(ProxyDiagnosticError::http2_incompatible(proxy_url, error))
    }
}
