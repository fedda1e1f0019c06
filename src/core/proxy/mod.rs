//! Proxy failure diagnostics
//!
//! This module provides:
//! - Proxy URL discovery from environment variables
//! - A bounded TCP probe to check whether the proxy is listening
//! - Classification of request errors caused by a stopped proxy
//! - Classification of request errors caused by HTTP/2 leaking through the proxy

pub mod chain;
pub mod diagnostics;
pub mod env_resolver;
pub mod errors;
pub mod http2;
pub mod patterns;
pub mod prober;
pub mod refused;

pub use chain::ErrorChain;
pub use diagnostics::{
    classify_connection_refused, classify_http2_incompatibility, ProxyDiagnostics,
};
pub use env_resolver::{resolve_proxy_url, EnvSource, MapEnv, ProcessEnv, ProxyEnvResolver};
pub use errors::ProxyDiagnosticError;
pub use http2::Http2IncompatibilityClassifier;
pub use patterns::PhraseSet;
pub use prober::{probe, probe_async, probe_default};
pub use refused::ConnectionRefusedClassifier;
