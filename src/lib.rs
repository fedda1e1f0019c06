//! Diagnoses HTTP request failures caused by a debug proxy.
//!
//! When a request made through an intercepting proxy fails, the classifiers
//! in [`core::proxy`] decide whether the proxy is simply not running or is
//! relaying HTTP/2 to an HTTP/1-only client, and turn the transport error
//! into an actionable [`ProxyDiagnosticError`].

pub mod core;
pub mod logging;

pub use crate::core::config::DiagnosticsConfig;
pub use crate::core::proxy::{
    classify_connection_refused, classify_http2_incompatibility, probe, resolve_proxy_url,
    ProxyDiagnosticError, ProxyDiagnostics,
};
