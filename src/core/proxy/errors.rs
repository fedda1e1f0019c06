//! Diagnostic error types raised when a request failure is traced to the proxy

use thiserror::Error;

/// A request failure re-classified as a proxy problem
///
/// Both variants own the original failure and expose it through
/// [`std::error::Error::source`], so the full transport chain stays available.
#[derive(Error, Debug)]
pub enum ProxyDiagnosticError {
    /// The configured proxy refused the connection, i.e. it is not listening
    #[error(
        "The configured debug proxy is not running at {proxy_url}. \
         Start the proxy tool (e.g. Burp Suite) or adjust the proxy URL."
    )]
    ProxyNotRunning {
        proxy_url: String,
        #[source]
        source: anyhow::Error,
    },

    /// The proxy relayed an HTTP/2 response the HTTP/1 client could not parse
    #[error("{message}")]
    Http2Incompatible {
        proxy_url: String,
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ProxyDiagnosticError {
    pub fn proxy_not_running(proxy_url: impl Into<String>, source: anyhow::Error) -> Self {
        ProxyDiagnosticError::ProxyNotRunning {
            proxy_url: proxy_url.into(),
            source,
        }
    }

    pub fn http2_incompatible(proxy_url: impl Into<String>, source: anyhow::Error) -> Self {
        let proxy_url = proxy_url.into();
        let message = http2_remediation_message(&proxy_url);
        ProxyDiagnosticError::Http2Incompatible {
            proxy_url,
            message,
            source,
        }
    }

    /// Proxy URL that was in effect when the diagnosis was made
    pub fn proxy_url(&self) -> &str {
        match self {
            ProxyDiagnosticError::ProxyNotRunning { proxy_url, .. }
            | ProxyDiagnosticError::Http2Incompatible { proxy_url, .. } => proxy_url,
        }
    }

    /// The failure that was diagnosed
    pub fn original(&self) -> &anyhow::Error {
        match self {
            ProxyDiagnosticError::ProxyNotRunning { source, .. }
            | ProxyDiagnosticError::Http2Incompatible { source, .. } => source,
        }
    }

    pub fn into_original(self) -> anyhow::Error {
        match self {
            ProxyDiagnosticError::ProxyNotRunning { source, .. }
            | ProxyDiagnosticError::Http2Incompatible { source, .. } => source,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ProxyDiagnosticError::ProxyNotRunning { .. } => "proxy_not_running",
            ProxyDiagnosticError::Http2Incompatible { .. } => "proxy_http2_incompatible",
        }
    }
}

/// Operator instructions for turning off HTTP/2 in an intercepting proxy
pub fn http2_remediation_message(proxy_url: &str) -> String {
    format!(
        "Proxy detected: {proxy_url}\n\
         This looks like an HTTP/2 issue via a debug proxy.\n\
         Typical error: 'Received an invalid status line: HTTP/2 200 OK'.\n\
         \n\
         Solution in Burp Suite:\n\
         • Settings -> Network -> HTTP -> Disable 'Default to HTTP/2 if the server supports it'\n\
         • Tools -> Proxy -> Proxy listeners -> your listener -> Edit -> HTTP/2 tab -> Disable 'Support HTTP/2'\n\
         • Restart Burp and the app"
    )
}
