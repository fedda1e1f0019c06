mod common;

use common::run_with_env;
use proxy_diagnostics::core::proxy::{resolve_proxy_url, ProxyDiagnostics, ProxyEnvResolver};
use std::env;

#[test]
fn test_env_resolution_precedence() {
    run_with_env(|| {
        assert!(resolve_proxy_url().is_none());

        env::set_var("ALL_PROXY", "socks5://all.proxy:1080");
        assert_eq!(resolve_proxy_url().as_deref(), Some("socks5://all.proxy:1080"));

        env::set_var("HTTP_PROXY", "http://http.proxy:8080");
        assert_eq!(resolve_proxy_url().as_deref(), Some("http://http.proxy:8080"));

        env::set_var("HTTPS_PROXY", "http://https.proxy:8443");
        assert_eq!(resolve_proxy_url().as_deref(), Some("http://https.proxy:8443"));
    });
}

#[test]
fn test_env_resolution_skips_empty_values() {
    run_with_env(|| {
        env::set_var("HTTPS_PROXY", "   ");
        env::set_var("HTTP_PROXY", "http://fallback:8080");
        assert_eq!(resolve_proxy_url().as_deref(), Some("http://fallback:8080"));
    });
}

#[test]
fn test_lowercase_names_ignored_by_default() {
    run_with_env(|| {
        env::set_var("https_proxy", "http://lower:8080");
        // some platforms have case-insensitive env lookups
        if env::var("HTTPS_PROXY").is_ok() {
            return;
        }
        assert!(resolve_proxy_url().is_none());

        let resolver = ProxyEnvResolver::with_keys(["HTTPS_PROXY", "https_proxy"]);
        assert_eq!(
            resolver.resolve_from_process().as_deref(),
            Some("http://lower:8080")
        );
    });
}

#[test]
fn test_no_caching_between_calls() {
    run_with_env(|| {
        let diagnostics = ProxyDiagnostics::default();
        env::set_var("HTTP_PROXY", "http://first:1");
        assert_eq!(diagnostics.proxy_url().as_deref(), Some("http://first:1"));

        env::set_var("HTTP_PROXY", "http://second:2");
        assert_eq!(diagnostics.proxy_url().as_deref(), Some("http://second:2"));

        env::remove_var("HTTP_PROXY");
        assert!(diagnostics.proxy_url().is_none());
    });
}
