#![allow(dead_code)]
//! Shared helpers for integration tests that touch the process environment.

use std::env;
use std::sync::{Mutex, Once};

/// Serializes tests that mutate proxy environment variables
pub static ENV_LOCK: Mutex<()> = Mutex::new(());

pub const PROXY_VARS: &[&str] = &[
    "HTTPS_PROXY",
    "https_proxy",
    "HTTP_PROXY",
    "http_proxy",
    "ALL_PROXY",
    "all_proxy",
];

static INIT: Once = Once::new();

pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Run `f` with all proxy variables cleared, restoring a clean slate afterwards
pub fn run_with_env<F>(f: F)
where
    F: FnOnce(),
{
    init_test_env();
    let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    for var in PROXY_VARS {
        env::remove_var(var);
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    for var in PROXY_VARS {
        env::remove_var(var);
    }
    if let Err(panic) = result {
        std::panic::resume_unwind(panic);
    }
}
