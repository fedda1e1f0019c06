// tracing setup for binaries and tests embedding the diagnostics
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging() {
    // already initialized: keep the existing subscriber
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
    tracing::info!(target = "proxy", "tracing initialized");
}
