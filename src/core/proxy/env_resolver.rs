//! Proxy URL discovery from environment variables
//!
//! Variables are read on every call; nothing is memoized so a change to the
//! environment during the process lifetime is picked up immediately.

use std::collections::HashMap;

/// Default lookup order: secure proxy, plain proxy, catch-all
pub const DEFAULT_PROXY_ENV_KEYS: &[&str] = &["HTTPS_PROXY", "HTTP_PROXY", "ALL_PROXY"];

/// Read-only view of environment variables
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Synthetic environment for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.vars.remove(key);
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut env = MapEnv::new();
        for (k, v) in iter {
            env.set(k, v);
        }
        env
    }
}

/// Resolves the active proxy URL from an ordered list of variable names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEnvResolver {
    keys: Vec<String>,
}

impl Default for ProxyEnvResolver {
    fn default() -> Self {
        Self::with_keys(DEFAULT_PROXY_ENV_KEYS.iter().copied())
    }
}

impl ProxyEnvResolver {
    /// Names are matched exactly; pass lowercase variants explicitly if wanted
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// First non-blank value in key order, trimmed. The value is not validated.
    pub fn resolve(&self, env: &dyn EnvSource) -> Option<String> {
        for key in &self.keys {
            if let Some(value) = env.var(key) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    tracing::debug!(target = "proxy", key = %key, "proxy configured via environment");
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }

    pub fn resolve_from_process(&self) -> Option<String> {
        self.resolve(&ProcessEnv)
    }
}

/// Resolve the proxy URL from the process environment with the default keys
pub fn resolve_proxy_url() -> Option<String> {
    ProxyEnvResolver::default().resolve_from_process()
}
