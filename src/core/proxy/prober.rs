//! Best-effort reachability probe for a proxy endpoint
//!
//! Used to corroborate a diagnosis: a `false` result means the proxy could
//! not be reached within the time budget, for whatever reason. Probing never
//! fails and never blocks the caller past its timeout.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use url::Url;

/// Default probe budget
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Upper bound on blocking probe workers alive at once
///
/// Name resolution cannot be cancelled, so a worker stuck on a black-holed
/// resolver outlives its caller. Past this limit new probes report `false`
/// instead of spawning.
pub const MAX_INFLIGHT_PROBES: usize = 16;

static INFLIGHT_PROBES: AtomicUsize = AtomicUsize::new(0);

/// One occupied worker slot, released on drop
struct InflightSlot {
    counter: &'static AtomicUsize,
}

impl InflightSlot {
    fn acquire(counter: &'static AtomicUsize, limit: usize) -> Option<Self> {
        counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < limit).then_some(n + 1))
            .ok()
            .map(|_| Self { counter })
    }
}

impl Drop for InflightSlot {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Extract `(host, port)` from an absolute proxy URL
///
/// Falls back to the scheme's well-known port (`http` 80, `https` 443).
/// Returns `None` for relative or host-less input.
pub fn parse_proxy_endpoint(proxy_url: &str) -> Option<(String, u16)> {
    let url = Url::parse(proxy_url.trim()).ok()?;
    let host = url.host_str().filter(|h| !h.is_empty())?;
    // IPv6 literals come back bracketed
    let host = host.trim_start_matches('[').trim_end_matches(']').to_string();
    let port = url.port_or_known_default()?;
    Some((host, port))
}

/// Probe with the default 500 ms budget
pub fn probe_default(proxy_url: &str) -> bool {
    probe(proxy_url, DEFAULT_PROBE_TIMEOUT)
}

/// Try a TCP connection to the proxy; `true` only if it completes within `timeout`
///
/// The attempt (name resolution included) runs on a worker thread. When the
/// budget runs out the caller returns `false` and the worker finishes on its
/// own, dropping whatever socket it holds. At most [`MAX_INFLIGHT_PROBES`]
/// workers exist at a time. A timeout too large to represent as a deadline
/// means no deadline.
pub fn probe(proxy_url: &str, timeout: Duration) -> bool {
    let Some((host, port)) = parse_proxy_endpoint(proxy_url) else {
        tracing::debug!(target = "proxy", url = %proxy_url, "probe skipped: not an absolute proxy URL");
        return false;
    };

    let Some(slot) = InflightSlot::acquire(&INFLIGHT_PROBES, MAX_INFLIGHT_PROBES) else {
        tracing::warn!(target = "proxy", "probe skipped: {} probes still in flight", MAX_INFLIGHT_PROBES);
        return false;
    };

    let started = Instant::now();
    let deadline = started.checked_add(timeout);
    let (tx, rx) = mpsc::channel();
    let worker_host = host.clone();
    let spawned = thread::Builder::new()
        .name("proxy-probe".into())
        .spawn(move || {
            let _slot = slot;
            let _ = tx.send(connect_until(&worker_host, port, deadline));
        });
    if let Err(e) = spawned {
        tracing::debug!(target = "proxy", "probe thread could not start: {}", e);
        return false;
    }

    let reachable = rx.recv_timeout(timeout).unwrap_or(false);
    tracing::debug!(
        target = "proxy",
        host = %host,
        port,
        reachable,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "proxy probe finished"
    );
    reachable
}

/// Connect to the first reachable resolved address before `deadline`
fn connect_until(host: &str, port: u16, deadline: Option<Instant>) -> bool {
    let addrs: Vec<SocketAddr> = match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs.collect(),
        Err(e) => {
            tracing::debug!(target = "proxy", "probe could not resolve {}: {}", host, e);
            return false;
        }
    };

    for addr in addrs {
        let attempt = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return false;
                }
                TcpStream::connect_timeout(&addr, remaining)
            }
            None => TcpStream::connect(addr),
        };
        match attempt {
            // stream dropped here, only reachability matters
            Ok(_stream) => return true,
            Err(e) => {
                tracing::debug!(target = "proxy", addr = %addr, "probe connect failed: {}", e);
            }
        }
    }
    false
}

/// Async variant for callers already inside a tokio runtime
pub async fn probe_async(proxy_url: &str, timeout: Duration) -> bool {
    let Some((host, port)) = parse_proxy_endpoint(proxy_url) else {
        tracing::debug!(target = "proxy", url = %proxy_url, "probe skipped: not an absolute proxy URL");
        return false;
    };

    let attempt = tokio::net::TcpStream::connect((host.as_str(), port));
    match tokio::time::timeout(timeout, attempt).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            tracing::debug!(target = "proxy", "probe connect to {}:{} failed: {}", host, port, e);
            false
        }
        Err(_) => {
            tracing::debug!(target = "proxy", "probe connect to {}:{} timed out", host, port);
            false
        }
    }
}
