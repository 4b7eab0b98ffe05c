//! Bounded-concurrency liveness probing of posting URLs
//!
//! Probes are read-only and target independent hosts, so unlike update
//! cycles they may run in parallel. At most `concurrency` probes are in
//! flight; each one is cut off after `timeout`. A timeout counts as "not
//! live" and is neither retried nor reported as an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait LinkProbe: Send + Sync {
    /// Whether the resource at `url` currently answers.
    async fn is_live(&self, url: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    pub concurrency: usize,
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Live,
    Dead,
    TimedOut,
}

impl Liveness {
    pub fn is_live(self) -> bool {
        self == Self::Live
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub url: String,
    pub liveness: Liveness,
}

/// Probe every URL. Results come back in input order.
pub async fn probe_all(
    probe: Arc<dyn LinkProbe>,
    urls: Vec<String>,
    config: ProbeConfig,
) -> Vec<ProbeResult> {
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (idx, url) in urls.iter().cloned().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let probe = Arc::clone(&probe);
        tasks.spawn(async move {
            // The semaphore is never closed, so acquisition cannot fail.
            let _permit = semaphore.acquire_owned().await.ok();
            let liveness = match tokio::time::timeout(config.timeout, probe.is_live(&url)).await {
                Ok(true) => Liveness::Live,
                Ok(false) => Liveness::Dead,
                Err(_) => Liveness::TimedOut,
            };
            (idx, liveness)
        });
    }

    let mut outcomes = vec![Liveness::Dead; urls.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, liveness)) => outcomes[idx] = liveness,
            Err(e) => tracing::warn!(error = %e, "probe task aborted"),
        }
    }

    urls.into_iter()
        .zip(outcomes)
        .map(|(url, liveness)| {
            tracing::debug!(%url, ?liveness, "probed");
            ProbeResult { url, liveness }
        })
        .collect()
}

/// Reachability probe: a URL is live if a TCP connection to its host and
/// port can be opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbe;

#[async_trait]
impl LinkProbe for TcpProbe {
    async fn is_live(&self, url: &str) -> bool {
        match host_and_port(url) {
            Some((host, port)) => TcpStream::connect((host.as_str(), port)).await.is_ok(),
            None => false,
        }
    }
}

/// Extract `(host, port)` from an http(s) URL.
fn host_and_port(url: &str) -> Option<(String, u16)> {
    let (default_port, rest) = if let Some(rest) = url.strip_prefix("https://") {
        (443, rest)
    } else if let Some(rest) = url.strip_prefix("http://") {
        (80, rest)
    } else {
        return None;
    };

    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .filter(|a| !a.is_empty())?;
    let authority = authority.rsplit('@').next()?;

    if let Some(bracketed) = authority.strip_prefix('[') {
        let (host, after) = bracketed.split_once(']')?;
        let port = match after.strip_prefix(':') {
            Some(p) => p.parse().ok()?,
            None => default_port,
        };
        return Some((host.to_string(), port));
    }

    match authority.rsplit_once(':') {
        Some((host, port)) => Some((host.to_string(), port.parse().ok()?)),
        None => Some((authority.to_string(), default_port)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hosts_and_default_ports() {
        assert_eq!(
            host_and_port("https://jobs.acme.test/postings/42?ref=x"),
            Some(("jobs.acme.test".into(), 443))
        );
        assert_eq!(
            host_and_port("http://localhost:8080/careers"),
            Some(("localhost".into(), 8080))
        );
        assert_eq!(host_and_port("http://[::1]:9000/"), Some(("::1".into(), 9000)));
        assert_eq!(host_and_port("ftp://acme.test"), None);
        assert_eq!(host_and_port("https://"), None);
    }

    #[tokio::test]
    async fn tcp_probe_reports_open_listener_live() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(TcpProbe.is_live(&format!("http://127.0.0.1:{}/job", port)).await);
        assert!(!TcpProbe.is_live("not a url").await);
    }
}
