use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use harvest_core::{AppError, ObjectPool, Poolable, Pooled};

use crate::agent::ChromeUserAgent;
use crate::client::build_socks_client;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Queries the current circuit status (typically the observed egress IP).
pub trait StatusProbe: Send + Sync {
    fn probe(&self) -> impl Future<Output = Result<Pooled<ProbeStatus>, AppError>> + Send;
}

/// Pooled scratch holding one probe response body.
#[derive(Debug, Default)]
pub struct ProbeStatus {
    pub body: String,
}

impl Poolable for ProbeStatus {
    fn reset(&mut self) {
        self.body.clear();
    }
}

static PROBE_POOL: OnceLock<ObjectPool<ProbeStatus>> = OnceLock::new();

/// Process-wide pool of probe scratch buffers.
pub fn probe_pool() -> &'static ObjectPool<ProbeStatus> {
    PROBE_POOL.get_or_init(ObjectPool::new)
}

/// Probes the ping URL through the SOCKS5 hop.
///
/// Each probe builds a fresh short-lived client so the request cannot reuse
/// a connection pinned to the previous circuit.
#[derive(Clone)]
pub struct PingProbe {
    host: String,
    port: String,
    ping_url: String,
    agent: ChromeUserAgent,
}

impl PingProbe {
    pub fn new(
        host: impl Into<String>,
        port: impl Into<String>,
        ping_url: impl Into<String>,
        agent: ChromeUserAgent,
    ) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            ping_url: ping_url.into(),
            agent,
        }
    }
}

impl StatusProbe for PingProbe {
    async fn probe(&self) -> Result<Pooled<ProbeStatus>, AppError> {
        let client = build_socks_client(&self.host, &self.port, PROBE_TIMEOUT, &self.agent)?;

        let response = client
            .get(&self.ping_url)
            .send()
            .await
            .map_err(|e| AppError::NetworkError(format!("ping proxy for URL {}: {e}", self.ping_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "response status: {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("read response body: {e}")))?;

        let mut scratch = probe_pool().get();
        scratch.body.push_str(&body);
        Ok(scratch)
    }
}
