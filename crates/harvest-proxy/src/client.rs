use std::sync::{Arc, Mutex};
use std::time::Duration;

use harvest_core::AppError;

use crate::agent::ChromeUserAgent;

/// HTTP client dialed through a SOCKS5 hop with a randomized user-agent.
///
/// The built client is cached: concurrent callers of [`Self::client`] see
/// the same instance until [`Self::invalidate`] drops it. The user-agent is
/// drawn once per build, so every request on one client carries the same
/// identity and a rebuild picks a fresh one.
#[derive(Clone)]
pub struct ProxyHttpClient {
    host: String,
    port: String,
    timeout: Duration,
    agent: ChromeUserAgent,
    client: Arc<Mutex<Option<reqwest::Client>>>,
}

impl ProxyHttpClient {
    pub fn new(
        host: impl Into<String>,
        port: impl Into<String>,
        timeout: Duration,
        agent: ChromeUserAgent,
    ) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            timeout,
            agent,
            client: Arc::new(Mutex::new(None)),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The cached client, built on first access.
    pub fn client(&self) -> Result<reqwest::Client, AppError> {
        let mut cached = self
            .client
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(client) = cached.as_ref() {
            return Ok(client.clone());
        }

        let client = build_socks_client(&self.host, &self.port, self.timeout, &self.agent)?;
        *cached = Some(client.clone());
        Ok(client)
    }

    /// Drop the cached client; idle connections close with the last handle
    /// and the next [`Self::client`] call rebuilds.
    pub fn invalidate(&self) {
        let mut cached = self
            .client
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *cached = None;
    }
}

/// Build a reqwest client that dials through `socks5h://host:port`.
pub(crate) fn build_socks_client(
    host: &str,
    port: &str,
    timeout: Duration,
    agent: &ChromeUserAgent,
) -> Result<reqwest::Client, AppError> {
    if host.is_empty() || port.is_empty() {
        return Err(AppError::ConfigError("proxy host or port is empty".into()));
    }
    if port.parse::<u16>().is_err() {
        return Err(AppError::ConfigError("proxy port is invalid".into()));
    }

    let proxy = reqwest::Proxy::all(format!("socks5h://{host}:{port}"))
        .map_err(|e| AppError::ConfigError(format!("invalid SOCKS5 proxy address: {e}")))?;

    reqwest::Client::builder()
        .proxy(proxy)
        .timeout(timeout)
        .user_agent(agent.generate())
        .build()
        .map_err(|e| AppError::HttpError(format!("failed to create HTTP client: {e}")))
}
