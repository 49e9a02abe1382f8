use harvest_core::traits::Notifier;
use harvest_core::AppError;

use crate::client::ProxyHttpClient;
use crate::probe::probe_pool;

/// Logs the egress identity observed through the shared anonymized client.
#[derive(Clone)]
pub struct EgressNotifier {
    http: ProxyHttpClient,
    url: String,
}

impl EgressNotifier {
    pub fn new(http: ProxyHttpClient, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

impl Notifier for EgressNotifier {
    async fn notify(&self) -> Result<(), AppError> {
        let client = self.http.client()?;

        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::NetworkError(format!("get info: {e}")))?;

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
        tracing::info!(identity = %scratch.body.trim(), "observed egress identity");
        Ok(())
    }
}
