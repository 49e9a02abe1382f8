use futures::TryStreamExt;

use harvest_core::traits::{FeedFetcher, HtmlFetcher};
use harvest_core::AppError;

use crate::client::ProxyHttpClient;

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Fetches page and feed bodies through the cached anonymized client,
/// capping how much of a response body is read.
#[derive(Clone)]
pub struct ProxiedFetcher {
    http: ProxyHttpClient,
    max_body_bytes: usize,
}

impl ProxiedFetcher {
    pub fn new(http: ProxyHttpClient) -> Self {
        Self {
            http,
            max_body_bytes: MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    async fn get(&self, url: &str) -> Result<String, AppError> {
        let client = self.http.client()?;
        let timeout_secs = self.http.timeout().as_secs();

        let response = client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {url}",
                status.as_u16()
            )));
        }

        let mut body: Vec<u8> = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks
            .try_next()
            .await
            .map_err(|e| AppError::HttpError(format!("read response body: {e}")))?
        {
            let remaining = self.max_body_bytes - body.len();
            if chunk.len() >= remaining {
                body.extend_from_slice(&chunk[..remaining]);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl HtmlFetcher for ProxiedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.get(url).await
    }
}

impl FeedFetcher for ProxiedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.get(url).await
    }
}
