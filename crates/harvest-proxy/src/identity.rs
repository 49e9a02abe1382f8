//! Circuit rotation with verification.

use tokio::sync::Mutex;

use harvest_core::traits::CircuitRotator;
use harvest_core::{AppError, RetryPolicy};

use crate::client::ProxyHttpClient;
use crate::control::ControlLink;
use crate::probe::StatusProbe;

const NEWNYM: &str = "NEWNYM";
const DEFAULT_MAX_ATTEMPTS: i32 = 7;

/// Rotates the anonymizing circuit and verifies the rotation took effect.
///
/// A rotation is considered observable when the status probe returns a
/// different body than before the signal. Callers are serialized; one call
/// holds the control link for its full duration and the link is closed on
/// every exit path.
pub struct IdentityController<P, L>
where
    P: StatusProbe,
    L: ControlLink,
{
    probe: P,
    link: Mutex<L>,
    retry: RetryPolicy,
    max_attempts: i32,
    http: ProxyHttpClient,
}

impl<P, L> IdentityController<P, L>
where
    P: StatusProbe,
    L: ControlLink,
{
    pub fn new(probe: P, link: L, retry: RetryPolicy, http: ProxyHttpClient) -> Self {
        Self {
            probe,
            link: Mutex::new(link),
            retry,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            http,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: i32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Signal new circuits until the probed status changes, backing off
    /// between attempts per the retry policy.
    async fn verify(&self, link: &mut L, pre_status: &str) -> Result<String, AppError> {
        link.authenticate().await?;

        for attempt in 1..=self.max_attempts + 1 {
            link.signal(NEWNYM).await?;

            let post = self.probe.probe().await?;
            if post.body != pre_status {
                tracing::info!(status = %post.body, "circuit successfully changed");
                return Ok(post.body.clone());
            }
            tracing::debug!(attempt, "circuit did not change");

            let delay = match self.retry.wait_duration(attempt) {
                Ok(delay) => delay,
                Err(_) => return Err(AppError::RetryExhausted),
            };
            tokio::time::sleep(delay).await;
        }

        Err(AppError::RetryExhausted)
    }
}

impl<P, L> CircuitRotator for IdentityController<P, L>
where
    P: StatusProbe,
    L: ControlLink,
{
    async fn rotate(&self) -> Result<String, AppError> {
        let mut link = self.link.lock().await;

        let pre = self.probe.probe().await?;
        tracing::debug!(status = %pre.body, "current circuit status");

        link.connect().await?;
        let result = self.verify(&mut *link, &pre.body).await;
        if let Err(error) = link.close().await {
            tracing::warn!(error = %error, "close control session");
        }

        // A verified rotation obsoletes the cached client: the next fetch
        // must dial through the new circuit with a fresh identity.
        if result.is_ok() {
            self.http.invalidate();
        }
        result
    }
}
