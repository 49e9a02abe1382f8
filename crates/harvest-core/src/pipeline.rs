//! Per-source batch worker: pending URLs in, vacancy records out.
//!
//! Each batch rotates the proxy circuit, then fans the batch out over a
//! bounded set of workers. Slot IDs drawn from a prefilled channel identify
//! the concurrency slot a worker occupies, purely for observability.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::FutureExt;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::traits::{
    CircuitRotator, HtmlFetcher, HtmlParser, Ingester, SourceHandler, UrlStore, VacancyStore,
};
use crate::url::{Url, UrlStatus};

const MAX_CONCURRENCY: usize = 5;
const BATCH_DELAY: Duration = Duration::from_secs(15);

/// A per-source worker that consumes pending URLs and produces vacancies.
pub struct SourcePipeline<I, R, U, V, F, P>
where
    I: Ingester,
    R: CircuitRotator,
    U: UrlStore,
    V: VacancyStore,
    F: HtmlFetcher,
    P: HtmlParser,
{
    name: String,
    feed_url: String,
    ingester: I,
    rotator: R,
    url_store: U,
    vacancy_store: V,
    fetcher: F,
    parser: P,
    max_concurrency: usize,
    batch_delay: Duration,
}

impl<I, R, U, V, F, P> SourcePipeline<I, R, U, V, F, P>
where
    I: Ingester,
    R: CircuitRotator,
    U: UrlStore + 'static,
    V: VacancyStore + 'static,
    F: HtmlFetcher + 'static,
    P: HtmlParser + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        feed_url: impl Into<String>,
        ingester: I,
        rotator: R,
        url_store: U,
        vacancy_store: V,
        fetcher: F,
        parser: P,
    ) -> Self {
        Self {
            name: name.into(),
            feed_url: feed_url.into(),
            ingester,
            rotator,
            url_store,
            vacancy_store,
            fetcher,
            parser,
            max_concurrency: MAX_CONCURRENCY,
            batch_delay: BATCH_DELAY,
        }
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    /// Rotate the circuit, then fetch and process one batch of pending URLs.
    ///
    /// Returns `Ok(false)` once the store has no more pending work; an empty
    /// *effective* success set does not terminate the outer loop.
    async fn process_batch(
        &self,
        cancel: &CancellationToken,
        batch_size: usize,
    ) -> Result<bool, AppError> {
        let circuit = self.rotator.rotate().await?;
        tracing::info!(source = %self.name, circuit = %circuit, "circuit rotated");

        let urls = self
            .url_store
            .fetch_batch(UrlStatus::Pending, batch_size)
            .await?;
        if urls.is_empty() {
            return Ok(false);
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let (slot_tx, mut slot_rx) = mpsc::channel(self.max_concurrency);
        for slot in 1..=self.max_concurrency {
            let _ = slot_tx.try_send(slot);
        }

        let mut workers = Vec::with_capacity(urls.len());
        for url in urls {
            if cancel.is_cancelled() {
                break;
            }

            // Acquire a permit and a slot id before spawning.
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let slot = match slot_rx.recv().await {
                Some(slot) => slot,
                None => break,
            };

            let source = self.name.clone();
            let fetcher = self.fetcher.clone();
            let parser = self.parser.clone();
            let url_store = self.url_store.clone();
            let vacancy_store = self.vacancy_store.clone();
            let slot_tx = slot_tx.clone();

            workers.push(tokio::spawn(async move {
                let address = url.address.clone();
                let outcome =
                    AssertUnwindSafe(process_one(fetcher, parser, url_store, vacancy_store, url))
                        .catch_unwind()
                        .await;
                match outcome {
                    Ok(Ok(())) => {
                        tracing::info!(source = %source, url = %address, slot, "processed URL");
                    }
                    Ok(Err(error)) => {
                        tracing::warn!(
                            source = %source,
                            url = %address,
                            slot,
                            error = %error,
                            "failed to process URL"
                        );
                    }
                    Err(_) => {
                        tracing::error!(
                            source = %source,
                            url = %address,
                            slot,
                            "recovered from panic while processing URL"
                        );
                    }
                }
                // Return the slot id, then free the semaphore permit.
                let _ = slot_tx.try_send(slot);
                drop(permit);
            }));
        }

        for worker in workers {
            if let Err(error) = worker.await {
                tracing::error!(source = %self.name, error = %error, "worker task failed");
            }
        }

        Ok(true)
    }
}

/// Process a single URL: fetch → parse → persist vacancy → mark URL.
///
/// A fetch failure marks the URL `failed` and short-circuits; parse and
/// persistence failures leave the URL untouched so a later batch can retry
/// it.
async fn process_one<F, P, U, V>(
    fetcher: F,
    parser: P,
    url_store: U,
    vacancy_store: V,
    url: Url,
) -> Result<(), AppError>
where
    F: HtmlFetcher,
    P: HtmlParser,
    U: UrlStore,
    V: VacancyStore,
{
    let processed_at = Utc::now();
    let id = url.id_hex();

    let body = match fetcher.fetch(&url.address).await {
        Ok(body) => body,
        Err(fetch_error) => {
            url_store
                .update_status(&id, UrlStatus::Failed, Some(processed_at))
                .await?;
            return Err(fetch_error);
        }
    };

    let draft = parser.parse(&body)?;
    let mut vacancy = draft.to_vacancy();
    vacancy_store.save(&mut vacancy).await?;

    url_store
        .update_status(&id, UrlStatus::Success, Some(processed_at))
        .await?;
    Ok(())
}

#[async_trait]
impl<I, R, U, V, F, P> SourceHandler for SourcePipeline<I, R, U, V, F, P>
where
    I: Ingester,
    R: CircuitRotator,
    U: UrlStore + 'static,
    V: VacancyStore + 'static,
    F: HtmlFetcher + 'static,
    P: HtmlParser + 'static,
{
    async fn process_urls(&self, _cancel: &CancellationToken) -> Result<(), AppError> {
        self.ingester.ingest(&self.feed_url).await
    }

    async fn process_html(
        &self,
        cancel: &CancellationToken,
        batch_size: usize,
    ) -> Result<(), AppError> {
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let has_more = self.process_batch(cancel, batch_size).await?;
            if !has_more {
                return Ok(());
            }

            tracing::debug!(source = %self.name, "sleeping between batches");
            tokio::select! {
                () = tokio::time::sleep(self.batch_delay) => {}
                () = cancel.cancelled() => return Ok(()),
            }
        }
    }
}
