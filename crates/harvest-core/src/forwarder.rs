//! Ticker-driven shipment of unsent vacancies over the outbound RPC.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::traits::{TokenClient, VacancyClient, VacancyStore};
use crate::vacancy::Vacancy;

const MAX_CONCURRENCY: usize = 5;

/// Periodically drains vacancies whose `sent_at` is unset, shipping them to
/// the remote service under a fresh bearer token per cycle.
#[derive(Clone)]
pub struct ForwardingScheduler<V, T, C>
where
    V: VacancyStore,
    T: TokenClient,
    C: VacancyClient,
{
    vacancies: V,
    tokens: T,
    rpc: C,
    batch_size: usize,
    token_issuer: String,
    token_scopes: Vec<String>,
    ticker_time: Duration,
    cancel: CancellationToken,
    processed_count: Arc<AtomicI64>,
}

impl<V, T, C> ForwardingScheduler<V, T, C>
where
    V: VacancyStore + 'static,
    T: TokenClient + 'static,
    C: VacancyClient + 'static,
{
    pub fn new(
        vacancies: V,
        tokens: T,
        rpc: C,
        batch_size: usize,
        token_issuer: impl Into<String>,
        token_scopes: Vec<String>,
        ticker_time: Duration,
    ) -> Self {
        Self {
            vacancies,
            tokens,
            rpc,
            batch_size,
            token_issuer: token_issuer.into(),
            token_scopes,
            ticker_time,
            cancel: CancellationToken::new(),
            processed_count: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Spawn the driver task. Each tick runs one forwarding cycle; a cycle
    /// error is logged and the driver waits for the next tick.
    pub fn start(&self) -> JoinHandle<()> {
        let scheduler = self.clone();
        tokio::spawn(async move {
            tracing::info!("starting forwarding scheduler");
            loop {
                tokio::select! {
                    () = scheduler.cancel.cancelled() => {
                        tracing::info!("forwarding scheduler exit");
                        return;
                    }
                    () = tokio::time::sleep(scheduler.ticker_time) => {
                        if let Err(error) = scheduler.run_cycle().await {
                            tracing::error!(error = %error, "transfer vacancies failed");
                        }
                    }
                }
            }
        })
    }

    /// Signal the driver to exit after the current tick completes.
    /// Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Total vacancies shipped successfully since construction.
    pub fn processed(&self) -> i64 {
        self.processed_count.load(Ordering::SeqCst)
    }

    /// One forwarding cycle: acquire a fresh token, then drain batches until
    /// no unsent vacancies remain. Public for testing purposes.
    pub async fn run_cycle(&self) -> Result<(), AppError> {
        let token = self
            .tokens
            .generate(&self.token_issuer, &self.token_scopes)
            .await?;

        loop {
            let has_more = self.process_batch(&token).await?;
            if !has_more {
                tracing::debug!("finished processing all batches");
                return Ok(());
            }
        }
    }

    async fn process_batch(&self, token: &str) -> Result<bool, AppError> {
        let items = self.vacancies.fetch_batch(self.batch_size).await?;
        if items.is_empty() {
            return Ok(false);
        }

        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENCY));
        let (slot_tx, mut slot_rx) = mpsc::channel(MAX_CONCURRENCY);
        for slot in 1..=MAX_CONCURRENCY {
            let _ = slot_tx.try_send(slot);
        }

        let mut workers = Vec::with_capacity(items.len());
        for item in items {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let slot = match slot_rx.recv().await {
                Some(slot) => slot,
                None => break,
            };

            let vacancies = self.vacancies.clone();
            let rpc = self.rpc.clone();
            let token = token.to_string();
            let counter = Arc::clone(&self.processed_count);
            let slot_tx = slot_tx.clone();

            workers.push(tokio::spawn(async move {
                let id = item.id_hex();
                let outcome = AssertUnwindSafe(send_one(vacancies, rpc, token, item))
                    .catch_unwind()
                    .await;
                match outcome {
                    Ok(Ok(())) => {
                        counter.fetch_add(1, Ordering::SeqCst);
                        tracing::info!(vacancy = %id, slot, "successfully sent vacancy");
                    }
                    Ok(Err(error)) => {
                        tracing::warn!(vacancy = %id, slot, error = %error, "could not send vacancy");
                    }
                    Err(_) => {
                        tracing::error!(vacancy = %id, slot, "recovered from panic while sending vacancy");
                    }
                }
                let _ = slot_tx.try_send(slot);
                drop(permit);
            }));
        }

        for worker in workers {
            if let Err(error) = worker.await {
                tracing::error!(error = %error, "forwarding worker task failed");
            }
        }

        tracing::debug!(total = self.processed(), "processed items in total");
        Ok(true)
    }
}

/// Ship one vacancy, then stamp its `sent_at`.
///
/// The remote creation is not undone when the local update fails, so
/// delivery is at-least-once.
async fn send_one<V, C>(
    vacancies: V,
    rpc: C,
    token: String,
    mut item: Vacancy,
) -> Result<(), AppError>
where
    V: VacancyStore,
    C: VacancyClient,
{
    let posted_at = item.posted_at.format("%Y-%m-%d").to_string();
    rpc.create_vacancy(
        &token,
        &item.title,
        &item.company,
        &item.description,
        &posted_at,
        &item.location,
    )
    .await?;

    item.sent_at = Some(Utc::now());
    vacancies.update(&item).await?;
    Ok(())
}
