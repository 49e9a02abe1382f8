use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::pool::Pooled;
use crate::url::{Url, UrlStatus};
use crate::vacancy::{Vacancy, VacancyDraft};

/// Fetches raw HTML content from a URL through the anonymized egress.
pub trait HtmlFetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Extracts vacancy details from raw HTML content.
pub trait HtmlParser: Send + Sync + Clone {
    fn parse(&self, html: &str) -> Result<Pooled<VacancyDraft>, AppError>;
}

/// Streams the body of a feed document; errors on non-200 responses.
pub trait FeedFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Pure transformation from a feed body to a list of absolute URLs.
pub trait FeedParser: Send + Sync {
    fn parse(&self, body: &str) -> Result<Vec<String>, AppError>;
}

/// Performs a diagnostic request to log the observed egress identity.
pub trait Notifier: Send + Sync {
    fn notify(&self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Turns a feed into pending work items.
pub trait Ingester: Send + Sync {
    fn ingest(&self, feed_url: &str) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Rotates the anonymizing circuit, returning the verified post-rotation
/// status.
pub trait CircuitRotator: Send + Sync {
    fn rotate(&self) -> impl Future<Output = Result<String, AppError>> + Send;
}

impl<T: CircuitRotator> CircuitRotator for Arc<T> {
    fn rotate(&self) -> impl Future<Output = Result<String, AppError>> + Send {
        (**self).rotate()
    }
}

/// Typed repository over persisted work-item URLs.
pub trait UrlStore: Send + Sync + Clone {
    /// Persist a new URL, assigning an id when the entity has none.
    fn save(&self, url: &mut Url) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Retrieve up to `limit` URLs with the given status, in a
    /// deterministic order.
    fn fetch_batch(
        &self,
        status: UrlStatus,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Url>, AppError>> + Send;

    /// Update the status (and optionally the processed instant) of the URL
    /// with the given hex id. Errors when no record matches.
    fn update_status(
        &self,
        id: &str,
        status: UrlStatus,
        processed_at: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Typed repository over persisted vacancies.
pub trait VacancyStore: Send + Sync + Clone {
    /// Persist a new vacancy, assigning an id when the entity has none.
    fn save(&self, vacancy: &mut Vacancy) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Replace the stored vacancy with the same id. Errors when no record
    /// matches.
    fn update(&self, vacancy: &Vacancy) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Generic query with pagination, ordered by `posted_at` descending.
    fn fetch(
        &self,
        filters: bson::Document,
        limit: usize,
        offset: u64,
    ) -> impl Future<Output = Result<Vec<Vacancy>, AppError>> + Send;

    /// Retrieve up to `limit` vacancies that have not been shipped yet, in a
    /// deterministic order.
    fn fetch_batch(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Vacancy>, AppError>> + Send;

    fn find_by_id(&self, id: &str) -> impl Future<Output = Result<Vacancy, AppError>> + Send;
}

/// Issues short-lived bearer tokens for outbound calls.
pub trait TokenClient: Send + Sync + Clone {
    fn generate(
        &self,
        issuer: &str,
        scopes: &[String],
    ) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Ships vacancies to the remote service.
pub trait VacancyClient: Send + Sync + Clone {
    /// Create a vacancy remotely; `posted_at` must be rendered `YYYY-MM-DD`.
    /// Returns the remote id.
    #[allow(clippy::too_many_arguments)]
    fn create_vacancy(
        &self,
        token: &str,
        title: &str,
        company: &str,
        description: &str,
        posted_at: &str,
        location: &str,
    ) -> impl Future<Output = Result<i64, AppError>> + Send;
}

/// The operations required for managing a vacancy source.
#[async_trait]
pub trait SourceHandler: Send + Sync {
    /// Retrieve the source's feed and persist its URLs as pending work.
    async fn process_urls(&self, cancel: &CancellationToken) -> Result<(), AppError>;

    /// Consume pending URLs for this source in batches, extracting and
    /// persisting vacancies.
    async fn process_html(
        &self,
        cancel: &CancellationToken,
        batch_size: usize,
    ) -> Result<(), AppError>;
}
