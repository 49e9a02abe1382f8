//! Test utilities: mock implementations of the core capability traits.
//!
//! Handwritten mocks for dependency injection in unit tests. All mocks use
//! `Arc<Mutex<_>>` for interior mutability, allowing test assertions on
//! recorded calls.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::pool::Pooled;
use crate::traits::{
    CircuitRotator, FeedFetcher, HtmlFetcher, HtmlParser, Ingester, Notifier, SourceHandler,
    TokenClient, UrlStore, VacancyClient, VacancyStore,
};
use crate::url::{Url, UrlStatus};
use crate::vacancy::{draft_pool, Vacancy, VacancyDraft};

// ---------------------------------------------------------------------------
// MockHtmlFetcher
// ---------------------------------------------------------------------------

/// Mock HTML fetcher with a scripted response queue and a concurrency gauge.
#[derive(Clone)]
pub struct MockHtmlFetcher {
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    delay: Duration,
    pub calls: Arc<Mutex<Vec<String>>>,
    active: Arc<AtomicUsize>,
    pub max_active: Arc<AtomicUsize>,
}

impl MockHtmlFetcher {
    pub fn new(html: &str) -> Self {
        Self::with_responses(vec![Ok(html.to_string())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Hold each fetch open for `delay` so overlap becomes observable.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn next_response(&self) -> Result<String, AppError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("<html><body>default</body></html>".to_string())
        } else {
            responses.remove(0)
        }
    }
}

impl HtmlFetcher for MockHtmlFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(url.to_string());

        let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(running, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        self.next_response()
    }
}

// ---------------------------------------------------------------------------
// MockHtmlParser
// ---------------------------------------------------------------------------

/// Mock parser that returns a canned draft, an error, or panics.
#[derive(Clone)]
pub struct MockHtmlParser {
    error: Arc<Mutex<Option<AppError>>>,
    panics: bool,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockHtmlParser {
    pub fn new() -> Self {
        Self {
            error: Arc::new(Mutex::new(None)),
            panics: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_error(error: AppError) -> Self {
        Self {
            error: Arc::new(Mutex::new(Some(error))),
            panics: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn panicking() -> Self {
        Self {
            error: Arc::new(Mutex::new(None)),
            panics: true,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl HtmlParser for MockHtmlParser {
    fn parse(&self, html: &str) -> Result<Pooled<VacancyDraft>, AppError> {
        self.calls.lock().unwrap().push(html.to_string());

        if self.panics {
            panic!("parser blew up");
        }
        if let Some(error) = self.error.lock().unwrap().take() {
            return Err(error);
        }

        let mut draft = draft_pool().get();
        draft.title.push_str("Parsed Title");
        draft.company.push_str("Parsed Company");
        draft.description.push_str("Parsed Description");
        draft.location.push_str("Parsed Location");
        draft.posted_at = Some(Utc::now());
        Ok(draft)
    }
}

// ---------------------------------------------------------------------------
// MockFeedFetcher / MockNotifier / MockIngester
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MockFeedFetcher {
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockFeedFetcher {
    pub fn new(body: &str) -> Self {
        Self {
            responses: Arc::new(Mutex::new(vec![Ok(body.to_string())])),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_error(error: AppError) -> Self {
        Self {
            responses: Arc::new(Mutex::new(vec![Err(error)])),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FeedFetcher for MockFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(url.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(String::new())
        } else {
            responses.remove(0)
        }
    }
}

#[derive(Clone)]
pub struct MockNotifier {
    error: Arc<Mutex<Option<AppError>>>,
    pub calls: Arc<AtomicUsize>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            error: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_error(error: AppError) -> Self {
        Self {
            error: Arc::new(Mutex::new(Some(error))),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Notifier for MockNotifier {
    async fn notify(&self) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockIngester {
    error: Arc<Mutex<Option<AppError>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockIngester {
    pub fn new() -> Self {
        Self {
            error: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_error(error: AppError) -> Self {
        Self {
            error: Arc::new(Mutex::new(Some(error))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Ingester for MockIngester {
    async fn ingest(&self, feed_url: &str) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(feed_url.to_string());
        if let Some(error) = self.error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockRotator
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MockRotator {
    results: Arc<Mutex<Vec<Result<String, AppError>>>>,
    pub calls: Arc<AtomicUsize>,
}

impl MockRotator {
    /// Rotator that always reports a fresh circuit.
    pub fn ok() -> Self {
        Self {
            results: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_error(error: AppError) -> Self {
        Self {
            results: Arc::new(Mutex::new(vec![Err(error)])),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl CircuitRotator for MockRotator {
    async fn rotate(&self) -> Result<String, AppError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            Ok(format!("circuit-{call}"))
        } else {
            results.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockUrlStore
// ---------------------------------------------------------------------------

/// Recorded status update: (id hex, status, processed instant).
pub type StatusUpdateRecord = (String, UrlStatus, Option<DateTime<Utc>>);

#[derive(Clone)]
pub struct MockUrlStore {
    batches: Arc<Mutex<Vec<Vec<Url>>>>,
    save_error: Arc<Mutex<Option<AppError>>>,
    pub saved: Arc<Mutex<Vec<Url>>>,
    pub status_updates: Arc<Mutex<Vec<StatusUpdateRecord>>>,
    pub fetch_calls: Arc<AtomicUsize>,
}

impl MockUrlStore {
    pub fn empty() -> Self {
        Self::with_batches(Vec::new())
    }

    /// Store whose `fetch_batch` pops the given batches in order, then
    /// reports no more work.
    pub fn with_batches(batches: Vec<Vec<Url>>) -> Self {
        Self {
            batches: Arc::new(Mutex::new(batches)),
            save_error: Arc::new(Mutex::new(None)),
            saved: Arc::new(Mutex::new(Vec::new())),
            status_updates: Arc::new(Mutex::new(Vec::new())),
            fetch_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_save_error(error: AppError) -> Self {
        let store = Self::empty();
        *store.save_error.lock().unwrap() = Some(error);
        store
    }
}

impl UrlStore for MockUrlStore {
    async fn save(&self, url: &mut Url) -> Result<(), AppError> {
        if let Some(error) = self.save_error.lock().unwrap().take() {
            return Err(error);
        }
        if url.id.is_none() {
            url.id = Some(ObjectId::new());
        }
        self.saved.lock().unwrap().push(url.clone());
        Ok(())
    }

    async fn fetch_batch(&self, _status: UrlStatus, limit: usize) -> Result<Vec<Url>, AppError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let mut batches = self.batches.lock().unwrap();
        if batches.is_empty() {
            Ok(Vec::new())
        } else {
            let mut batch = batches.remove(0);
            batch.truncate(limit);
            Ok(batch)
        }
    }

    async fn update_status(
        &self,
        id: &str,
        status: UrlStatus,
        processed_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        self.status_updates
            .lock()
            .unwrap()
            .push((id.to_string(), status, processed_at));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockVacancyStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MockVacancyStore {
    pub vacancies: Arc<Mutex<Vec<Vacancy>>>,
    pub saved: Arc<Mutex<Vec<Vacancy>>>,
    pub updated: Arc<Mutex<Vec<Vacancy>>>,
    save_error: Arc<Mutex<Option<AppError>>>,
    update_error: Arc<Mutex<Option<AppError>>>,
}

impl MockVacancyStore {
    pub fn empty() -> Self {
        Self::seeded(Vec::new())
    }

    pub fn seeded(vacancies: Vec<Vacancy>) -> Self {
        Self {
            vacancies: Arc::new(Mutex::new(vacancies)),
            saved: Arc::new(Mutex::new(Vec::new())),
            updated: Arc::new(Mutex::new(Vec::new())),
            save_error: Arc::new(Mutex::new(None)),
            update_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_save_error(error: AppError) -> Self {
        let store = Self::empty();
        *store.save_error.lock().unwrap() = Some(error);
        store
    }

    pub fn with_update_error(error: AppError) -> Self {
        let store = Self::empty();
        *store.update_error.lock().unwrap() = Some(error);
        store
    }
}

impl VacancyStore for MockVacancyStore {
    async fn save(&self, vacancy: &mut Vacancy) -> Result<(), AppError> {
        if let Some(error) = self.save_error.lock().unwrap().take() {
            return Err(error);
        }
        if vacancy.id.is_none() {
            vacancy.id = Some(ObjectId::new());
        }
        self.saved.lock().unwrap().push(vacancy.clone());
        self.vacancies.lock().unwrap().push(vacancy.clone());
        Ok(())
    }

    async fn update(&self, vacancy: &Vacancy) -> Result<(), AppError> {
        if let Some(error) = self.update_error.lock().unwrap().take() {
            return Err(error);
        }
        self.updated.lock().unwrap().push(vacancy.clone());

        let mut vacancies = self.vacancies.lock().unwrap();
        match vacancies.iter_mut().find(|v| v.id == vacancy.id) {
            Some(stored) => {
                *stored = vacancy.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(vacancy.id_hex())),
        }
    }

    async fn fetch(
        &self,
        _filters: bson::Document,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<Vacancy>, AppError> {
        let vacancies = self.vacancies.lock().unwrap();
        Ok(vacancies
            .iter()
            .skip(offset as usize)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fetch_batch(&self, limit: usize) -> Result<Vec<Vacancy>, AppError> {
        let vacancies = self.vacancies.lock().unwrap();
        Ok(vacancies
            .iter()
            .filter(|v| v.sent_at.is_none())
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Vacancy, AppError> {
        let vacancies = self.vacancies.lock().unwrap();
        vacancies
            .iter()
            .find(|v| v.id_hex() == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// MockTokenClient / MockVacancyClient
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MockTokenClient {
    token: String,
    error: Arc<Mutex<Option<AppError>>>,
    pub requests: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl MockTokenClient {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            error: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_error(error: AppError) -> Self {
        let client = Self::new("");
        *client.error.lock().unwrap() = Some(error);
        client
    }
}

impl TokenClient for MockTokenClient {
    async fn generate(&self, issuer: &str, scopes: &[String]) -> Result<String, AppError> {
        self.requests
            .lock()
            .unwrap()
            .push((issuer.to_string(), scopes.to_vec()));
        if let Some(error) = self.error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self.token.clone())
    }
}

/// Recorded remote creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedVacancy {
    pub token: String,
    pub title: String,
    pub company: String,
    pub description: String,
    pub posted_at: String,
    pub location: String,
}

#[derive(Clone)]
pub struct MockVacancyClient {
    fail_titles: Arc<Mutex<HashSet<String>>>,
    pub created: Arc<Mutex<Vec<CreatedVacancy>>>,
    active: Arc<AtomicUsize>,
    pub max_active: Arc<AtomicUsize>,
    delay: Duration,
}

impl MockVacancyClient {
    pub fn new() -> Self {
        Self {
            fail_titles: Arc::new(Mutex::new(HashSet::new())),
            created: Arc::new(Mutex::new(Vec::new())),
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
        }
    }

    /// Fail every creation whose title is in the given set.
    pub fn failing_titles(titles: &[&str]) -> Self {
        let client = Self::new();
        let mut failures = client.fail_titles.lock().unwrap();
        for title in titles {
            failures.insert((*title).to_string());
        }
        drop(failures);
        client
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl VacancyClient for MockVacancyClient {
    async fn create_vacancy(
        &self,
        token: &str,
        title: &str,
        company: &str,
        description: &str,
        posted_at: &str,
        location: &str,
    ) -> Result<i64, AppError> {
        let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(running, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail_titles.lock().unwrap().contains(title) {
            return Err(AppError::RpcError(format!("create vacancy: {title}")));
        }

        let mut created = self.created.lock().unwrap();
        created.push(CreatedVacancy {
            token: token.to_string(),
            title: title.to_string(),
            company: company.to_string(),
            description: description.to_string(),
            posted_at: posted_at.to_string(),
            location: location.to_string(),
        });
        Ok(created.len() as i64)
    }
}

// ---------------------------------------------------------------------------
// MockHandler
// ---------------------------------------------------------------------------

/// Source handler that records its phases into a shared journal.
pub struct MockHandler {
    name: String,
    pub journal: Arc<Mutex<Vec<String>>>,
    urls_error: Arc<Mutex<Option<AppError>>>,
    html_error: Arc<Mutex<Option<AppError>>>,
}

impl MockHandler {
    pub fn new(name: &str, journal: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            journal,
            urls_error: Arc::new(Mutex::new(None)),
            html_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_urls_error(self, error: AppError) -> Self {
        *self.urls_error.lock().unwrap() = Some(error);
        self
    }

    pub fn with_html_error(self, error: AppError) -> Self {
        *self.html_error.lock().unwrap() = Some(error);
        self
    }
}

#[async_trait]
impl SourceHandler for MockHandler {
    async fn process_urls(&self, _cancel: &CancellationToken) -> Result<(), AppError> {
        self.journal.lock().unwrap().push(format!("{}:urls", self.name));
        if let Some(error) = self.urls_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(())
    }

    async fn process_html(
        &self,
        _cancel: &CancellationToken,
        _batch_size: usize,
    ) -> Result<(), AppError> {
        self.journal.lock().unwrap().push(format!("{}:html", self.name));
        if let Some(error) = self.html_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Create a pending URL with an assigned id.
pub fn make_pending_url(address: &str) -> Url {
    Url {
        id: Some(ObjectId::new()),
        address: address.to_string(),
        status: UrlStatus::Pending,
        processed_at: None,
    }
}

/// Create a vacancy, optionally already shipped.
pub fn make_vacancy(title: &str, sent_at: Option<DateTime<Utc>>) -> Vacancy {
    Vacancy {
        id: Some(ObjectId::new()),
        title: title.to_string(),
        company: format!("{title} Inc."),
        description: format!("{title} description"),
        posted_at: Utc::now(),
        location: "Remote".to_string(),
        sent_at,
    }
}
