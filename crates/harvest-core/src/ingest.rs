use crate::error::AppError;
use crate::traits::{FeedFetcher, FeedParser, Ingester, Notifier, UrlStore};
use crate::url::Url;

/// Turns a remote feed into pending work items.
///
/// One ingest run performs notify → fetch → parse → save; a failure at any
/// step aborts the run.
pub struct SitemapIngester<F, P, N, U>
where
    F: FeedFetcher,
    P: FeedParser,
    N: Notifier,
    U: UrlStore,
{
    fetcher: F,
    parser: P,
    notifier: N,
    urls: U,
}

impl<F, P, N, U> SitemapIngester<F, P, N, U>
where
    F: FeedFetcher,
    P: FeedParser,
    N: Notifier,
    U: UrlStore,
{
    pub fn new(fetcher: F, parser: P, notifier: N, urls: U) -> Self {
        Self {
            fetcher,
            parser,
            notifier,
            urls,
        }
    }

    /// Persist each extracted URL as a pending work item, failing fast on
    /// the first error.
    async fn save_urls(&self, links: Vec<String>) -> Result<(), AppError> {
        let total = links.len();
        for link in links {
            let mut url = Url::pending(link);
            self.urls.save(&mut url).await?;
        }
        tracing::info!(total, "saved feed URLs as pending work items");
        Ok(())
    }
}

impl<F, P, N, U> Ingester for SitemapIngester<F, P, N, U>
where
    F: FeedFetcher,
    P: FeedParser,
    N: Notifier,
    U: UrlStore,
{
    async fn ingest(&self, feed_url: &str) -> Result<(), AppError> {
        self.notifier.notify().await?;

        let body = self.fetcher.fetch(feed_url).await?;
        let links = self.parser.parse(&body)?;

        self.save_urls(links).await
    }
}
