pub mod error;
pub mod forwarder;
pub mod ingest;
pub mod orchestrator;
pub mod parse;
pub mod pipeline;
pub mod pool;
pub mod retry;
pub mod traits;
pub mod url;
pub mod util;
pub mod vacancy;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::AppError;
pub use forwarder::ForwardingScheduler;
pub use ingest::SitemapIngester;
pub use orchestrator::PipelineOrchestrator;
pub use pipeline::SourcePipeline;
pub use pool::{ObjectPool, Poolable, Pooled};
pub use retry::RetryPolicy;
pub use url::{Url, UrlStatus};
pub use vacancy::{draft_pool, Vacancy, VacancyDraft};
