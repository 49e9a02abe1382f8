use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::traits::SourceHandler;

/// Registry of source handlers, run sequentially once per cycle.
///
/// A cycle is explicitly single-pass; periodic re-runs are the
/// responsibility of an external scheduler.
pub struct PipelineOrchestrator {
    handlers: RwLock<HashMap<String, Arc<dyn SourceHandler>>>,
    batch_size: usize,
}

impl PipelineOrchestrator {
    pub fn new(batch_size: usize) -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            batch_size,
        }
    }

    /// Add a source handler under a unique name.
    pub fn register(
        &self,
        name: impl Into<String>,
        handler: Arc<dyn SourceHandler>,
    ) -> Result<(), AppError> {
        let name = name.into();
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if handlers.contains_key(&name) {
            return Err(AppError::ConfigError(format!(
                "handler with name {name} already exists"
            )));
        }
        handlers.insert(name, handler);
        Ok(())
    }

    /// Retrieve a handler by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn SourceHandler>, AppError> {
        let handlers = self
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        handlers
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::ConfigError(format!("handler with name {name} does not exist")))
    }

    /// Run one pass over every registered source: ingest its feed, then
    /// drain its pending URLs. Per-source errors are logged and the pass
    /// moves on; a URL-phase failure skips that source's HTML phase.
    pub async fn run(&self, cancel: &CancellationToken) {
        let handlers = self.snapshot();
        tracing::info!(sources = handlers.len(), "starting to process all registered sources");

        for (name, handler) in handlers {
            if cancel.is_cancelled() {
                tracing::info!("cancellation requested; stopping source processing");
                break;
            }
            tracing::info!(source = %name, "processing source");

            if let Err(error) = handler.process_urls(cancel).await {
                tracing::error!(source = %name, error = %error, "failed to process source URLs");
                continue;
            }
            if let Err(error) = handler.process_html(cancel, self.batch_size).await {
                tracing::error!(source = %name, error = %error, "failed to process source HTML");
            }
        }

        tracing::info!("finished processing all registered sources");
    }

    /// Snapshot the registry in name order so a run is deterministic.
    fn snapshot(&self) -> Vec<(String, Arc<dyn SourceHandler>)> {
        let handlers = self
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut snapshot: Vec<_> = handlers
            .iter()
            .map(|(name, handler)| (name.clone(), Arc::clone(handler)))
            .collect();
        snapshot.sort_by(|a, b| a.0.cmp(&b.0));
        snapshot
    }
}
