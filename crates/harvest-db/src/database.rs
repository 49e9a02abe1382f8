use bson::doc;
use mongodb::Client;

use harvest_core::AppError;

use crate::config::MongoConfig;
use crate::url_store::MongoUrlStore;
use crate::vacancy_store::MongoVacancyStore;

/// Central document-store facade that owns the client and vends typed stores.
#[derive(Clone)]
pub struct Database {
    client: Client,
    config: MongoConfig,
}

impl Database {
    /// Connect to MongoDB with the given configuration.
    pub async fn connect(config: MongoConfig) -> Result<Self, AppError> {
        let client = Client::with_uri_str(config.connection_uri())
            .await
            .map_err(|e| AppError::DatabaseError(format!("unable to connect to mongo: {e}")))?;

        Ok(Self { client, config })
    }

    /// Verify the deployment is reachable. The driver connects lazily, so
    /// this is the first operation that actually dials.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::DatabaseError(format!("ping mongo: {e}")))?;
        Ok(())
    }

    /// Get a [`MongoUrlStore`] backed by this client.
    pub fn url_store(&self) -> MongoUrlStore {
        let collection = self
            .client
            .database(&self.config.database)
            .collection(&self.config.urls_collection);
        MongoUrlStore::new(collection)
    }

    /// Get a [`MongoVacancyStore`] backed by this client.
    pub fn vacancy_store(&self) -> MongoVacancyStore {
        let collection = self
            .client
            .database(&self.config.database)
            .collection(&self.config.vacancy_collection);
        MongoVacancyStore::new(collection)
    }

    /// Cleanly shut the client down, draining in-flight operations.
    pub async fn shutdown(&self) {
        self.client.clone().shutdown().await;
    }
}
