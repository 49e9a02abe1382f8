use bson::oid::ObjectId;
use bson::doc;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::Collection;

use harvest_core::traits::UrlStore;
use harvest_core::{AppError, Url, UrlStatus};

/// MongoDB-backed store for work-item URLs.
#[derive(Clone)]
pub struct MongoUrlStore {
    collection: Collection<Url>,
}

impl MongoUrlStore {
    pub fn new(collection: Collection<Url>) -> Self {
        Self { collection }
    }
}

impl UrlStore for MongoUrlStore {
    async fn save(&self, url: &mut Url) -> Result<(), AppError> {
        if url.id.is_none() {
            url.id = Some(ObjectId::new());
        }
        self.collection
            .insert_one(&*url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("insert url: {e}")))?;
        Ok(())
    }

    async fn fetch_batch(&self, status: UrlStatus, limit: usize) -> Result<Vec<Url>, AppError> {
        let cursor = self
            .collection
            .find(doc! { "status": status.as_str() })
            .sort(doc! { "_id": 1 })
            .limit(limit as i64)
            .await
            .map_err(|e| AppError::DatabaseError(format!("fetch url batch: {e}")))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AppError::DatabaseError(format!("read url batch: {e}")))
    }

    async fn update_status(
        &self,
        id: &str,
        status: UrlStatus,
        processed_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        let oid = ObjectId::parse_str(id)
            .map_err(|e| AppError::DatabaseError(format!("invalid url id {id}: {e}")))?;

        let mut fields = doc! { "status": status.as_str() };
        if let Some(instant) = processed_at {
            fields.insert("processed_at", bson::DateTime::from_chrono(instant));
        }

        let result = self
            .collection
            .update_one(doc! { "_id": oid }, doc! { "$set": fields })
            .await
            .map_err(|e| AppError::DatabaseError(format!("update url status: {e}")))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
