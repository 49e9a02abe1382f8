use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::Collection;

use harvest_core::traits::VacancyStore;
use harvest_core::{AppError, Vacancy};

/// MongoDB-backed store for vacancies.
#[derive(Clone)]
pub struct MongoVacancyStore {
    collection: Collection<Vacancy>,
}

impl MongoVacancyStore {
    pub fn new(collection: Collection<Vacancy>) -> Self {
        Self { collection }
    }
}

impl VacancyStore for MongoVacancyStore {
    async fn save(&self, vacancy: &mut Vacancy) -> Result<(), AppError> {
        if vacancy.id.is_none() {
            vacancy.id = Some(ObjectId::new());
        }
        self.collection
            .insert_one(&*vacancy)
            .await
            .map_err(|e| AppError::DatabaseError(format!("insert vacancy: {e}")))?;
        Ok(())
    }

    async fn update(&self, vacancy: &Vacancy) -> Result<(), AppError> {
        let id = vacancy
            .id
            .ok_or_else(|| AppError::DatabaseError("vacancy has no id".into()))?;

        let result = self
            .collection
            .replace_one(doc! { "_id": id }, vacancy)
            .await
            .map_err(|e| AppError::DatabaseError(format!("update vacancy: {e}")))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(id.to_hex()));
        }
        Ok(())
    }

    async fn fetch(
        &self,
        filters: Document,
        limit: usize,
        offset: u64,
    ) -> Result<Vec<Vacancy>, AppError> {
        let cursor = self
            .collection
            .find(filters)
            .sort(doc! { "posted_at": -1 })
            .limit(limit as i64)
            .skip(offset)
            .await
            .map_err(|e| AppError::DatabaseError(format!("fetch vacancies: {e}")))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AppError::DatabaseError(format!("read vacancies: {e}")))
    }

    /// Unsent vacancies only: `sent_at` is stored as `null` until the
    /// forwarding scheduler stamps it.
    async fn fetch_batch(&self, limit: usize) -> Result<Vec<Vacancy>, AppError> {
        let cursor = self
            .collection
            .find(doc! { "sent_at": Bson::Null })
            .sort(doc! { "_id": 1 })
            .limit(limit as i64)
            .await
            .map_err(|e| AppError::DatabaseError(format!("fetch vacancy batch: {e}")))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AppError::DatabaseError(format!("read vacancy batch: {e}")))
    }

    async fn find_by_id(&self, id: &str) -> Result<Vacancy, AppError> {
        let oid = ObjectId::parse_str(id)
            .map_err(|e| AppError::DatabaseError(format!("invalid vacancy id {id}: {e}")))?;

        self.collection
            .find_one(doc! { "_id": oid })
            .await
            .map_err(|e| AppError::DatabaseError(format!("find vacancy: {e}")))?
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }
}
