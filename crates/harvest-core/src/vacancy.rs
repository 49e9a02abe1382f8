use std::sync::OnceLock;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pool::{ObjectPool, Poolable};

/// A structured job vacancy extracted from a source page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vacancy {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub company: String,
    pub description: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub posted_at: DateTime<Utc>,
    pub location: String,
    /// When the vacancy was acknowledged by the downstream service;
    /// `None` means not yet shipped.
    #[serde(with = "crate::util::optional_bson_datetime", default)]
    pub sent_at: Option<DateTime<Utc>>,
}

impl Vacancy {
    /// Hex rendering of the id, empty when no id has been assigned yet.
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

/// Mutable scratch DTO filled by the per-source HTML parsers.
///
/// Borrowed from [`draft_pool`] on the hot per-URL path and released when the
/// guard drops.
#[derive(Debug, Default)]
pub struct VacancyDraft {
    pub title: String,
    pub company: String,
    pub description: String,
    pub location: String,
    pub posted_at: Option<DateTime<Utc>>,
}

impl VacancyDraft {
    /// Map the draft into a persistable entity. A missing `posted_at`
    /// defaults to the current instant.
    pub fn to_vacancy(&self) -> Vacancy {
        Vacancy {
            id: None,
            title: self.title.clone(),
            company: self.company.clone(),
            description: self.description.clone(),
            posted_at: self.posted_at.unwrap_or_else(Utc::now),
            location: self.location.clone(),
            sent_at: None,
        }
    }
}

impl Poolable for VacancyDraft {
    fn reset(&mut self) {
        self.title.clear();
        self.company.clear();
        self.description.clear();
        self.location.clear();
        self.posted_at = None;
    }
}

static DRAFT_POOL: OnceLock<ObjectPool<VacancyDraft>> = OnceLock::new();

/// Process-wide pool of vacancy drafts.
pub fn draft_pool() -> &'static ObjectPool<VacancyDraft> {
    DRAFT_POOL.get_or_init(ObjectPool::new)
}
