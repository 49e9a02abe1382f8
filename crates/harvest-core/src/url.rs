use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing status of a work-item URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlStatus {
    Pending,
    Success,
    Failed,
}

impl UrlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlStatus::Pending => "pending",
            UrlStatus::Success => "success",
            UrlStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UrlStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(UrlStatus::Pending),
            "success" => Ok(UrlStatus::Success),
            "failed" => Ok(UrlStatus::Failed),
            _ => Err(format!("Unknown url status: {}", s)),
        }
    }
}

/// A candidate URL discovered from a feed, waiting to be fetched and parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Url {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub address: String,
    pub status: UrlStatus,
    /// When the URL was last processed; `None` means never.
    #[serde(with = "crate::util::optional_bson_datetime", default)]
    pub processed_at: Option<DateTime<Utc>>,
}

impl Url {
    /// A freshly discovered, not-yet-processed work item.
    pub fn pending(address: impl Into<String>) -> Self {
        Self {
            id: None,
            address: address.into(),
            status: UrlStatus::Pending,
            processed_at: None,
        }
    }

    /// Hex rendering of the id, empty when no id has been assigned yet.
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}
