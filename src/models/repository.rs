//! Code repository showcase model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A showcased code repository. Same view counting as posts, no comments or tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}
