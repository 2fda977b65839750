//! Post model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication state of a post.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_i64(self) -> i64 {
        match self {
            PostStatus::Draft => 0,
            PostStatus::Published => 1,
        }
    }

    /// Anything other than the published marker is treated as a draft.
    pub fn from_i64(value: i64) -> Self {
        if value == 1 {
            PostStatus::Published
        } else {
            PostStatus::Draft
        }
    }
}

/// A blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub body: String,
    pub status: PostStatus,
    pub view_count: i64,
    pub author_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalogue_id: Option<i64>,
    /// Slugs of the tags attached to this post
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }
}
