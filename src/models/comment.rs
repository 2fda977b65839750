//! Comment model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum comment length, counted in characters.
pub const MAX_COMMENT_CHARS: usize = 200;

/// Display format for comment timestamps.
pub const COMMENT_TIME_FORMAT: &str = "%Y年%m月%d日 %H:%M";

/// A comment on a post.
///
/// `root_id` is `None` for root comments and points at the root comment
/// (on the same post) for replies. The client address is kept for
/// diagnostics and never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_id: Option<i64>,
    pub author_id: i64,
    pub author_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
    pub content: String,
    #[serde(skip_serializing, default)]
    pub ip_address: String,
    pub published_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.root_id.is_none()
    }
}

/// Values needed to store a new comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub root_id: Option<i64>,
    pub author_id: i64,
    pub content: String,
    pub ip_address: String,
}

/// A freshly submitted comment, shaped for immediate display.
///
/// `content` is the raw user input; renderers must escape it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedComment {
    pub id: i64,
    pub author_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
    pub published_at: String,
    pub content: String,
}

impl From<&Comment> for RenderedComment {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            author_name: comment.author_name.clone(),
            author_avatar: comment.author_avatar.clone(),
            published_at: comment.published_at.format(COMMENT_TIME_FORMAT).to_string(),
            content: comment.content.clone(),
        }
    }
}

/// Response body of a soft-delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedComment {
    pub comment_id: i64,
}
