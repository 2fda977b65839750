//! Catalogue and tag models used to filter post feeds.

use serde::{Deserialize, Serialize};

/// A post category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalogue {
    pub id: i64,
    pub name: String,
}

/// A tag, addressed by its slug in URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: i64,
    pub slug: String,
    pub name: String,
}
