use serde::{Deserialize, Serialize};

/// A featured item shown above post feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselItem {
    pub id: i64,
    pub title: String,
    pub image_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}
