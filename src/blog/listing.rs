//! Listing assembly for the home feed, filtered feeds and the repository list.

use serde::Serialize;

use super::pagination::{paginate, Page};
use crate::db::BlogStore;
use crate::errors::AppError;
use crate::models::{AuthorPostCount, CarouselItem, Post, Repository};

/// Which posts a feed shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostSource {
    /// Every published post.
    Published,
    /// Posts carrying the tag with this slug.
    Tag(String),
    /// Posts in this catalogue.
    Category(i64),
    /// Posts written by this user.
    Author(i64),
}

/// Sidebar content shared by listing and detail views.
///
/// A piece that failed to load is `None`; the view is still served.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sidebar {
    pub hot_articles: Option<Vec<Post>>,
    pub author_post_counts: Option<Vec<AuthorPostCount>>,
}

/// Everything a post feed needs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListing {
    #[serde(flatten)]
    pub page: Page<Post>,
    pub sidebar: Sidebar,
    pub carousel: Option<Vec<CarouselItem>>,
}

/// Everything the repository list needs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryListing {
    #[serde(flatten)]
    pub page: Page<Repository>,
    pub sidebar: Sidebar,
}

/// Build a post feed.
///
/// Fails with `NotFound` when the tag, catalogue or author does not exist.
pub async fn list_posts(
    store: &dyn BlogStore,
    source: &PostSource,
    page: usize,
    page_size: usize,
    hot_list_size: usize,
) -> Result<PostListing, AppError> {
    let posts = resolve_posts(store, source).await?;
    let page = paginate(&posts, page, page_size);

    let sidebar = load_sidebar(store, hot_list_size).await;
    let carousel = recover("carousel", store.list_carousel().await);

    Ok(PostListing {
        page,
        sidebar,
        carousel,
    })
}

/// Build the repository list.
pub async fn list_repositories(
    store: &dyn BlogStore,
    page: usize,
    page_size: usize,
    hot_list_size: usize,
) -> Result<RepositoryListing, AppError> {
    let repositories = store.list_repositories().await?;
    let page = paginate(&repositories, page, page_size);
    let sidebar = load_sidebar(store, hot_list_size).await;

    Ok(RepositoryListing { page, sidebar })
}

async fn resolve_posts(store: &dyn BlogStore, source: &PostSource) -> Result<Vec<Post>, AppError> {
    match source {
        PostSource::Published => store.list_published_posts().await,
        PostSource::Tag(slug) => {
            let tag = store
                .get_tag_by_slug(slug)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Tag {} not found", slug)))?;
            store.list_posts_by_tag(tag.id).await
        }
        PostSource::Category(id) => {
            let catalogue = store
                .get_catalogue(*id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;
            store.list_posts_by_catalogue(catalogue.id).await
        }
        PostSource::Author(id) => {
            let user = store
                .get_user(*id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;
            store.list_posts_by_author(user.id).await
        }
    }
}

/// Load the hot list and per-author counts, each independently.
pub async fn load_sidebar(store: &dyn BlogStore, hot_list_size: usize) -> Sidebar {
    Sidebar {
        hot_articles: recover("hot articles", store.hot_posts(hot_list_size).await),
        author_post_counts: recover("author post counts", store.author_post_counts().await),
    }
}

/// Turn a failed sidebar query into an `Aggregation` error, log it and drop the piece.
fn recover<T>(what: &str, result: Result<T, AppError>) -> Option<T> {
    match result.map_err(|e| AppError::Aggregation(format!("{} unavailable: {}", what, e))) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Omitting sidebar data: {}", e);
            None
        }
    }
}
