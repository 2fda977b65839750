//! Detail assembly for single posts and repositories.
//!
//! Every fetch counts as a view; there is no per-viewer deduplication.

use serde::Serialize;

use super::listing::{load_sidebar, Sidebar};
use super::threading::{thread_comments, CommentThread};
use crate::db::BlogStore;
use crate::errors::AppError;
use crate::models::{Post, Repository};

/// A post with its comment threads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<CommentThread>,
    pub sidebar: Sidebar,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDetail {
    pub repository: Repository,
    pub sidebar: Sidebar,
}

/// Fetch a published post, count the view and thread its comments.
pub async fn post_detail(
    store: &dyn BlogStore,
    id: i64,
    hot_list_size: usize,
) -> Result<PostDetail, AppError> {
    let mut post = store
        .get_post(id)
        .await?
        .filter(Post::is_published)
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))?;

    post.view_count = store
        .increment_post_views(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))?;
    tracing::debug!(post_id = id, view_count = post.view_count, "Counted post view");

    let comments = thread_comments(store.list_comments_for_post(id).await?);
    let sidebar = load_sidebar(store, hot_list_size).await;

    Ok(PostDetail {
        post,
        comments,
        sidebar,
    })
}

/// Fetch a repository and count the view.
pub async fn repository_detail(
    store: &dyn BlogStore,
    id: i64,
    hot_list_size: usize,
) -> Result<RepositoryDetail, AppError> {
    let mut repository = store
        .get_repository(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Repository {} not found", id)))?;

    repository.view_count = store
        .increment_repository_views(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Repository {} not found", id)))?;
    tracing::debug!(repository_id = id, view_count = repository.view_count, "Counted repository view");

    let sidebar = load_sidebar(store, hot_list_size).await;

    Ok(RepositoryDetail {
        repository,
        sidebar,
    })
}
