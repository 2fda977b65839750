//! Post feed and post detail endpoints.

use axum::extract::{Path, Query, State};

use super::{success, ApiResult, PageQuery};
use crate::blog::{self, PostDetail, PostListing, PostSource};
use crate::AppState;

/// GET /api/posts - Home feed of published posts.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<PostListing> {
    post_feed(&state, PostSource::Published, &query).await
}

/// GET /api/tags/:slug/posts - Posts carrying a tag.
pub async fn list_tag_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<PostListing> {
    post_feed(&state, PostSource::Tag(slug), &query).await
}

/// GET /api/categories/:id/posts - Posts in a category.
pub async fn list_category_posts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> ApiResult<PostListing> {
    post_feed(&state, PostSource::Category(id), &query).await
}

/// GET /api/authors/:id/posts - Posts by an author.
pub async fn list_author_posts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> ApiResult<PostListing> {
    post_feed(&state, PostSource::Author(id), &query).await
}

/// GET /api/posts/:id - A published post with its comment threads.
pub async fn get_post(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<PostDetail> {
    let detail = blog::post_detail(state.store.as_ref(), id, state.config.hot_list_size).await?;
    success(detail)
}

async fn post_feed(state: &AppState, source: PostSource, query: &PageQuery) -> ApiResult<PostListing> {
    let listing = blog::list_posts(
        state.store.as_ref(),
        &source,
        query.page(),
        state.config.page_size,
        state.config.hot_list_size,
    )
    .await?;
    success(listing)
}
