//! Repository showcase endpoints.

use axum::extract::{Path, Query, State};

use super::{success, ApiResult, PageQuery};
use crate::blog::{self, RepositoryDetail, RepositoryListing};
use crate::AppState;

/// GET /api/repositories - Paginated repository list.
pub async fn list_repositories(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<RepositoryListing> {
    let listing = blog::list_repositories(
        state.store.as_ref(),
        query.page(),
        state.config.page_size,
        state.config.hot_list_size,
    )
    .await?;
    success(listing)
}

/// GET /api/repositories/:id - A single repository.
pub async fn get_repository(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<RepositoryDetail> {
    let detail =
        blog::repository_detail(state.store.as_ref(), id, state.config.hot_list_size).await?;
    success(detail)
}
