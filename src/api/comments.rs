//! Comment endpoints.

use axum::{
    extract::{Path, State},
    Form, Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::auth::{Caller, ClientIp};
use crate::blog;
use crate::errors::AppError;
use crate::models::{DeletedComment, RenderedComment};
use crate::AppState;

/// Form body of a new comment.
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub comment: String,
}

/// POST /api/posts/:id/comments - Add a root comment to a post.
pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    caller: Caller,
    ClientIp(ip): ClientIp,
    Form(form): Form<CommentForm>,
) -> ApiResult<RenderedComment> {
    tracing::debug!(post_id, authenticated = caller.is_authenticated(), "Comment submitted");
    let rendered =
        blog::submit_comment(state.store.as_ref(), &caller, post_id, &form.comment, &ip).await?;
    success(rendered)
}

/// POST /api/comments/:id/delete - Soft-delete a comment.
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<i64>,
    caller: Caller,
) -> Result<Json<DeletedComment>, AppError> {
    let deleted = blog::delete_comment(
        state.store.as_ref(),
        &caller,
        comment_id,
        state.config.restrict_comment_delete,
    )
    .await?;
    Ok(Json(deleted))
}
