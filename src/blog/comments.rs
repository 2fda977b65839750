//! Comment submission and soft deletion.

use crate::auth::Caller;
use crate::db::BlogStore;
use crate::errors::AppError;
use crate::models::{DeletedComment, NewComment, RenderedComment, User, MAX_COMMENT_CHARS};

/// Check comment text. Length is counted in characters, not bytes.
pub fn validate_content(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("Please enter a comment".to_string()));
    }
    if content.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::Validation("Comment is too long".to_string()));
    }
    Ok(())
}

fn require_user(caller: &Caller) -> Result<&User, AppError> {
    caller
        .user()
        .ok_or_else(|| AppError::Unauthorized("Please log in".to_string()))
}

/// Store a new root comment on a post and return it ready for display.
///
/// Nothing is written unless the caller is logged in, the text is valid and
/// the post exists.
pub async fn submit_comment(
    store: &dyn BlogStore,
    caller: &Caller,
    post_id: i64,
    content: &str,
    ip_address: &str,
) -> Result<RenderedComment, AppError> {
    let user = require_user(caller)?;
    validate_content(content)?;

    store
        .get_post(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))?;

    let comment = store
        .create_comment(&NewComment {
            post_id,
            root_id: None,
            author_id: user.id,
            content: content.to_string(),
            ip_address: ip_address.to_string(),
        })
        .await?;
    tracing::debug!(comment_id = comment.id, post_id, user_id = user.id, "Comment created");

    Ok(RenderedComment::from(&comment))
}

/// Flag a comment as deleted.
///
/// With `author_only`, only the comment's author may delete it.
pub async fn delete_comment(
    store: &dyn BlogStore,
    caller: &Caller,
    comment_id: i64,
    author_only: bool,
) -> Result<DeletedComment, AppError> {
    let user = require_user(caller)?;

    let comment = store
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", comment_id)))?;

    if author_only && comment.author_id != user.id {
        return Err(AppError::Unauthorized(
            "Only the author may delete this comment".to_string(),
        ));
    }

    if !store.soft_delete_comment(comment.id).await? {
        return Err(AppError::NotFound(format!("Comment {} not found", comment_id)));
    }
    tracing::debug!(comment_id, user_id = user.id, "Comment soft-deleted");

    Ok(DeletedComment {
        comment_id: comment.id,
    })
}
