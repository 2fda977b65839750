//! Comment threading: roots with one level of replies.

use serde::Serialize;

use crate::models::Comment;

/// A root comment and its replies.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    pub root: Comment,
    pub replies: Vec<Comment>,
}

/// Group a newest-first comment list into threads.
///
/// Roots keep their input order. Each root's replies are collected in input
/// order and then reversed, so replies read oldest-first under newest-first
/// roots. Deleted comments are dropped, as are replies whose root is not in
/// the input.
pub fn thread_comments(comments: Vec<Comment>) -> Vec<CommentThread> {
    let (roots, children): (Vec<Comment>, Vec<Comment>) = comments
        .into_iter()
        .filter(|comment| !comment.is_deleted)
        .partition(Comment::is_root);

    roots
        .into_iter()
        .map(|root| {
            let mut replies: Vec<Comment> = children
                .iter()
                .filter(|child| child.root_id == Some(root.id))
                .cloned()
                .collect();
            replies.reverse();
            CommentThread { root, replies }
        })
        .collect()
}
