//! Blog core: pagination, comment threading and the view assemblers.
//!
//! Everything here talks to storage through [`crate::db::BlogStore`] only.

pub mod comments;
pub mod detail;
pub mod listing;
pub mod pagination;
pub mod threading;

pub use comments::{delete_comment, submit_comment};
pub use detail::{post_detail, repository_detail, PostDetail, RepositoryDetail};
pub use listing::{list_posts, list_repositories, PostListing, PostSource, RepositoryListing};
pub use pagination::parse_page;
