//! Data models for the blog server.
//!
//! Serialized field names are camelCase, matching the JSON API.

mod carousel;
mod comment;
mod post;
mod repository;
mod taxonomy;
mod user;

pub use carousel::*;
pub use comment::*;
pub use post::*;
pub use repository::*;
pub use taxonomy::*;
pub use user::*;
