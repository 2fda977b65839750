//! Database module for SQLite persistence.
//!
//! The blog core talks to storage only through the [`BlogStore`] port;
//! [`SqliteStore`] is the production adapter.

#[cfg(test)]
pub mod fixtures;
mod store;

pub use store::*;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::{
    AuthorPostCount, CarouselItem, Catalogue, Comment, NewComment, Post, Repository, Tag, User,
};

/// Storage access patterns needed by the blog core.
///
/// Lookups return `Ok(None)` for missing records; callers decide whether that is
/// a `NotFound`.
#[async_trait]
pub trait BlogStore: Send + Sync {
    // Posts
    async fn list_published_posts(&self) -> Result<Vec<Post>, AppError>;
    async fn list_posts_by_tag(&self, tag_id: i64) -> Result<Vec<Post>, AppError>;
    async fn list_posts_by_catalogue(&self, catalogue_id: i64) -> Result<Vec<Post>, AppError>;
    async fn list_posts_by_author(&self, author_id: i64) -> Result<Vec<Post>, AppError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, AppError>;
    /// Atomically add one view and return the new count.
    async fn increment_post_views(&self, id: i64) -> Result<Option<i64>, AppError>;

    // Sidebar aggregates
    async fn hot_posts(&self, limit: usize) -> Result<Vec<Post>, AppError>;
    async fn author_post_counts(&self) -> Result<Vec<AuthorPostCount>, AppError>;
    async fn list_carousel(&self) -> Result<Vec<CarouselItem>, AppError>;

    // Repositories
    async fn list_repositories(&self) -> Result<Vec<Repository>, AppError>;
    async fn get_repository(&self, id: i64) -> Result<Option<Repository>, AppError>;
    async fn increment_repository_views(&self, id: i64) -> Result<Option<i64>, AppError>;

    // Filter keys and users
    async fn get_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, AppError>;
    async fn get_catalogue(&self, id: i64) -> Result<Option<Catalogue>, AppError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn get_api_token(&self, user_id: i64) -> Result<Option<String>, AppError>;

    // Comments
    /// Non-deleted comments of a post, newest first.
    async fn list_comments_for_post(&self, post_id: i64) -> Result<Vec<Comment>, AppError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, AppError>;
    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, AppError>;
    /// Flag a comment as deleted. Returns `false` if no such comment exists.
    async fn soft_delete_comment(&self, id: i64) -> Result<bool, AppError>;
}

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            avatar_path TEXT,
            api_token TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS catalogues (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            slug TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            summary TEXT,
            body TEXT NOT NULL DEFAULT '',
            status INTEGER NOT NULL DEFAULT 0,
            view_count INTEGER NOT NULL DEFAULT 0,
            author_id INTEGER NOT NULL,
            catalogue_id INTEGER,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS post_tags (
            post_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL,
            PRIMARY KEY (post_id, tag_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS repositories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            link TEXT,
            view_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS carousels (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            image_path TEXT NOT NULL,
            link TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    // root_id = 0 marks a root comment
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id INTEGER NOT NULL,
            root_id INTEGER NOT NULL DEFAULT 0,
            author_id INTEGER NOT NULL,
            content TEXT NOT NULL,
            ip_address TEXT NOT NULL,
            published_at TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_posts_status_created ON posts(status, created_at);
        CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id);
        CREATE INDEX IF NOT EXISTS idx_posts_catalogue ON posts(catalogue_id);
        CREATE INDEX IF NOT EXISTS idx_post_tags_tag ON post_tags(tag_id);
        CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id, is_deleted, published_at);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
