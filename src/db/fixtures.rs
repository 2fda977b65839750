//! Test fixtures: a throwaway SQLite database plus seeding helpers.
//!
//! Records that admin tooling would normally create are inserted directly here.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;

use super::{init_database, SqliteStore};
use crate::models::PostStatus;

/// A fresh database in a temporary directory.
pub struct TestDb {
    pub store: Arc<SqliteStore>,
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

/// Fixed base time so ordering in tests is deterministic.
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
}

impl TestDb {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let store = Arc::new(SqliteStore::new(pool.clone()));

        TestDb {
            store,
            pool,
            _temp_dir: temp_dir,
        }
    }

    pub async fn insert_user(&self, name: &str, api_token: Option<&str>) -> i64 {
        sqlx::query("INSERT INTO users (name, avatar_path, api_token) VALUES (?, ?, ?)")
            .bind(name)
            .bind(format!("/media/avatars/{}.png", name.to_lowercase()))
            .bind(api_token)
            .execute(&self.pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn insert_catalogue(&self, name: &str) -> i64 {
        sqlx::query("INSERT INTO catalogues (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn insert_tag(&self, slug: &str) -> i64 {
        sqlx::query("INSERT INTO tags (slug, name) VALUES (?, ?)")
            .bind(slug)
            .bind(slug.to_uppercase())
            .execute(&self.pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn tag_post(&self, post_id: i64, tag_id: i64) {
        sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn insert_post(
        &self,
        title: &str,
        status: PostStatus,
        author_id: i64,
        catalogue_id: Option<i64>,
        created_at: DateTime<Utc>,
    ) -> i64 {
        sqlx::query(
            "INSERT INTO posts (title, summary, body, status, view_count, author_id, catalogue_id, created_at) VALUES (?, NULL, ?, ?, 0, ?, ?, ?)"
        )
        .bind(title)
        .bind(format!("Body of {}", title))
        .bind(status.as_i64())
        .bind(author_id)
        .bind(catalogue_id)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .unwrap()
        .last_insert_rowid()
    }

    pub async fn set_post_views(&self, post_id: i64, view_count: i64) {
        sqlx::query("UPDATE posts SET view_count = ? WHERE id = ?")
            .bind(view_count)
            .bind(post_id)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn insert_repository(&self, title: &str, created_at: DateTime<Utc>) -> i64 {
        sqlx::query(
            "INSERT INTO repositories (title, description, link, view_count, created_at) VALUES (?, NULL, ?, 0, ?)"
        )
        .bind(title)
        .bind(format!("https://git.example.com/{}", title))
        .bind(created_at)
        .execute(&self.pool)
        .await
        .unwrap()
        .last_insert_rowid()
    }

    pub async fn insert_carousel(&self, title: &str) -> i64 {
        sqlx::query("INSERT INTO carousels (title, image_path, link) VALUES (?, ?, NULL)")
            .bind(title)
            .bind(format!("/media/carousel/{}.jpg", title))
            .execute(&self.pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    /// Insert a comment; `root_id` of `None` makes it a root.
    pub async fn insert_comment(
        &self,
        post_id: i64,
        root_id: Option<i64>,
        author_id: i64,
        content: &str,
        published_at: DateTime<Utc>,
    ) -> i64 {
        sqlx::query(
            "INSERT INTO comments (post_id, root_id, author_id, content, ip_address, published_at, is_deleted) VALUES (?, ?, ?, ?, '127.0.0.1', ?, 0)"
        )
        .bind(post_id)
        .bind(root_id.unwrap_or(0))
        .bind(author_id)
        .bind(content)
        .bind(published_at)
        .execute(&self.pool)
        .await
        .unwrap()
        .last_insert_rowid()
    }

    pub async fn comment_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// Break the author statistics query without touching post tables.
    pub async fn drop_users_table(&self) {
        sqlx::query("DROP TABLE users")
            .execute(&self.pool)
            .await
            .unwrap();
    }
}
