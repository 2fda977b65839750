//! SQLite implementation of the storage port.
//!
//! Uses prepared statements; view counters are bumped in a single UPDATE.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::BlogStore;
use crate::errors::AppError;
use crate::models::{
    AuthorPostCount, CarouselItem, Catalogue, Comment, NewComment, Post, PostStatus, Repository,
    Tag, User,
};

const POST_COLUMNS: &str = r#"
    p.id, p.title, p.summary, p.body, p.status, p.view_count, p.author_id, p.catalogue_id,
    p.created_at,
    (SELECT group_concat(t.slug, char(31)) FROM post_tags pt JOIN tags t ON t.id = pt.tag_id
     WHERE pt.post_id = p.id) AS tag_slugs
"#;

/// Separator for the aggregated tag column; the ASCII unit separator never
/// appears in a slug.
const SLUG_SEPARATOR: char = '\u{1f}';

const POST_ORDER: &str = "ORDER BY p.created_at DESC, p.id DESC";

const COMMENT_COLUMNS: &str = r#"
    c.id, c.post_id, c.root_id, c.author_id,
    COALESCE(u.name, '') AS author_name, u.avatar_path AS author_avatar,
    c.content, c.ip_address, c.published_at, c.is_deleted
"#;

const REPOSITORY_COLUMNS: &str = "id, title, description, link, view_count, created_at";

/// SQLite-backed blog storage.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_posts(&self, filter: &str, bind: Option<i64>) -> Result<Vec<Post>, AppError> {
        let sql = format!("SELECT {} FROM posts p {} {}", POST_COLUMNS, filter, POST_ORDER);
        let mut query = sqlx::query(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(post_from_row).collect::<Result<Vec<_>, _>>()?)
    }
}

#[async_trait]
impl BlogStore for SqliteStore {
    // ==================== POST OPERATIONS ====================

    async fn list_published_posts(&self) -> Result<Vec<Post>, AppError> {
        let filter = format!("WHERE p.status = {}", PostStatus::Published.as_i64());
        self.fetch_posts(&filter, None).await
    }

    async fn list_posts_by_tag(&self, tag_id: i64) -> Result<Vec<Post>, AppError> {
        self.fetch_posts(
            "WHERE p.id IN (SELECT post_id FROM post_tags WHERE tag_id = ?)",
            Some(tag_id),
        )
        .await
    }

    async fn list_posts_by_catalogue(&self, catalogue_id: i64) -> Result<Vec<Post>, AppError> {
        self.fetch_posts("WHERE p.catalogue_id = ?", Some(catalogue_id))
            .await
    }

    async fn list_posts_by_author(&self, author_id: i64) -> Result<Vec<Post>, AppError> {
        self.fetch_posts("WHERE p.author_id = ?", Some(author_id))
            .await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, AppError> {
        let sql = format!("SELECT {} FROM posts p WHERE p.id = ?", POST_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(post_from_row).transpose()?)
    }

    async fn increment_post_views(&self, id: i64) -> Result<Option<i64>, AppError> {
        let row = sqlx::query(
            "UPDATE posts SET view_count = view_count + 1 WHERE id = ? RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.try_get::<i64, _>("view_count")).transpose()?)
    }

    // ==================== SIDEBAR AGGREGATES ====================

    async fn hot_posts(&self, limit: usize) -> Result<Vec<Post>, AppError> {
        let sql = format!(
            "SELECT {} FROM posts p WHERE p.status = ? ORDER BY p.view_count DESC, p.id DESC LIMIT ?",
            POST_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(PostStatus::Published.as_i64())
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(post_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn author_post_counts(&self) -> Result<Vec<AuthorPostCount>, AppError> {
        let rows = sqlx::query(
            r#"SELECT u.id AS user_id, u.name, u.avatar_path, COUNT(p.id) AS post_count
            FROM users u
            LEFT JOIN posts p ON p.author_id = u.id AND p.status = ?
            GROUP BY u.id, u.name, u.avatar_path
            ORDER BY post_count DESC, u.id"#,
        )
        .bind(PostStatus::Published.as_i64())
        .fetch_all(&self.pool)
        .await?;

        let counts = rows
            .iter()
            .map(|row| -> Result<AuthorPostCount, sqlx::Error> {
                Ok(AuthorPostCount {
                    user_id: row.try_get("user_id")?,
                    name: row.try_get("name")?,
                    avatar_path: row.try_get("avatar_path")?,
                    post_count: row.try_get("post_count")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    async fn list_carousel(&self) -> Result<Vec<CarouselItem>, AppError> {
        let rows = sqlx::query("SELECT id, title, image_path, link FROM carousels ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .iter()
            .map(|row| -> Result<CarouselItem, sqlx::Error> {
                Ok(CarouselItem {
                    id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    image_path: row.try_get("image_path")?,
                    link: row.try_get("link")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    // ==================== REPOSITORY OPERATIONS ====================

    async fn list_repositories(&self) -> Result<Vec<Repository>, AppError> {
        let sql = format!(
            "SELECT {} FROM repositories ORDER BY created_at DESC, id DESC",
            REPOSITORY_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(repository_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn get_repository(&self, id: i64) -> Result<Option<Repository>, AppError> {
        let sql = format!("SELECT {} FROM repositories WHERE id = ?", REPOSITORY_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(repository_from_row).transpose()?)
    }

    async fn increment_repository_views(&self, id: i64) -> Result<Option<i64>, AppError> {
        let row = sqlx::query(
            "UPDATE repositories SET view_count = view_count + 1 WHERE id = ? RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.try_get::<i64, _>("view_count")).transpose()?)
    }

    // ==================== FILTER KEYS AND USERS ====================

    async fn get_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, AppError> {
        let row = sqlx::query("SELECT id, slug, name FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        let tag = row
            .map(|row| {
                Ok::<_, sqlx::Error>(Tag {
                    id: row.try_get("id")?,
                    slug: row.try_get("slug")?,
                    name: row.try_get("name")?,
                })
            })
            .transpose()?;
        Ok(tag)
    }

    async fn get_catalogue(&self, id: i64) -> Result<Option<Catalogue>, AppError> {
        let row = sqlx::query("SELECT id, name FROM catalogues WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let catalogue = row
            .map(|row| {
                Ok::<_, sqlx::Error>(Catalogue {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                })
            })
            .transpose()?;
        Ok(catalogue)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query("SELECT id, name, avatar_path FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let user = row
            .map(|row| {
                Ok::<_, sqlx::Error>(User {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    avatar_path: row.try_get("avatar_path")?,
                })
            })
            .transpose()?;
        Ok(user)
    }

    async fn get_api_token(&self, user_id: i64) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT api_token FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.try_get("api_token")?),
            None => Ok(None),
        }
    }

    // ==================== COMMENT OPERATIONS ====================

    async fn list_comments_for_post(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        let sql = format!(
            r#"SELECT {} FROM comments c LEFT JOIN users u ON u.id = c.author_id
            WHERE c.post_id = ? AND c.is_deleted = 0
            ORDER BY c.published_at DESC, c.id DESC"#,
            COMMENT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(comment_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, AppError> {
        let sql = format!(
            "SELECT {} FROM comments c LEFT JOIN users u ON u.id = c.author_id WHERE c.id = ?",
            COMMENT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(comment_from_row).transpose()?)
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, AppError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO comments (post_id, root_id, author_id, content, ip_address, published_at, is_deleted) VALUES (?, ?, ?, ?, ?, ?, 0)"
        )
        .bind(comment.post_id)
        .bind(comment.root_id.unwrap_or(0))
        .bind(comment.author_id)
        .bind(&comment.content)
        .bind(&comment.ip_address)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_comment(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Comment {} vanished after insert", id)))
    }

    async fn soft_delete_comment(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE comments SET is_deleted = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// Helper functions for row conversion

fn post_from_row(row: &SqliteRow) -> Result<Post, sqlx::Error> {
    let status: i64 = row.try_get("status")?;
    let tag_slugs: Option<String> = row.try_get("tag_slugs")?;
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        summary: row.try_get("summary")?,
        body: row.try_get("body")?,
        status: PostStatus::from_i64(status),
        view_count: row.try_get("view_count")?,
        author_id: row.try_get("author_id")?,
        catalogue_id: row.try_get("catalogue_id")?,
        tags: tag_slugs.map(|s| split_slugs(&s)).unwrap_or_default(),
        created_at: row.try_get("created_at")?,
    })
}

fn repository_from_row(row: &SqliteRow) -> Result<Repository, sqlx::Error> {
    Ok(Repository {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        link: row.try_get("link")?,
        view_count: row.try_get("view_count")?,
        created_at: row.try_get("created_at")?,
    })
}

fn comment_from_row(row: &SqliteRow) -> Result<Comment, sqlx::Error> {
    let root_id: i64 = row.try_get("root_id")?;
    let is_deleted: i64 = row.try_get("is_deleted")?;
    Ok(Comment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        root_id: (root_id != 0).then_some(root_id),
        author_id: row.try_get("author_id")?,
        author_name: row.try_get("author_name")?,
        author_avatar: row.try_get("author_avatar")?,
        content: row.try_get("content")?,
        ip_address: row.try_get("ip_address")?,
        published_at: row.try_get("published_at")?,
        is_deleted: is_deleted != 0,
    })
}

/// Split the `group_concat` tag column into sorted slugs.
fn split_slugs(s: &str) -> Vec<String> {
    let mut slugs: Vec<String> = s
        .split(SLUG_SEPARATOR)
        .filter(|slug| !slug.is_empty())
        .map(str::to_string)
        .collect();
    slugs.sort();
    slugs
}
