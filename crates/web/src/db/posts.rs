//! Post repository for database operations.
//!
//! The `post` table keys rows by `(key, version)`. Exactly one row per key
//! carries `version = 'current'`; archived rows carry the RFC 3339
//! timestamp of the save that displaced them and are never touched again.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kavka_core::{PublishWindow, UserId};

use super::RepositoryError;
use crate::models::post::{CURRENT_VERSION, Post, PostDraft};

/// Database row shape for a post.
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    key: String,
    version: String,
    title: String,
    published_from: Option<DateTime<Utc>>,
    published_to: Option<DateTime<Utc>>,
    content_cs: String,
    content_en: String,
    created_at: DateTime<Utc>,
    created_by: Option<i32>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            key: row.key,
            title: row.title,
            window: PublishWindow::new(row.published_from, row.published_to),
            content_cs: row.content_cs,
            content_en: row.content_en,
            version: row.version,
            created_at: row.created_at,
            created_by: row.created_by.map(UserId::new),
        }
    }
}

const POST_COLUMNS: &str = "key, version, title, published_from, published_to, \
                            content_cs, content_en, created_at, created_by";

/// Repository for post database operations.
pub struct PostRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the current version of a post by key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_key(&self, key: &str) -> Result<Option<Post>, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM post WHERE key = $1 AND version = $2"
        ))
        .bind(key)
        .bind(CURRENT_VERSION)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    /// Get all current posts, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Post>, RepositoryError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM post WHERE version = $1 ORDER BY key"
        ))
        .bind(CURRENT_VERSION)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    /// Save a post: archive the prior current row under a timestamp
    /// version label, then overwrite the current row with the draft.
    ///
    /// Both steps run in one transaction; a failed save leaves neither a
    /// stray archive row nor a half-written current row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no current row exists for
    /// `key`, `RepositoryError::Database` for other failures.
    pub async fn save(
        &self,
        key: &str,
        draft: &PostDraft,
        editor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Post, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Archive the row being displaced.
        let archived = sqlx::query(
            "INSERT INTO post (key, version, title, published_from, published_to, \
                               content_cs, content_en, created_at, created_by) \
             SELECT key, $2, title, published_from, published_to, \
                    content_cs, content_en, created_at, created_by \
             FROM post WHERE key = $1 AND version = $3",
        )
        .bind(key)
        .bind(now.to_rfc3339())
        .bind(CURRENT_VERSION)
        .execute(&mut *tx)
        .await?;

        if archived.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let row = sqlx::query_as::<_, PostRow>(&format!(
            "UPDATE post \
             SET published_from = $3, published_to = $4, content_cs = $5, \
                 content_en = $6, created_at = $7, created_by = $8 \
             WHERE key = $1 AND version = $2 \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(key)
        .bind(CURRENT_VERSION)
        .bind(draft.window.from)
        .bind(draft.window.to)
        .bind(&draft.content_cs)
        .bind(&draft.content_en)
        .bind(now)
        .bind(editor.as_i32())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;

        Ok(Post::from(row))
    }

    /// Archived version labels for a post, newest first.
    ///
    /// RFC 3339 labels sort chronologically as text.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn versions(&self, key: &str) -> Result<Vec<String>, RepositoryError> {
        let labels = sqlx::query_scalar::<_, String>(
            "SELECT version FROM post \
             WHERE key = $1 AND version <> $2 \
             ORDER BY version DESC",
        )
        .bind(key)
        .bind(CURRENT_VERSION)
        .fetch_all(self.pool)
        .await?;

        Ok(labels)
    }
}
