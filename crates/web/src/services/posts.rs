//! Post lookup with in-memory caching.
//!
//! Public pages read posts through [`CachedPostStore`], which keeps
//! lookups out of Postgres for up to 20 minutes. Saving through the
//! store drops the cached entry so the public site reflects edits
//! immediately.

use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use sqlx::PgPool;

use kavka_core::UserId;

use crate::db::RepositoryError;
use crate::db::posts::PostRepository;
use crate::models::{Post, PostDraft};

/// How long a cached post stays fresh.
const CACHE_TTL: Duration = Duration::from_secs(20 * 60);

/// Backing store for posts.
///
/// Absent posts are part of the contract: `get` returns `Ok(None)` for
/// an unknown key so the miss can be cached too.
pub trait PostStore: Send + Sync {
    /// Fetch the current version of a post.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Post>, RepositoryError>> + Send;

    /// Replace the current version of a post, archiving the old one.
    fn save(
        &self,
        key: &str,
        draft: &PostDraft,
        editor: UserId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Post, RepositoryError>> + Send;
}

/// Post store backed by Postgres.
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    /// Create a new Postgres-backed post store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl PostStore for PgPostStore {
    async fn get(&self, key: &str) -> Result<Option<Post>, RepositoryError> {
        PostRepository::new(&self.pool).get_by_key(key).await
    }

    async fn save(
        &self,
        key: &str,
        draft: &PostDraft,
        editor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Post, RepositoryError> {
        PostRepository::new(&self.pool)
            .save(key, draft, editor, now)
            .await
    }
}

/// Caching decorator over a [`PostStore`].
#[derive(Clone)]
pub struct CachedPostStore<S> {
    store: S,
    cache: Cache<String, Option<Post>>,
}

impl<S: PostStore> CachedPostStore<S> {
    /// Wrap a store with a 20-minute post cache.
    #[must_use]
    pub fn new(store: S) -> Self {
        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(CACHE_TTL)
            .build();

        Self { store, cache }
    }

    /// Fetch a post, serving from the cache when possible. Misses are
    /// cached as well, so hammering an unknown slug stays cheap.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the underlying store fails.
    pub async fn get(&self, key: &str) -> Result<Option<Post>, RepositoryError> {
        if let Some(post) = self.cache.get(key).await {
            tracing::debug!(key = %key, "Cache hit for post");
            return Ok(post);
        }

        let post = self.store.get(key).await?;
        self.cache.insert(key.to_string(), post.clone()).await;

        Ok(post)
    }

    /// Save a post through the underlying store and drop its cache
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the underlying store fails.
    pub async fn save(
        &self,
        key: &str,
        draft: &PostDraft,
        editor: UserId,
        now: DateTime<Utc>,
    ) -> Result<Post, RepositoryError> {
        let post = self.store.save(key, draft, editor, now).await?;
        self.cache.invalidate(key).await;

        Ok(post)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::models::post::CURRENT_VERSION;
    use kavka_core::PublishWindow;

    /// In-memory store counting how often the backing data is read.
    #[derive(Default)]
    struct MemoryStore {
        posts: Mutex<HashMap<String, Post>>,
        reads: AtomicUsize,
    }

    impl MemoryStore {
        fn with_post(key: &str) -> Self {
            let store = Self::default();
            store
                .posts
                .lock()
                .unwrap()
                .insert(key.to_string(), sample_post(key, "original"));
            store
        }
    }

    fn sample_post(key: &str, content: &str) -> Post {
        Post {
            key: key.to_string(),
            title: String::new(),
            window: PublishWindow::default(),
            content_cs: content.to_string(),
            content_en: content.to_string(),
            version: CURRENT_VERSION.to_string(),
            created_at: Utc::now(),
            created_by: None,
        }
    }

    impl PostStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<Post>, RepositoryError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.posts.lock().unwrap().get(key).cloned())
        }

        async fn save(
            &self,
            key: &str,
            draft: &PostDraft,
            _editor: UserId,
            _now: DateTime<Utc>,
        ) -> Result<Post, RepositoryError> {
            let mut post = sample_post(key, &draft.content_cs);
            post.window = draft.window;
            self.posts
                .lock()
                .unwrap()
                .insert(key.to_string(), post.clone());
            Ok(post)
        }
    }

    #[tokio::test]
    async fn test_second_get_is_served_from_cache() {
        let store = CachedPostStore::new(MemoryStore::with_post("lunch"));

        let first = store.get("lunch").await.unwrap().unwrap();
        let second = store.get("lunch").await.unwrap().unwrap();

        assert_eq!(first.content_cs, second.content_cs);
        assert_eq!(store.store.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_post_is_cached_too() {
        let store = CachedPostStore::new(MemoryStore::default());

        assert!(store.get("nope").await.unwrap().is_none());
        assert!(store.get("nope").await.unwrap().is_none());

        assert_eq!(store.store.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_save_invalidates_cached_entry() {
        let store = CachedPostStore::new(MemoryStore::with_post("lunch"));

        assert_eq!(
            store.get("lunch").await.unwrap().unwrap().content_cs,
            "original"
        );

        let draft = PostDraft {
            content_cs: "updated".to_string(),
            ..PostDraft::default()
        };
        store
            .save("lunch", &draft, UserId::new(1), Utc::now())
            .await
            .unwrap();

        assert_eq!(
            store.get("lunch").await.unwrap().unwrap().content_cs,
            "updated"
        );
    }
}
