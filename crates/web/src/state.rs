//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use kavka_core::{Lang, SiteMap, SlugMapping};

use crate::config::SiteConfig;
use crate::services::email::EmailService;
use crate::services::posts::{CachedPostStore, PgPostStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    site_map: SiteMap,
    posts: CachedPostStore<PgPostStore>,
    email: Option<EmailService>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: SiteConfig, pool: PgPool, email: Option<EmailService>) -> Self {
        let posts = CachedPostStore::new(PgPostStore::new(pool.clone()));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                site_map: site_map(),
                posts,
                email,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the site map.
    #[must_use]
    pub fn site_map(&self) -> &SiteMap {
        &self.inner.site_map
    }

    /// Get a reference to the cached post store.
    #[must_use]
    pub fn posts(&self) -> &CachedPostStore<PgPostStore> {
        &self.inner.posts
    }

    /// Get the email service, if SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }
}

/// The site's pages and their per-language slugs.
///
/// The homepage keeps one universal empty slug so `/en/` and `/cs/`
/// both resolve to it without a translation table entry.
#[must_use]
pub fn site_map() -> SiteMap {
    SiteMap::new(vec![
        ("homepage".into(), SlugMapping::universal("")),
        (
            "lunch".into(),
            SlugMapping::per_language([(Lang::En, "lunch"), (Lang::Cs, "poledne")]),
        ),
        (
            "dinner".into(),
            SlugMapping::per_language([(Lang::En, "dinner"), (Lang::Cs, "vecer")]),
        ),
        (
            "beverages".into(),
            SlugMapping::per_language([(Lang::En, "beverages"), (Lang::Cs, "napoje")]),
        ),
        (
            "gallery".into(),
            SlugMapping::per_language([(Lang::En, "gallery"), (Lang::Cs, "galerie")]),
        ),
        (
            "contact".into(),
            SlugMapping::per_language([(Lang::En, "contact"), (Lang::Cs, "kontakt")]),
        ),
    ])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_site_map_has_all_pages() {
        let map = site_map();
        let keys: Vec<&str> = map.pages().map(|(key, _)| key.as_str()).collect();
        assert_eq!(
            keys,
            ["homepage", "lunch", "dinner", "beverages", "gallery", "contact"]
        );
    }

    #[test]
    fn test_every_page_has_a_slug_in_every_language() {
        let map = site_map();
        for (key, _) in map.pages() {
            for &lang in &Lang::ALL {
                map.canonical_slug(key, lang).unwrap();
            }
        }
    }
}
