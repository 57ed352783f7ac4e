//! Content post domain types.

use chrono::{DateTime, Utc};

use kavka_core::{Lang, PublishStatus, PublishWindow, UserId};

/// The version label of the live row of each post.
pub const CURRENT_VERSION: &str = "current";

/// A content post (domain type).
///
/// Each public page may carry one post under the page's key; the lunch and
/// dinner menus are the typical case. Publication is derived from
/// [`PublishWindow`] on every read, never stored.
#[derive(Debug, Clone)]
pub struct Post {
    /// Stable key, shared with the page that renders the post.
    pub key: String,
    /// Editorial title, shown in the admin panel and notifications.
    pub title: String,
    /// Publish window as stored.
    pub window: PublishWindow,
    /// Czech content (HTML fragment).
    pub content_cs: String,
    /// English content (HTML fragment).
    pub content_en: String,
    /// Version label: `current` for the live row, an RFC 3339 timestamp
    /// for archived rows.
    pub version: String,
    /// When this row was written.
    pub created_at: DateTime<Utc>,
    /// Admin who wrote this row, if known.
    pub created_by: Option<UserId>,
}

impl Post {
    /// The content for one site language.
    #[must_use]
    pub fn content_for(&self, lang: Lang) -> &str {
        match lang {
            Lang::Cs => &self.content_cs,
            Lang::En => &self.content_en,
        }
    }

    /// Derived publication status at `now`.
    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> PublishStatus {
        self.window.status(now)
    }

    /// Whether the post is visible to the public at `now`.
    #[must_use]
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.window.is_published(now)
    }
}

/// Fields an editor can change on a post.
///
/// The key and title are fixed; the admin form edits the window and the
/// localized content.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    /// Validated publish window.
    pub window: PublishWindow,
    /// Czech content (HTML fragment).
    pub content_cs: String,
    /// English content (HTML fragment).
    pub content_en: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post(window: PublishWindow) -> Post {
        Post {
            key: "dinner".to_owned(),
            title: "Dinner menu".to_owned(),
            window,
            content_cs: "<p>Večerní menu</p>".to_owned(),
            content_en: "<p>Dinner menu</p>".to_owned(),
            version: CURRENT_VERSION.to_owned(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).single().expect("valid"),
            created_by: None,
        }
    }

    #[test]
    fn test_content_for_lang() {
        let post = post(PublishWindow::default());
        assert_eq!(post.content_for(Lang::Cs), "<p>Večerní menu</p>");
        assert_eq!(post.content_for(Lang::En), "<p>Dinner menu</p>");
    }

    #[test]
    fn test_draft_post_is_hidden() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).single().expect("valid");
        let post = post(PublishWindow::default());
        assert!(!post.is_published(now));
        assert_eq!(post.status(now), PublishStatus::Draft);
    }
}
