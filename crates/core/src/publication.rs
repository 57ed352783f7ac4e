//! Time-windowed publish/expire state for content posts.
//!
//! Publication is never stored as a status column: it is derived on every
//! read from the stored timestamps and the current time, so there is no
//! background job flipping flags and no state to drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The publish window of a post, as stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishWindow {
    /// First instant the post is visible. `None` means never published.
    pub from: Option<DateTime<Utc>>,
    /// Last instant the post is visible. `None` means no end.
    pub to: Option<DateTime<Utc>>,
}

/// Derived publication status at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    /// No publish start set; never visible.
    Draft,
    /// Publish start lies in the future.
    Planned,
    /// Visible now.
    Published,
    /// Publish end lies in the past.
    Expired,
}

impl std::fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Draft => "draft",
            Self::Planned => "planned",
            Self::Published => "published",
            Self::Expired => "expired",
        };
        f.write_str(label)
    }
}

impl PublishWindow {
    /// Construct a window from the two stored timestamps.
    #[must_use]
    pub const fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    /// True iff a publish start is set and lies strictly in the future.
    #[must_use]
    pub fn is_planned(&self, now: DateTime<Utc>) -> bool {
        self.from.is_some_and(|from| from > now)
    }

    /// True iff a publish end is set and lies strictly in the past.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.to.is_some_and(|to| to < now)
    }

    /// True iff a publish start is set and the window covers `now`.
    ///
    /// A post with no start is never published, regardless of its end.
    #[must_use]
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.from.is_some() && !self.is_planned(now) && !self.is_expired(now)
    }

    /// The single status holding at `now`.
    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> PublishStatus {
        if self.from.is_none() {
            PublishStatus::Draft
        } else if self.is_planned(now) {
            PublishStatus::Planned
        } else if self.is_expired(now) {
            PublishStatus::Expired
        } else {
            PublishStatus::Published
        }
    }
}

/// Contradictions between the "publish now" intent and the dates, caught
/// at the editing boundary before anything is saved.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// "Publish now" checked while the start date lies in the future.
    #[error(
        "the publish start is in the future but the post is marked to publish now; \
         either uncheck publishing or clear the start date"
    )]
    PlannedConflict,
    /// "Publish now" checked while the end date already passed.
    #[error(
        "the publish end has already passed but the post is marked to publish now; \
         either uncheck publishing or clear the end date"
    )]
    ExpiredConflict,
}

/// Resolve an editor's "publish now" intent against the submitted dates.
///
/// Publishing with no start date defaults the start to `now`. Unchecking
/// "publish now" leaves the dates untouched; hiding a post is done by
/// editing its window.
///
/// # Errors
///
/// [`PublishError`] on either contradiction; nothing is saved in that
/// case.
pub fn apply_publish_intent(
    publish_now: bool,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<PublishWindow, PublishError> {
    let from = if publish_now {
        match from {
            None => Some(now),
            Some(start) if start > now => return Err(PublishError::PlannedConflict),
            Some(start) => Some(start),
        }
    } else {
        from
    };

    if publish_now && to.is_some_and(|end| end < now) {
        return Err(PublishError::ExpiredConflict);
    }

    Ok(PublishWindow::new(from, to))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn yesterday() -> DateTime<Utc> {
        now() - Duration::days(1)
    }

    fn tomorrow() -> DateTime<Utc> {
        now() + Duration::days(1)
    }

    #[test]
    fn test_no_start_is_never_published() {
        // Regardless of the end date.
        for to in [None, Some(yesterday()), Some(tomorrow())] {
            let window = PublishWindow::new(None, to);
            assert!(!window.is_published(now()));
            assert_eq!(window.status(now()), PublishStatus::Draft);
        }
    }

    #[test]
    fn test_open_ended_window_is_published() {
        let window = PublishWindow::new(Some(yesterday()), None);
        assert!(window.is_published(now()));
        assert!(!window.is_planned(now()));
        assert!(!window.is_expired(now()));
    }

    #[test]
    fn test_future_start_is_planned() {
        let window = PublishWindow::new(Some(tomorrow()), None);
        assert!(window.is_planned(now()));
        assert!(!window.is_published(now()));
        assert_eq!(window.status(now()), PublishStatus::Planned);
    }

    #[test]
    fn test_past_end_is_expired() {
        let window = PublishWindow::new(Some(yesterday() - Duration::days(1)), Some(yesterday()));
        assert!(window.is_expired(now()));
        assert!(!window.is_published(now()));
        assert_eq!(window.status(now()), PublishStatus::Expired);
    }

    #[test]
    fn test_published_implies_window_covers_now() {
        let cases = [
            (Some(yesterday()), None),
            (Some(yesterday()), Some(tomorrow())),
            (Some(now()), Some(now())),
            (Some(tomorrow()), None),
            (Some(yesterday() - Duration::days(1)), Some(yesterday())),
            (None, Some(tomorrow())),
        ];
        for (from, to) in cases {
            let window = PublishWindow::new(from, to);
            if window.is_published(now()) {
                assert!(from.is_some_and(|f| f <= now()));
                assert!(to.is_none_or(|t| now() <= t));
            }
        }
    }

    #[test]
    fn test_statuses_are_mutually_exclusive() {
        let cases = [
            (Some(yesterday()), None),
            (Some(tomorrow()), None),
            (Some(yesterday() - Duration::days(1)), Some(yesterday())),
            (Some(tomorrow()), Some(yesterday())),
        ];
        for (from, to) in cases {
            let window = PublishWindow::new(from, to);
            let flags = [
                window.is_planned(now()),
                window.is_expired(now()),
                window.is_published(now()),
            ];
            // With a start set, exactly one of planned/expired/published
            // holds. A planned+expired window counts as planned.
            assert_eq!(
                flags.iter().filter(|&&f| f).count(),
                if window.is_planned(now()) && window.is_expired(now()) {
                    2
                } else {
                    1
                },
                "window {window:?}"
            );
            assert_ne!(window.status(now()), PublishStatus::Draft);
        }
    }

    #[test]
    fn test_publish_now_defaults_missing_start() {
        let window = apply_publish_intent(true, None, None, now()).unwrap();
        assert_eq!(window.from, Some(now()));
        assert!(window.is_published(now()));
    }

    #[test]
    fn test_publish_now_with_future_start_is_rejected() {
        let err = apply_publish_intent(true, Some(tomorrow()), None, now()).unwrap_err();
        assert_eq!(err, PublishError::PlannedConflict);
    }

    #[test]
    fn test_publish_now_with_past_end_is_rejected() {
        let err = apply_publish_intent(true, Some(yesterday()), Some(yesterday()), now()).unwrap_err();
        assert_eq!(err, PublishError::ExpiredConflict);
    }

    #[test]
    fn test_unpublished_save_keeps_dates_untouched() {
        let window = apply_publish_intent(false, Some(tomorrow()), Some(yesterday()), now()).unwrap();
        assert_eq!(window.from, Some(tomorrow()));
        assert_eq!(window.to, Some(yesterday()));
    }
}
