//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{DateTime, Utc};

/// Display format for timestamps in admin listings.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format accepted by `<input type="datetime-local">`.
const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a timestamp for admin listings.
///
/// Usage in templates: `{{ post.created_at|datetime }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn datetime(value: &DateTime<Utc>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.format(DISPLAY_FORMAT).to_string())
}

/// Formats an optional timestamp, rendering a dash when absent.
///
/// Usage in templates: `{{ post.window.from|opt_datetime }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn opt_datetime(
    value: &Option<DateTime<Utc>>,
    _env: &dyn askama::Values,
) -> askama::Result<String> {
    Ok(format_optional(value, DISPLAY_FORMAT, "\u{2013}"))
}

/// Formats an optional timestamp for a `datetime-local` form input.
///
/// Usage in templates: `value="{{ post.window.from|input_datetime }}"`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn input_datetime(
    value: &Option<DateTime<Utc>>,
    _env: &dyn askama::Values,
) -> askama::Result<String> {
    Ok(format_optional(value, INPUT_FORMAT, ""))
}

fn format_optional(value: &Option<DateTime<Utc>>, format: &str, empty: &str) -> String {
    value.map_or_else(|| empty.to_string(), |v| v.format(format).to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_optional() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();

        assert_eq!(
            format_optional(&Some(ts), DISPLAY_FORMAT, "\u{2013}"),
            "2025-03-14 09:26"
        );
        assert_eq!(format_optional(&None, DISPLAY_FORMAT, "\u{2013}"), "\u{2013}");
        assert_eq!(
            format_optional(&Some(ts), INPUT_FORMAT, ""),
            "2025-03-14T09:26"
        );
        assert_eq!(format_optional(&None, INPUT_FORMAT, ""), "");
    }
}
