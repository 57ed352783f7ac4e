//! Site languages.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a supported language code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported language code: {code}")]
pub struct LangError {
    /// The rejected input.
    pub code: String,
}

/// A site language.
///
/// The set is closed: the site is published in English and Czech only.
/// The legacy code `cz` is accepted as an alias for `cs` at every entry
/// point (query parameter, cookie, `Accept-Language` header) but is never
/// emitted; canonical URLs always use `cs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    /// English (`en`, locale `en-US`).
    En,
    /// Czech (`cs`, locale `cs-CZ`).
    Cs,
}

impl Lang {
    /// All supported languages, in site order.
    pub const ALL: [Self; 2] = [Self::En, Self::Cs];

    /// The fixed default language when negotiation yields nothing.
    pub const DEFAULT: Self = Self::En;

    /// Parse a language code. Accepts the `cz` alias for Czech.
    ///
    /// # Errors
    ///
    /// Returns [`LangError`] for anything outside the supported set.
    pub fn parse(code: &str) -> Result<Self, LangError> {
        match code {
            "en" => Ok(Self::En),
            "cs" | "cz" => Ok(Self::Cs),
            other => Err(LangError {
                code: other.to_owned(),
            }),
        }
    }

    /// The two-letter code used in URLs and the `lang` cookie.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Cs => "cs",
        }
    }

    /// The locale tag sent in the `Content-Language` header.
    #[must_use]
    pub const fn locale(self) -> &'static str {
        match self {
            Self::En => "en-US",
            Self::Cs => "cs-CZ",
        }
    }

    /// Extract a language hint from an `Accept-Language` header value.
    ///
    /// Only the primary two-letter subtag of the first listed language is
    /// considered, e.g. `cs-CZ,en;q=0.8` yields Czech.
    #[must_use]
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let primary = header.trim().get(..2)?;
        Self::parse(primary).ok()
    }

    /// Determine the visitor's preferred language.
    ///
    /// Preference chain: explicit query parameter, then the `lang` cookie,
    /// then the `Accept-Language` header, then [`Lang::DEFAULT`]. Invalid
    /// values at any step fall through to the next.
    #[must_use]
    pub fn negotiate(query: Option<&str>, cookie: Option<&str>, header: Option<&str>) -> Self {
        query
            .and_then(|q| Self::parse(q).ok())
            .or_else(|| cookie.and_then(|c| Self::parse(c).ok()))
            .or_else(|| header.and_then(Self::from_accept_language))
            .unwrap_or(Self::DEFAULT)
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Lang {
    type Err = LangError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes() {
        assert_eq!(Lang::parse("en").unwrap(), Lang::En);
        assert_eq!(Lang::parse("cs").unwrap(), Lang::Cs);
        assert!(Lang::parse("de").is_err());
        assert!(Lang::parse("").is_err());
        assert!(Lang::parse("EN").is_err());
    }

    #[test]
    fn test_cz_alias_normalizes_to_cs() {
        // The alias must hold at every resolution entry point.
        assert_eq!(Lang::parse("cz").unwrap(), Lang::Cs);
        assert_eq!(Lang::negotiate(Some("cz"), None, None), Lang::Cs);
        assert_eq!(Lang::negotiate(None, Some("cz"), None), Lang::Cs);
        assert_eq!(Lang::negotiate(None, None, Some("cz-CZ,en;q=0.5")), Lang::Cs);
        // And it is never emitted back.
        assert_eq!(Lang::parse("cz").unwrap().code(), "cs");
    }

    #[test]
    fn test_accept_language_primary_subtag() {
        assert_eq!(Lang::from_accept_language("cs-CZ,en;q=0.8"), Some(Lang::Cs));
        assert_eq!(Lang::from_accept_language("en-GB"), Some(Lang::En));
        assert_eq!(Lang::from_accept_language("de-DE,cs;q=0.9"), None);
        assert_eq!(Lang::from_accept_language(""), None);
        assert_eq!(Lang::from_accept_language("c"), None);
    }

    #[test]
    fn test_negotiate_chain_order() {
        // Query beats cookie beats header beats default.
        assert_eq!(
            Lang::negotiate(Some("cs"), Some("en"), Some("en-US")),
            Lang::Cs
        );
        assert_eq!(Lang::negotiate(None, Some("cs"), Some("en-US")), Lang::Cs);
        assert_eq!(Lang::negotiate(None, None, Some("cs-CZ")), Lang::Cs);
        assert_eq!(Lang::negotiate(None, None, None), Lang::En);
    }

    #[test]
    fn test_negotiate_skips_invalid_values() {
        // An invalid query value falls through to the cookie.
        assert_eq!(Lang::negotiate(Some("xx"), Some("cs"), None), Lang::Cs);
        // All invalid yields the default.
        assert_eq!(Lang::negotiate(Some("xx"), Some("yy"), Some("zz")), Lang::En);
    }

    #[test]
    fn test_locales() {
        assert_eq!(Lang::En.locale(), "en-US");
        assert_eq!(Lang::Cs.locale(), "cs-CZ");
    }
}
