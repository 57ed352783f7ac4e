//! Page/language resolution with canonical-URL redirects.
//!
//! The public site addresses every page as `/{lang}/{slug}`. A [`SiteMap`]
//! maps slugs back to stable page keys and computes the one canonical URL
//! form for any `(page, language)` pair; every equivalent request form
//! (missing language, alias language code, off-language slug) resolves to
//! a redirect towards it.
//!
//! The map is plain configuration passed in at construction. Resolution is
//! a pure function of the map and its inputs; persisting the outcome (the
//! `lang` cookie, response headers) is the HTTP boundary's job.

use std::collections::BTreeMap;

use crate::types::Lang;

/// Identifier of a page, stable across languages (e.g. `dinner`).
///
/// Post content attached to a page is stored under the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageKey(String);

impl PageKey {
    /// Create a page key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PageKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

/// How a page's URL slug varies by language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugMapping {
    /// A distinct slug per language (`dinner` / `vecer`).
    PerLanguage(BTreeMap<Lang, String>),
    /// One slug shared by all languages (the homepage's empty slug).
    Universal(String),
}

impl SlugMapping {
    /// Build a per-language mapping from `(lang, slug)` pairs.
    #[must_use]
    pub fn per_language<S: Into<String>>(slugs: impl IntoIterator<Item = (Lang, S)>) -> Self {
        Self::PerLanguage(
            slugs
                .into_iter()
                .map(|(lang, slug)| (lang, slug.into()))
                .collect(),
        )
    }

    /// Build a universal mapping.
    #[must_use]
    pub fn universal(slug: impl Into<String>) -> Self {
        Self::Universal(slug.into())
    }
}

/// Outcome of resolving a requested `(slug, language)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The request already names the canonical URL; render this page.
    Page {
        /// Resolved page identity.
        key: PageKey,
        /// Effective language for the response.
        lang: Lang,
    },
    /// The request is a non-canonical form; redirect to `/{lang}/{slug}`.
    Redirect {
        /// Canonical slug (may be empty for the homepage).
        slug: String,
        /// Canonical language code.
        lang: Lang,
    },
}

/// Resolution failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No page owns the requested slug in any language. Maps to 404.
    #[error("unknown page slug: {0:?}")]
    UnknownSlug(String),
    /// A configured page has no slug for the effective language and no
    /// universal fallback. This is a site-map configuration defect, not a
    /// user error; it must surface as an internal error, never a 404.
    #[error("site map has no {lang} slug for page {key}")]
    MissingSlug {
        /// The affected page.
        key: PageKey,
        /// The language without a slug.
        lang: Lang,
    },
}

/// The site's page table.
///
/// Order is preserved; it drives navigation rendering.
#[derive(Debug, Clone)]
pub struct SiteMap {
    pages: Vec<(PageKey, SlugMapping)>,
}

impl SiteMap {
    /// Build a site map from `(key, slugs)` pairs.
    #[must_use]
    pub fn new(pages: Vec<(PageKey, SlugMapping)>) -> Self {
        Self { pages }
    }

    /// All pages in configured order.
    pub fn pages(&self) -> impl Iterator<Item = &(PageKey, SlugMapping)> {
        self.pages.iter()
    }

    /// Resolve a requested `(slug, lang)` pair against the map.
    ///
    /// `preferred` is the visitor's negotiated language, used whenever the
    /// request carries no valid explicit language. A request with neither
    /// slug nor language redirects to the preferred language's homepage.
    ///
    /// # Errors
    ///
    /// [`ResolveError::UnknownSlug`] when no page owns the slug, and
    /// [`ResolveError::MissingSlug`] on site-map misconfiguration.
    pub fn resolve(
        &self,
        slug: Option<&str>,
        lang: Option<&str>,
        preferred: Lang,
    ) -> Result<Resolution, ResolveError> {
        // Bare domain: send the visitor to their language's homepage.
        if slug.is_none() && lang.is_none() {
            return Ok(Resolution::Redirect {
                slug: String::new(),
                lang: preferred,
            });
        }

        // A missing slug addresses the homepage (empty slug).
        let requested_slug = slug.unwrap_or("");

        let key = self
            .page_for_slug(requested_slug)
            .ok_or_else(|| ResolveError::UnknownSlug(requested_slug.to_owned()))?;

        // Explicit valid language wins ("cz" parses as Czech); anything
        // else falls back to the negotiated preference.
        let effective = lang
            .and_then(|code| Lang::parse(code).ok())
            .unwrap_or(preferred);

        let canonical = self.canonical_slug(key, effective)?;

        // Off-canonical language code (absent, alias, or switched) or
        // off-language slug: redirect to the one canonical form.
        if lang != Some(effective.code()) || requested_slug != canonical {
            return Ok(Resolution::Redirect {
                slug: canonical.to_owned(),
                lang: effective,
            });
        }

        Ok(Resolution::Page {
            key: key.clone(),
            lang: effective,
        })
    }

    /// The canonical slug for a page in a given language.
    ///
    /// # Errors
    ///
    /// [`ResolveError::MissingSlug`] when the page defines neither a slug
    /// for `lang` nor a universal one.
    pub fn canonical_slug(&self, key: &PageKey, lang: Lang) -> Result<&str, ResolveError> {
        let mapping = self
            .pages
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, m)| m)
            .ok_or_else(|| ResolveError::MissingSlug {
                key: key.clone(),
                lang,
            })?;

        match mapping {
            SlugMapping::PerLanguage(slugs) => {
                slugs
                    .get(&lang)
                    .map(String::as_str)
                    .ok_or_else(|| ResolveError::MissingSlug {
                        key: key.clone(),
                        lang,
                    })
            }
            SlugMapping::Universal(slug) => Ok(slug),
        }
    }

    /// Canonical `(lang, slug)` pairs for a page in every language that
    /// defines one. Used to render alternate-language links.
    #[must_use]
    pub fn alternates(&self, key: &PageKey) -> Vec<(Lang, &str)> {
        Lang::ALL
            .iter()
            .filter_map(|&lang| {
                self.canonical_slug(key, lang)
                    .ok()
                    .map(|slug| (lang, slug))
            })
            .collect()
    }

    /// Reverse lookup: which page owns this slug (in any language)?
    fn page_for_slug(&self, slug: &str) -> Option<&PageKey> {
        self.pages.iter().find_map(|(key, mapping)| {
            let owns = match mapping {
                SlugMapping::PerLanguage(slugs) => slugs.values().any(|s| s == slug),
                SlugMapping::Universal(s) => s == slug,
            };
            owns.then_some(key)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn bistro_map() -> SiteMap {
        SiteMap::new(vec![
            (PageKey::from("homepage"), SlugMapping::universal("")),
            (
                PageKey::from("dinner"),
                SlugMapping::per_language([(Lang::En, "dinner"), (Lang::Cs, "vecer")]),
            ),
            (
                PageKey::from("lunch"),
                SlugMapping::per_language([(Lang::En, "lunch"), (Lang::Cs, "poledne")]),
            ),
        ])
    }

    #[test]
    fn test_bare_domain_redirects_to_preferred_homepage() {
        let map = bistro_map();
        let resolution = map.resolve(None, None, Lang::Cs).unwrap();
        assert_eq!(
            resolution,
            Resolution::Redirect {
                slug: String::new(),
                lang: Lang::Cs,
            }
        );
    }

    #[test]
    fn test_canonical_pair_resolves_without_redirect() {
        let map = bistro_map();
        let resolution = map.resolve(Some("vecer"), Some("cs"), Lang::En).unwrap();
        assert_eq!(
            resolution,
            Resolution::Page {
                key: PageKey::from("dinner"),
                lang: Lang::Cs,
            }
        );
    }

    #[test]
    fn test_canonical_round_trip() {
        // Resolving a canonical pair's slug yields the same pair, stable
        // under repetition.
        let map = bistro_map();
        for &lang in &Lang::ALL {
            let slug = map.canonical_slug(&PageKey::from("lunch"), lang).unwrap();
            let resolution = map
                .resolve(Some(slug), Some(lang.code()), Lang::DEFAULT)
                .unwrap();
            assert_eq!(
                resolution,
                Resolution::Page {
                    key: PageKey::from("lunch"),
                    lang,
                }
            );
        }
    }

    #[test]
    fn test_missing_lang_redirects_to_canonical_url() {
        let map = bistro_map();
        // "vecer" with no language segment: page resolves to "dinner",
        // the language comes from the preference chain, and the slug is
        // recomputed for that language.
        let resolution = map.resolve(Some("vecer"), None, Lang::Cs).unwrap();
        assert_eq!(
            resolution,
            Resolution::Redirect {
                slug: "vecer".to_owned(),
                lang: Lang::Cs,
            }
        );
    }

    #[test]
    fn test_off_language_slug_redirects() {
        let map = bistro_map();
        // Czech URL with the English slug: redirect to the Czech slug.
        let resolution = map.resolve(Some("dinner"), Some("cs"), Lang::En).unwrap();
        assert_eq!(
            resolution,
            Resolution::Redirect {
                slug: "vecer".to_owned(),
                lang: Lang::Cs,
            }
        );
    }

    #[test]
    fn test_cz_alias_redirects_to_cs_url() {
        let map = bistro_map();
        let resolution = map.resolve(Some("vecer"), Some("cz"), Lang::En).unwrap();
        assert_eq!(
            resolution,
            Resolution::Redirect {
                slug: "vecer".to_owned(),
                lang: Lang::Cs,
            }
        );
    }

    #[test]
    fn test_invalid_explicit_lang_falls_back_to_preference() {
        let map = bistro_map();
        let resolution = map.resolve(Some("dinner"), Some("de"), Lang::En).unwrap();
        // "de" is not a page slug either, so the segment cannot be saved;
        // the resolver treats the slug as-is and redirects to a URL with a
        // valid language.
        assert_eq!(
            resolution,
            Resolution::Redirect {
                slug: "dinner".to_owned(),
                lang: Lang::En,
            }
        );
    }

    #[test]
    fn test_unknown_slug_is_not_found() {
        let map = bistro_map();
        let err = map.resolve(Some("burgers"), Some("en"), Lang::En).unwrap_err();
        assert_eq!(err, ResolveError::UnknownSlug("burgers".to_owned()));
    }

    #[test]
    fn test_universal_slug_serves_all_languages() {
        let map = bistro_map();
        let resolution = map.resolve(Some(""), Some("cs"), Lang::En).unwrap();
        assert_eq!(
            resolution,
            Resolution::Page {
                key: PageKey::from("homepage"),
                lang: Lang::Cs,
            }
        );
        assert_eq!(
            map.alternates(&PageKey::from("homepage")),
            vec![(Lang::En, ""), (Lang::Cs, "")]
        );
    }

    #[test]
    fn test_missing_slug_is_config_error_not_404() {
        // A page whose mapping covers only English.
        let map = SiteMap::new(vec![(
            PageKey::from("specials"),
            SlugMapping::per_language([(Lang::En, "specials")]),
        )]);
        let err = map.resolve(Some("specials"), Some("cs"), Lang::Cs).unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingSlug {
                key: PageKey::from("specials"),
                lang: Lang::Cs,
            }
        );
    }

    #[test]
    fn test_alternates_in_site_language_order() {
        let map = bistro_map();
        assert_eq!(
            map.alternates(&PageKey::from("dinner")),
            vec![(Lang::En, "dinner"), (Lang::Cs, "vecer")]
        );
    }
}
