//! Public page handlers.
//!
//! Every public URL is `/{lang}/{slug}` with localized slugs. Requests
//! that arrive off-canonical (missing language prefix, `cz` alias,
//! wrong-language slug) are redirected to the one canonical URL of the
//! page in the effective language. The visitor's language comes from
//! the `lang` query parameter, then the language cookie, then the
//! `Accept-Language` header.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use kavka_core::{Lang, PageKey, Resolution};

use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Language preference cookie name.
pub const LANG_COOKIE_NAME: &str = "kavka_lang";

/// Language cookie lifetime in seconds (30 days).
const LANG_COOKIE_MAX_AGE: i64 = 30 * 24 * 60 * 60;

/// A link in the main navigation.
pub struct NavLink {
    pub href: String,
    pub label: &'static str,
    pub active: bool,
}

/// A link to the same page in another language.
pub struct AltLink {
    pub code: &'static str,
    pub locale: &'static str,
    pub href: String,
}

/// Template for every public page.
#[derive(Template, WebTemplate)]
#[template(path = "pages/page.html")]
pub struct PageTemplate {
    pub lang: &'static str,
    pub locale: &'static str,
    pub title: &'static str,
    pub page_key: String,
    pub content: Option<String>,
    pub nav: Vec<NavLink>,
    pub alternates: Vec<AltLink>,
}

/// Bare domain request.
#[instrument(skip(state, headers))]
pub async fn root(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    serve(&state, &headers, query.as_deref(), None, None).await
}

/// One path segment: either a language prefix (`/cs`) or a bare slug
/// without one (`/vecer`).
#[instrument(skip(state, headers))]
pub async fn one_segment(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    Path(first): Path<String>,
) -> Result<Response> {
    if Lang::parse(&first).is_ok() {
        serve(&state, &headers, query.as_deref(), None, Some(first.as_str())).await
    } else {
        serve(&state, &headers, query.as_deref(), Some(first.as_str()), None).await
    }
}

/// Two path segments: `/{lang}/{slug}`.
#[instrument(skip(state, headers))]
pub async fn two_segments(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    Path((lang, slug)): Path<(String, String)>,
) -> Result<Response> {
    serve(
        &state,
        &headers,
        query.as_deref(),
        Some(slug.as_str()),
        Some(lang.as_str()),
    )
    .await
}

/// Resolve a request against the site map, then redirect or render.
async fn serve(
    state: &AppState,
    headers: &HeaderMap,
    query: Option<&str>,
    slug: Option<&str>,
    lang: Option<&str>,
) -> Result<Response> {
    let query_lang = query_param(query, "lang");
    let cookie_lang = cookie_value(headers, LANG_COOKIE_NAME);
    let header_lang = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());

    let preferred = Lang::negotiate(query_lang.as_deref(), cookie_lang.as_deref(), header_lang);

    match state.site_map().resolve(slug, lang, preferred)? {
        Resolution::Redirect { slug, lang } => {
            let target = canonical_url(&slug, lang, query);
            Ok(language_redirect(&target))
        }
        Resolution::Page { key, lang } => render_page(state, &key, lang).await,
    }
}

/// Redirect to a canonical URL. The target depends on the negotiated
/// language, so caches must key on `Accept-Language`.
fn language_redirect(target: &str) -> Response {
    let mut response = Redirect::to(target).into_response();
    response
        .headers_mut()
        .insert(header::VARY, HeaderValue::from_static("Accept-Language"));
    response
}

/// Render a resolved page with its post content, if one is published.
async fn render_page(state: &AppState, key: &PageKey, lang: Lang) -> Result<Response> {
    let post = state.posts().get(key.as_str()).await?;
    let content = post
        .filter(|post| post.is_published(chrono::Utc::now()))
        .map(|post| post.content_for(lang).to_string());

    let nav = nav_links(state, key, lang)?;
    let alternates = alternates(state, key)?;

    let template = PageTemplate {
        lang: lang.code(),
        locale: lang.locale(),
        title: page_title(key.as_str(), lang),
        page_key: key.as_str().to_string(),
        content,
        nav,
        alternates,
    };

    let mut response = template.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_LANGUAGE,
        HeaderValue::from_static(lang.locale()),
    );
    headers.insert(header::VARY, HeaderValue::from_static("Accept-Language"));
    if let Ok(cookie) = HeaderValue::from_str(&format!(
        "{LANG_COOKIE_NAME}={}; Max-Age={LANG_COOKIE_MAX_AGE}; Path=/; SameSite=Lax",
        lang.code()
    )) {
        headers.insert(header::SET_COOKIE, cookie);
    }

    Ok(response)
}

/// Links to every page in the given language, marking the current one.
fn nav_links(state: &AppState, current: &PageKey, lang: Lang) -> Result<Vec<NavLink>> {
    let mut links = Vec::new();
    for (key, _) in state.site_map().pages() {
        let slug = state.site_map().canonical_slug(key, lang)?;
        links.push(NavLink {
            href: canonical_url(slug, lang, None),
            label: page_title(key.as_str(), lang),
            active: key == current,
        });
    }

    Ok(links)
}

/// Same-page links in every other language, for `hreflang` and the
/// language switcher.
fn alternates(state: &AppState, key: &PageKey) -> Result<Vec<AltLink>> {
    Ok(state
        .site_map()
        .alternates(key)
        .into_iter()
        .map(|(lang, slug)| AltLink {
            code: lang.code(),
            locale: lang.locale(),
            href: canonical_url(slug, lang, None),
        })
        .collect())
}

/// The canonical URL of a slug in a language, preserving any query
/// parameters except the consumed `lang`.
fn canonical_url(slug: &str, lang: Lang, query: Option<&str>) -> String {
    let mut url = if slug.is_empty() {
        format!("/{}", lang.code())
    } else {
        format!("/{}/{slug}", lang.code())
    };

    if let Some(query) = query {
        let mut preserved = url::form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if name != "lang" {
                preserved.append_pair(&name, &value);
                any = true;
            }
        }
        if any {
            url.push('?');
            url.push_str(&preserved.finish());
        }
    }

    url
}

/// Read one query parameter from a raw query string.
fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Read one cookie from the `Cookie` header.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Localized display title of a page.
fn page_title(key: &str, lang: Lang) -> &'static str {
    match (key, lang) {
        ("homepage", Lang::En) => "Kavka Bistro",
        ("homepage", Lang::Cs) => "Bistro Kavka",
        ("lunch", Lang::En) => "Lunch",
        ("lunch", Lang::Cs) => "Polední menu",
        ("dinner", Lang::En) => "Dinner",
        ("dinner", Lang::Cs) => "Večerní menu",
        ("beverages", Lang::En) => "Beverages",
        ("beverages", Lang::Cs) => "Nápoje",
        ("gallery", Lang::En) => "Gallery",
        ("gallery", Lang::Cs) => "Galerie",
        ("contact", Lang::En) => "Contact",
        ("contact", Lang::Cs) => "Kontakt",
        _ => "Kavka Bistro",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_url_homepage_has_no_trailing_slug() {
        assert_eq!(canonical_url("", Lang::Cs, None), "/cs");
        assert_eq!(canonical_url("vecer", Lang::Cs, None), "/cs/vecer");
    }

    #[test]
    fn test_canonical_url_preserves_query_but_drops_lang() {
        assert_eq!(
            canonical_url("lunch", Lang::En, Some("lang=cz&table=4")),
            "/en/lunch?table=4"
        );
        assert_eq!(canonical_url("lunch", Lang::En, Some("lang=cz")), "/en/lunch");
    }

    #[test]
    fn test_language_redirect_varies_on_accept_language() {
        let response = language_redirect("/cs");
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/cs")
        );
        assert_eq!(
            response
                .headers()
                .get(header::VARY)
                .and_then(|v| v.to_str().ok()),
            Some("Accept-Language")
        );
    }

    #[test]
    fn test_query_param_extraction() {
        assert_eq!(
            query_param(Some("lang=cs&x=1"), "lang"),
            Some("cs".to_string())
        );
        assert_eq!(query_param(Some("x=1"), "lang"), None);
        assert_eq!(query_param(None, "lang"), None);
    }

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("other=1; kavka_lang=cs; session=abc"),
        );
        assert_eq!(
            cookie_value(&headers, LANG_COOKIE_NAME),
            Some("cs".to_string())
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }
}
