use crate::{UrlError, UrlResult};
use url::Url;

/// Schemes that never lead to a fetchable page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Brings a URL into the canonical form used as a crawl key
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Require an `http` or `https` scheme
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
///
/// Host lowercasing and dot-segment removal come from the URL parser itself.
/// Nothing else is rewritten, so the canonical form of a URL still contains
/// any target prefix the raw URL contained.
///
/// # Examples
///
/// ```
/// use larder::url::canonicalize;
///
/// let url = canonicalize("https://Example.COM/recipe/a/../b#reviews").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/recipe/b");
/// ```
pub fn canonicalize(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    into_canonical(url)
}

/// Resolves an href against the page it was found on
///
/// Relative paths, protocol-relative links (`//host/path`) and fragment-only
/// links (`#section`, which resolve to the base page itself) follow standard
/// URL resolution. Returns `None` for empty hrefs, non-HTTP schemes and
/// anything that fails to resolve.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return None;
    }

    let joined = base_url.join(href).ok()?;
    into_canonical(joined).ok()
}

/// Path plus query string, the part of a URL robots.txt patterns apply to
pub fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn into_canonical(mut url: Url) -> UrlResult<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}
