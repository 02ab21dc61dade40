//! URL handling module for Larder
//!
//! This module provides the canonical URL form used for crawl bookkeeping,
//! href resolution, and the target-prefix scope check.

mod normalize;

// Re-export main functions
pub use normalize::{canonicalize, path_and_query, resolve_link};

/// Brings a target prefix into the same form as the canonical URLs it is
/// matched against
///
/// A prefix that parses as an http(s) URL is canonicalized. Otherwise only the
/// scheme and host (everything before the first `/` after `://`) are
/// lower-cased, and a prefix without `://` is returned unchanged.
pub fn normalize_prefix(prefix: &str) -> String {
    if let Ok(url) = canonicalize(prefix) {
        return url.into();
    }

    let Some(scheme_end) = prefix.find("://") else {
        return prefix.to_string();
    };
    let authority_start = scheme_end + 3;
    let host_end = prefix[authority_start..]
        .find('/')
        .map_or(prefix.len(), |offset| authority_start + offset);

    format!(
        "{}{}",
        prefix[..host_end].to_ascii_lowercase(),
        &prefix[host_end..]
    )
}

/// Returns true if a URL belongs to the crawled part of the site
///
/// A URL is in scope when its canonical string contains the configured target
/// prefix anywhere, so a prefix of `https://site.com/recipe` also admits
/// `https://site.com/recipes-a-z`.
pub fn in_scope(url: &str, target_prefix: &str) -> bool {
    url.contains(target_prefix)
}
