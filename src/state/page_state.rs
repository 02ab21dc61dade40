//! Page state definitions for a single crawl run
//!
//! Every call to `CrawlEngine::visit` ends in exactly one of these states.

use std::fmt;

/// Final state of a URL after one visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== No-op States =====
    /// URL was already visited or recorded; nothing happened
    AlreadySeen,

    // ===== Skip States (marked visited, never fetched) =====
    /// URL does not contain the target prefix
    OutOfScope,

    /// URL path matches a robots.txt disallow pattern
    Disallowed,

    /// URL could not be parsed as an absolute URL
    Malformed,

    // ===== Fetched States =====
    /// Transport error or non-success status; marked visited without result
    FetchFailed,

    /// Page fetched but the item selector matched nothing; links still followed
    IndexPage,

    /// Page yielded at least one item and was added to the result map
    Recorded,
}

impl PageState {
    /// Returns true if a request was sent for the URL
    pub fn was_fetched(&self) -> bool {
        matches!(self, Self::FetchFailed | Self::IndexPage | Self::Recorded)
    }

    /// Short snake_case label used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadySeen => "already_seen",
            Self::OutOfScope => "out_of_scope",
            Self::Disallowed => "disallowed",
            Self::Malformed => "malformed",
            Self::FetchFailed => "fetch_failed",
            Self::IndexPage => "index_page",
            Self::Recorded => "recorded",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> [Self; 7] {
        [
            Self::AlreadySeen,
            Self::OutOfScope,
            Self::Disallowed,
            Self::Malformed,
            Self::FetchFailed,
            Self::IndexPage,
            Self::Recorded,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
