//! Robots.txt handling module
//!
//! The policy document is fetched once per run with the crawler's own fetcher
//! and reduced to a `PolicyRuleSet`. A missing or unreachable document
//! restricts nothing.

mod parser;

pub use parser::{PathPattern, PolicyRuleSet};

use crate::crawler::PageFetcher;

/// Fetches and parses the robots.txt at `robots_url`
///
/// Never fails: any fetch error yields `PolicyRuleSet::allow_all()`.
pub async fn fetch_policy(fetcher: &PageFetcher, robots_url: &str) -> PolicyRuleSet {
    match fetcher.fetch(robots_url).await {
        Some(content) => {
            let rules = PolicyRuleSet::from_content(&content);
            tracing::info!(
                "Loaded robots.txt from {}: {} disallow patterns",
                robots_url,
                rules.disallowed().len()
            );
            rules
        }
        None => {
            tracing::warn!(
                "Could not fetch robots.txt from {}, crawling without restrictions",
                robots_url
            );
            PolicyRuleSet::allow_all()
        }
    }
}
