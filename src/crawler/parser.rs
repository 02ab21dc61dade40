//! HTML parser for extracting items and links
//!
//! This module handles parsing fetched pages to extract:
//! - Item texts matched by the configured `<tag attribute="value">` selector
//! - Outbound links not yet visited

use crate::config::ExtractionConfig;
use crate::state::VisitedSet;
use crate::url::resolve_link;
use crate::LarderError;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Normalized item texts, in document order, duplicates kept
    pub items: Vec<String>,

    /// Unvisited absolute links, sorted
    pub links: BTreeSet<String>,
}

/// Compiled item selector
#[derive(Debug, Clone)]
pub struct ItemSelector {
    selector: Selector,
    source: String,
}

impl ItemSelector {
    /// Compiles `tag[attribute="value"]` from the extraction config
    pub fn new(config: &ExtractionConfig) -> Result<Self, LarderError> {
        let source = format!(r#"{}[{}="{}"]"#, config.tag, config.attribute, config.value);
        let selector = Selector::parse(&source).map_err(|e| LarderError::Selector {
            selector: source.clone(),
            message: e.to_string(),
        })?;

        Ok(Self { selector, source })
    }

    /// The CSS selector text
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the normalized text of every matching element
    ///
    /// Elements whose text is blank after normalization are dropped.
    pub fn extract(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.selector)
            .map(|element| normalize_item(&element.text().collect::<String>()))
            .filter(|item| !item.is_empty())
            .collect()
    }
}

/// Normalizes an item text
///
/// Newlines and surrounding whitespace are stripped, inner whitespace runs
/// collapse to one space, and the result is lower-cased.
pub fn normalize_item(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Extracts every resolvable `<a href>` target not yet in `visited`
///
/// Hrefs are resolved against `base_url` and brought into canonical form.
/// Returns an empty set when the page has no links.
pub fn extract_links(document: &Html, base_url: &Url, visited: &VisitedSet) -> BTreeSet<String> {
    let mut links = BTreeSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if let Some(absolute_url) = resolve_link(href, base_url) {
                let absolute_url = String::from(absolute_url);
                if !visited.contains(&absolute_url) {
                    links.insert(absolute_url);
                }
            }
        }
    }

    links
}

/// Parses a page once and runs both extractions over it
///
/// # Example
///
/// ```
/// use larder::config::ExtractionConfig;
/// use larder::crawler::{parse_page, ItemSelector};
/// use larder::state::VisitedSet;
/// use url::Url;
///
/// let selector = ItemSelector::new(&ExtractionConfig {
///     tag: "span".to_string(),
///     attribute: "data-ingredient-name".to_string(),
///     value: "true".to_string(),
/// })
/// .unwrap();
/// let html = r#"<span data-ingredient-name="true">Flour</span><a href="/recipe/2">Next</a>"#;
/// let base_url = Url::parse("https://example.com/recipe/1").unwrap();
///
/// let page = parse_page(html, &base_url, &selector, &VisitedSet::new());
/// assert_eq!(page.items, vec!["flour"]);
/// assert!(page.links.contains("https://example.com/recipe/2"));
/// ```
pub fn parse_page(
    html: &str,
    base_url: &Url,
    selector: &ItemSelector,
    visited: &VisitedSet,
) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        items: selector.extract(&document),
        links: extract_links(&document, base_url, visited),
    }
}
