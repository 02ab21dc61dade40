//! Crawler module for page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching that reports failures instead of raising them
//! - HTML parsing for item extraction and link discovery
//! - The frontier that fixes traversal order
//! - The engine driving one run
//! - Saving results however a run ends

mod engine;
mod fetcher;
mod frontier;
mod parser;
mod session;

pub use engine::CrawlEngine;
pub use fetcher::{build_http_client, fetch_url, FetchResult, PageFetcher};
pub use frontier::Frontier;
pub use parser::{extract_links, normalize_item, parse_page, ItemSelector, ParsedPage};
pub use session::{crawl_and_persist, CrawlReport};
