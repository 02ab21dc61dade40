//! Crawl engine - traversal and per-URL state machine
//!
//! The engine owns every piece of mutable crawl state for one run: the visited
//! set, the result map seeded from the previous run, and the frontier. Each URL
//! popped from the frontier goes through `visit`, which settles it into exactly
//! one `PageState`.
//!
//! Interrupting `run` (dropping its future) leaves the result map intact, so
//! the caller can always persist what has been accumulated.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{parse_page, ItemSelector};
use crate::crawler::PageFetcher;
use crate::output::CrawlStatistics;
use crate::robots::{fetch_policy, PolicyRuleSet};
use crate::state::{PageState, ResultMap, VisitedSet};
use crate::url::{canonicalize, in_scope, normalize_prefix};
use crate::LarderError;
use tokio::time::Instant;

/// Single-site crawler
pub struct CrawlEngine {
    settings: CrawlerConfig,
    rules: PolicyRuleSet,
    policy_loaded: bool,
    fetcher: PageFetcher,
    selector: ItemSelector,
    visited: VisitedSet,
    results: ResultMap,
    frontier: Frontier,
    stats: CrawlStatistics,
    fetches: u32,
    last_fetch: Option<Instant>,
}

impl CrawlEngine {
    /// Creates an engine seeded with results from a previous run
    ///
    /// URLs in `prior` are treated as already visited and never fetched.
    pub fn new(config: &Config, prior: ResultMap) -> Result<Self, LarderError> {
        let fetcher = PageFetcher::new(&config.crawler.user_agent)?;
        let selector = ItemSelector::new(&config.extraction)?;

        tracing::debug!(
            "Engine ready: selector {}, {} prior results",
            selector.as_str(),
            prior.len()
        );

        let mut settings = config.crawler.clone();
        settings.target_prefix = normalize_prefix(&settings.target_prefix);

        Ok(Self {
            settings,
            rules: PolicyRuleSet::allow_all(),
            policy_loaded: false,
            fetcher,
            selector,
            visited: VisitedSet::new(),
            results: prior,
            frontier: Frontier::new(config.crawler.order),
            stats: CrawlStatistics::new(),
            fetches: 0,
            last_fetch: None,
        })
    }

    /// Fetches the robots.txt policy once; later calls return the cached rules
    pub async fn load_policy(&mut self) -> &PolicyRuleSet {
        if !self.policy_loaded {
            self.rules = fetch_policy(&self.fetcher, &self.settings.robots_url).await;
            self.policy_loaded = true;
        }
        &self.rules
    }

    /// Crawls from the configured start URL until the frontier is empty
    ///
    /// Stops early once `max-pages` requests have been sent.
    pub async fn run(&mut self) -> Result<(), LarderError> {
        self.load_policy().await;

        let start = canonicalize(&self.settings.start_url)?;
        tracing::info!(
            "Starting {:?} crawl at {} (scope: {})",
            self.frontier.order(),
            start,
            self.settings.target_prefix
        );
        self.frontier.push(String::from(start));

        while let Some(url) = self.frontier.pop() {
            if self.budget_exhausted() {
                tracing::info!(
                    "Reached max-pages limit ({} fetches), {} URLs left in frontier",
                    self.fetches,
                    self.frontier.len() + 1
                );
                break;
            }

            let state = self.visit(&url).await;
            tracing::trace!("{} -> {}", url, state);
        }

        Ok(())
    }

    /// Visits one URL and returns the state it ended in
    ///
    /// Afterwards the URL is in the visited set or the result map, and a second
    /// call returns `PageState::AlreadySeen` without any request.
    pub async fn visit(&mut self, url: &str) -> PageState {
        let state = self.visit_inner(url).await;
        self.stats.record(state);
        state
    }

    async fn visit_inner(&mut self, url: &str) -> PageState {
        if self.visited.contains(url) || self.results.contains(url) {
            return PageState::AlreadySeen;
        }

        if !in_scope(url, &self.settings.target_prefix) {
            tracing::debug!("Out of scope: {}", url);
            self.visited.mark(url);
            return PageState::OutOfScope;
        }

        let parsed = match canonicalize(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Skipping malformed URL {}: {}", url, e);
                self.visited.mark(url);
                return PageState::Malformed;
            }
        };

        if let Some(pattern) = self.rules.blocking_pattern(&parsed) {
            tracing::debug!("Disallowed by robots.txt ({}): {}", pattern, url);
            self.visited.mark(url);
            return PageState::Disallowed;
        }

        self.wait_for_crawl_delay().await;
        self.fetches += 1;
        let body = self.fetcher.fetch(url).await;
        self.last_fetch = Some(Instant::now());

        let Some(body) = body else {
            self.visited.mark(url);
            return PageState::FetchFailed;
        };

        let page = parse_page(&body, &parsed, &self.selector, &self.visited);

        let state = if page.items.is_empty() {
            tracing::debug!("No items on {}, following {} links", url, page.links.len());
            self.visited.mark(url);
            PageState::IndexPage
        } else {
            tracing::info!("Recorded {} items from {}", page.items.len(), url);
            self.results.insert(url, page.items);
            PageState::Recorded
        };

        let results = &self.results;
        let queued = self
            .frontier
            .push_siblings(page.links.into_iter().filter(|link| !results.contains(link)));
        tracing::trace!("Queued {} new links from {}", queued, url);

        state
    }

    fn budget_exhausted(&self) -> bool {
        self.settings
            .max_pages
            .is_some_and(|max_pages| self.fetches >= max_pages)
    }

    async fn wait_for_crawl_delay(&self) {
        let (Some(delay), Some(last_fetch)) = (self.rules.crawl_delay(), self.last_fetch) else {
            return;
        };

        let elapsed = last_fetch.elapsed();
        if elapsed < delay {
            tokio::time::sleep(delay - elapsed).await;
        }
    }

    /// Rules in effect for this run
    pub fn rules(&self) -> &PolicyRuleSet {
        &self.rules
    }

    /// Results accumulated so far, prior results included
    pub fn results(&self) -> &ResultMap {
        &self.results
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn stats(&self) -> &CrawlStatistics {
        &self.stats
    }
}
