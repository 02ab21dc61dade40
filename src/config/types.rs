use serde::Deserialize;

/// User agent sent when the config does not name one
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Main configuration structure for Larder
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// First URL pushed onto the frontier
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Only URLs containing this prefix are fetched
    #[serde(rename = "target-prefix")]
    pub target_prefix: String,

    /// Location of the site's robots.txt
    #[serde(rename = "robots-url")]
    pub robots_url: String,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Frontier discipline
    #[serde(default)]
    pub order: TraversalOrder,

    /// Maximum number of page fetches in one run
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,
}

/// Order in which discovered links are visited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    /// Last discovered link is visited next (stack)
    #[default]
    DepthFirst,
    /// Links are visited in discovery order (queue)
    BreadthFirst,
}

/// Selects the elements whose text is an ingredient
///
/// Matches every `<tag attribute="value">` element on a page.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    pub tag: String,
    pub attribute: String,
    pub value: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV results matrix (read at start, rewritten at the end)
    #[serde(rename = "results-path")]
    pub results_path: String,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
