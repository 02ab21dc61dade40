//! Larder main entry point
//!
//! This is the command-line interface for the Larder ingredient crawler.

use anyhow::Context;
use clap::Parser;
use larder::config::{load_config_with_hash, Config};
use larder::crawler::{crawl_and_persist, CrawlEngine, PageFetcher};
use larder::output::{print_statistics, MatrixStatistics};
use larder::robots::fetch_policy;
use larder::storage::{RecordStore, ResultStore};
use larder::ResultMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Larder: a polite single-site ingredient crawler
///
/// Larder walks one site while respecting its robots.txt, records the
/// ingredients of every recipe page it finds, and keeps them in a CSV matrix
/// that later runs use to skip pages already seen.
#[derive(Parser, Debug)]
#[command(name = "larder")]
#[command(version)]
#[command(about = "A polite single-site ingredient crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Ignore the existing results file and revisit every page
    #[arg(long)]
    fresh: bool,

    /// Validate config and show the robots.txt rules without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the results file and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

/// Number of items listed by `--stats`
const TOP_ITEMS: usize = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config).await
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(&config, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("larder=info,warn"),
            1 => EnvFilter::new("larder=debug,info"),
            2 => EnvFilter::new("larder=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the configuration and the policy in effect
async fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Larder Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!("  Target prefix: {}", config.crawler.target_prefix);
    println!("  Robots URL: {}", config.crawler.robots_url);
    println!("  User agent: {}", config.crawler.user_agent);
    println!("  Order: {:?}", config.crawler.order);
    match config.crawler.max_pages {
        Some(max_pages) => println!("  Max pages: {}", max_pages),
        None => println!("  Max pages: unlimited"),
    }

    println!("\nExtraction:");
    println!(
        "  Selector: {}[{}=\"{}\"]",
        config.extraction.tag, config.extraction.attribute, config.extraction.value
    );

    println!("\nOutput:");
    println!("  Results: {}", config.output.results_path);

    let fetcher = PageFetcher::new(&config.crawler.user_agent)?;
    let rules = fetch_policy(&fetcher, &config.crawler.robots_url).await;

    println!("\nRobots Rules:");
    println!("  Disallowed ({}):", rules.disallowed().len());
    for pattern in rules.disallowed() {
        println!("    - {}", pattern);
    }
    println!("  Allowed, not enforced ({}):", rules.allowed().len());
    for pattern in rules.allowed() {
        println!("    - {}", pattern);
    }
    if let Some(delay) = rules.crawl_delay() {
        println!("  Crawl delay: {:.1}s", delay.as_secs_f64());
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: summarizes the results file
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let store = RecordStore::new(&config.output.results_path);
    println!("Results: {}\n", store.path().display());

    let results = store
        .read()
        .with_context(|| format!("Failed to read {}", store.path().display()))?
        .unwrap_or_default();

    print_statistics(&MatrixStatistics::from_results(&results, TOP_ITEMS));

    Ok(())
}

/// Handles the main crawl operation
///
/// Results are saved however the crawl ends, Ctrl-C included.
async fn handle_crawl(config: &Config, fresh: bool) -> anyhow::Result<()> {
    let store = RecordStore::new(&config.output.results_path);

    let prior = if fresh {
        tracing::info!("Starting fresh crawl (ignoring {})", store.path().display());
        ResultMap::new()
    } else {
        store.load()
    };

    let mut engine = CrawlEngine::new(config, prior)?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let report = crawl_and_persist(&mut engine, &store, shutdown)
        .await
        .with_context(|| format!("Crawl into {} failed", store.path().display()))?;

    if report.interrupted {
        tracing::info!("Crawl stopped early; run again to continue");
    }

    Ok(())
}
