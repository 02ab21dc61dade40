//! One crawl run from seeded engine to saved results
//!
//! The crawl is raced against a shutdown future. However the race ends, the
//! results accumulated so far go through the store before any error is
//! returned.

use crate::crawler::CrawlEngine;
use crate::storage::{ResultStore, SaveSummary};
use crate::LarderError;
use std::future::Future;

/// How a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlReport {
    /// True if the shutdown future resolved before the crawl finished
    pub interrupted: bool,

    /// What was written, or `None` if there was nothing to save
    pub saved: Option<SaveSummary>,
}

/// Runs the engine until it finishes or `shutdown` resolves, then saves
///
/// A crawl error is logged and returned only after the save has been
/// attempted. If both fail, the crawl error is returned and the save error
/// is logged.
pub async fn crawl_and_persist<S, F>(
    engine: &mut CrawlEngine,
    store: &S,
    shutdown: F,
) -> Result<CrawlReport, LarderError>
where
    S: ResultStore + ?Sized,
    F: Future,
{
    let (outcome, interrupted) = tokio::select! {
        result = engine.run() => (result, false),
        _ = shutdown => {
            tracing::warn!("Interrupted, saving results collected so far");
            (Ok(()), true)
        }
    };

    if let Err(e) = &outcome {
        tracing::error!("Crawl failed: {}", e);
    }

    let saved = store.save(engine.results()).map_err(|e| {
        tracing::error!("Failed to save results: {}", e);
        e
    });
    engine.stats().log_summary();

    outcome?;
    Ok(CrawlReport {
        interrupted,
        saved: saved?,
    })
}
