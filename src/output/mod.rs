//! Output module for crawl summaries
//!
//! This module handles:
//! - Counting visit outcomes during a run and logging them at the end
//! - Summarizing a saved results matrix for `--stats`

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics, MatrixStatistics};
