//! Statistics for a crawl run and for the saved results matrix

use crate::state::{PageState, ResultMap};
use crate::storage::ColumnSchema;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Counters collected while a crawl runs
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Number of visits ending in each state
    pub pages_by_state: HashMap<PageState, u64>,
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            pages_by_state: HashMap::new(),
        }
    }
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, state: PageState) {
        *self.pages_by_state.entry(state).or_insert(0) += 1;
    }

    pub fn count(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Number of requests sent, the policy document excluded
    pub fn pages_fetched(&self) -> u64 {
        PageState::all_states()
            .into_iter()
            .filter(PageState::was_fetched)
            .map(|state| self.count(state))
            .sum()
    }

    /// Logs one summary line per state with a non-zero count
    pub fn log_summary(&self) {
        let elapsed = Utc::now() - self.started_at;
        tracing::info!(
            "Crawl finished after {}s: {} pages fetched, {} recorded",
            elapsed.num_seconds(),
            self.pages_fetched(),
            self.count(PageState::Recorded)
        );

        for state in PageState::all_states() {
            let count = self.count(state);
            if count > 0 {
                tracing::info!("  {}: {}", state, count);
            }
        }
    }
}

/// Summary of a results matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixStatistics {
    /// Number of URL rows
    pub rows: usize,

    /// Number of item columns (URL column excluded)
    pub columns: usize,

    /// Number of "Y" cells
    pub total_marks: usize,

    /// Most frequent item columns, most frequent first, ties by name
    pub top_items: Vec<(String, usize)>,
}

impl MatrixStatistics {
    /// Computes statistics over the matrix a `ResultMap` would be saved as
    pub fn from_results(results: &ResultMap, top_n: usize) -> Self {
        let schema = ColumnSchema::from_results(results);
        let mut counts = vec![0usize; schema.len()];

        for (_, items) in results.iter() {
            for (count, cell) in counts.iter_mut().zip(schema.presence_cells(items)) {
                if !cell.is_empty() {
                    *count += 1;
                }
            }
        }

        let total_marks = counts.iter().sum();
        let mut top_items: Vec<(String, usize)> =
            schema.columns().map(String::from).zip(counts).collect();
        top_items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_items.truncate(top_n);

        Self {
            rows: results.len(),
            columns: schema.len(),
            total_marks,
            top_items,
        }
    }
}

/// Prints matrix statistics to stdout in a formatted manner
pub fn print_statistics(stats: &MatrixStatistics) {
    println!("=== Results Statistics ===\n");

    println!("Overview:");
    println!("  Pages recorded: {}", stats.rows);
    println!("  Distinct items: {}", stats.columns);
    println!("  Item marks: {}", stats.total_marks);

    let average = if stats.rows > 0 {
        stats.total_marks as f64 / stats.rows as f64
    } else {
        0.0
    };
    println!("  Items per page: {:.1}", average);
    println!();

    if !stats.top_items.is_empty() {
        println!("Most Common Items:");
        for (item, count) in &stats.top_items {
            let percentage = if stats.rows > 0 {
                (*count as f64 / stats.rows as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", item, count, percentage);
        }
    }
}
