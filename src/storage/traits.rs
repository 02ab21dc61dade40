//! Storage traits and error types
//!
//! This module defines the trait interface for result stores and the errors
//! they report.

use crate::state::ResultMap;
use thiserror::Error;

/// Errors that can occur while reading or writing the results file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Row {row} has an empty URL")]
    EmptyUrl { row: usize },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Counts reported after a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveSummary {
    /// Data rows written
    pub rows: usize,
    /// Item columns written, URL column excluded
    pub columns: usize,
    /// Cells marked present
    pub marks: usize,
}

/// Durable home of a `ResultMap` between runs
pub trait ResultStore {
    /// Loads prior results
    ///
    /// A missing or unreadable file is an expected cold start and yields an
    /// empty map; implementations log the condition instead of failing.
    fn load(&self) -> ResultMap;

    /// Persists the full result map
    ///
    /// An empty map writes nothing and returns `Ok(None)`, leaving any existing
    /// file untouched.
    fn save(&self, results: &ResultMap) -> StoreResult<Option<SaveSummary>>;
}
