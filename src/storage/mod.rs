//! Storage module for persisting crawl results
//!
//! This module handles the results file, which is both the output of a run
//! and the cache consulted by the next one:
//! - Deriving the column schema from every item ever seen
//! - Writing the URL x item presence matrix atomically
//! - Reading it back into a `ResultMap`, treating a bad file as a cold start

mod csv_store;
mod schema;
mod traits;

pub use csv_store::RecordStore;
pub use schema::{sanitize_column, ColumnSchema, PRESENT, URL_COLUMN};
pub use traits::{ResultStore, SaveSummary, StoreError, StoreResult};
