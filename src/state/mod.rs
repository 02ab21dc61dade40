//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: the outcome of visiting one URL
//! - `VisitedSet`: URLs handled this run without a result
//! - `ResultMap`: URL to extracted items, seeded from the previous run

mod page_state;
mod results;
mod visited;

// Re-export main types
pub use page_state::PageState;
pub use results::ResultMap;
pub use visited::VisitedSet;
