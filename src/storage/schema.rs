//! Column schema of the results matrix
//!
//! The header is the fixed `URL` column followed by every sanitized item name
//! in first-seen order. The schema is computed in full before any row is
//! materialized, so every row has the same width.

use crate::state::ResultMap;
use indexmap::IndexSet;
use regex::Regex;
use std::sync::LazyLock;

/// Name of the key column
pub const URL_COLUMN: &str = "URL";

/// Cell value marking an item as present
pub const PRESENT: &str = "Y";

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").expect("valid regex"));

/// Turns an item name into a column identifier
///
/// Every non-word character becomes `_`. Applying it twice changes nothing.
pub fn sanitize_column(item: &str) -> String {
    NON_WORD.replace_all(item, "_").into_owned()
}

/// Ordered, duplicate-free item columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: IndexSet<String>,
}

impl ColumnSchema {
    /// Scans every row in map order and collects each sanitized item once
    ///
    /// Empty item names are skipped.
    pub fn from_results(results: &ResultMap) -> Self {
        let columns = results
            .iter()
            .flat_map(|(_, items)| items.iter())
            .filter(|item| !item.is_empty())
            .map(|item| sanitize_column(item))
            .collect();

        Self { columns }
    }

    /// Full header row, `URL` first
    pub fn header(&self) -> impl Iterator<Item = &str> {
        std::iter::once(URL_COLUMN).chain(self.columns.iter().map(String::as_str))
    }

    /// Item columns only
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Position of an item among the item columns
    pub fn position(&self, item: &str) -> Option<usize> {
        self.columns.get_index_of(sanitize_column(item).as_str())
    }

    /// Builds the presence cells of one row, one per item column
    pub fn presence_cells(&self, items: &[String]) -> Vec<&'static str> {
        let mut cells = vec![""; self.columns.len()];
        for item in items.iter().filter(|item| !item.is_empty()) {
            if let Some(index) = self.position(item) {
                cells[index] = PRESENT;
            }
        }
        cells
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
