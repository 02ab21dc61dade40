use indexmap::IndexMap;

/// Item lists keyed by page URL, in insertion order
///
/// A URL present here is never fetched again. Rows loaded from a previous run
/// come first, in file order, followed by pages recorded during this run in
/// discovery order. That order drives the column order of the saved matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMap {
    rows: IndexMap<String, Vec<String>>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the items of a page
    ///
    /// Re-recording a URL replaces its items but keeps its original position.
    pub fn insert(&mut self, url: impl Into<String>, items: Vec<String>) -> Option<Vec<String>> {
        self.rows.insert(url.into(), items)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.rows.contains_key(url)
    }

    pub fn get(&self, url: &str) -> Option<&[String]> {
        self.rows.get(url).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.rows
            .iter()
            .map(|(url, items)| (url.as_str(), items.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
