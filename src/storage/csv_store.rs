//! CSV implementation of the result store
//!
//! The file is a presence matrix: a `URL` column, then one column per
//! sanitized item, with `Y` in every cell whose item appears on that page.
//! It is read once at start-up and fully rewritten at the end of a run.

use crate::state::ResultMap;
use crate::storage::schema::{ColumnSchema, PRESENT};
use crate::storage::traits::{ResultStore, SaveSummary, StoreError, StoreResult};
use chrono::Utc;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Results file on disk
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the matrix without any fallback
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - No file at the path
    /// * `Ok(Some(map))` - File parsed; items are the column names marked present
    /// * `Err(StoreError)` - File exists but cannot be parsed
    pub fn read(&self) -> StoreResult<Option<ResultMap>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new().from_reader(file);
        let header = reader.headers()?.clone();
        let mut results = ResultMap::new();

        for (index, record) in reader.records().enumerate() {
            let record = record?;

            let url = record.get(0).unwrap_or_default().trim();
            if url.is_empty() {
                return Err(StoreError::EmptyUrl { row: index + 1 });
            }

            let items = header
                .iter()
                .zip(record.iter())
                .skip(1)
                .filter(|(column, cell)| !column.is_empty() && cell.trim() == PRESENT)
                .map(|(column, _)| column.to_string())
                .collect();

            results.insert(url, items);
        }

        Ok(Some(results))
    }

    /// Moves an unreadable file aside so the next save does not overwrite it
    fn quarantine(&self) -> std::io::Result<PathBuf> {
        let mut target = self.path.as_os_str().to_owned();
        target.push(format!(".{}.corrupt", Utc::now().format("%Y%m%dT%H%M%S")));
        let target = PathBuf::from(target);

        fs::rename(&self.path, &target)?;
        Ok(target)
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.as_os_str().to_owned();
        temp.push(".tmp");
        PathBuf::from(temp)
    }
}

impl ResultStore for RecordStore {
    fn load(&self) -> ResultMap {
        match self.read() {
            Ok(Some(results)) => {
                tracing::info!(
                    "Loaded {} prior results from {}",
                    results.len(),
                    self.path.display()
                );
                results
            }
            Ok(None) => {
                tracing::info!(
                    "No results file at {}, starting from scratch",
                    self.path.display()
                );
                ResultMap::new()
            }
            Err(e) => {
                tracing::warn!(
                    "Could not read results file {}: {}",
                    self.path.display(),
                    e
                );
                match self.quarantine() {
                    Ok(moved_to) => {
                        tracing::warn!("Moved unreadable results file to {}", moved_to.display())
                    }
                    Err(e) => tracing::warn!("Could not move unreadable results file: {}", e),
                }
                ResultMap::new()
            }
        }
    }

    fn save(&self, results: &ResultMap) -> StoreResult<Option<SaveSummary>> {
        if results.is_empty() {
            tracing::info!("No results to save, leaving {} untouched", self.path.display());
            return Ok(None);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let schema = ColumnSchema::from_results(results);
        let temp_path = self.temp_path();

        let written = write_matrix(&temp_path, &schema, results).and_then(|marks| {
            fs::rename(&temp_path, &self.path)?;
            Ok(marks)
        });
        let marks = match written {
            Ok(marks) => marks,
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&temp_path) {
                    if cleanup.kind() != ErrorKind::NotFound {
                        tracing::warn!("Could not remove {}: {}", temp_path.display(), cleanup);
                    }
                }
                return Err(e);
            }
        };

        let summary = SaveSummary {
            rows: results.len(),
            columns: schema.len(),
            marks,
        };
        tracing::info!(
            "Saved {} rows x {} items to {}",
            summary.rows,
            summary.columns,
            self.path.display()
        );

        Ok(Some(summary))
    }
}

/// Writes the header and one row per URL; returns the number of marked cells
fn write_matrix(path: &Path, schema: &ColumnSchema, results: &ResultMap) -> StoreResult<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(schema.header())?;

    let mut marks = 0;
    for (url, items) in results.iter() {
        let cells = schema.presence_cells(items);
        marks += cells.iter().filter(|cell| !cell.is_empty()).count();
        writer.write_record(std::iter::once(url).chain(cells))?;
    }

    writer.flush()?;
    Ok(marks)
}
