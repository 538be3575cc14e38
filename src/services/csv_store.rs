//! CSV record table store
//!
//! The scan/extract stage writes its flattened record table to CSV, and
//! the analyze stage reads one back. Any collaborator producing the same
//! columns (artifact_id, source_id, field, value, filepath) can feed the
//! pipeline; the core does not care about provenance.
//!
//! Row-level problems (ragged rows, rejected records) are collected and
//! reported, never fatal to the load.

use std::path::Path;

use thiserror::Error;

use crate::error::{Error, Result};
use crate::records::{RawRecord, RecordError, RecordStore};

/// Required column headers, in write order
const COLUMNS: [&str; 5] = ["artifact_id", "source_id", "field", "value", "filepath"];

/// Non-fatal problems encountered while loading a record table
#[derive(Debug, Error)]
pub enum CsvIssue {
    /// The CSV layer could not read this row at all
    #[error("line {line}: {message}")]
    Row { line: u64, message: String },

    /// The row parsed but failed record validation
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Load a record table from CSV
///
/// The header row must name at least `artifact_id`, `source_id`, `field`
/// and `value` (any order, extra columns ignored); `filepath` is optional.
/// An empty `value` cell is kept as the empty string — "" is a legal
/// value, distinct from a missing column.
pub fn load_records(path: &Path) -> Result<(RecordStore, Vec<CsvIssue>)> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let column_index = |name: &str| headers.iter().position(|h| h == name);

    let columns: Vec<Option<usize>> = COLUMNS.iter().map(|c| column_index(c)).collect();
    for (name, index) in COLUMNS.iter().zip(&columns) {
        if index.is_none() && *name != "filepath" {
            return Err(Error::InvalidInput(format!(
                "CSV {} is missing required column '{}'",
                path.display(),
                name
            )));
        }
    }

    let mut issues = Vec::new();
    let mut raw_rows = Vec::new();

    for (row_number, row) in reader.records().enumerate() {
        match row {
            Ok(row) => {
                let cell =
                    |i: usize| columns[i].and_then(|c| row.get(c)).map(|s| s.to_string());
                raw_rows.push(RawRecord {
                    artifact_id: cell(0),
                    source_id: cell(1),
                    field: cell(2),
                    value: cell(3),
                    filepath: cell(4),
                });
            }
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(row_number as u64 + 2);
                tracing::warn!(line, error = %e, "Skipping unreadable CSV row");
                issues.push(CsvIssue::Row {
                    line,
                    message: e.to_string(),
                });
            }
        }
    }

    let (store, rejected) = RecordStore::ingest(raw_rows);
    issues.extend(rejected.into_iter().map(CsvIssue::Record));

    tracing::info!(
        path = %path.display(),
        records = store.len(),
        issues = issues.len(),
        "Loaded record table"
    );

    Ok((store, issues))
}

/// Write a record table to CSV
pub fn save_records(path: &Path, store: &RecordStore) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(COLUMNS)?;
    for record in store.records() {
        writer.write_record([
            record.artifact_id.as_str(),
            record.source_id.as_str(),
            record.field.as_str(),
            record.value.as_str(),
            record.filepath.as_str(),
        ])?;
    }
    writer.flush()?;

    tracing::info!(
        path = %path.display(),
        records = store.len(),
        "Wrote record table"
    );

    Ok(())
}
