//! Metadata record store
//!
//! Holds the flat (artifact, source, field, value) table that the analysis
//! pipeline consumes. Collaborators (scanner + extractor, CSV loader) hand
//! in unvalidated `RawRecord`s; validation rejects malformed rows one at a
//! time so a single bad row never aborts a run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Record validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// A required field is absent or blank
    #[error("record {index}: missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },
}

/// One metadata observation for one artifact
///
/// Immutable once validated. Uniqueness is not enforced: duplicate
/// (artifact, source, field, value) tuples are legal input and are handled
/// downstream without double-counting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Identifier of the collected file/object
    pub artifact_id: String,

    /// Device or collection origin (e.g. a phone, a laptop image)
    pub source_id: String,

    /// Metadata field name as reported by the extractor
    pub field: String,

    /// Field value, stringified exactly once at extraction time
    pub value: String,

    /// Original file path; informational only, never matched on
    #[serde(default)]
    pub filepath: String,
}

/// Unvalidated record as produced by a collaborator (CSV row, extractor output)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub artifact_id: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub filepath: Option<String>,
}

impl RawRecord {
    /// Validate one raw record
    ///
    /// `artifact_id`, `source_id` and `field` must be present and non-blank.
    /// `value` must be present but MAY be the empty string — "" is a legal
    /// value here; triviality filtering happens in association clustering.
    pub fn validate(self, index: usize) -> Result<MetadataRecord, RecordError> {
        let artifact_id = require_non_blank(self.artifact_id, index, "artifact_id")?;
        let source_id = require_non_blank(self.source_id, index, "source_id")?;
        let field = require_non_blank(self.field, index, "field")?;
        let value = self
            .value
            .ok_or(RecordError::MissingField { index, field: "value" })?;

        Ok(MetadataRecord {
            artifact_id,
            source_id,
            field,
            value,
            filepath: self.filepath.unwrap_or_default(),
        })
    }
}

fn require_non_blank(
    value: Option<String>,
    index: usize,
    field: &'static str,
) -> Result<String, RecordError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RecordError::MissingField { index, field }),
    }
}

/// Read-only snapshot of the record table for one analysis run
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<MetadataRecord>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-validated records
    pub fn from_records(records: Vec<MetadataRecord>) -> Self {
        Self { records }
    }

    /// Validate raw records in order, keeping good rows and collecting
    /// per-row rejections
    ///
    /// A partial, explainable result is more useful than a hard failure,
    /// so rejected rows are reported rather than fatal.
    pub fn ingest<I>(raw: I) -> (Self, Vec<RecordError>)
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut records = Vec::new();
        let mut rejected = Vec::new();

        for (index, row) in raw.into_iter().enumerate() {
            match row.validate(index) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Rejecting malformed record");
                    rejected.push(e);
                }
            }
        }

        (Self { records }, rejected)
    }

    /// Append one validated record
    pub fn push(&mut self, record: MetadataRecord) {
        self.records.push(record);
    }

    /// All records, in ingestion order
    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct artifact ids in the table
    pub fn artifact_count(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        for r in &self.records {
            seen.insert(r.artifact_id.as_str());
        }
        seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(artifact: &str, source: &str, field: &str, value: &str) -> RawRecord {
        RawRecord {
            artifact_id: Some(artifact.to_string()),
            source_id: Some(source.to_string()),
            field: Some(field.to_string()),
            value: Some(value.to_string()),
            filepath: None,
        }
    }

    #[test]
    fn test_validate_ok() {
        let record = raw("A1", "S1", "Make", "Canon").validate(0).unwrap();
        assert_eq!(record.artifact_id, "A1");
        assert_eq!(record.filepath, "");
    }

    #[test]
    fn test_validate_empty_value_is_legal() {
        let record = raw("A1", "S1", "Comment", "").validate(0).unwrap();
        assert_eq!(record.value, "");
    }

    #[test]
    fn test_validate_missing_artifact_id() {
        let mut row = raw("A1", "S1", "Make", "Canon");
        row.artifact_id = None;
        let err = row.validate(3).unwrap_err();
        assert_eq!(
            err,
            RecordError::MissingField { index: 3, field: "artifact_id" }
        );
    }

    #[test]
    fn test_validate_blank_field_rejected() {
        let mut row = raw("A1", "S1", "Make", "Canon");
        row.field = Some("   ".to_string());
        assert!(row.validate(0).is_err());
    }

    #[test]
    fn test_ingest_keeps_good_rows() {
        let mut bad = raw("A2", "S1", "Make", "Canon");
        bad.source_id = None;

        let rows = vec![raw("A1", "S1", "Make", "Canon"), bad];
        let (store, rejected) = RecordStore::ingest(rows);

        assert_eq!(store.len(), 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(store.records()[0].artifact_id, "A1");
    }

    #[test]
    fn test_artifact_count_distinct() {
        let (store, _) = RecordStore::ingest(vec![
            raw("A1", "S1", "Make", "Canon"),
            raw("A1", "S1", "Model", "EOS"),
            raw("A2", "S1", "Make", "Canon"),
        ]);
        assert_eq!(store.artifact_count(), 2);
    }
}
