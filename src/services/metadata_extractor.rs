//! Metadata extraction via exiftool
//!
//! Runs `exiftool -j -G <file>` as an external process and flattens the
//! JSON output into one record per (field, value) pair. Values are
//! stringified exactly once here: JSON strings verbatim, everything else
//! via canonical JSON serialization. The core never re-interprets them.

use std::path::PathBuf;
use std::process::Stdio;

use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;

use super::file_scanner::ArtifactFile;
use crate::records::RawRecord;

/// Metadata extraction errors
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Could not spawn the extraction tool
    #[error("Failed to run {tool}: {message}")]
    ToolUnavailable { tool: String, message: String },

    /// The tool ran but reported failure for this file
    #[error("Extraction failed for {path}: {stderr}")]
    ToolFailed { path: PathBuf, stderr: String },

    /// The tool's output was not the expected JSON shape
    #[error("Unparseable extractor output for {path}: {message}")]
    BadOutput { path: PathBuf, message: String },
}

/// exiftool-backed metadata extractor
pub struct MetadataExtractor {
    exiftool: PathBuf,
}

impl MetadataExtractor {
    /// Create an extractor using `exiftool` from PATH
    pub fn new() -> Self {
        Self {
            exiftool: PathBuf::from("exiftool"),
        }
    }

    /// Use a specific exiftool binary
    pub fn with_binary(binary: PathBuf) -> Self {
        Self { exiftool: binary }
    }

    /// Extract all metadata tags from one artifact file
    pub async fn extract(&self, artifact: &ArtifactFile) -> Result<Vec<RawRecord>, ExtractError> {
        tracing::debug!(
            artifact = %artifact.artifact_id,
            path = %artifact.path.display(),
            "Extracting metadata"
        );

        let output = Command::new(&self.exiftool)
            .arg("-j")
            .arg("-G")
            .arg(&artifact.path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ExtractError::ToolUnavailable {
                tool: self.exiftool.display().to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ExtractError::ToolFailed {
                path: artifact.path.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let parsed: Value =
            serde_json::from_slice(&output.stdout).map_err(|e| ExtractError::BadOutput {
                path: artifact.path.clone(),
                message: e.to_string(),
            })?;

        // exiftool returns a one-element array of tag objects
        let tags = parsed
            .as_array()
            .and_then(|a| a.first())
            .and_then(|v| v.as_object())
            .ok_or_else(|| ExtractError::BadOutput {
                path: artifact.path.clone(),
                message: "expected a one-element JSON array of tag objects".to_string(),
            })?;

        Ok(flatten_tags(artifact, tags))
    }

    /// Extract metadata from many files, skipping failures
    ///
    /// One unreadable or unsupported file must not sink the whole run, so
    /// per-file errors are collected alongside the records that did come
    /// out.
    pub async fn extract_all(
        &self,
        artifacts: &[ArtifactFile],
    ) -> (Vec<RawRecord>, Vec<ExtractError>) {
        let mut records = Vec::new();
        let mut errors = Vec::new();

        for artifact in artifacts {
            match self.extract(artifact).await {
                Ok(mut rows) => records.append(&mut rows),
                Err(e) => {
                    tracing::warn!(
                        artifact = %artifact.artifact_id,
                        error = %e,
                        "Skipping artifact after extraction failure"
                    );
                    errors.push(e);
                }
            }
        }

        tracing::info!(
            records = records.len(),
            failed_files = errors.len(),
            "Metadata extraction complete"
        );

        (records, errors)
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten one tag object into raw records for the given artifact
fn flatten_tags(
    artifact: &ArtifactFile,
    tags: &serde_json::Map<String, Value>,
) -> Vec<RawRecord> {
    tags.iter()
        .map(|(field, value)| RawRecord {
            artifact_id: Some(artifact.artifact_id.clone()),
            source_id: Some(artifact.source_id.clone()),
            field: Some(field.clone()),
            value: Some(stringify_value(value)),
            filepath: Some(artifact.path.display().to_string()),
        })
        .collect()
}

/// Stringify a tag value for exact-match comparison
///
/// Strings come through verbatim (no added quotes); numbers, booleans,
/// arrays and null use their canonical JSON rendering.
fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
