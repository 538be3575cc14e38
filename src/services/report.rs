//! Analysis report output
//!
//! Console summary for the investigator plus a JSON export for downstream
//! tooling (graph visualizers, case management imports). Both render the
//! same `AnalysisReport`; neither feeds anything back into the core.

use std::path::Path;

use crate::analysis::{AnalysisReport, UniqueAssociation};
use crate::error::Result;

/// Render a human-readable summary of one analysis run
///
/// Clusters are listed in canonical order with their members, and each
/// multi-artifact association shows the evidence values that linked it.
pub fn render_summary(report: &AnalysisReport) -> String {
    let mut out = String::new();

    let pocket_entries: usize = report.pockets.iter().map(|p| p.member_records.len()).sum();
    let unique_entries: usize = report.unique_groups.iter().map(|g| g.pairs.len()).sum();

    out.push_str("--- Similarity Model ---\n");
    out.push_str(&format!(
        "{} of {} metadata records fall into {} similarity pockets\n",
        pocket_entries,
        report.record_count,
        report.pockets.len()
    ));
    out.push_str(&format!(
        "{} similarity groups\n",
        report.similarity_groups.len()
    ));
    for (n, group) in report.similarity_groups.iter().enumerate() {
        out.push_str(&format!(
            "  Sg {}: {}\n",
            n + 1,
            join_ids(group.artifacts.iter())
        ));
    }

    out.push_str("\n--- Unique Model ---\n");
    out.push_str(&format!(
        "{} unique (field, value) pairs across {} unique groups\n",
        unique_entries,
        report.unique_groups.len()
    ));
    out.push_str(&format!(
        "{} unique associations\n",
        report.associations.len()
    ));
    for (n, association) in report.associations.iter().enumerate() {
        out.push_str(&format!(
            "  UA {}: {}{}\n",
            n + 1,
            join_ids(association.artifacts.iter()),
            evidence_suffix(association)
        ));
    }

    out
}

fn join_ids<'a>(ids: impl Iterator<Item = &'a String>) -> String {
    ids.map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn evidence_suffix(association: &UniqueAssociation) -> String {
    let mut values: Vec<&str> = association
        .edges
        .iter()
        .flat_map(|e| e.evidence.iter().map(String::as_str))
        .collect();
    if values.is_empty() {
        return String::new();
    }
    values.sort_unstable();
    values.dedup();
    format!("  [evidence: {}]", values.join(", "))
}

/// Write the full report as pretty-printed JSON
pub fn write_json(path: &Path, report: &AnalysisReport) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), report)?;

    tracing::info!(path = %path.display(), "Wrote JSON report");
    Ok(())
}
