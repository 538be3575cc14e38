//! Metadata clustering pipeline
//!
//! One synchronous pass over an in-memory record snapshot:
//!
//! ```text
//! RecordStore -> find_pockets -> cluster_groups          (similarity side)
//!                            \-> extract_unique_groups
//!                                   -> cluster_associations   (unique side)
//! ```
//!
//! Pocket members and Unique Group pairs are a strict partition of the
//! input records. Everything is recomputed from scratch per run; there is
//! no incremental update and no state outside the arguments.

pub mod pockets;
pub mod similarity;
pub mod union_find;
pub mod unique;

use serde::Serialize;

use crate::records::RecordStore;
pub use pockets::{find_pockets, PocketKey, SimilarityPocket};
pub use similarity::{cluster_groups, SimilarityGroup};
pub use unique::{
    cluster_associations, extract_unique_groups, AssociationEdge, UniqueAssociation,
    UniqueGroup, TRIVIAL_VALUES,
};

/// Full output of one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Number of input records analyzed
    pub record_count: usize,
    /// Qualifying (source, field, value) partitions
    pub pockets: Vec<SimilarityPocket>,
    /// Transitive closure of pocket sharing
    pub similarity_groups: Vec<SimilarityGroup>,
    /// Per-artifact leftovers after pocket subtraction
    pub unique_groups: Vec<UniqueGroup>,
    /// Transitive closure of non-trivial cross-value matches
    pub associations: Vec<UniqueAssociation>,
}

/// Run the full clustering pipeline over a record snapshot
///
/// Empty input yields empty outputs; no qualifying pockets means every
/// record flows into the unique side. Neither is an error.
pub fn analyze(store: &RecordStore) -> AnalysisReport {
    tracing::info!(records = store.len(), artifacts = store.artifact_count(), "Starting analysis");

    let pockets = find_pockets(store);
    let similarity_groups = cluster_groups(&pockets);
    let unique_groups = extract_unique_groups(store, &pockets);
    let associations = cluster_associations(&unique_groups);

    tracing::info!(
        pockets = pockets.len(),
        similarity_groups = similarity_groups.len(),
        unique_groups = unique_groups.len(),
        associations = associations.len(),
        "Analysis complete"
    );

    AnalysisReport {
        record_count: store.len(),
        pockets,
        similarity_groups,
        unique_groups,
        associations,
    }
}
