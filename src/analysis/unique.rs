//! Unique pipeline: pocket subtraction and cross-value association
//!
//! Everything that failed the Similarity Pocket condition flows here.
//! Leftover records are folded into per-artifact Unique Groups, and
//! artifacts whose groups share any non-trivial metadata *value* — field
//! identity ignored, sources ignored — are transitively clustered into
//! Unique Associations.
//!
//! The association scan compares every unordered artifact pair, O(A²) in
//! the number of Unique Groups. Fine at forensic-case scale (tens to
//! hundreds of artifacts); a scalability limit beyond that.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::pockets::SimilarityPocket;
use super::union_find::UnionFind;
use crate::records::RecordStore;

/// Values that never count as association evidence
///
/// Exact, case-sensitive matches. "None" the literal string, not a null
/// concept — values were stringified upstream.
pub const TRIVIAL_VALUES: [&str; 5] = ["", "0", "<null>", "None", "n/a"];

/// The (field, value) pairs of one artifact's records that escaped every
/// Similarity Pocket
///
/// Only artifacts with at least one leftover record get a UniqueGroup;
/// artifacts fully absorbed into pockets are omitted from the unique
/// pipeline entirely (not present even as singleton associations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueGroup {
    pub artifact_id: String,
    /// Distinct (field, value) pairs, canonically sorted
    pub pairs: BTreeSet<(String, String)>,
}

impl UniqueGroup {
    /// The bare values of this group, field names dropped
    pub fn values(&self) -> BTreeSet<&str> {
        self.pairs.iter().map(|(_, v)| v.as_str()).collect()
    }
}

/// One qualifying pairwise match, kept as reporting evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssociationEdge {
    /// Endpoint artifact ids, lexicographically ordered
    pub artifacts: (String, String),
    /// The non-trivial values both endpoints carry
    pub evidence: BTreeSet<String>,
}

/// One connected component of the shared-value relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueAssociation {
    /// Member artifact ids (canonically sorted)
    pub artifacts: BTreeSet<String>,
    /// The edges that formed this component; empty for singletons
    pub edges: Vec<AssociationEdge>,
}

/// Subtract pocket member records from the table and fold the remainder
/// into per-artifact Unique Groups
///
/// Membership is by record identity (table index), so duplicate tuples
/// absorbed by a pocket are all removed. Output is sorted by artifact id.
pub fn extract_unique_groups(
    store: &RecordStore,
    pockets: &[SimilarityPocket],
) -> Vec<UniqueGroup> {
    let mut absorbed = vec![false; store.len()];
    for pocket in pockets {
        for &index in &pocket.member_records {
            absorbed[index] = true;
        }
    }

    let mut by_artifact: HashMap<&str, BTreeSet<(String, String)>> = HashMap::new();
    for (index, record) in store.records().iter().enumerate() {
        if absorbed[index] {
            continue;
        }
        by_artifact
            .entry(record.artifact_id.as_str())
            .or_default()
            .insert((record.field.clone(), record.value.clone()));
    }

    let mut groups: Vec<UniqueGroup> = by_artifact
        .into_iter()
        .map(|(artifact_id, pairs)| UniqueGroup {
            artifact_id: artifact_id.to_string(),
            pairs,
        })
        .collect();
    groups.sort_by(|a, b| a.artifact_id.cmp(&b.artifact_id));

    tracing::debug!(
        unique_groups = groups.len(),
        "Unique pocket extraction complete"
    );

    groups
}

/// Cluster Unique Groups into Unique Associations
///
/// Two artifacts are associated when their bare value-sets intersect on at
/// least one non-trivial value, regardless of field or source. The
/// transitive closure of that relation partitions the UniqueGroup
/// artifacts; artifacts with no qualifying match stay as singleton
/// components with no edges.
pub fn cluster_associations(groups: &[UniqueGroup]) -> Vec<UniqueAssociation> {
    // Component order must be canonical even if the caller's groups are
    // not sorted by artifact id.
    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.sort_by(|&a, &b| groups[a].artifact_id.cmp(&groups[b].artifact_id));

    let value_sets: Vec<BTreeSet<&str>> = groups.iter().map(UniqueGroup::values).collect();

    let mut forest = UnionFind::new(order.len());
    let mut edges: Vec<(usize, usize, BTreeSet<String>)> = Vec::new();

    for i in 0..order.len() {
        for j in (i + 1)..order.len() {
            let (gi, gj) = (order[i], order[j]);
            let evidence: BTreeSet<String> = value_sets[gi]
                .intersection(&value_sets[gj])
                .filter(|v| !TRIVIAL_VALUES.contains(v))
                .map(|v| v.to_string())
                .collect();
            if !evidence.is_empty() {
                forest.union(i, j);
                edges.push((i, j, evidence));
            }
        }
    }

    let associations: Vec<UniqueAssociation> = forest
        .components()
        .into_iter()
        .map(|component| {
            let artifacts: BTreeSet<String> = component
                .iter()
                .map(|&i| groups[order[i]].artifact_id.clone())
                .collect();
            let members: BTreeSet<usize> = component.into_iter().collect();
            let edges = edges
                .iter()
                .filter(|(a, _, _)| members.contains(a))
                .map(|(a, b, evidence)| AssociationEdge {
                    artifacts: (
                        groups[order[*a]].artifact_id.clone(),
                        groups[order[*b]].artifact_id.clone(),
                    ),
                    evidence: evidence.clone(),
                })
                .collect();
            UniqueAssociation { artifacts, edges }
        })
        .collect();

    tracing::debug!(
        associations = associations.len(),
        edges = associations.iter().map(|a| a.edges.len()).sum::<usize>(),
        "Unique association clustering complete"
    );

    associations
}
