//! Similarity Group clusterer
//!
//! A Similarity Group is the transitive closure of "shares a Similarity
//! Pocket": artifacts A and C end up together whenever some chain of
//! pocket co-membership connects them, even if no single pocket holds both.
//!
//! Each pocket is a clique over its artifacts, so instead of emitting
//! C(k,2) edges per pocket, every member is unioned with the pocket's
//! first member; the disjoint-set forest yields the same components.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::pockets::SimilarityPocket;
use super::union_find::UnionFind;

/// One connected component of the pocket-sharing relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimilarityGroup {
    /// Member artifact ids (canonically sorted)
    pub artifacts: BTreeSet<String>,
}

/// Cluster pocket members into Similarity Groups
///
/// Nodes are exactly the artifacts appearing in at least one qualifying
/// pocket; the returned groups partition that set. Artifact ids are
/// interned in sorted order before clustering, so group membership and
/// group order are independent of input iteration order.
pub fn cluster_groups(pockets: &[SimilarityPocket]) -> Vec<SimilarityGroup> {
    // Intern every pocket artifact into a dense, sorted arena
    let mut ids: BTreeSet<&str> = BTreeSet::new();
    for pocket in pockets {
        for artifact in &pocket.artifacts {
            ids.insert(artifact);
        }
    }
    let ids: Vec<&str> = ids.into_iter().collect();
    let index_of: HashMap<&str, usize> =
        ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut forest = UnionFind::new(ids.len());
    for pocket in pockets {
        let mut members = pocket.artifacts.iter();
        if let Some(first) = members.next() {
            let anchor = index_of[first.as_str()];
            for artifact in members {
                forest.union(anchor, index_of[artifact.as_str()]);
            }
        }
    }

    let groups: Vec<SimilarityGroup> = forest
        .components()
        .into_iter()
        .map(|component| SimilarityGroup {
            artifacts: component
                .into_iter()
                .map(|i| ids[i].to_string())
                .collect(),
        })
        .collect();

    tracing::debug!(
        groups = groups.len(),
        artifacts = ids.len(),
        "Similarity clustering complete"
    );

    groups
}
