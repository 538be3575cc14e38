//! Similarity Pocket finder
//!
//! A Similarity Pocket is a group of two or more artifacts carrying the
//! identical metadata field+value pair within the same source. Pockets are
//! the raw material for similarity grouping, and their member records are
//! subtracted from the table before unique-association analysis.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::records::RecordStore;

/// Composite key identifying one pocket candidate
///
/// Comparison is exact string equality on every part. No normalization,
/// case-folding, or numeric coercion: "10" and "10.0" are different values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PocketKey {
    pub source_id: String,
    pub field: String,
    pub value: String,
}

/// A qualifying (source, field, value) partition
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityPocket {
    pub key: PocketKey,

    /// Distinct artifact ids sharing the key (set semantics — duplicate
    /// records of the same artifact count once)
    pub artifacts: BTreeSet<String>,

    /// Indices into the record store of every member record, duplicates
    /// included, so the unique pipeline can subtract them by identity
    pub member_records: Vec<usize>,
}

/// Partition the record table by (source_id, field, value) and keep the
/// partitions with at least two distinct artifacts
///
/// Trivial-looking values ("", "0") are ordinary values here; triviality
/// filtering applies only to unique-association matching.
///
/// Output is sorted by key so downstream clustering and reporting are
/// deterministic regardless of input order.
pub fn find_pockets(store: &RecordStore) -> Vec<SimilarityPocket> {
    let mut partitions: HashMap<PocketKey, (BTreeSet<String>, Vec<usize>)> = HashMap::new();

    for (index, record) in store.records().iter().enumerate() {
        let key = PocketKey {
            source_id: record.source_id.clone(),
            field: record.field.clone(),
            value: record.value.clone(),
        };
        let entry = partitions.entry(key).or_default();
        entry.0.insert(record.artifact_id.clone());
        entry.1.push(index);
    }

    let mut pockets: Vec<SimilarityPocket> = partitions
        .into_iter()
        .filter(|(_, (artifacts, _))| artifacts.len() >= 2)
        .map(|(key, (artifacts, member_records))| SimilarityPocket {
            key,
            artifacts,
            member_records,
        })
        .collect();

    pockets.sort_by(|a, b| a.key.cmp(&b.key));

    tracing::debug!(
        pockets = pockets.len(),
        records = store.len(),
        "Similarity pocket scan complete"
    );

    pockets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::MetadataRecord;

    fn record(artifact: &str, source: &str, field: &str, value: &str) -> MetadataRecord {
        MetadataRecord {
            artifact_id: artifact.to_string(),
            source_id: source.to_string(),
            field: field.to_string(),
            value: value.to_string(),
            filepath: String::new(),
        }
    }

    #[test]
    fn test_two_artifacts_one_pocket() {
        let store = RecordStore::from_records(vec![
            record("A", "S1", "f1", "v1"),
            record("B", "S1", "f1", "v1"),
        ]);
        let pockets = find_pockets(&store);
        assert_eq!(pockets.len(), 1);
        assert_eq!(
            pockets[0].artifacts,
            BTreeSet::from(["A".to_string(), "B".to_string()])
        );
        assert_eq!(pockets[0].member_records, vec![0, 1]);
    }

    #[test]
    fn test_single_artifact_does_not_qualify() {
        let store = RecordStore::from_records(vec![record("A", "S1", "f1", "v1")]);
        assert!(find_pockets(&store).is_empty());
    }

    #[test]
    fn test_duplicate_tuples_count_once() {
        // Same artifact repeated under a key is cardinality 1, not 2
        let store = RecordStore::from_records(vec![
            record("A", "S1", "f1", "v1"),
            record("A", "S1", "f1", "v1"),
        ]);
        assert!(find_pockets(&store).is_empty());
    }

    #[test]
    fn test_duplicate_tuples_all_subtracted() {
        let store = RecordStore::from_records(vec![
            record("A", "S1", "f1", "v1"),
            record("B", "S1", "f1", "v1"),
            record("A", "S1", "f1", "v1"),
        ]);
        let pockets = find_pockets(&store);
        assert_eq!(pockets.len(), 1);
        // Both copies of A's record are members
        assert_eq!(pockets[0].member_records, vec![0, 1, 2]);
        assert_eq!(pockets[0].artifacts.len(), 2);
    }

    #[test]
    fn test_sources_partition_separately() {
        // Same field+value in different sources never forms one pocket
        let store = RecordStore::from_records(vec![
            record("A", "S1", "f1", "v1"),
            record("B", "S2", "f1", "v1"),
        ]);
        assert!(find_pockets(&store).is_empty());
    }

    #[test]
    fn test_exact_string_equality() {
        let store = RecordStore::from_records(vec![
            record("A", "S1", "size", "10"),
            record("B", "S1", "size", "10.0"),
        ]);
        assert!(find_pockets(&store).is_empty());
    }

    #[test]
    fn test_zero_and_empty_are_ordinary_here() {
        let store = RecordStore::from_records(vec![
            record("A", "S1", "flags", "0"),
            record("B", "S1", "flags", "0"),
        ]);
        assert_eq!(find_pockets(&store).len(), 1);
    }

    #[test]
    fn test_output_sorted_by_key() {
        let store = RecordStore::from_records(vec![
            record("A", "S2", "f1", "v1"),
            record("B", "S2", "f1", "v1"),
            record("C", "S1", "f1", "v1"),
            record("D", "S1", "f1", "v1"),
        ]);
        let pockets = find_pockets(&store);
        assert_eq!(pockets[0].key.source_id, "S1");
        assert_eq!(pockets[1].key.source_id, "S2");
    }
}
