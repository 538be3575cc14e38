//! End-to-end tests for the clustering pipeline
//!
//! Exercises the whole analysis flow over in-memory record tables and over
//! the CSV interchange path, covering the partition and disjointness
//! properties plus the canonical small scenarios.

use std::collections::BTreeSet;

use metasift::analysis::analyze;
use metasift::records::{MetadataRecord, RecordStore};
use metasift::services::{load_records, save_records};

fn record(artifact: &str, source: &str, field: &str, value: &str) -> MetadataRecord {
    MetadataRecord {
        artifact_id: artifact.to_string(),
        source_id: source.to_string(),
        field: field.to_string(),
        value: value.to_string(),
        filepath: format!("/evidence/{}/{}.jpg", source, artifact),
    }
}

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn shared_pair_forms_group_and_empties_unique_side() {
    // Two artifacts share one pair: pocket {A,B}, group {A,B}, no
    // unique groups at all
    let store = RecordStore::from_records(vec![
        record("A", "S1", "f1", "v1"),
        record("B", "S1", "f1", "v1"),
    ]);
    let report = analyze(&store);

    assert_eq!(report.pockets.len(), 1);
    assert_eq!(report.pockets[0].artifacts, set(&["A", "B"]));
    assert_eq!(report.similarity_groups.len(), 1);
    assert_eq!(report.similarity_groups[0].artifacts, set(&["A", "B"]));
    assert!(report.unique_groups.is_empty());
    assert!(report.associations.is_empty());
}

#[test]
fn lone_record_becomes_singleton_association() {
    let store = RecordStore::from_records(vec![record("A", "S1", "f1", "v1")]);
    let report = analyze(&store);

    assert!(report.pockets.is_empty());
    assert_eq!(report.unique_groups.len(), 1);
    assert_eq!(
        report.unique_groups[0].pairs,
        BTreeSet::from([("f1".to_string(), "v1".to_string())])
    );
    assert_eq!(report.associations.len(), 1);
    assert_eq!(report.associations[0].artifacts, set(&["A"]));
    assert!(report.associations[0].edges.is_empty());
}

#[test]
fn cross_field_value_overlap_associates() {
    let store = RecordStore::from_records(vec![
        record("A", "S1", "f1", "x"),
        record("B", "S1", "f2", "x"),
    ]);
    let report = analyze(&store);

    assert!(report.pockets.is_empty()); // fields differ, no pocket
    assert_eq!(report.associations.len(), 1);
    assert_eq!(report.associations[0].artifacts, set(&["A", "B"]));
    assert_eq!(report.associations[0].edges[0].evidence, set(&["x"]));
}

#[test]
fn trivial_overlap_stays_singletons() {
    let store = RecordStore::from_records(vec![
        record("A", "S1", "f1", "0"),
        record("B", "S1", "f2", "0"),
    ]);
    let report = analyze(&store);

    assert_eq!(report.associations.len(), 2);
    assert!(report.associations.iter().all(|a| a.edges.is_empty()));
}

#[test]
fn similarity_groups_close_transitively() {
    // A-B share pocket P1, B-C share pocket P2 with a different key;
    // A and C still land in one group through B
    let store = RecordStore::from_records(vec![
        record("A", "S1", "f1", "v1"),
        record("B", "S1", "f1", "v1"),
        record("B", "S2", "f2", "v2"),
        record("C", "S2", "f2", "v2"),
    ]);
    let report = analyze(&store);

    assert_eq!(report.pockets.len(), 2);
    assert_eq!(report.similarity_groups.len(), 1);
    assert_eq!(report.similarity_groups[0].artifacts, set(&["A", "B", "C"]));
}

#[test]
fn every_record_lands_on_exactly_one_side() {
    let store = RecordStore::from_records(vec![
        record("A", "S1", "f1", "v1"),
        record("B", "S1", "f1", "v1"),
        record("A", "S1", "f2", "x"),
        record("B", "S1", "f3", "y"),
        record("C", "S2", "f4", "x"),
        record("D", "S2", "f5", "z"),
    ]);
    let report = analyze(&store);

    let pocket_members: usize = report.pockets.iter().map(|p| p.member_records.len()).sum();
    let unique_pairs: usize = report.unique_groups.iter().map(|g| g.pairs.len()).sum();
    assert_eq!(pocket_members + unique_pairs, store.len());

    // Similarity groups partition the pocket artifacts
    let mut grouped = BTreeSet::new();
    for group in &report.similarity_groups {
        for artifact in &group.artifacts {
            assert!(grouped.insert(artifact.clone()), "groups must be disjoint");
        }
    }
    assert_eq!(grouped, set(&["A", "B"]));

    // Associations partition the unique-group artifacts
    let mut associated = BTreeSet::new();
    for association in &report.associations {
        for artifact in &association.artifacts {
            assert!(
                associated.insert(artifact.clone()),
                "associations must be disjoint"
            );
        }
    }
    let unique_artifacts: BTreeSet<String> = report
        .unique_groups
        .iter()
        .map(|g| g.artifact_id.clone())
        .collect();
    assert_eq!(associated, unique_artifacts);
}

#[test]
fn input_order_does_not_change_clusters() {
    let mut records = vec![
        record("A", "S1", "f1", "v1"),
        record("B", "S1", "f1", "v1"),
        record("B", "S1", "f9", "x"),
        record("C", "S2", "f2", "x"),
        record("D", "S2", "f3", "solo"),
    ];
    let forward = analyze(&RecordStore::from_records(records.clone()));
    records.reverse();
    let backward = analyze(&RecordStore::from_records(records));

    assert_eq!(forward.similarity_groups, backward.similarity_groups);
    assert_eq!(forward.unique_groups, backward.unique_groups);
    assert_eq!(forward.associations, backward.associations);
}

#[test]
fn csv_round_trip_feeds_identical_analysis() {
    let store = RecordStore::from_records(vec![
        record("A", "S1", "f1", "v1"),
        record("B", "S1", "f1", "v1"),
        record("B", "S1", "f9", "x"),
        record("C", "S2", "f2", "x"),
    ]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.csv");
    save_records(&path, &store).unwrap();
    let (loaded, issues) = load_records(&path).unwrap();
    assert!(issues.is_empty());

    let direct = analyze(&store);
    let via_csv = analyze(&loaded);
    assert_eq!(direct.similarity_groups, via_csv.similarity_groups);
    assert_eq!(direct.associations, via_csv.associations);
}

#[test]
fn duplicate_tuples_do_not_double_count() {
    // The duplicate copy of A's pocket record is absorbed with the pocket;
    // it must not leak into the unique side
    let store = RecordStore::from_records(vec![
        record("A", "S1", "f1", "v1"),
        record("A", "S1", "f1", "v1"),
        record("B", "S1", "f1", "v1"),
    ]);
    let report = analyze(&store);

    assert_eq!(report.similarity_groups.len(), 1);
    assert!(report.unique_groups.is_empty());
    assert!(report.associations.is_empty());
}
