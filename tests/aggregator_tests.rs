mod common;

use common::SnapshotBuilder;
use heapdiff::aggregator::{aggregate_by_type, collect_retainer_hints, whole_file_aggregate};
use heapdiff::parser::parse_snapshot;
use heapdiff::utils::config::{AnalysisConfig, TypeNaming, FALLBACK_TYPE_NAME};

#[test]
fn test_aggregate_counts_and_sizes() {
    let mut builder = SnapshotBuilder::new();
    builder.objects("Array", 3, 100);
    builder.objects("Map", 2, 40);
    builder.object("Array", 50);
    let snapshot = parse_snapshot(&builder.build()).unwrap();

    let aggregates = aggregate_by_type(&snapshot, &AnalysisConfig::default());

    assert_eq!(aggregates.len(), 2);
    let array = aggregates.get("Array").unwrap();
    assert_eq!(array.count, 4);
    assert_eq!(array.total_size, 350);
    assert_eq!(aggregates.get("Map").unwrap().total_size, 80);
    assert_eq!(aggregates.total_size(), snapshot.stats().total_self_size);
}

#[test]
fn test_first_seen_order() {
    let mut builder = SnapshotBuilder::new();
    builder.object("Zeta", 1);
    builder.object("Alpha", 1);
    builder.object("Zeta", 1);
    let snapshot = parse_snapshot(&builder.build()).unwrap();

    let aggregates = aggregate_by_type(&snapshot, &AnalysisConfig::default());
    let names: Vec<&str> = aggregates.iter().map(|a| a.type_name.as_str()).collect();
    assert_eq!(names, vec!["Zeta", "Alpha"]);
}

#[test]
fn test_empty_name_falls_back() {
    let mut builder = SnapshotBuilder::new();
    builder.object("", 24);
    let snapshot = parse_snapshot(&builder.build()).unwrap();

    let aggregates = aggregate_by_type(&snapshot, &AnalysisConfig::default());
    assert_eq!(aggregates.get(FALLBACK_TYPE_NAME).unwrap().total_size, 24);
}

#[test]
fn test_constructor_naming_buckets_strings() {
    let mut builder = SnapshotBuilder::new();
    builder.string("hello", 20);
    builder.string("world", 22);
    builder.object("Session", 64);
    let snapshot = parse_snapshot(&builder.build()).unwrap();

    let by_name = aggregate_by_type(&snapshot, &AnalysisConfig::default());
    assert_eq!(by_name.len(), 3);

    let config = AnalysisConfig::default().with_naming(TypeNaming::Constructor);
    let by_constructor = aggregate_by_type(&snapshot, &config);
    assert_eq!(by_constructor.len(), 2);
    assert_eq!(by_constructor.get("(string)").unwrap().count, 2);
    assert_eq!(by_constructor.get("Session").unwrap().total_size, 64);
}

#[test]
fn test_sample_ids_are_capped() {
    let mut builder = SnapshotBuilder::new();
    builder.objects("Array", 20, 8);
    let snapshot = parse_snapshot(&builder.build()).unwrap();

    let config = AnalysisConfig::default();
    let aggregates = aggregate_by_type(&snapshot, &config);
    assert_eq!(
        aggregates.get("Array").unwrap().sample_ids.len(),
        config.max_sample_ids
    );
}

#[test]
fn test_retainer_hints_from_built_graph() {
    let mut builder = SnapshotBuilder::new();
    let cache = builder.object("LruCache", 64);
    let registry = builder.object("Registry", 64);
    for entry in builder.objects("Session", 3, 128) {
        builder.property(cache, "entries", entry);
    }
    let lonely = builder.object("Session", 128);
    builder.property(registry, "current", lonely);
    let snapshot = parse_snapshot(&builder.build()).unwrap();

    let hints = collect_retainer_hints(&snapshot, &["Session"], &AnalysisConfig::default());
    let session = &hints["Session"];
    assert_eq!(session.len(), 2);
    assert!(session[0].starts_with("LruCache via 'entries'"));
    assert!(session[0].contains("3 refs"));
    assert!(session[1].starts_with("Registry via 'current'"));
}

#[test]
fn test_whole_file_aggregate() {
    let aggregates = whole_file_aggregate(4096);
    assert_eq!(aggregates.len(), 1);
    assert_eq!(aggregates.total_size(), 4096);
    assert_eq!(aggregates.total_count(), 1);
}
