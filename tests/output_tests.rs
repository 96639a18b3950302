use heapdiff::aggregator::{TypeAggregate, TypeAggregates};
use heapdiff::diff::{
    compare_aggregates, render_terminal_report, summarize_aggregates, AnalysisResult,
    CaptureContext,
};
use heapdiff::output::{read_result, write_result};
use heapdiff::utils::config::{AnalysisConfig, SCHEMA_VERSION};
use heapdiff::utils::error::OutputError;
use pretty_assertions::assert_eq;

fn sample_result(threshold: u64) -> AnalysisResult {
    let before: TypeAggregates = vec![
        TypeAggregate::new("Array", 100, 100_000),
        TypeAggregate::new("Object", 50, 5000),
    ]
    .into_iter()
    .collect();
    let after: TypeAggregates = vec![
        TypeAggregate::new("Array", 2000, 10_000_000),
        TypeAggregate::new("Object", 50, 5000),
    ]
    .into_iter()
    .collect();

    compare_aggregates(
        summarize_aggregates("before.heapsnapshot", &before),
        &before,
        summarize_aggregates("after.heapsnapshot", &after),
        &after,
        &AnalysisConfig::default().with_threshold(threshold),
        CaptureContext {
            container_id: Some("checkout-5d8".to_string()),
            image_id: None,
            delay_secs: Some(600),
        },
    )
    .unwrap()
}

#[test]
fn test_result_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports/heap.json");
    let result = sample_result(1024 * 1024);

    write_result(&result, &path).unwrap();
    assert_eq!(read_result(&path).unwrap(), result);
}

#[test]
fn test_result_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("heap.json");
    write_result(&sample_result(1024 * 1024), &path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(value["metadata"]["schema_version"], SCHEMA_VERSION);
    assert_eq!(value["metadata"]["container_id"], "checkout-5d8");
    assert_eq!(value["metadata"]["delay_secs"], 600);
    assert!(value["metadata"].get("image_id").is_none());
    assert_eq!(value["offenders"][0]["type_name"], "Array");
    assert_eq!(value["offenders"][0]["severity"], "critical");
    assert_eq!(value["summary"]["suspicious_growth"], true);
}

#[test]
fn test_write_to_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = write_result(&sample_result(0), dir.path()).unwrap_err();
    assert!(matches!(err, OutputError::InvalidPath(_)));
}

#[test]
fn test_read_garbage_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{\"before\": 1}").unwrap();

    let err = read_result(&path).unwrap_err();
    assert!(matches!(err, OutputError::SerializationFailed(_)));
}

#[test]
fn test_terminal_report_below_threshold() {
    colored::control::set_override(false);
    let rendered = render_terminal_report(&sample_result(100 * 1024 * 1024));

    assert!(rendered.contains("Container: checkout-5d8"));
    assert!(rendered.contains("Interval:  600s"));
    assert!(rendered.contains("GROWTH BELOW THRESHOLD"));
}
