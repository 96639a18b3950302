use crate::aggregator::aggregate_by_type;
use crate::parser::{load_snapshot, SnapshotStats};
use crate::utils::config::{AnalysisConfig, BYTES_PER_MB, SCHEMA_VERSION};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Validate a heap snapshot and print its table sizes and largest types
pub fn validate_snapshot_file(file_path: PathBuf, top: usize) -> Result<SnapshotStats> {
    println!("Validating snapshot: {}", file_path.display());

    let snapshot = load_snapshot(&file_path)
        .with_context(|| format!("Invalid heap snapshot {}", file_path.display()))?;
    let stats = snapshot.stats();

    println!("✓ Valid heap snapshot");
    println!("  Nodes:   {}", stats.node_count);
    println!("  Edges:   {}", stats.edge_count);
    println!("  Strings: {}", stats.string_count);
    println!(
        "  Heap:    {:.2} MB",
        stats.total_self_size as f64 / BYTES_PER_MB
    );

    if top > 0 {
        let aggregates = aggregate_by_type(&snapshot, &AnalysisConfig::default());
        println!("  Largest types:");
        for aggregate in aggregates.top_by_size(top) {
            println!(
                "    {:<32} {:>10} objects {:>10.2} MB",
                aggregate.type_name,
                aggregate.count,
                aggregate.total_size as f64 / BYTES_PER_MB
            );
        }
    }

    Ok(stats)
}

/// Display result schema information
pub fn display_schema(show_details: bool) {
    println!("heapdiff Analysis Result Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  before / after: object    - Per-snapshot summary");
        println!("    filename: string        - Snapshot file name");
        println!("    total_size: number      - Sum of node self sizes (bytes)");
        println!("    file_size: number       - Snapshot file size (bytes)");
        println!("    node_count: number      - Number of nodes");
        println!("    edge_count: number      - Number of edges");
        println!("    timestamp: string?      - File modification time");
        println!("  offenders: array          - Growing types, largest first");
        println!("    type_name: string       - Constructor/type name");
        println!("    count_before/after      - Instance counts");
        println!("    size_before/after       - Bytes per side");
        println!("    delta_size: number      - Byte growth");
        println!("    delta_count: number     - Instance growth");
        println!("    growth_rate: number|\"infinite\" - delta / size_before");
        println!("    severity: string        - low | medium | high | critical");
        println!("    retainer_hints: array?  - Who references the new instances");
        println!("  summary: object           - Verdict");
        println!("    total_growth_mb: number");
        println!("    suspicious_growth: bool - Growth exceeded the threshold");
        println!("    likely_leak_source: string?");
        println!("    confidence: number      - 0.0 to 1.0");
        println!("    recommendations: array");
        println!("  metadata: object          - schema_version, analyzed_at, mode,");
        println!("                              threshold_bytes, container/image/delay");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("heapdiff v{}", env!("CARGO_PKG_VERSION"));
    println!("Result Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Compares two V8 heap snapshots and reports which types grew.");
}
