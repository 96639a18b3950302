//! Core analysis engine implementation.
//! Runs load → aggregate → diff → classify → assemble for a snapshot pair.

use crate::aggregator::{
    aggregate_by_type, collect_retainer_hints, whole_file_aggregate, TypeAggregates,
};
use crate::parser::{load_snapshot, HeapSnapshot, SnapshotSource};
use crate::utils::config::{AnalysisConfig, AnalysisMode, BYTES_PER_MB, SCHEMA_VERSION};
use crate::utils::error::{AnalysisError, SnapshotError};
use chrono::Utc;
use log::{debug, info};
use std::path::Path;

use super::classifier::{classify, Classification};
use super::normalizer::{diff_types, signed_difference};
use super::recommendations::generate_recommendations;
use super::schema::{
    AnalysisMetadata, AnalysisResult, CaptureContext, LeakSummary, SnapshotSummary,
};

/// One side of the comparison after loading and aggregation
struct LoadedSide {
    snapshot: HeapSnapshot,
    summary: SnapshotSummary,
    aggregates: TypeAggregates,
}

/// Analyze two snapshot files on disk
///
/// **Public** - main entry point for callers
///
/// Both sides are loaded and aggregated concurrently; the diff starts once
/// both are done. Either side failing fails the whole call.
///
/// # Errors
/// * `AnalysisError::Snapshot` - Either file is unreadable or malformed
/// * `AnalysisError::InconsistentAnalysis` - Internal invariant broken during assembly
///
/// # Example
/// ```ignore
/// let config = AnalysisConfig::default().with_threshold(1024 * 1024);
/// let result = analyze_snapshot_files("before.heapsnapshot", "after.heapsnapshot",
///                                     &config, CaptureContext::default())?;
/// ```
pub fn analyze_snapshot_files(
    before_path: impl AsRef<Path>,
    after_path: impl AsRef<Path>,
    config: &AnalysisConfig,
    context: CaptureContext,
) -> Result<AnalysisResult, AnalysisError> {
    let before_path = before_path.as_ref();
    let after_path = after_path.as_ref();

    match config.mode {
        AnalysisMode::PerType => {
            info!(
                "Loading snapshots: {} and {}",
                before_path.display(),
                after_path.display()
            );
            let (before, after) = rayon::join(
                || load_side(before_path, config),
                || load_side(after_path, config),
            );
            let before = before?;
            let after = after?;

            compare_sides(
                before.summary,
                &before.aggregates,
                after.summary,
                &after.aggregates,
                Some(&after.snapshot),
                config,
                context,
            )
        }
        AnalysisMode::FileSize => {
            info!(
                "Comparing file sizes: {} and {}",
                before_path.display(),
                after_path.display()
            );
            let before = SnapshotSource::from_path(before_path)?;
            let after = SnapshotSource::from_path(after_path)?;
            let before_aggregates = whole_file_aggregate(before.file_size);
            let after_aggregates = whole_file_aggregate(after.file_size);

            compare_sides(
                file_size_summary(before),
                &before_aggregates,
                file_size_summary(after),
                &after_aggregates,
                None,
                config,
                context,
            )
        }
    }
}

/// Analyze two snapshots that are already in memory
///
/// Same pipeline as [`analyze_snapshot_files`] minus the file reads;
/// retainer hints come from `after`.
pub fn analyze_snapshots(
    before: &HeapSnapshot,
    before_source: SnapshotSource,
    after: &HeapSnapshot,
    after_source: SnapshotSource,
    config: &AnalysisConfig,
    context: CaptureContext,
) -> Result<AnalysisResult, AnalysisError> {
    let before_aggregates = aggregate_by_type(before, config);
    let after_aggregates = aggregate_by_type(after, config);

    compare_sides(
        snapshot_summary(before_source, before, &before_aggregates),
        &before_aggregates,
        snapshot_summary(after_source, after, &after_aggregates),
        &after_aggregates,
        Some(after),
        config,
        context,
    )
}

/// Compare two type tables without any snapshot behind them
///
/// No retainer hints are produced.
pub fn compare_aggregates(
    before_summary: SnapshotSummary,
    before: &TypeAggregates,
    after_summary: SnapshotSummary,
    after: &TypeAggregates,
    config: &AnalysisConfig,
    context: CaptureContext,
) -> Result<AnalysisResult, AnalysisError> {
    compare_sides(
        before_summary,
        before,
        after_summary,
        after,
        None,
        config,
        context,
    )
}

/// Summary of a type table when no file backs it
pub fn summarize_aggregates(filename: &str, aggregates: &TypeAggregates) -> SnapshotSummary {
    SnapshotSummary {
        filename: filename.to_string(),
        total_size: aggregates.total_size(),
        file_size: 0,
        node_count: aggregates.total_count(),
        edge_count: 0,
        timestamp: None,
    }
}

/// Package the pipeline's outputs into the final result
///
/// **Public** - pure; exposed so the consistency checks can be exercised
///
/// # Errors
/// * `AnalysisError::InconsistentAnalysis` - The offender list does not
///   agree with the summaries (heap grew but nothing offends, a
///   non-growing offender, wrong order, or a growth total that does not
///   match the summaries)
pub fn assemble_result(
    before: SnapshotSummary,
    after: SnapshotSummary,
    classification: Classification,
    recommendations: Vec<String>,
    config: &AnalysisConfig,
    context: CaptureContext,
) -> Result<AnalysisResult, AnalysisError> {
    let total_growth_bytes = signed_difference(after.total_size, before.total_size);
    check_consistency(total_growth_bytes, &classification)?;

    let Classification {
        offenders,
        suspicious_growth,
        likely_leak_source,
        confidence,
        ..
    } = classification;

    Ok(AnalysisResult {
        before,
        after,
        offenders,
        summary: LeakSummary {
            total_growth_mb: total_growth_bytes as f64 / BYTES_PER_MB,
            suspicious_growth,
            likely_leak_source,
            confidence,
            recommendations,
        },
        metadata: AnalysisMetadata {
            schema_version: SCHEMA_VERSION.to_string(),
            analyzed_at: Utc::now(),
            mode: config.mode,
            threshold_bytes: config.threshold_bytes,
            capture: context,
        },
    })
}

/// Load, stat and aggregate one snapshot file
///
/// **Private** - runs on a rayon worker
fn load_side(path: &Path, config: &AnalysisConfig) -> Result<LoadedSide, SnapshotError> {
    let source = SnapshotSource::from_path(path)?;
    let snapshot = load_snapshot(path)?;
    let aggregates = aggregate_by_type(&snapshot, config);
    let summary = snapshot_summary(source, &snapshot, &aggregates);

    Ok(LoadedSide {
        snapshot,
        summary,
        aggregates,
    })
}

/// Diff, classify, attach hints, recommend, assemble
///
/// **Private** - shared tail of every entry point
fn compare_sides(
    before_summary: SnapshotSummary,
    before: &TypeAggregates,
    after_summary: SnapshotSummary,
    after: &TypeAggregates,
    hint_source: Option<&HeapSnapshot>,
    config: &AnalysisConfig,
    context: CaptureContext,
) -> Result<AnalysisResult, AnalysisError> {
    let deltas = diff_types(before, after);
    debug!("Computed {} type deltas", deltas.len());

    let mut classification = classify(
        deltas,
        before_summary.total_size,
        after_summary.total_size,
        config,
    );

    if let Some(snapshot) = hint_source {
        attach_retainer_hints(&mut classification, snapshot, config);
    }

    let recommendations =
        generate_recommendations(&classification.offenders, classification.suspicious_growth);

    let result = assemble_result(
        before_summary,
        after_summary,
        classification,
        recommendations,
        config,
        context,
    )?;

    info!(
        "Analysis complete: {:+.2} MB, {} offenders, suspicious={}",
        result.summary.total_growth_mb,
        result.offenders.len(),
        result.summary.suspicious_growth
    );

    Ok(result)
}

fn attach_retainer_hints(
    classification: &mut Classification,
    snapshot: &HeapSnapshot,
    config: &AnalysisConfig,
) {
    let names: Vec<&str> = classification
        .offenders
        .iter()
        .map(|o| o.type_name.as_str())
        .collect();
    let mut hints = collect_retainer_hints(snapshot, &names, config);

    for offender in &mut classification.offenders {
        if let Some(found) = hints.remove(&offender.type_name) {
            offender.retainer_hints = found;
        }
    }
}

fn check_consistency(
    total_growth_bytes: i64,
    classification: &Classification,
) -> Result<(), AnalysisError> {
    if total_growth_bytes != classification.total_growth_bytes {
        return Err(AnalysisError::InconsistentAnalysis(format!(
            "classified growth {} bytes does not match summary growth {} bytes",
            classification.total_growth_bytes, total_growth_bytes
        )));
    }

    if total_growth_bytes > 0 && classification.offenders.is_empty() {
        return Err(AnalysisError::InconsistentAnalysis(format!(
            "heap grew by {} bytes but no type was reported as growing",
            total_growth_bytes
        )));
    }

    if let Some(bad) = classification
        .offenders
        .iter()
        .find(|o| o.delta_size <= 0 || o.severity.is_none())
    {
        return Err(AnalysisError::InconsistentAnalysis(format!(
            "offender '{}' has delta {} and severity {:?}",
            bad.type_name, bad.delta_size, bad.severity
        )));
    }

    let ordered = classification.offenders.windows(2).all(|pair| {
        pair[0].delta_size > pair[1].delta_size
            || (pair[0].delta_size == pair[1].delta_size && pair[0].type_name <= pair[1].type_name)
    });
    if !ordered {
        return Err(AnalysisError::InconsistentAnalysis(
            "offenders are not sorted by growth".to_string(),
        ));
    }

    Ok(())
}

fn snapshot_summary(
    source: SnapshotSource,
    snapshot: &HeapSnapshot,
    aggregates: &TypeAggregates,
) -> SnapshotSummary {
    SnapshotSummary {
        filename: source.filename,
        total_size: aggregates.total_size(),
        file_size: source.file_size,
        node_count: snapshot.node_count() as u64,
        edge_count: snapshot.edge_count() as u64,
        timestamp: source.timestamp,
    }
}

fn file_size_summary(source: SnapshotSource) -> SnapshotSummary {
    SnapshotSummary {
        filename: source.filename,
        total_size: source.file_size,
        file_size: source.file_size,
        node_count: 0,
        edge_count: 0,
        timestamp: source.timestamp,
    }
}
