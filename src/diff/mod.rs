//! Snapshot comparison, classification and verdict.
//!
//! Compares the type tables of a before and an after heap snapshot and
//! produces a ranked list of growing types with an overall leak verdict.
//!
//! # Example
//! ```ignore
//! use heapdiff::diff::{analyze_snapshot_files, render_terminal_report, CaptureContext};
//! use heapdiff::utils::AnalysisConfig;
//!
//! let config = AnalysisConfig::default();
//! let result = analyze_snapshot_files("before.heapsnapshot", "after.heapsnapshot",
//!                                     &config, CaptureContext::default())?;
//! println!("{}", render_terminal_report(&result));
//! ```

mod classifier;
mod engine;
mod normalizer;
mod output;
mod recommendations;
mod schema;

// Public API exports
pub use classifier::{
    classify, classify_severity, confidence_score, is_suspicious, rank_offenders,
    severity_by_growth, severity_by_size, Classification,
};
pub use engine::{
    analyze_snapshot_files, analyze_snapshots, assemble_result, compare_aggregates,
    summarize_aggregates,
};
pub use normalizer::{calculate_type_delta, diff_types, growth_rate};
pub use output::render_terminal_report;
pub use recommendations::generate_recommendations;
pub use schema::{
    AnalysisMetadata, AnalysisResult, CaptureContext, GrowthRate, LeakSummary, Severity,
    SnapshotSummary, TypeDelta,
};
