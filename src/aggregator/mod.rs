//! Aggregation of heap snapshot nodes into per-type totals.
//!
//! This module transforms a loaded snapshot into:
//! - Per-type instance counts and self-size totals
//! - Retainer hints for types that grew (edge pass, offenders only)

pub mod retainers;
pub mod type_stats;

// Re-export main types and functions
pub use retainers::collect_retainer_hints;
pub use type_stats::{
    aggregate_by_type, resolve_type_name, whole_file_aggregate, TypeAggregate, TypeAggregates,
};
