//! Heap snapshot loading.
//!
//! This module handles:
//! - Reading `.heapsnapshot` JSON from disk
//! - Checking that the required tables are present and well-sized
//! - Exposing node/edge rows and the string table to the aggregator

pub mod heap_snapshot;
pub mod node_kind;
pub mod schema;

// Re-export main types
pub use heap_snapshot::{
    load_snapshot, parse_snapshot, EdgeLayout, HeapSnapshot, NodeLayout, SnapshotSource,
    SnapshotStats,
};
pub use node_kind::NodeKind;
