//! On-disk heap snapshot schema.
//!
//! Mirrors the JSON layout written by V8's heap profiler
//! (`v8.writeHeapSnapshot()`, Chrome DevTools "Save profile").
//! Every section is optional here so a missing one can be reported by name
//! instead of surfacing as a generic deserialization error.

use serde::Deserialize;

/// Top-level `.heapsnapshot` document
#[derive(Debug, Deserialize)]
pub struct RawSnapshotFile {
    /// Header holding the field layouts
    pub snapshot: Option<RawSnapshotHeader>,

    /// Flat node table, `node_fields.len()` values per node
    pub nodes: Option<Vec<u64>>,

    /// Flat edge table, `edge_fields.len()` values per edge
    pub edges: Option<Vec<u64>>,

    /// String table referenced by index from nodes and edges
    pub strings: Option<Vec<String>>,
}

/// `snapshot` section
#[derive(Debug, Deserialize)]
pub struct RawSnapshotHeader {
    pub meta: Option<RawSnapshotMeta>,

    /// Node count as claimed by the writer (informational)
    #[serde(default)]
    pub node_count: Option<u64>,

    /// Edge count as claimed by the writer (informational)
    #[serde(default)]
    pub edge_count: Option<u64>,
}

/// `snapshot.meta` section
///
/// `node_types`/`edge_types` are positional: entry `i` describes field `i`.
/// An enum-valued field carries an array of its variant names, any other
/// field a plain type string such as `"string"` or `"number"`.
#[derive(Debug, Deserialize)]
pub struct RawSnapshotMeta {
    pub node_fields: Option<Vec<String>>,

    #[serde(default)]
    pub node_types: Vec<serde_json::Value>,

    pub edge_fields: Option<Vec<String>>,

    #[serde(default)]
    pub edge_types: Vec<serde_json::Value>,
}
