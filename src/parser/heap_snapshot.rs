//! Heap snapshot loader.
//!
//! Reads a `.heapsnapshot` file into typed node/edge tables plus the string
//! table. The only semantic checks are the ones the aggregator depends on:
//! table lengths must be whole multiples of their field layouts, and the
//! node layout must carry `name` and `self_size`.

use super::node_kind::NodeKind;
use super::schema::{RawSnapshotFile, RawSnapshotMeta};
use crate::utils::config::{
    EDGE_NAME_FIELD, EDGE_TO_NODE_FIELD, EDGE_TYPE_FIELD, NODE_EDGE_COUNT_FIELD, NODE_ID_FIELD,
    NODE_NAME_FIELD, NODE_SELF_SIZE_FIELD, NODE_TYPE_FIELD,
};
use crate::utils::error::SnapshotError;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;
use std::path::Path;

/// Column offsets of the node fields the engine reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLayout {
    pub stride: usize,
    pub type_idx: Option<usize>,
    pub name_idx: usize,
    pub id_idx: Option<usize>,
    pub self_size_idx: usize,
    pub edge_count_idx: Option<usize>,
}

/// Column offsets of the edge fields the engine reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLayout {
    pub stride: usize,
    pub type_idx: Option<usize>,
    pub name_idx: Option<usize>,
    pub to_node_idx: Option<usize>,
}

/// A loaded heap snapshot
///
/// The tables are kept exactly as read from disk.
#[derive(Debug, Clone)]
pub struct HeapSnapshot {
    pub node_fields: Vec<String>,
    /// Variant names of the node `type` field
    pub node_types: Vec<String>,
    pub edge_fields: Vec<String>,
    /// Variant names of the edge `type` field
    pub edge_types: Vec<String>,
    pub nodes: Vec<u64>,
    pub edges: Vec<u64>,
    pub strings: Vec<String>,
    node_layout: NodeLayout,
    edge_layout: EdgeLayout,
}

/// Table sizes of a loaded snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapshotStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub string_count: usize,
    pub total_self_size: u64,
}

/// File-level facts about a snapshot artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSource {
    /// File name without directories
    pub filename: String,
    /// Size of the file on disk
    pub file_size: u64,
    /// Last modification time, used as the capture timestamp
    pub timestamp: Option<DateTime<Utc>>,
}

impl SnapshotSource {
    /// Stat a snapshot file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        let timestamp = metadata.modified().ok().map(DateTime::<Utc>::from);

        Ok(Self {
            filename: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            file_size: metadata.len(),
            timestamp,
        })
    }
}

/// Load a heap snapshot from disk
///
/// **Public** - main entry point for the loader
///
/// # Errors
/// * `SnapshotError::Io` - File cannot be read
/// * `SnapshotError::InvalidFormat` - Not JSON, or a section has the wrong shape
/// * `SnapshotError::MissingSection` - A required table is absent
/// * `SnapshotError::CorruptData` - A table length does not match its layout
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<HeapSnapshot, SnapshotError> {
    let path = path.as_ref();
    debug!("Loading heap snapshot: {}", path.display());

    let bytes = std::fs::read(path)?;
    let raw: RawSnapshotFile = serde_json::from_slice(&bytes)?;
    let snapshot = from_raw(raw)?;

    debug!(
        "Loaded {} nodes, {} edges, {} strings from {}",
        snapshot.node_count(),
        snapshot.edge_count(),
        snapshot.strings.len(),
        path.display()
    );

    Ok(snapshot)
}

/// Parse a heap snapshot from an in-memory JSON string
///
/// **Public** - same contract as [`load_snapshot`] without the file read
pub fn parse_snapshot(json: &str) -> Result<HeapSnapshot, SnapshotError> {
    let raw: RawSnapshotFile = serde_json::from_str(json)?;
    from_raw(raw)
}

/// Validate the raw document and build the typed view
///
/// **Private** - shared by load_snapshot and parse_snapshot
fn from_raw(raw: RawSnapshotFile) -> Result<HeapSnapshot, SnapshotError> {
    let header = raw.snapshot.ok_or(SnapshotError::MissingSection("snapshot"))?;
    let meta = header
        .meta
        .ok_or(SnapshotError::MissingSection("snapshot.meta"))?;

    let RawSnapshotMeta {
        node_fields,
        node_types,
        edge_fields,
        edge_types,
    } = meta;

    let node_fields = node_fields.ok_or(SnapshotError::MissingSection("snapshot.meta.node_fields"))?;
    let edge_fields = edge_fields.ok_or(SnapshotError::MissingSection("snapshot.meta.edge_fields"))?;
    let nodes = raw.nodes.ok_or(SnapshotError::MissingSection("nodes"))?;
    let edges = raw.edges.ok_or(SnapshotError::MissingSection("edges"))?;
    let strings = raw.strings.ok_or(SnapshotError::MissingSection("strings"))?;

    check_divisible("nodes", nodes.len(), node_fields.len())?;
    check_divisible("edges", edges.len(), edge_fields.len())?;

    let node_layout = resolve_node_layout(&node_fields)?;
    let edge_layout = resolve_edge_layout(&edge_fields);

    let snapshot = HeapSnapshot {
        node_types: enum_variants(&node_types, node_layout.type_idx),
        edge_types: enum_variants(&edge_types, edge_layout.type_idx),
        node_fields,
        edge_fields,
        nodes,
        edges,
        strings,
        node_layout,
        edge_layout,
    };

    if let Some(claimed) = header.node_count {
        if claimed != snapshot.node_count() as u64 {
            warn!(
                "Snapshot header claims {} nodes but the node table holds {}",
                claimed,
                snapshot.node_count()
            );
        }
    }
    if let Some(claimed) = header.edge_count {
        if claimed != snapshot.edge_count() as u64 {
            warn!(
                "Snapshot header claims {} edges but the edge table holds {}",
                claimed,
                snapshot.edge_count()
            );
        }
    }

    Ok(snapshot)
}

fn check_divisible(table: &str, len: usize, field_count: usize) -> Result<(), SnapshotError> {
    if field_count == 0 {
        return Err(SnapshotError::CorruptData(format!(
            "{} field layout is empty",
            table
        )));
    }
    if len % field_count != 0 {
        return Err(SnapshotError::CorruptData(format!(
            "{} table has {} values, not a multiple of {} fields",
            table, len, field_count
        )));
    }
    Ok(())
}

fn field_index(fields: &[String], name: &str) -> Option<usize> {
    fields.iter().position(|field| field == name)
}

fn resolve_node_layout(fields: &[String]) -> Result<NodeLayout, SnapshotError> {
    let required = |name: &str| {
        field_index(fields, name).ok_or_else(|| {
            SnapshotError::CorruptData(format!("node field layout has no '{}' field", name))
        })
    };

    Ok(NodeLayout {
        stride: fields.len(),
        type_idx: field_index(fields, NODE_TYPE_FIELD),
        name_idx: required(NODE_NAME_FIELD)?,
        id_idx: field_index(fields, NODE_ID_FIELD),
        self_size_idx: required(NODE_SELF_SIZE_FIELD)?,
        edge_count_idx: field_index(fields, NODE_EDGE_COUNT_FIELD),
    })
}

fn resolve_edge_layout(fields: &[String]) -> EdgeLayout {
    EdgeLayout {
        stride: fields.len(),
        type_idx: field_index(fields, EDGE_TYPE_FIELD),
        name_idx: field_index(fields, EDGE_NAME_FIELD),
        to_node_idx: field_index(fields, EDGE_TO_NODE_FIELD),
    }
}

/// Pull the variant names of an enum-valued field out of `node_types`/`edge_types`
fn enum_variants(types: &[serde_json::Value], field_idx: Option<usize>) -> Vec<String> {
    field_idx
        .and_then(|idx| types.get(idx))
        .and_then(|value| value.as_array())
        .map(|variants| {
            variants
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

impl HeapSnapshot {
    pub fn node_layout(&self) -> &NodeLayout {
        &self.node_layout
    }

    pub fn edge_layout(&self) -> &EdgeLayout {
        &self.edge_layout
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len() / self.node_layout.stride
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len() / self.edge_layout.stride
    }

    /// Node rows, one slice of `node_fields.len()` values per node
    pub fn node_rows(&self) -> std::slice::ChunksExact<'_, u64> {
        self.nodes.chunks_exact(self.node_layout.stride)
    }

    /// Edge rows, one slice of `edge_fields.len()` values per edge
    pub fn edge_rows(&self) -> std::slice::ChunksExact<'_, u64> {
        self.edges.chunks_exact(self.edge_layout.stride)
    }

    /// Resolve a string table index
    pub fn string(&self, index: u64) -> Option<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.strings.get(i))
            .map(String::as_str)
    }

    /// Kind of the node in `row`, if the layout has a `type` field
    pub fn node_kind(&self, row: &[u64]) -> Option<NodeKind> {
        let idx = self.node_layout.type_idx?;
        let variant = usize::try_from(row[idx]).ok()?;
        self.node_types
            .get(variant)
            .map(|name| name.parse().unwrap_or(NodeKind::Other))
    }

    /// Name of the edge type in `row`, if the layout has a `type` field
    pub fn edge_type_name(&self, row: &[u64]) -> Option<&str> {
        let idx = self.edge_layout.type_idx?;
        let variant = usize::try_from(row[idx]).ok()?;
        self.edge_types.get(variant).map(String::as_str)
    }

    /// Table sizes and total self size
    pub fn stats(&self) -> SnapshotStats {
        let self_size_idx = self.node_layout.self_size_idx;
        SnapshotStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            string_count: self.strings.len(),
            total_self_size: self
                .node_rows()
                .map(|row| row[self_size_idx])
                .fold(0, u64::saturating_add),
        }
    }
}
