//! Shared fixture builder for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

/// Builds a V8 heap snapshot document node by node
#[derive(Default)]
pub struct SnapshotBuilder {
    strings: Vec<String>,
    index: HashMap<String, u64>,
    nodes: Vec<Vec<u64>>,
    edges: Vec<Vec<(u64, u64, usize)>>,
}

const NODE_FIELDS: usize = 7;
const OBJECT_TYPE: u64 = 3;
const STRING_TYPE: u64 = 2;
const PROPERTY_EDGE: u64 = 2;

impl SnapshotBuilder {
    pub fn new() -> Self {
        let mut builder = Self::default();
        builder.intern("");
        builder
    }

    fn intern(&mut self, s: &str) -> u64 {
        if let Some(&idx) = self.index.get(s) {
            return idx;
        }
        let idx = self.strings.len() as u64;
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), idx);
        idx
    }

    fn push_node(&mut self, kind: u64, name: &str, self_size: u64) -> usize {
        let name = self.intern(name);
        let id = (self.nodes.len() as u64 + 1) * 2 + 1;
        self.nodes.push(vec![kind, name, id, self_size, 0, 0, 0]);
        self.edges.push(Vec::new());
        self.nodes.len() - 1
    }

    /// Add an object node; returns its ordinal
    pub fn object(&mut self, name: &str, self_size: u64) -> usize {
        self.push_node(OBJECT_TYPE, name, self_size)
    }

    /// Add a string node; returns its ordinal
    pub fn string(&mut self, value: &str, self_size: u64) -> usize {
        self.push_node(STRING_TYPE, value, self_size)
    }

    /// Add `count` objects of one type, each `size` bytes
    pub fn objects(&mut self, name: &str, count: usize, size: u64) -> Vec<usize> {
        (0..count).map(|_| self.object(name, size)).collect()
    }

    /// Add a named property edge `from.name -> to`
    pub fn property(&mut self, from: usize, name: &str, to: usize) -> &mut Self {
        let name = self.intern(name);
        self.edges[from].push((PROPERTY_EDGE, name, to));
        self
    }

    pub fn build(&self) -> String {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        for (row, out) in self.nodes.iter().zip(&self.edges) {
            let mut row = row.clone();
            row[4] = out.len() as u64;
            nodes.extend(row);
            for (kind, name, to) in out {
                edges.extend([*kind, *name, (*to * NODE_FIELDS) as u64]);
            }
        }

        serde_json::json!({
            "snapshot": {
                "meta": {
                    "node_fields": ["type", "name", "id", "self_size", "edge_count",
                                    "trace_node_id", "detachedness"],
                    "node_types": [
                        ["hidden", "array", "string", "object", "code", "closure", "regexp",
                         "number", "native", "synthetic", "concatenated string",
                         "sliced string", "symbol", "bigint", "object shape"],
                        "string", "number", "number", "number", "number", "number"
                    ],
                    "edge_fields": ["type", "name_or_index", "to_node"],
                    "edge_types": [
                        ["context", "element", "property", "internal", "hidden", "shortcut", "weak"],
                        "string_or_number", "node"
                    ]
                },
                "node_count": self.nodes.len(),
                "edge_count": edges.len() / 3
            },
            "nodes": nodes,
            "edges": edges,
            "strings": self.strings,
        })
        .to_string()
    }

    /// Write the document to a temporary `.heapsnapshot` file
    pub fn write(&self) -> NamedTempFile {
        write_text(&self.build())
    }
}

pub fn write_text(text: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".heapsnapshot")
        .tempfile()
        .unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
