//! Per-type aggregation of a single heap snapshot.
//!
//! One pass over the node table: every node lands in the bucket of its
//! type name, adding one to the count and its `self_size` to the size.
//! Edges are never followed, so "retained size" here means the sum of
//! self sizes of all instances of a type.

use crate::parser::HeapSnapshot;
use crate::utils::config::{AnalysisConfig, TypeNaming, FALLBACK_TYPE_NAME, WHOLE_FILE_TYPE_NAME};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregate of all instances of one type in one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAggregate {
    /// Constructor/type name used as the bucket key
    pub type_name: String,

    /// Number of instances
    pub count: u64,

    /// Sum of instance self sizes in bytes
    pub total_size: u64,

    /// A few instance ids for diagnostics
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sample_ids: Vec<u64>,
}

impl TypeAggregate {
    pub fn new(type_name: impl Into<String>, count: u64, total_size: u64) -> Self {
        Self {
            type_name: type_name.into(),
            count,
            total_size,
            sample_ids: Vec::new(),
        }
    }
}

/// Type name → aggregate mapping for one snapshot
///
/// Iteration follows the order in which each type was first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeAggregates {
    entries: Vec<TypeAggregate>,
    index: HashMap<String, usize>,
}

impl TypeAggregates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one instance to the bucket for `type_name`
    pub fn record(&mut self, type_name: &str, self_size: u64, id: Option<u64>, max_samples: usize) {
        let slot = match self.index.get(type_name) {
            Some(&slot) => slot,
            None => {
                self.entries.push(TypeAggregate::new(type_name, 0, 0));
                self.index.insert(type_name.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[slot];
        entry.count += 1;
        entry.total_size = entry.total_size.saturating_add(self_size);
        if let Some(id) = id {
            if entry.sample_ids.len() < max_samples {
                entry.sample_ids.push(id);
            }
        }
    }

    /// Insert a whole aggregate, merging with an existing bucket of the same name
    pub fn insert(&mut self, aggregate: TypeAggregate) {
        match self.index.get(&aggregate.type_name) {
            Some(&slot) => {
                let entry = &mut self.entries[slot];
                entry.count += aggregate.count;
                entry.total_size = entry.total_size.saturating_add(aggregate.total_size);
                entry.sample_ids.extend(aggregate.sample_ids);
            }
            None => {
                self.index
                    .insert(aggregate.type_name.clone(), self.entries.len());
                self.entries.push(aggregate);
            }
        }
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeAggregate> {
        self.index.get(type_name).map(|&slot| &self.entries[slot])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeAggregate> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of sizes over all types
    pub fn total_size(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| e.total_size)
            .fold(0, u64::saturating_add)
    }

    /// Sum of instance counts over all types
    pub fn total_count(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| e.count)
            .fold(0, u64::saturating_add)
    }

    /// The `n` largest types by size, ties by name
    pub fn top_by_size(&self, n: usize) -> Vec<&TypeAggregate> {
        let mut sorted: Vec<&TypeAggregate> = self.entries.iter().collect();
        sorted.sort_by(|a, b| {
            b.total_size
                .cmp(&a.total_size)
                .then_with(|| a.type_name.cmp(&b.type_name))
        });
        sorted.truncate(n);
        sorted
    }
}

impl FromIterator<TypeAggregate> for TypeAggregates {
    fn from_iter<I: IntoIterator<Item = TypeAggregate>>(iter: I) -> Self {
        let mut aggregates = TypeAggregates::new();
        for aggregate in iter {
            aggregates.insert(aggregate);
        }
        aggregates
    }
}

impl<'a> IntoIterator for &'a TypeAggregates {
    type Item = &'a TypeAggregate;
    type IntoIter = std::slice::Iter<'a, TypeAggregate>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Aggregate a loaded snapshot by type name
///
/// **Public** - main entry point for the aggregator
///
/// Pure: the same snapshot and config always give the same mapping.
pub fn aggregate_by_type(snapshot: &HeapSnapshot, config: &AnalysisConfig) -> TypeAggregates {
    let layout = snapshot.node_layout();
    let mut aggregates = TypeAggregates::new();

    for row in snapshot.node_rows() {
        let type_name = resolve_type_name(snapshot, row, config.naming);
        let id = layout.id_idx.map(|idx| row[idx]);
        aggregates.record(type_name, row[layout.self_size_idx], id, config.max_sample_ids);
    }

    debug!(
        "Aggregated {} nodes into {} types ({} bytes)",
        snapshot.node_count(),
        aggregates.len(),
        aggregates.total_size()
    );

    aggregates
}

/// Bucket name for the node in `row`
///
/// Falls back to `"object"` when the name is empty or its string index is
/// out of range.
pub fn resolve_type_name<'a>(
    snapshot: &'a HeapSnapshot,
    row: &[u64],
    naming: TypeNaming,
) -> &'a str {
    if naming == TypeNaming::Constructor {
        if let Some(kind) = snapshot.node_kind(row) {
            if !kind.is_object_like() {
                return kind.bucket_label();
            }
        }
    }

    match snapshot.string(row[snapshot.node_layout().name_idx]) {
        Some(name) if !name.is_empty() => name,
        _ => FALLBACK_TYPE_NAME,
    }
}

/// Single synthetic bucket holding a whole file's byte size
///
/// Feeds the differ in `AnalysisMode::FileSize`.
pub fn whole_file_aggregate(file_size: u64) -> TypeAggregates {
    std::iter::once(TypeAggregate::new(WHOLE_FILE_TYPE_NAME, 1, file_size)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_snapshot;

    fn snapshot_json(nodes: &str, strings: &str) -> String {
        format!(
            r#"{{
                "snapshot": {{
                    "meta": {{
                        "node_fields": ["type", "name", "id", "self_size", "edge_count"],
                        "node_types": [["hidden", "object", "string", "closure"], "string", "number", "number", "number"],
                        "edge_fields": ["type", "name_or_index", "to_node"],
                        "edge_types": [["property"], "string_or_number", "node"]
                    }}
                }},
                "nodes": [{}],
                "edges": [],
                "strings": [{}]
            }}"#,
            nodes, strings
        )
    }

    #[test]
    fn test_aggregate_counts_and_sizes() {
        let json = snapshot_json(
            "1,1,1,100,0, 1,1,3,50,0, 1,2,5,10,0",
            r#""", "Array", "Map""#,
        );
        let snapshot = parse_snapshot(&json).unwrap();
        let aggregates = aggregate_by_type(&snapshot, &AnalysisConfig::default());

        let array = aggregates.get("Array").unwrap();
        assert_eq!(array.count, 2);
        assert_eq!(array.total_size, 150);
        assert_eq!(array.sample_ids, vec![1, 3]);
        assert_eq!(aggregates.get("Map").unwrap().total_size, 10);
        assert_eq!(aggregates.total_size(), 160);
    }

    #[test]
    fn test_empty_and_unresolved_names_fall_back() {
        let json = snapshot_json("1,0,1,8,0, 1,42,2,4,0", r#""", "Array""#);
        let snapshot = parse_snapshot(&json).unwrap();
        let aggregates = aggregate_by_type(&snapshot, &AnalysisConfig::default());

        assert_eq!(aggregates.len(), 1);
        let fallback = aggregates.get(FALLBACK_TYPE_NAME).unwrap();
        assert_eq!(fallback.count, 2);
        assert_eq!(fallback.total_size, 12);
    }

    #[test]
    fn test_insertion_order_is_first_occurrence() {
        let json = snapshot_json(
            "1,2,1,1,0, 1,1,2,1,0, 1,2,3,1,0",
            r#""", "Array", "Map""#,
        );
        let snapshot = parse_snapshot(&json).unwrap();
        let aggregates = aggregate_by_type(&snapshot, &AnalysisConfig::default());

        let names: Vec<&str> = aggregates.iter().map(|a| a.type_name.as_str()).collect();
        assert_eq!(names, vec!["Map", "Array"]);
    }

    #[test]
    fn test_constructor_naming_buckets_strings() {
        let json = snapshot_json(
            "2,1,1,20,0, 2,2,3,30,0, 1,3,5,40,0",
            r#""", "hello", "world", "Session""#,
        );
        let snapshot = parse_snapshot(&json).unwrap();
        let config = AnalysisConfig::default().with_naming(TypeNaming::Constructor);
        let aggregates = aggregate_by_type(&snapshot, &config);

        assert_eq!(aggregates.get("(string)").unwrap().total_size, 50);
        assert_eq!(aggregates.get("Session").unwrap().count, 1);
        assert!(aggregates.get("hello").is_none());
    }

    #[test]
    fn test_totals_saturate() {
        let json = snapshot_json(
            "1,1,1,18446744073709551615,0, 1,2,2,18446744073709551615,0",
            r#""", "Array", "Map""#,
        );
        let snapshot = parse_snapshot(&json).unwrap();
        let aggregates = aggregate_by_type(&snapshot, &AnalysisConfig::default());

        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates.total_size(), u64::MAX);
        assert_eq!(aggregates.total_count(), 2);

        let counts: TypeAggregates = vec![
            TypeAggregate::new("Array", u64::MAX, 1),
            TypeAggregate::new("Map", u64::MAX, 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(counts.total_count(), u64::MAX);
    }

    #[test]
    fn test_sample_ids_are_bounded() {
        let nodes: Vec<String> = (0..10).map(|i| format!("1,1,{},1,0", i)).collect();
        let json = snapshot_json(&nodes.join(","), r#""", "Array""#);
        let snapshot = parse_snapshot(&json).unwrap();
        let config = AnalysisConfig {
            max_sample_ids: 3,
            ..AnalysisConfig::default()
        };

        let aggregates = aggregate_by_type(&snapshot, &config);
        let array = aggregates.get("Array").unwrap();
        assert_eq!(array.count, 10);
        assert_eq!(array.sample_ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_top_by_size() {
        let aggregates: TypeAggregates = vec![
            TypeAggregate::new("B", 1, 10),
            TypeAggregate::new("A", 1, 10),
            TypeAggregate::new("C", 1, 99),
        ]
        .into_iter()
        .collect();

        let top: Vec<&str> = aggregates
            .top_by_size(2)
            .iter()
            .map(|a| a.type_name.as_str())
            .collect();
        assert_eq!(top, vec!["C", "A"]);
    }

    #[test]
    fn test_whole_file_aggregate() {
        let aggregates = whole_file_aggregate(4096);
        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates.get(WHOLE_FILE_TYPE_NAME).unwrap().total_size, 4096);
    }
}
