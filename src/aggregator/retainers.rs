//! Retainer hints for offending types.
//!
//! A single walk over the edge table of one snapshot. For every edge that
//! points at an instance of an offender type, the owner's type name and the
//! edge label are tallied. The most frequent pairs become short hints such
//! as `Map via 'cache' (120 refs)`. No path search is done.

use super::type_stats::resolve_type_name;
use crate::parser::HeapSnapshot;
use crate::utils::config::AnalysisConfig;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// Edge types that never keep their target alive
const IGNORED_EDGE_TYPES: &[&str] = &["weak", "shortcut"];

/// Label used for indexed (array element) edges
const ELEMENT_LABEL: &str = "[]";

/// Collect retainer hints for the given offender type names
///
/// **Public** - used by the engine after classification
///
/// # Returns
/// Offender type name → up to `config.retainer_hint_limit` hint strings,
/// most frequent first. Types with no incoming strong edges are absent.
/// Returns an empty map when the edge layout lacks `to_node` or the node
/// layout lacks `edge_count`.
pub fn collect_retainer_hints(
    snapshot: &HeapSnapshot,
    offender_types: &[&str],
    config: &AnalysisConfig,
) -> HashMap<String, Vec<String>> {
    if config.retainer_hint_limit == 0 || offender_types.is_empty() {
        return HashMap::new();
    }

    let node_layout = snapshot.node_layout();
    let edge_layout = snapshot.edge_layout();
    let (Some(edge_count_idx), Some(to_node_idx)) =
        (node_layout.edge_count_idx, edge_layout.to_node_idx)
    else {
        debug!("Snapshot layout has no edge ownership data, skipping retainer hints");
        return HashMap::new();
    };

    let wanted: HashSet<&str> = offender_types.iter().copied().collect();
    let node_rows: Vec<&[u64]> = snapshot.node_rows().collect();
    let edge_rows: Vec<&[u64]> = snapshot.edge_rows().collect();

    // offender -> (owner type, edge label) -> reference count
    let mut tallies: HashMap<&str, HashMap<(&str, String), u64>> = HashMap::new();
    let mut cursor = 0usize;

    for owner_row in &node_rows {
        let edge_count = usize::try_from(owner_row[edge_count_idx]).unwrap_or(usize::MAX);
        let end = cursor.saturating_add(edge_count);
        if end > edge_rows.len() {
            warn!(
                "Node edge counts exceed the edge table ({} > {}), retainer hints truncated",
                end,
                edge_rows.len()
            );
            break;
        }

        for edge_row in &edge_rows[cursor..end] {
            let edge_type = snapshot.edge_type_name(edge_row);
            if edge_type.is_some_and(|t| IGNORED_EDGE_TYPES.contains(&t)) {
                continue;
            }

            let Some(target_row) = target_node(&node_rows, edge_row[to_node_idx], node_layout.stride)
            else {
                continue;
            };

            let target_type = resolve_type_name(snapshot, target_row, config.naming);
            if !wanted.contains(target_type) {
                continue;
            }

            let owner_type = resolve_type_name(snapshot, owner_row, config.naming);
            let label = edge_label(snapshot, edge_row, edge_type);
            *tallies
                .entry(target_type)
                .or_default()
                .entry((owner_type, label))
                .or_insert(0) += 1;
        }

        cursor = end;
    }

    tallies
        .into_iter()
        .map(|(offender, counts)| {
            (
                offender.to_string(),
                format_hints(counts, config.retainer_hint_limit),
            )
        })
        .collect()
}

/// Node row referenced by a `to_node` value (an offset into the node table)
fn target_node<'a>(node_rows: &[&'a [u64]], to_node: u64, stride: usize) -> Option<&'a [u64]> {
    let offset = usize::try_from(to_node).ok()?;
    if offset % stride != 0 {
        return None;
    }
    node_rows.get(offset / stride).copied()
}

fn edge_label(snapshot: &HeapSnapshot, edge_row: &[u64], edge_type: Option<&str>) -> String {
    let Some(name_idx) = snapshot.edge_layout().name_idx else {
        return String::new();
    };

    match edge_type {
        Some("element") => ELEMENT_LABEL.to_string(),
        Some("hidden") => "(hidden)".to_string(),
        _ => snapshot
            .string(edge_row[name_idx])
            .unwrap_or_default()
            .to_string(),
    }
}

fn format_hints(counts: HashMap<(&str, String), u64>, limit: usize) -> Vec<String> {
    let mut ranked: Vec<((&str, String), u64)> = counts.into_iter().collect();
    ranked.sort_by(|((a_owner, a_label), a_refs), ((b_owner, b_label), b_refs)| {
        b_refs
            .cmp(a_refs)
            .then_with(|| a_owner.cmp(b_owner))
            .then_with(|| a_label.cmp(b_label))
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|((owner, label), refs)| {
            let noun = if refs == 1 { "ref" } else { "refs" };
            if label.is_empty() {
                format!("{} ({} {})", owner, refs, noun)
            } else {
                format!("{} via '{}' ({} {})", owner, label, refs, noun)
            }
        })
        .collect()
}
