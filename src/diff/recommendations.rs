//! Advisory text picked from fixed templates by offender pattern.

use super::schema::{Severity, TypeDelta};
use crate::utils::config::WHOLE_FILE_TYPE_NAME;

/// Offenders considered when matching type patterns
const MAX_MATCHED_OFFENDERS: usize = 5;

/// Fixed advice for a type name, if it matches a known pattern
fn advice_for(type_name: &str) -> Option<&'static str> {
    let advice = match type_name {
        "Buffer" | "ArrayBuffer" | "Uint8Array" | "(native)" => {
            "Buffers are being retained; make sure streams are consumed and pooled buffers are released."
        }
        "Array" | "(array)" => {
            "Check for arrays that are appended to but never trimmed (request logs, queues, history buffers)."
        }
        "Map" | "Set" | "WeakMap" | "Object" | "(object)" => {
            "Look for in-memory caches or lookup tables without eviction; bound them with an LRU or TTL."
        }
        "(closure)" | "Function" | "(compiled code)" => {
            "Growing closures usually mean listeners or callbacks that are registered but never removed."
        }
        "Promise" | "PromiseReaction" => {
            "Pending promises are accumulating; check for requests or timers that never settle."
        }
        "Timeout" | "Timer" | "Immediate" | "TimersList" => {
            "Clear intervals and timeouts when their owner is disposed (`clearInterval`/`clearTimeout`)."
        }
        "(string)" | "String" => {
            "Strings are piling up; look for unbounded string concatenation or caching of request bodies."
        }
        WHOLE_FILE_TYPE_NAME => {
            "Only whole-file sizes were compared; rerun in per-type mode to see which constructors grew."
        }
        name if name == "EventEmitter" || name.ends_with("Listener") || name.ends_with("Socket") => {
            "Verify every `on()` has a matching `off()`/`removeListener()` and that sockets are destroyed on close."
        }
        name if name.ends_with("Array") => {
            "Check for arrays that are appended to but never trimmed (request logs, queues, history buffers)."
        }
        _ => return None,
    };
    Some(advice)
}

/// Build advisory text for a finished classification
///
/// Advice is picked from fixed templates by offender name and severity.
/// The result is never empty.
pub fn generate_recommendations(offenders: &[TypeDelta], suspicious_growth: bool) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !suspicious_growth {
        recommendations.push(
            "No significant heap growth detected between the two snapshots.".to_string(),
        );
        if !offenders.is_empty() {
            recommendations.push(format!(
                "{} type(s) grew below the threshold; compare a later snapshot if growth continues.",
                offenders.len()
            ));
        }
        return recommendations;
    }

    if let Some(top) = offenders.first() {
        recommendations.push(format!(
            "Start with `{}`: +{:.2} MB across {:+} instances.",
            top.type_name,
            top.delta_mb(),
            top.delta_count
        ));
        if let Some(hint) = top.retainer_hints.first() {
            recommendations.push(format!(
                "Most new `{}` instances are held by {}.",
                top.type_name, hint
            ));
        }
    }

    for offender in offenders.iter().take(MAX_MATCHED_OFFENDERS) {
        if let Some(advice) = advice_for(&offender.type_name) {
            if !recommendations.iter().any(|r| r == advice) {
                recommendations.push(advice.to_string());
            }
        }
    }

    let critical = offenders
        .iter()
        .filter(|o| o.severity == Some(Severity::Critical))
        .count();
    if critical > 0 {
        recommendations.push(format!(
            "{} critical offender(s): take a third snapshot after another interval to confirm monotonic growth.",
            critical
        ));
    }

    if offenders.len() > MAX_MATCHED_OFFENDERS {
        recommendations.push(
            "Growth is spread over many types; a slow, general leak (e.g. a growing object graph) is likely."
                .to_string(),
        );
    }

    if recommendations.is_empty() {
        recommendations.push(
            "Heap grew past the threshold without a single dominant type; capture another snapshot pair."
                .to_string(),
        );
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::schema::GrowthRate;

    fn offender(name: &str, delta_size: i64, severity: Severity) -> TypeDelta {
        TypeDelta {
            type_name: name.to_string(),
            count_before: 1,
            count_after: 2,
            size_before: 1,
            size_after: 1 + delta_size as u64,
            delta_size,
            delta_count: 1,
            growth_rate: GrowthRate::Finite(delta_size as f64),
            severity: Some(severity),
            retainer_hints: vec!["Cache via 'items' (4 refs)".to_string()],
        }
    }

    #[test]
    fn test_not_suspicious_message() {
        let recs = generate_recommendations(&[], false);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("No significant heap growth"));
    }

    #[test]
    fn test_array_offender_advice() {
        let recs = generate_recommendations(&[offender("Array", 20_000_000, Severity::Critical)], true);
        assert!(recs[0].contains("`Array`"));
        assert!(recs.iter().any(|r| r.contains("Cache via 'items'")));
        assert!(recs.iter().any(|r| r.contains("appended to but never trimmed")));
        assert!(recs.iter().any(|r| r.contains("critical offender")));
    }

    #[test]
    fn test_advice_not_repeated() {
        let recs = generate_recommendations(
            &[
                offender("Map", 300, Severity::Low),
                offender("Set", 200, Severity::Low),
            ],
            true,
        );
        let cache_advice = recs.iter().filter(|r| r.contains("eviction")).count();
        assert_eq!(cache_advice, 1);
    }
}
