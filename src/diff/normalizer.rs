//! Per-type delta calculation.
//!
//! Handles the math for comparing two type tables, including types that
//! exist on only one side and division by a zero baseline.

use crate::aggregator::{TypeAggregate, TypeAggregates};

use super::schema::{GrowthRate, TypeDelta};

/// Compute a delta for every type seen in either snapshot
///
/// # Arguments
/// * `before` - Type table of the baseline snapshot
/// * `after` - Type table of the later snapshot
///
/// # Returns
/// One TypeDelta per type in the union, none dropped. Types from `before`
/// come first in their order, followed by types only present in `after`.
pub fn diff_types(before: &TypeAggregates, after: &TypeAggregates) -> Vec<TypeDelta> {
    let mut deltas = Vec::with_capacity(before.len().max(after.len()));

    for base in before {
        deltas.push(calculate_type_delta(
            &base.type_name,
            Some(base),
            after.get(&base.type_name),
        ));
    }

    for target in after {
        if before.get(&target.type_name).is_none() {
            deltas.push(calculate_type_delta(&target.type_name, None, Some(target)));
        }
    }

    deltas
}

/// Delta for one type; a missing side counts as zero instances and bytes
pub fn calculate_type_delta(
    type_name: &str,
    before: Option<&TypeAggregate>,
    after: Option<&TypeAggregate>,
) -> TypeDelta {
    let (count_before, size_before) = before.map_or((0, 0), |a| (a.count, a.total_size));
    let (count_after, size_after) = after.map_or((0, 0), |a| (a.count, a.total_size));

    let delta_size = signed_difference(size_after, size_before);

    TypeDelta {
        type_name: type_name.to_string(),
        count_before,
        count_after,
        size_before,
        size_after,
        delta_size,
        delta_count: signed_difference(count_after, count_before),
        growth_rate: growth_rate(delta_size, size_before, size_after),
        severity: None,
        retainer_hints: Vec::new(),
    }
}

/// Growth as a multiple of the before size
///
/// `Infinite` when the type had no bytes before and has some after;
/// `Finite(0.0)` when it has none on either side.
pub fn growth_rate(delta_size: i64, size_before: u64, size_after: u64) -> GrowthRate {
    if size_before > 0 {
        GrowthRate::Finite(delta_size as f64 / size_before as f64)
    } else if size_after > 0 {
        GrowthRate::Infinite
    } else {
        GrowthRate::Finite(0.0)
    }
}

/// `after - before` as a signed value, saturating at the i64 range
pub fn signed_difference(after: u64, before: u64) -> i64 {
    if after >= before {
        i64::try_from(after - before).unwrap_or(i64::MAX)
    } else {
        i64::try_from(before - after).map_or(i64::MIN, |d| -d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, u64, u64)]) -> TypeAggregates {
        entries
            .iter()
            .map(|(name, count, size)| TypeAggregate::new(*name, *count, *size))
            .collect()
    }

    #[test]
    fn test_growth_rate_normal() {
        assert_eq!(growth_rate(50, 100, 150), GrowthRate::Finite(0.5));
        assert_eq!(growth_rate(-25, 100, 75), GrowthRate::Finite(-0.25));
    }

    #[test]
    fn test_growth_rate_zero_baseline() {
        assert_eq!(growth_rate(10, 0, 10), GrowthRate::Infinite);
        assert_eq!(growth_rate(0, 0, 0), GrowthRate::Finite(0.0));
    }

    #[test]
    fn test_signed_difference() {
        assert_eq!(signed_difference(150, 100), 50);
        assert_eq!(signed_difference(100, 150), -50);
        assert_eq!(signed_difference(u64::MAX, 0), i64::MAX);
    }

    #[test]
    fn test_diff_types_missing_types() {
        let before = table(&[("Array", 10, 1000), ("Map", 5, 500)]);
        let after = table(&[("Array", 8, 800), ("Set", 3, 300)]);

        let deltas = diff_types(&before, &after);
        let names: Vec<&str> = deltas.iter().map(|d| d.type_name.as_str()).collect();
        assert_eq!(names, vec!["Array", "Map", "Set"]);

        assert_eq!(deltas[0].delta_size, -200);
        assert_eq!(deltas[0].delta_count, -2);

        assert_eq!(deltas[1].size_after, 0);
        assert_eq!(deltas[1].delta_size, -500);
        assert_eq!(deltas[1].growth_rate, GrowthRate::Finite(-1.0));

        assert_eq!(deltas[2].count_before, 0);
        assert_eq!(deltas[2].delta_count, 3);
        assert!(deltas[2].growth_rate.is_infinite());
    }

    #[test]
    fn test_diff_types_keeps_unchanged() {
        let before = table(&[("Object", 50, 5000)]);
        let deltas = diff_types(&before, &before.clone());
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].delta_size, 0);
        assert_eq!(deltas[0].growth_rate, GrowthRate::Finite(0.0));
    }
}
