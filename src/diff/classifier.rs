//! Severity classification, offender ranking and the overall verdict.
//!
//! Severity is the higher of two readings: one from the growth in MB and
//! one from the growth rate. Only types that grew are offenders.

use crate::utils::config::{
    AnalysisConfig, BYTES_PER_MB, CRITICAL_DELTA_MB, CRITICAL_GROWTH_RATE, HIGH_DELTA_MB,
    HIGH_GROWTH_RATE, MEDIUM_DELTA_MB, MEDIUM_GROWTH_RATE,
};
use log::debug;

use super::normalizer::signed_difference;
use super::schema::{GrowthRate, Severity, TypeDelta};

/// Output of the classifier, before recommendations and assembly
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Offenders with severity set, largest growth first
    pub offenders: Vec<TypeDelta>,

    /// after total - before total, in bytes
    pub total_growth_bytes: i64,

    pub suspicious_growth: bool,

    pub likely_leak_source: Option<String>,

    pub confidence: f64,
}

/// Severity from growth in MB alone
pub fn severity_by_size(delta_mb: f64) -> Severity {
    if delta_mb > CRITICAL_DELTA_MB {
        Severity::Critical
    } else if delta_mb > HIGH_DELTA_MB {
        Severity::High
    } else if delta_mb > MEDIUM_DELTA_MB {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Severity from growth rate alone; an infinite rate carries no signal here
pub fn severity_by_growth(rate: GrowthRate) -> Severity {
    match rate {
        GrowthRate::Finite(r) if r > CRITICAL_GROWTH_RATE => Severity::Critical,
        GrowthRate::Finite(r) if r > HIGH_GROWTH_RATE => Severity::High,
        GrowthRate::Finite(r) if r > MEDIUM_GROWTH_RATE => Severity::Medium,
        _ => Severity::Low,
    }
}

/// Severity of a delta, or `None` when the type did not grow
pub fn classify_severity(delta: &TypeDelta) -> Option<Severity> {
    if delta.delta_size <= 0 {
        return None;
    }
    Some(severity_by_size(delta.delta_mb()).max(severity_by_growth(delta.growth_rate)))
}

/// Keep the types that grew, set their severity and sort them
///
/// Order: delta size descending, then type name ascending.
pub fn rank_offenders(deltas: Vec<TypeDelta>) -> Vec<TypeDelta> {
    let mut offenders: Vec<TypeDelta> = deltas
        .into_iter()
        .filter_map(|mut delta| {
            delta.severity = Some(classify_severity(&delta)?);
            Some(delta)
        })
        .collect();

    offenders.sort_by(|a, b| {
        b.delta_size
            .cmp(&a.delta_size)
            .then_with(|| a.type_name.cmp(&b.type_name))
    });

    offenders
}

/// Whether total growth exceeds the threshold
pub fn is_suspicious(total_growth_bytes: i64, threshold_bytes: u64) -> bool {
    total_growth_bytes > 0 && total_growth_bytes as u64 > threshold_bytes
}

/// Heuristic confidence in [0, 1]
///
/// `magnitude × (0.5 + 0.5 × concentration)`, where magnitude is
/// `1 - threshold / growth` and concentration is the top offender's share
/// of all offender growth. Zero when the growth is not suspicious.
pub fn confidence_score(
    total_growth_bytes: i64,
    threshold_bytes: u64,
    offenders: &[TypeDelta],
) -> f64 {
    if !is_suspicious(total_growth_bytes, threshold_bytes) {
        return 0.0;
    }

    let growth = total_growth_bytes as f64;
    let magnitude = 1.0 - (threshold_bytes as f64 / growth);

    let offender_growth: f64 = offenders.iter().map(|o| o.delta_size as f64).sum();
    let concentration = match offenders.first() {
        Some(top) if offender_growth > 0.0 => top.delta_size as f64 / offender_growth,
        _ => 0.0,
    };

    (magnitude * (0.5 + 0.5 * concentration)).clamp(0.0, 1.0)
}

/// Classify raw deltas against the snapshot totals
///
/// **Public** - main entry point for classification
pub fn classify(
    deltas: Vec<TypeDelta>,
    before_total: u64,
    after_total: u64,
    config: &AnalysisConfig,
) -> Classification {
    let offenders = rank_offenders(deltas);
    let total_growth_bytes = signed_difference(after_total, before_total);
    let suspicious_growth = is_suspicious(total_growth_bytes, config.threshold_bytes);
    let confidence = confidence_score(total_growth_bytes, config.threshold_bytes, &offenders);
    let likely_leak_source = offenders.first().map(|o| o.type_name.clone());

    debug!(
        "Classified {} offenders, growth {:.2} MB, suspicious={}, confidence={:.2}",
        offenders.len(),
        total_growth_bytes as f64 / BYTES_PER_MB,
        suspicious_growth,
        confidence
    );

    Classification {
        offenders,
        total_growth_bytes,
        suspicious_growth,
        likely_leak_source,
        confidence,
    }
}
