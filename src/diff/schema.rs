//! Schema definitions for analysis results.
//!
//! Defines the per-type deltas and the top-level report handed to the
//! JSON writer, the terminal renderer and the webhook sender.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Complete result of comparing a before and an after snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Summary of the baseline snapshot
    pub before: SnapshotSummary,

    /// Summary of the later snapshot
    pub after: SnapshotSummary,

    /// Types that grew, largest growth first
    pub offenders: Vec<TypeDelta>,

    /// Verdict and recommendations
    pub summary: LeakSummary,

    /// Capture context and analysis bookkeeping
    pub metadata: AnalysisMetadata,
}

/// Per-snapshot totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SnapshotSummary {
    /// Source file name
    pub filename: String,

    /// Sum of all node self sizes (bytes)
    pub total_size: u64,

    /// Size of the snapshot file on disk (bytes)
    pub file_size: u64,

    /// Number of nodes
    pub node_count: u64,

    /// Number of edges
    pub edge_count: u64,

    /// File modification time, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Change of one type between the two snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDelta {
    /// Constructor/type name
    pub type_name: String,

    pub count_before: u64,
    pub count_after: u64,

    /// Bytes in the before snapshot
    pub size_before: u64,

    /// Bytes in the after snapshot
    pub size_after: u64,

    /// size_after - size_before
    pub delta_size: i64,

    /// count_after - count_before
    pub delta_count: i64,

    /// delta_size as a multiple of size_before
    pub growth_rate: GrowthRate,

    /// Set by the classifier for types that grew
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    /// Who holds references to the new instances
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retainer_hints: Vec<String>,
}

impl TypeDelta {
    /// Growth in megabytes (MiB)
    pub fn delta_mb(&self) -> f64 {
        self.delta_size as f64 / crate::utils::config::BYTES_PER_MB
    }
}

/// Growth of a type relative to its before size
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrowthRate {
    /// delta / before, for a type that existed before
    Finite(f64),
    /// The type was absent (zero bytes) before and is present after
    Infinite,
}

impl GrowthRate {
    pub fn is_infinite(&self) -> bool {
        matches!(self, GrowthRate::Infinite)
    }

    /// The finite multiple, if any
    pub fn as_finite(&self) -> Option<f64> {
        match self {
            GrowthRate::Finite(rate) => Some(*rate),
            GrowthRate::Infinite => None,
        }
    }
}

impl std::fmt::Display for GrowthRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrowthRate::Finite(rate) => write!(f, "{:.2}x", rate),
            GrowthRate::Infinite => write!(f, "new"),
        }
    }
}

const INFINITE_MARKER: &str = "infinite";

impl Serialize for GrowthRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GrowthRate::Finite(rate) => serializer.serialize_f64(*rate),
            GrowthRate::Infinite => serializer.serialize_str(INFINITE_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for GrowthRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Rate(f64),
            Marker(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Rate(rate) => Ok(GrowthRate::Finite(rate)),
            Repr::Marker(marker) if marker == INFINITE_MARKER => Ok(GrowthRate::Infinite),
            Repr::Marker(other) => Err(serde::de::Error::custom(format!(
                "unknown growth rate marker '{}'",
                other
            ))),
        }
    }
}

/// Severity of an offending type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Overall verdict of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakSummary {
    /// (after.total_size - before.total_size) in MB
    pub total_growth_mb: f64,

    /// Total growth exceeded the configured threshold
    pub suspicious_growth: bool,

    /// Offender with the largest growth
    pub likely_leak_source: Option<String>,

    /// Heuristic confidence in [0, 1]
    pub confidence: f64,

    /// Advisory remediation text
    pub recommendations: Vec<String>,
}

/// Capture context supplied by the caller
///
/// The engine never fills these in itself; they describe where the
/// snapshots came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CaptureContext {
    /// Container or pod the snapshots were taken from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,

    /// Image the container was running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,

    /// Seconds between the two captures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_secs: Option<u64>,
}

/// Result metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Output schema version
    pub schema_version: String,

    /// When the analysis ran
    pub analyzed_at: DateTime<Utc>,

    /// Analyzer that produced the type table
    pub mode: crate::utils::config::AnalysisMode,

    /// Threshold the verdict was computed against (bytes)
    pub threshold_bytes: u64,

    #[serde(flatten)]
    pub capture: CaptureContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_rate_serialization() {
        assert_eq!(serde_json::to_string(&GrowthRate::Finite(2.5)).unwrap(), "2.5");
        assert_eq!(
            serde_json::to_string(&GrowthRate::Infinite).unwrap(),
            "\"infinite\""
        );
        let parsed: GrowthRate = serde_json::from_str("\"infinite\"").unwrap();
        assert!(parsed.is_infinite());
        assert!(serde_json::from_str::<GrowthRate>("\"huge\"").is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(Severity::Critical.to_string(), "critical");
    }
}
