//! Configuration and constants for the analysis engine.
//!
//! Every analysis call receives its own [`AnalysisConfig`]. Nothing here is
//! mutable global state; the constants only seed `AnalysisConfig::default()`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use super::error::ConfigError;

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Bytes in one megabyte as used by reports and severity thresholds (MiB)
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Default growth threshold: 10 MiB
pub const DEFAULT_THRESHOLD_BYTES: u64 = 10 * 1024 * 1024;

/// Bucket used when a node name is empty or cannot be resolved
pub const FALLBACK_TYPE_NAME: &str = "object";

/// Synthetic type used by the whole-file-size analysis mode
pub const WHOLE_FILE_TYPE_NAME: &str = "(whole file)";

/// Representative instance ids kept per type
pub const DEFAULT_MAX_SAMPLE_IDS: usize = 5;

/// Retainer hints kept per offender
pub const DEFAULT_RETAINER_HINT_LIMIT: usize = 3;

/// Timeout for webhook delivery
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(15);

// Severity thresholds on delta size (MB)
pub const CRITICAL_DELTA_MB: f64 = 100.0;
pub const HIGH_DELTA_MB: f64 = 50.0;
pub const MEDIUM_DELTA_MB: f64 = 10.0;

// Severity thresholds on growth rate (multiple of before-size)
pub const CRITICAL_GROWTH_RATE: f64 = 10.0;
pub const HIGH_GROWTH_RATE: f64 = 5.0;
pub const MEDIUM_GROWTH_RATE: f64 = 2.0;

// Field names looked up in the snapshot node/edge layouts
pub const NODE_TYPE_FIELD: &str = "type";
pub const NODE_NAME_FIELD: &str = "name";
pub const NODE_ID_FIELD: &str = "id";
pub const NODE_SELF_SIZE_FIELD: &str = "self_size";
pub const NODE_EDGE_COUNT_FIELD: &str = "edge_count";
pub const EDGE_TYPE_FIELD: &str = "type";
pub const EDGE_NAME_FIELD: &str = "name_or_index";
pub const EDGE_TO_NODE_FIELD: &str = "to_node";

/// How a node's bucket name is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeNaming {
    /// Look up the node's `name` in the string table
    #[default]
    Name,
    /// Like `Name` for object-like nodes, `(kind)` for strings, code, numbers, etc.
    Constructor,
}

/// Which analyzer feeds the differ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Per-type aggregation over the node table
    #[default]
    PerType,
    /// Whole-file byte size, treated as a single synthetic type
    FileSize,
}

/// Immutable configuration for one analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Total growth (bytes) above which the comparison is suspicious
    pub threshold_bytes: u64,

    /// Bucket naming policy
    pub naming: TypeNaming,

    /// Analyzer feeding the differ
    pub mode: AnalysisMode,

    /// Instance ids sampled per type
    pub max_sample_ids: usize,

    /// Retainer hints attached per offender (0 disables the edge pass)
    pub retainer_hint_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold_bytes: DEFAULT_THRESHOLD_BYTES,
            naming: TypeNaming::default(),
            mode: AnalysisMode::default(),
            max_sample_ids: DEFAULT_MAX_SAMPLE_IDS,
            retainer_hint_limit: DEFAULT_RETAINER_HINT_LIMIT,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold_bytes: u64) -> Self {
        self.threshold_bytes = threshold_bytes;
        self
    }

    pub fn with_naming(mut self, naming: TypeNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_mode(mut self, mode: AnalysisMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_retainer_hint_limit(mut self, limit: usize) -> Self {
        self.retainer_hint_limit = limit;
        self
    }
}

/// Load an analysis configuration from a TOML file
///
/// Missing keys fall back to the defaults.
///
/// # Example
/// ```ignore
/// let config = load_config("heapdiff.toml")?;
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AnalysisConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: AnalysisConfig = toml::from_str(&contents)?;
    Ok(config)
}
