use crate::utils::config::AnalysisMode;
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Baseline snapshot
    pub before: PathBuf,

    /// Later snapshot
    pub after: PathBuf,

    /// Growth threshold in bytes; overrides the config file
    pub threshold_bytes: Option<u64>,

    /// TOML file with an AnalysisConfig
    pub config_file: Option<PathBuf>,

    /// Analyzer override
    pub mode: Option<AnalysisMode>,

    /// Where to write the JSON result
    pub output: Option<PathBuf>,

    /// Write the JSON result without pretty-printing
    pub compact: bool,

    /// Print the terminal report
    pub summary: bool,

    /// Endpoint to POST the result to
    pub webhook_url: Option<String>,

    /// Capture context, copied into the result metadata
    pub container_id: Option<String>,
    pub image_id: Option<String>,
    pub delay_secs: Option<u64>,

    /// Return an error when the growth is suspicious
    pub fail_on_leak: bool,
}
