//! Utility modules for configuration and error handling.

pub mod config;
pub mod error;

// Re-export commonly used types for convenience
pub use config::{load_config, AnalysisConfig, AnalysisMode, TypeNaming};
pub use error::{AnalysisError, ConfigError, NotifyError, OutputError, SnapshotError};
