//! Output writers for analysis results.
//!
//! Terminal rendering lives with the diff module; this module handles
//! persisting results to disk.

pub mod json;

// Re-export main functions
pub use json::{read_result, write_result, write_result_compact};
