//! JSON result writer.
//!
//! Writes AnalysisResult structs to JSON files, pretty or compact.

use crate::diff::AnalysisResult;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write an analysis result to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Arguments
/// * `result` - Analysis result to write
/// * `output_path` - Path to output JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
///
/// # Example
/// ```ignore
/// let result = analyze_snapshot_files(before, after, &config, context)?;
/// write_result(&result, "heap-report.json")?;
/// ```
pub fn write_result(
    result: &AnalysisResult,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    write_json(result, output_path.as_ref(), true)
}

/// Write an analysis result as compact JSON (no formatting)
///
/// **Public** - for artifacts that are shipped rather than read
pub fn write_result_compact(
    result: &AnalysisResult,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    write_json(result, output_path.as_ref(), false)
}

/// Read an analysis result back from a JSON file
///
/// **Public** - used by tests and by tooling that post-processes reports
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_result(input_path: impl AsRef<Path>) -> Result<AnalysisResult, OutputError> {
    let input_path = input_path.as_ref();
    debug!("Reading analysis result from: {}", input_path.display());

    let file = File::open(input_path)?;
    let result: AnalysisResult = serde_json::from_reader(BufReader::new(file))?;

    debug!(
        "Result loaded: schema {}, {} offenders",
        result.metadata.schema_version,
        result.offenders.len()
    );

    Ok(result)
}

/// **Private** - shared body of the pretty and compact writers
fn write_json(result: &AnalysisResult, output_path: &Path, pretty: bool) -> Result<(), OutputError> {
    info!("Writing analysis result to: {}", output_path.display());

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    if pretty {
        serde_json::to_writer_pretty(&mut writer, result)?;
    } else {
        serde_json::to_writer(&mut writer, result)?;
    }
    writer.flush()?;

    info!(
        "Analysis result written ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
