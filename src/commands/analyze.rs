//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Resolves the analysis configuration
//! 2. Loads and compares both snapshots
//! 3. Writes the JSON result
//! 4. Prints the terminal report
//! 5. Posts to the webhook

use super::models::AnalyzeArgs;
use crate::diff::{analyze_snapshot_files, render_terminal_report, AnalysisResult, CaptureContext};
use crate::notify::{send_webhook, validate_webhook_url};
use crate::output::{write_result, write_result_compact};
use crate::utils::config::{load_config, AnalysisConfig};
use anyhow::{Context, Result};
use colored::*;
use log::{info, warn};
use std::time::Instant;

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Unreadable or malformed snapshots
/// * Config file errors
/// * Output write errors
/// * Suspicious growth when `fail_on_leak` is set
///
/// A failed webhook delivery is logged, not returned.
pub fn execute_analyze(args: AnalyzeArgs) -> Result<AnalysisResult> {
    let start_time = Instant::now();

    // Step 1: Resolve configuration
    let config = resolve_config(&args)?;
    info!(
        "Analyzing {} -> {} (threshold {} bytes, mode {:?})",
        args.before.display(),
        args.after.display(),
        config.threshold_bytes,
        config.mode
    );

    // Step 2: Compare
    let context = CaptureContext {
        container_id: args.container_id.clone(),
        image_id: args.image_id.clone(),
        delay_secs: args.delay_secs,
    };
    let result = analyze_snapshot_files(&args.before, &args.after, &config, context)
        .context("Failed to analyze heap snapshots")?;

    // Step 3: Write output if requested
    if let Some(path) = &args.output {
        if args.compact {
            write_result_compact(&result, path)
        } else {
            write_result(&result, path)
        }
        .context("Failed to write analysis result JSON")?;
        println!(
            "🧠 Analysis result written to {}",
            path.display().to_string().cyan()
        );
    }

    // Step 4: Terminal summary
    if args.summary {
        println!("{}", render_terminal_report(&result));
    }

    // Step 5: Webhook
    if let Some(url) = &args.webhook_url {
        match send_webhook(url, &result) {
            Ok(()) => info!("✓ Result delivered to webhook"),
            Err(e) => warn!("Webhook delivery failed: {}", e),
        }
    }

    info!(
        "Analysis completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    // Step 6: Exit code mapping
    if args.fail_on_leak && result.summary.suspicious_growth {
        return Err(anyhow::anyhow!(
            "Suspicious heap growth: {:+.2} MB, likely source {}",
            result.summary.total_growth_mb,
            result
                .summary
                .likely_leak_source
                .as_deref()
                .unwrap_or("unknown")
        ));
    }

    Ok(result)
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.before.as_os_str().is_empty() || args.after.as_os_str().is_empty() {
        anyhow::bail!("Both --before and --after snapshots are required");
    }

    if !args.before.is_file() {
        anyhow::bail!("Before snapshot not found: {}", args.before.display());
    }

    if !args.after.is_file() {
        anyhow::bail!("After snapshot not found: {}", args.after.display());
    }

    if let Some(url) = &args.webhook_url {
        validate_webhook_url(url)?;
    }

    Ok(())
}

/// Config file first, then CLI overrides
///
/// **Private** - internal helper for execute_analyze
fn resolve_config(args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config_file {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    if let Some(threshold) = args.threshold_bytes {
        config = config.with_threshold(threshold);
    }
    if let Some(mode) = args.mode {
        config = config.with_mode(mode);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::AnalysisMode;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_resolve_config_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "threshold_bytes = 500\nmode = \"file_size\"").unwrap();

        let args = AnalyzeArgs {
            config_file: Some(file.path().to_path_buf()),
            threshold_bytes: Some(900),
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.threshold_bytes, 900);
        assert_eq!(config.mode, AnalysisMode::FileSize);
    }

    #[test]
    fn test_validate_args_missing_file() {
        let existing = NamedTempFile::new().unwrap();
        let args = AnalyzeArgs {
            before: existing.path().to_path_buf(),
            after: PathBuf::from("/nonexistent/after.heapsnapshot"),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_bad_webhook() {
        let before = NamedTempFile::new().unwrap();
        let after = NamedTempFile::new().unwrap();
        let args = AnalyzeArgs {
            before: before.path().to_path_buf(),
            after: after.path().to_path_buf(),
            webhook_url: Some("not-a-url".to_string()),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }
}
