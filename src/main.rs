//! heapdiff CLI
//!
//! Compares two V8 heap snapshots and reports which object types grew,
//! with a leak verdict suitable for CI gates.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use std::path::PathBuf;

use heapdiff::commands::{
    display_schema, display_version, execute_analyze, validate_args, validate_snapshot_file,
    AnalyzeArgs,
};
use heapdiff::utils::config::AnalysisMode;

/// heapdiff - Heap snapshot leak detection
#[derive(Parser, Debug)]
#[command(name = "heapdiff")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Analyzer selection on the command line
#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    /// Aggregate node self sizes per type
    PerType,
    /// Compare whole file sizes only
    FileSize,
}

impl From<ModeArg> for AnalysisMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::PerType => AnalysisMode::PerType,
            ModeArg::FileSize => AnalysisMode::FileSize,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare a before and an after heap snapshot
    Analyze {
        /// Baseline snapshot
        #[arg(short, long)]
        before: PathBuf,

        /// Later snapshot
        #[arg(short, long)]
        after: PathBuf,

        /// Growth threshold in bytes (default 10 MiB)
        #[arg(short, long, env = "HEAPDIFF_THRESHOLD_BYTES")]
        threshold: Option<u64>,

        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Analyzer to use
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Output path for the JSON result
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the JSON result on a single line
        #[arg(long)]
        compact: bool,

        /// Print the terminal report
        #[arg(long)]
        summary: bool,

        /// POST the result to this URL
        #[arg(long, env = "HEAPDIFF_WEBHOOK_URL")]
        webhook: Option<String>,

        /// Container the snapshots were taken from
        #[arg(long)]
        container: Option<String>,

        /// Image the container was running
        #[arg(long)]
        image: Option<String>,

        /// Seconds between the two captures
        #[arg(long)]
        delay: Option<u64>,

        /// Exit non-zero when growth is suspicious
        #[arg(long)]
        fail_on_leak: bool,
    },

    /// Validate a heap snapshot file
    Validate {
        /// Path to the snapshot
        #[arg(short, long)]
        file: PathBuf,

        /// Number of largest types to list
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Display result schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Analyze {
            before,
            after,
            threshold,
            config,
            mode,
            output,
            compact,
            summary,
            webhook,
            container,
            image,
            delay,
            fail_on_leak,
        } => {
            let args = AnalyzeArgs {
                before,
                after,
                threshold_bytes: threshold,
                config_file: config,
                mode: mode.map(AnalysisMode::from),
                output,
                compact,
                summary,
                webhook_url: webhook,
                container_id: container,
                image_id: image,
                delay_secs: delay,
                fail_on_leak,
            };

            validate_args(&args)?;
            execute_analyze(args)?;
        }

        Commands::Validate { file, top } => {
            validate_snapshot_file(file, top)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
