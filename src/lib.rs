//! heapdiff
//!
//! Memory-leak detection by comparing two V8 heap snapshots.
//!
//! The pipeline loads both snapshots, aggregates node self sizes per type,
//! diffs the two type tables, ranks the types that grew and produces a
//! verdict with recommendations.
//!
//! ## Getting Started
//!
//! ```bash
//! heapdiff analyze --before before.heapsnapshot --after after.heapsnapshot --summary
//! ```
//!
//! Library users start at [`diff::analyze_snapshot_files`].

pub mod aggregator;
pub mod commands;
pub mod diff;
pub mod notify;
pub mod output;
pub mod parser;
pub mod utils;
