//! Terminal output rendering for analysis results.
//!
//! Human-readable summary of a snapshot comparison, with visual cues for
//! growth and severity.

use super::schema::{AnalysisResult, Severity, SnapshotSummary};
use crate::utils::config::BYTES_PER_MB;
use colored::*;

/// Offenders listed in the terminal summary
const MAX_RENDERED_OFFENDERS: usize = 10;

/// Render a human-readable summary of an analysis result for the terminal
pub fn render_terminal_report(result: &AnalysisResult) -> String {
    let mut out = String::new();

    out.push_str(&render_header(result));
    out.push_str(&render_totals(result));
    out.push_str(&render_offenders(result));
    out.push_str(&render_recommendations(result));
    out.push_str(&render_verdict(result));

    out
}

fn render_header(result: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str("\n🧠 ");
    out.push_str(&"Heap Snapshot Comparison".bold().to_string());
    out.push_str("\n---------------------------------------------------\n");
    out.push_str(&format!("Before: {}\n", describe_side(&result.before)));
    out.push_str(&format!("After:  {}\n", describe_side(&result.after)));

    let capture = &result.metadata.capture;
    if let Some(container) = &capture.container_id {
        out.push_str(&format!("Container: {}\n", container));
    }
    if let Some(image) = &capture.image_id {
        out.push_str(&format!("Image:     {}\n", image));
    }
    if let Some(delay) = capture.delay_secs {
        out.push_str(&format!("Interval:  {}s\n", delay));
    }
    out.push_str("---------------------------------------------------\n\n");
    out
}

fn describe_side(summary: &SnapshotSummary) -> String {
    if summary.node_count == 0 {
        return summary.filename.clone();
    }
    format!(
        "{} ({} nodes, {} edges)",
        summary.filename, summary.node_count, summary.edge_count
    )
}

fn render_totals(result: &AnalysisResult) -> String {
    let growth = result.summary.total_growth_mb;
    format!(
        "{} Heap: {:.2} MB -> {:.2} MB ({:+.2} MB)\n",
        get_delta_symbol(growth),
        result.before.total_size as f64 / BYTES_PER_MB,
        result.after.total_size as f64 / BYTES_PER_MB,
        growth
    )
}

fn render_offenders(result: &AnalysisResult) -> String {
    let mut out = String::new();
    if result.offenders.is_empty() {
        return out;
    }

    out.push_str("\nTop Growing Types:\n");
    for offender in result.offenders.iter().take(MAX_RENDERED_OFFENDERS) {
        let label = match offender.severity {
            Some(severity) => severity_label(severity),
            None => "-".normal(),
        };
        out.push_str(&format!(
            "  [{}] {}: {:+.2} MB, {:+} instances ({})\n",
            label,
            offender.type_name,
            offender.delta_mb(),
            offender.delta_count,
            offender.growth_rate
        ));
        for hint in &offender.retainer_hints {
            out.push_str(&format!("      ↳ held by {}\n", hint));
        }
    }

    let hidden = result.offenders.len().saturating_sub(MAX_RENDERED_OFFENDERS);
    if hidden > 0 {
        out.push_str(&format!("  ... and {} more\n", hidden));
    }
    out
}

fn render_recommendations(result: &AnalysisResult) -> String {
    let mut out = String::new();
    if result.summary.recommendations.is_empty() {
        return out;
    }
    out.push_str("\nRecommendations:\n");
    for rec in &result.summary.recommendations {
        out.push_str(&format!("  💡 {}\n", rec));
    }
    out
}

fn render_verdict(result: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str("\n---------------------------------------------------\n");
    let verdict = if result.summary.suspicious_growth {
        let source = result
            .summary
            .likely_leak_source
            .as_deref()
            .unwrap_or("unknown");
        format!(
            "❌ VERDICT: LIKELY LEAK in {} (confidence {:.0}%)",
            source,
            result.summary.confidence * 100.0
        )
        .red()
        .bold()
    } else if !result.offenders.is_empty() {
        "⚠️  VERDICT: GROWTH BELOW THRESHOLD".yellow().bold()
    } else {
        "✅ VERDICT: NO GROWTH".green().bold()
    };
    out.push_str(&verdict.to_string());
    out.push('\n');
    out
}

fn severity_label(severity: Severity) -> ColoredString {
    let text = severity.to_string().to_uppercase();
    match severity {
        Severity::Critical => text.red().bold(),
        Severity::High => text.red(),
        Severity::Medium => text.yellow(),
        Severity::Low => text.normal(),
    }
}

fn get_delta_symbol(change: f64) -> &'static str {
    if change > 0.0 {
        "📈"
    } else if change < 0.0 {
        "📉"
    } else {
        "➡️"
    }
}
