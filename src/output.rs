//! Output formatting and persistence for grade reports.
//!
//! Supports the pretty JSON report file and a plain-text summary.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::engine::types::Report;

/// Serializes `value` as pretty-printed JSON and writes it to `path`,
/// creating parent directories as needed.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), "JSON written");

    Ok(())
}

/// Reads a previously written report back.
pub fn read_report(path: &Path) -> Result<Report> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(serde_json::from_str(&content)?)
}

fn signed(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:+.2}"),
        None => "n/a".to_string(),
    }
}

/// Renders the human-readable summary printed after a calculation.
pub fn render_summary(report: &Report) -> String {
    let mut out = String::new();
    let rule = "=".repeat(50);
    let thin = "-".repeat(30);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "GRADE CALCULATION SUMMARY");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Grading Method: {}", report.grading_method);

    let _ = writeln!(out);
    let _ = writeln!(out, "Exam Components:");
    let _ = writeln!(out, "{thin}");
    for row in &report.components {
        let c = &row.component;
        let _ = writeln!(
            out,
            "{:2} | Score: {:6.2} | Percentage: {:5.1}% | Avg: {:6.2} | StdDev: {:6.2}",
            c.name, c.score, c.percentage, c.average, c.standard_deviation
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Final Grade:");
    let _ = writeln!(out, "{thin}");
    let _ = writeln!(out, "Numerical Grade: {:.2}", report.final_grade);
    let _ = writeln!(out, "Letter Grade:    {}", report.letter_grade);
    let overall = &report.overall;
    let _ = writeln!(out, "Class Average:   {:.2}", overall.average);
    let _ = writeln!(out, "Class StdDev:    {:.2}", overall.standard_deviation);

    let _ = writeln!(out);
    let _ = writeln!(out, "Component Analysis:");
    let _ = writeln!(out, "{thin}");
    for row in &report.components {
        let _ = writeln!(
            out,
            "{}: Z-score = {}, Percentile = {:.1}%",
            row.component.name,
            signed(row.z_score),
            row.percentile_rank
        );
    }
    let _ = writeln!(out, "Best component:    {}", report.best_component);
    let _ = writeln!(out, "Weakest component: {}", report.weakest_component);

    out
}
