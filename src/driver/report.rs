use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

use super::RunSummary;
use crate::pipeline::{ScoredResult, WorkerStats};
use crate::scoring::ScoringKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Tab-separated id and score, two decimals, headed by the strategy's
    /// score column
    #[default]
    Text,
    /// Results plus run statistics as JSON
    Json,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    strategy: String,
    threshold: f64,
    count: usize,
    results: &'a [ScoredResult],
    stats: WorkerStats,
    elapsed_ms: u64,
}

pub fn render_text(results: &[ScoredResult], strategy: ScoringKind) -> String {
    let mut out = format!("ID\t{}\n", strategy.report_column());
    for result in results {
        // Writing to a String cannot fail
        let _ = writeln!(out, "{}\t{:.2}", result.id, result.score);
    }
    out
}

pub fn render_json(summary: &RunSummary) -> Result<String> {
    let report = JsonReport {
        strategy: summary.strategy.to_string(),
        threshold: summary.threshold,
        count: summary.results.len(),
        results: &summary.results,
        stats: summary.pool.totals(),
        elapsed_ms: summary.elapsed.as_millis() as u64,
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize report")
}

pub fn render(summary: &RunSummary, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(&summary.results, summary.strategy)),
        ReportFormat::Json => render_json(summary),
    }
}

/// Write the rendered report to `path`, or stdout when `None`
pub fn write_report(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write report: {}", path.display())),
        None => {
            print!("{content}");
            Ok(())
        }
    }
}
