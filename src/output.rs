//! Run summary in human-readable and JSON Lines modes.
//!
//! Stdout carries nothing but this summary; diagnostics go to stderr.

use console::style;
use serde::Serialize;

use crate::core::SplitStats;

/// Output mode for CLI results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Structured summary for JSON output
#[derive(Debug, Serialize)]
pub struct SplitSummary<'a> {
    pub files: usize,
    pub rows: usize,
    pub lines_read: usize,
    pub bytes_written: u64,
    pub prefix: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efermi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_lines: Option<usize>,
    pub dry_run: bool,
    pub duration_secs: f64,
}

/// The one-line completion message
pub fn summary_line(files: usize, prefix: &str) -> String {
    format!(
        "{} DOS file(s) have been splitted named as {}0, {}1...",
        files, prefix, prefix
    )
}

/// Writes the run summary in the selected mode
#[derive(Debug, Clone)]
pub struct OutputWriter {
    pub mode: OutputMode,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            mode: if json { OutputMode::Json } else { OutputMode::Human },
        }
    }

    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Render the summary without printing it
    pub fn render(&self, stats: &SplitStats, prefix: &str) -> String {
        match self.mode {
            OutputMode::Json => {
                let summary = SplitSummary {
                    files: stats.files,
                    rows: stats.header.rows,
                    lines_read: stats.lines_read,
                    bytes_written: stats.bytes_written,
                    prefix,
                    efermi: stats.header.efermi,
                    partial_lines: stats.partial_lines,
                    dry_run: stats.dry_run,
                    duration_secs: stats.duration.as_secs_f64(),
                };
                serde_json::to_string(&summary).unwrap_or_default()
            }
            OutputMode::Human => summary_line(stats.files, prefix),
        }
    }

    /// Print the summary to stdout
    pub fn summary(&self, stats: &SplitStats, prefix: &str) {
        println!("{}", self.render(stats, prefix));
    }
}

/// Print an error line to stderr, sanitized to a single line
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), sanitize_error(msg));
}

/// Collapse multi-line error messages so a diagnostic stays on one line
pub fn sanitize_error(msg: &str) -> String {
    msg.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
