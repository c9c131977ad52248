//! Structured JSON output for scripting and piping.
//!
//! When `--json` is passed, the progress lines are suppressed and a single
//! [`JsonOutput`] document describing the run is printed to stdout instead.

use humansize::{DECIMAL, format_size};
use serde::Serialize;

use crate::concatenator::{AppendRecord, RunReport};
use crate::config::Threshold;

/// Top-level JSON output emitted when `--json` is active.
#[derive(Serialize, Debug)]
pub struct JsonOutput {
    /// Path of the output file.
    pub output_path: String,

    /// Stopping threshold and where it came from.
    pub threshold: Threshold,

    /// Appended files, in append order.
    pub appended: Vec<JsonAppend>,

    /// Aggregated statistics.
    pub summary: JsonSummary,
}

/// A single appended file in the JSON output.
#[derive(Serialize, Debug)]
pub struct JsonAppend {
    /// Path of the appended file, rendered lossily like `output_path`.
    pub input_path: String,

    /// Size of the appended file in bytes.
    pub input_size: u64,

    /// Output size before the append.
    pub output_size_before: u64,

    /// Output size after the append.
    pub output_size_after: u64,
}

impl From<&AppendRecord> for JsonAppend {
    fn from(record: &AppendRecord) -> Self {
        Self {
            input_path: record.input_path.display().to_string(),
            input_size: record.input_size,
            output_size_before: record.output_size_before,
            output_size_after: record.output_size_after,
        }
    }
}

/// Aggregated statistics for a run.
#[derive(Serialize, Debug)]
pub struct JsonSummary {
    /// Number of files appended.
    pub files_appended: usize,

    /// Output size at the end of the append loop, in bytes.
    pub final_size: u64,

    /// Human-readable formatted final size (e.g. `"4.1 kB"`).
    pub final_size_formatted: String,

    /// Whether the run stopped because the threshold was crossed.
    pub threshold_exceeded: bool,

    /// Whether the output file was deleted afterward.
    pub cleared: bool,
}

impl From<&RunReport> for JsonOutput {
    fn from(report: &RunReport) -> Self {
        Self {
            output_path: report.output_path.display().to_string(),
            threshold: report.threshold,
            appended: report.appended.iter().map(JsonAppend::from).collect(),
            summary: JsonSummary {
                files_appended: report.appended.len(),
                final_size: report.final_size,
                final_size_formatted: format_size(report.final_size, DECIMAL),
                threshold_exceeded: report.threshold_exceeded,
                cleared: report.cleared,
            },
        }
    }
}
