//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use extpack_core::PackageReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

#[derive(Serialize)]
struct PackageOutput {
    name: String,
    version: String,
    archive_path: String,
    key_stripped: bool,
    ignore_patterns: usize,
    files_staged: usize,
    files_ignored: usize,
    ignored_paths: Vec<String>,
    entries_added: usize,
    bytes_written: u64,
    bytes_compressed: u64,
    compression_ratio: f64,
    duration_ms: u128,
}

impl From<&PackageReport> for PackageOutput {
    fn from(report: &PackageReport) -> Self {
        Self {
            name: report.name.clone(),
            version: report.version.clone(),
            archive_path: report.archive_path().display().to_string(),
            key_stripped: report.key_stripped,
            ignore_patterns: report.ignore_patterns,
            files_staged: report.stage.files_staged,
            files_ignored: report.stage.files_ignored,
            ignored_paths: report
                .stage
                .ignored_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            entries_added: report.archive.entries_added,
            bytes_written: report.archive.bytes_written,
            bytes_compressed: report.archive.bytes_compressed,
            compression_ratio: report.archive.compression_ratio(),
            duration_ms: report.duration().as_millis(),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_package_result(&self, report: &PackageReport) -> Result<()> {
        let output = JsonOutput::success("package", PackageOutput::from(report));
        Self::output(&output)
    }

    fn format_archive_name(&self, name: &str) -> Result<()> {
        #[derive(Serialize)]
        struct NameOutput<'a> {
            archive_name: &'a str,
        }

        let output = JsonOutput::success("name", NameOutput { archive_name: name });
        Self::output(&output)
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error("error", format!("{error:#}"));
        let _ = Self::output(&output);
    }
}
