//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use crate::error::archive_error;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use zipvault_core::CreationReport;
use zipvault_core::ExtractionReport;

pub struct JsonFormatter;

#[derive(Serialize)]
struct CreationOutput {
    output_path: String,
    files_added: usize,
    files_skipped: usize,
    bytes_written: u64,
    bytes_compressed: u64,
    compression_ratio: f64,
    compression_percentage: f64,
    encrypted: bool,
    duration_ms: u128,
    warnings: Vec<String>,
}

impl CreationOutput {
    fn new(output_path: &Path, report: &CreationReport) -> Self {
        Self {
            output_path: output_path.display().to_string(),
            files_added: report.files_added,
            files_skipped: report.files_skipped,
            bytes_written: report.bytes_written,
            bytes_compressed: report.bytes_compressed,
            compression_ratio: report.compression_ratio(),
            compression_percentage: report.compression_percentage(),
            encrypted: report.encrypted,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        }
    }
}

#[derive(Serialize)]
struct ExtractionOutput {
    output_dir: String,
    files_extracted: usize,
    directories_created: usize,
    bytes_written: u64,
    duration_ms: u128,
    warnings: Vec<String>,
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }

    // Kept off stdout so stdout holds exactly one JSON document.
    fn output_stderr<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        writeln!(io::stderr(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_creation_result(&self, output_path: &Path, report: &CreationReport) -> Result<()> {
        let output = JsonOutput::success("compress", CreationOutput::new(output_path, report));
        Self::output(&output)
    }

    fn format_extraction_result(&self, output_dir: &Path, report: &ExtractionReport) -> Result<()> {
        let data = ExtractionOutput {
            output_dir: output_dir.display().to_string(),
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        };

        let output = JsonOutput::success("decompress", data);
        Self::output(&output)
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let kind = archive_error(error).map(|e| e.kind().as_str());
        let output = JsonOutput::error(operation, format!("{error:#}"), kind);
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output_stderr(&output);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_output_fields() {
        let mut report = CreationReport::new();
        report.files_added = 2;
        report.bytes_written = 100;
        report.bytes_compressed = 50;
        report.encrypted = true;

        let data = CreationOutput::new(Path::new("out.zip"), &report);
        let json: serde_json::Value = serde_json::to_value(&data).unwrap();

        assert_eq!(json["output_path"], "out.zip");
        assert_eq!(json["files_added"], 2);
        assert_eq!(json["encrypted"], true);
        assert_eq!(json["compression_ratio"], 2.0);
    }
}
