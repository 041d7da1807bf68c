//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use zipvault_core::CreationReport;
use zipvault_core::ExtractionReport;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format compress result
    fn format_creation_result(&self, output_path: &Path, report: &CreationReport) -> Result<()>;

    /// Format decompress result
    fn format_extraction_result(&self, output_dir: &Path, report: &ExtractionReport)
    -> Result<()>;

    /// Format error message for the named operation
    fn format_error(&self, operation: &str, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
            kind: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(
        operation: impl Into<String>,
        error: impl Into<String>,
        kind: Option<&'static str>,
    ) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
            kind,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_output_omits_data() {
        let output = JsonOutput::error("decompress", "bad password", Some("decryption_failed"));
        let json: serde_json::Value = serde_json::to_value(&output).unwrap();

        assert_eq!(json["operation"], "decompress");
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "bad password");
        assert_eq!(json["kind"], "decryption_failed");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_success_output_omits_error() {
        let output = JsonOutput::success("compress", 3_u32);
        let json: serde_json::Value = serde_json::to_value(&output).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["data"], 3);
        assert!(json.get("error").is_none());
        assert!(json.get("kind").is_none());
    }
}
