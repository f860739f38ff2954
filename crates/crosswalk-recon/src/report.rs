//! CSV rows for the downloadable mismatch table.

use crate::events::ValidationMismatch;
use thiserror::Error;

/// Column headers for the downloadable mismatch table.
pub const CSV_HEADERS: &[&str] = &[
    "DirectoryID",
    "ExternalID",
    "Email",
    "MismatchType",
    "SourceValue",
    "TargetValue",
    "Timestamp",
    "Details",
];

/// CSV rendering failure. Not expected with well-formed rows; surfaced so
/// a bad row is skipped rather than corrupting the artifact.
#[derive(Debug, Error)]
#[error("Failed to render CSV row: {0}")]
pub struct ReportError(String);

/// Generate the CSV header row.
#[must_use]
pub fn header_row() -> String {
    CSV_HEADERS.join(",")
}

/// Render one mismatch as a CSV row (no trailing newline), with standard
/// quoting for fields containing the delimiter, quotes, or newlines.
pub fn format_row(mismatch: &ValidationMismatch) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            mismatch.directory_record_id.as_str(),
            mismatch.external_id.as_str(),
            mismatch.email.as_str(),
            mismatch.mismatch_type.as_str(),
            mismatch.source_value.as_str(),
            mismatch.target_value.as_str(),
            &mismatch.timestamp.to_rfc3339(),
            mismatch.details.as_str(),
        ])
        .map_err(|e| ReportError(e.to_string()))?;

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError(e.to_string()))?;

    String::from_utf8(bytes)
        .map(|s| s.trim_end().to_string()) // Remove trailing newline
        .map_err(|e| ReportError(e.to_string()))
}
