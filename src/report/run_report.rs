//! JSON export of a conversion run

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{ConversionReport, Field, Filters, SortDirection, Summary};

/// Metadata about the run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the export (RFC 3339)
    pub timestamp: String,
    pub manaconv_version: String,
    pub input_file: String,
    /// Output CSV, when one was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
}

/// One applied sort, in order
#[derive(Serialize)]
pub struct SortStep {
    pub field: Field,
    pub direction: SortDirection,
}

/// Complete run report
#[derive(Serialize)]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub conversion: ConversionReport,
    pub filters: Filters,
    pub sorts: Vec<SortStep>,
    pub displayed: Summary,
}

impl RunReport {
    pub fn new(
        input_file: &Path,
        output_file: Option<&Path>,
        conversion: ConversionReport,
        filters: Filters,
        sorts: Vec<SortStep>,
        displayed: Summary,
    ) -> Self {
        Self {
            metadata: RunMetadata {
                timestamp: Utc::now().to_rfc3339(),
                manaconv_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: input_file.display().to_string(),
                output_file: output_file.map(|p| p.display().to_string()),
            },
            conversion,
            filters,
            sorts,
            displayed,
        }
    }
}

/// Write the report as pretty-printed JSON
pub fn export_run_report(report: &RunReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write run report: {}", path.display()))?;
    Ok(())
}
