//! Export service domain logic for the student tracker.
//!
//! Exports always contain every stored record, never the filtered view, as a
//! pretty-printed JSON array named `students_<YYYY-MM-DD>.json`. The JSON has
//! the same shape as the stored data, so an export can be dropped into a data
//! directory as `students.json`.

use anyhow::Result;
use chrono::NaiveDate;
use log::{error, info};
use shared::{ExportDataResponse, ExportToPathResponse, StudentRecord};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// File name for an export made on `date`
    pub fn export_filename(&self, date: NaiveDate) -> String {
        format!("students_{}.json", date.format("%Y-%m-%d"))
    }

    /// Serialize every record for download
    pub fn export_json(&self, records: &[StudentRecord], date: NaiveDate) -> Result<ExportDataResponse> {
        info!("📄 EXPORT: Exporting {} students as JSON", records.len());

        let json_content = serde_json::to_string_pretty(records)?;
        let response = ExportDataResponse {
            json_content,
            filename: self.export_filename(date),
            record_count: records.len(),
        };

        info!(
            "✅ EXPORT: Generated {} ({} bytes)",
            response.filename,
            response.json_content.len()
        );
        Ok(response)
    }

    /// Write the export into `custom_dir`, or the documents directory when none is given
    pub fn export_to_path(
        &self,
        records: &[StudentRecord],
        custom_dir: Option<&Path>,
        date: NaiveDate,
    ) -> Result<ExportToPathResponse> {
        let export = self.export_json(records, date)?;

        let export_dir = match custom_dir {
            Some(dir) => dir.to_path_buf(),
            None => match default_export_directory() {
                Some(dir) => dir,
                None => {
                    error!("❌ EXPORT: Could not determine default export directory");
                    return Ok(ExportToPathResponse {
                        success: false,
                        message: "Failed to determine export directory".to_string(),
                        file_path: String::new(),
                        record_count: 0,
                    });
                }
            },
        };

        if !export_dir.exists() {
            fs::create_dir_all(&export_dir)?;
        }

        let file_path = export_dir.join(&export.filename);
        fs::write(&file_path, &export.json_content)?;

        info!("✅ EXPORT: Wrote {} students to {}", export.record_count, file_path.display());
        Ok(ExportToPathResponse {
            success: true,
            message: format!("Exported {} students to {}", export.record_count, file_path.display()),
            file_path: file_path.to_string_lossy().to_string(),
            record_count: export.record_count,
        })
    }
}

fn default_export_directory() -> Option<PathBuf> {
    dirs::document_dir().or_else(dirs::home_dir)
}
