use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::clean::CleanOptions;

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Settings read from an optional JSON file; every field has a default.
///
/// ```json
/// { "data_path": "encounters.csv", "histogram_bins": 30 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Source loaded at startup when none is given on the command line.
    pub data_path: Option<PathBuf>,
    /// chrono pattern for `Date_of_Admission` / `Discharge_Date`.
    pub date_format: String,
    /// Bins per distribution histogram.
    pub histogram_bins: usize,
    /// Rows shown in the data preview.
    pub preview_rows: usize,
    /// Suggested name for the CSV download.
    pub export_file_name: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            date_format: CleanOptions::default().date_format,
            histogram_bins: 20,
            preview_rows: 5,
            export_file_name: "filtered_healthcare_data.csv".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.histogram_bins > 0, "histogram_bins must be at least 1");
        anyhow::ensure!(!self.date_format.is_empty(), "date_format must not be empty");
        Ok(())
    }

    pub fn clean_options(&self) -> CleanOptions {
        CleanOptions {
            date_format: self.date_format.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(file, "{json}").unwrap();
        file
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = write(r#"{ "histogram_bins": 30, "data_path": "encounters.csv" }"#);
        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.histogram_bins, 30);
        assert_eq!(config.data_path, Some(PathBuf::from("encounters.csv")));
        assert_eq!(config.date_format, "%d-%m-%Y");
        assert_eq!(config.preview_rows, 5);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let file = write(r#"{ "bins": 30 }"#);
        assert!(DashboardConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn zero_bins_are_rejected() {
        let file = write(r#"{ "histogram_bins": 0 }"#);
        let err = DashboardConfig::from_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("histogram_bins"));
    }
}
