//! Run configuration, read from an optional JSON file and overridden by CLI flags

use crate::error::{ReconError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default number of divergences echoed to the console when no report is written
pub const DEFAULT_PREVIEW_LIMIT: usize = 10;

/// Settings for one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconConfig {
    /// Key columns; empty means positional alignment
    pub key_columns: Vec<String>,
    /// Where to write the report; a timestamped `.xlsx` name when unset
    pub report_path: Option<PathBuf>,
    /// Worksheet to read from spreadsheet inputs; the first sheet when unset
    pub sheet: Option<String>,
    /// Field delimiter for delimited inputs; sniffed when unset
    pub csv_delimiter: Option<char>,
    /// Extra tokens read as null in delimited inputs
    pub null_values: Vec<String>,
    /// Divergences printed when the report cannot be written
    pub preview_limit: usize,
    /// Show progress spinners
    pub show_progress: bool,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            key_columns: Vec::new(),
            report_path: None,
            sheet: None,
            csv_delimiter: None,
            null_values: Vec::new(),
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            show_progress: true,
        }
    }
}

impl ReconConfig {
    /// Load a configuration file, filling unspecified fields with defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReconError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            ReconError::config(format!("invalid config file '{}': {}", path.display(), e))
        })?;
        config.validate()?;

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.preview_limit == 0 {
            return Err(ReconError::config("preview_limit must be greater than 0"));
        }

        if let Some(delimiter) = self.csv_delimiter {
            if delimiter == '\n' || delimiter == '\r' || delimiter == '"' {
                return Err(ReconError::config(format!(
                    "csv_delimiter cannot be {:?}",
                    delimiter
                )));
            }
        }

        if self.key_columns.iter().any(|c| c.trim().is_empty()) {
            return Err(ReconError::config("key_columns must not contain blank names"));
        }

        Ok(())
    }

    /// Write this configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
