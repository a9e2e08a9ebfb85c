/// Scan configuration — defaults, JSON file loading, validation.
use crate::analysis::top_files::{validate_limit, DEFAULT_TOP_K};
use crate::error::{ScanError, SelectError};
use crate::report::ReportFormat;
use crate::scanner::WalkOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default results file, created in the working directory.
pub const DEFAULT_OUTPUT: &str = "largest_files.txt";

/// Settings for one scan run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Files reported per volume.
    pub top_k: i64,
    /// Results file, truncated at scan start.
    pub output: PathBuf,
    pub format: ReportFormat,
    /// Walk volumes concurrently instead of one after another.
    pub parallel_volumes: bool,
    pub walk: WalkOptions,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            output: PathBuf::from(DEFAULT_OUTPUT),
            format: ReportFormat::Text,
            parallel_volumes: false,
            walk: WalkOptions::default(),
        }
    }
}

impl ScanConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ScanError> {
        let text = fs::read_to_string(path).map_err(|e| ScanError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ScanError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Reject settings that would fail only after volumes were walked.
    pub fn validate(&self) -> Result<(), SelectError> {
        validate_limit(self.top_k).map(|_| ())
    }
}
