/// Per-volume and whole-run scan outcomes.
use crate::model::FileEntry;
use crate::platform::Volume;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of walking one volume.
///
/// `top` is ordered by size descending and never holds more than the
/// configured limit or more than `files_examined` entries.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub volume: Volume,
    pub top: Vec<FileEntry>,
    /// Number of regular files seen on the volume.
    pub files_examined: u64,
    /// Sum of the sizes of every file seen.
    pub total_bytes: u64,
    /// Nodes that could not be read and were skipped.
    pub skipped: u64,
    pub elapsed: Duration,
}

impl ScanResult {
    /// True when the walk found no regular files.
    ///
    /// Such volumes are still returned to callers; the report file gets
    /// no block for them.
    pub fn is_empty(&self) -> bool {
        self.files_examined == 0
    }
}

/// Everything a completed [`run_scan`](crate::scanner::run_scan) produced.
#[derive(Debug)]
pub struct ScanSummary {
    pub started_at: DateTime<Local>,
    /// Successful volumes, in enumeration order.
    pub results: Vec<ScanResult>,
    /// Volumes whose walk was aborted by [`ErrorPolicy::Abort`](crate::scanner::ErrorPolicy).
    pub failed: Vec<crate::error::ScanError>,
    /// Volumes whose report block could not be written.
    pub report_failures: u64,
    pub report_path: PathBuf,
    pub duration: Duration,
}
