/// Scan progress reporting — lightweight messages sent from the scan
/// thread to the console via a crossbeam channel.
use crate::platform::Volume;
use std::time::Duration;

/// Progress updates sent by the orchestrator.
///
/// Results themselves travel in the returned
/// [`ScanSummary`](crate::model::ScanSummary); these messages carry only
/// counters and status for display.
#[derive(Debug)]
pub enum ScanProgress {
    /// Enumeration finished; these volumes will be scanned, in order.
    VolumesFound { volumes: Vec<Volume> },
    /// A volume walk is starting.
    VolumeStarted { volume: Volume },
    /// Periodic running total within one volume.
    Update {
        volume: String,
        files_found: u64,
        current_path: String,
    },
    /// A node could not be read and was skipped.
    Skipped { path: String, message: String },
    /// A volume walk finished.
    VolumeComplete {
        volume: Volume,
        files: u64,
        bytes: u64,
        skipped: u64,
        duration: Duration,
    },
    /// A volume walk was aborted by the error policy.
    VolumeFailed { volume: String, message: String },
    /// The report block for a volume could not be written.
    ReportFailed { volume: String, message: String },
    /// All volumes processed.
    Complete { duration: Duration, volumes: usize },
}
