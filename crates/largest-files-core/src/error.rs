/// Error taxonomy for volume discovery, walking, selection and reporting.
///
/// Only enumeration failures and selector contract violations abort a
/// scan. Everything else is absorbed at the layer that produced it and
/// surfaces as a log line or a progress message.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The OS volume listing query failed; no volumes can be discovered.
#[derive(Debug, Error)]
pub enum EnumerationError {
    #[error("failed to read mount table {path}: {source}")]
    MountTable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("logical drive query failed: {0}")]
    Os(String),
}

/// A single volume could not be classified. The volume is treated as
/// ineligible and enumeration continues.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("volume {0} is not known to the volume source")]
    UnknownVolume(String),
    #[error("volume {0} has no root directory")]
    NoRootDirectory(String),
    #[error("could not inspect volume {id}: {source}")]
    Io {
        id: String,
        #[source]
        source: io::Error,
    },
}

/// A node could not be read while walking a tree.
#[derive(Debug, Error)]
#[error("{}: {message}", display_path(.path))]
pub struct WalkError {
    pub path: Option<PathBuf>,
    pub message: String,
}

impl WalkError {
    pub fn new(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<unknown path>".to_string())
}

impl From<jwalk::Error> for WalkError {
    fn from(err: jwalk::Error) -> Self {
        Self::new(err.path().map(|p| p.to_path_buf()), err.to_string())
    }
}

/// The top-K selector was called with a non-positive limit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("top-K limit must be a positive integer, got {0}")]
    InvalidLimit(i64),
}

/// Writing the results file failed.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot encode JSON report line: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot encode CSV report rows: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure of a whole scan, or of one volume within it.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Enumeration(#[from] EnumerationError),
    #[error("no eligible volumes found")]
    NoEligibleVolumes,
    #[error(transparent)]
    Selector(#[from] SelectError),
    #[error("walk of {volume} aborted at {source}")]
    Walk {
        volume: String,
        #[source]
        source: WalkError,
    },
    #[error("invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },
    #[error("failed to spawn scanner thread: {0}")]
    Spawn(#[source] io::Error),
    #[error("scanner thread panicked")]
    WorkerPanicked,
}
