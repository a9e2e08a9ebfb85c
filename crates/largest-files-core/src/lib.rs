/// largest-files core — volume discovery, tree walking and top-K selection.
///
/// This crate contains all scanning logic with no terminal dependencies.
///
/// # Modules
///
/// - [`platform`] — Volume enumeration behind the [`platform::VolumeSource`] trait.
/// - [`scanner`] — Tree walker, orchestration and progress reporting.
/// - [`analysis`] — Top-K largest file selection.
/// - [`model`] — File entries, per-volume results and size formatting.
/// - [`report`] — The results file writer.
/// - [`config`] — Scan settings.
/// - [`error`] — Error types.
pub mod analysis;
pub mod config;
pub mod error;
pub mod model;
pub mod platform;
pub mod report;
pub mod scanner;

pub use config::ScanConfig;
pub use error::ScanError;
pub use model::{FileEntry, ScanResult, ScanSummary};
pub use platform::{Volume, VolumeKind, VolumeSource};
