/// Scanner module — sequences volume discovery, walking, top-K selection
/// and report writing.
///
/// Volumes are processed in the order the [`VolumeSource`] lists them.
/// By default each volume completes and is written before the next begins;
/// with [`ScanConfig::parallel_volumes`] the walks run on rayon workers and
/// the results are gathered back into enumeration order before the report
/// is written.
///
/// Only enumeration failures and an invalid top-K limit abort a scan. A
/// volume whose walk is aborted by [`ErrorPolicy::Abort`], or whose report
/// block cannot be written, is logged and the scan moves on. A results file
/// that cannot be created does not stop the walks either; every block is
/// then counted as a report failure.
pub mod progress;
pub mod walk;

pub use walk::{ErrorPolicy, TreeWalker, Walk, WalkOptions, WalkStats};

use crate::analysis::TopK;
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::model::{ScanResult, ScanSummary};
use crate::platform::{list_eligible_volumes, Volume, VolumeSource};
use crate::report::ReportWriter;
use progress::ScanProgress;

use chrono::Local;
use crossbeam_channel::{Receiver, Sender};
use rayon::prelude::*;
use std::thread;
use std::time::Instant;
use tracing::{info, warn};

/// Maximum number of progress messages that may queue up in the channel.
///
/// The console drains it continuously; if it falls behind, the scanner
/// blocks on `send` rather than buffering without bound.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// Entries between two `ScanProgress::Update` messages.
const UPDATE_INTERVAL: u64 = 5_000;

/// Handle to a scan running on a background thread.
pub struct ScanHandle {
    /// Receiver for progress updates. Disconnects when the scan ends.
    pub progress_rx: Receiver<ScanProgress>,
    thread: thread::JoinHandle<Result<ScanSummary, ScanError>>,
}

impl ScanHandle {
    /// Wait for the scan to finish.
    pub fn join(self) -> Result<ScanSummary, ScanError> {
        self.thread.join().map_err(|_| ScanError::WorkerPanicked)?
    }
}

/// Start [`run_scan`] on a background thread.
pub fn start_scan(
    config: ScanConfig,
    source: Box<dyn VolumeSource + Send>,
) -> Result<ScanHandle, ScanError> {
    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<ScanProgress>(PROGRESS_CHANNEL_CAPACITY);

    let thread = thread::Builder::new()
        .name("largest-files-scanner".into())
        .spawn(move || run_scan(source.as_ref(), &config, Some(&progress_tx)))
        .map_err(ScanError::Spawn)?;

    Ok(ScanHandle {
        progress_rx,
        thread,
    })
}

/// Enumerate eligible volumes, scan each, and write the report.
///
/// Fails with [`ScanError::NoEligibleVolumes`] when the source lists no
/// fixed or removable volume. The report file is only touched once at
/// least one volume is known.
pub fn run_scan(
    source: &dyn VolumeSource,
    config: &ScanConfig,
    progress: Option<&Sender<ScanProgress>>,
) -> Result<ScanSummary, ScanError> {
    config.validate()?;
    let started_at = Local::now();
    let start = Instant::now();

    let volumes = list_eligible_volumes(source)?;
    emit(
        progress,
        ScanProgress::VolumesFound {
            volumes: volumes.clone(),
        },
    );
    if volumes.is_empty() {
        warn!("No eligible volumes found");
        return Err(ScanError::NoEligibleVolumes);
    }
    info!("Scanning {} volume(s)", volumes.len());

    let report = ReportWriter::new(&config.output, config.format);
    if let Err(err) = report.truncate() {
        warn!("Results file unavailable, scanning anyway: {err}");
    }
    let mut summary = ScanSummary {
        started_at,
        results: Vec::with_capacity(volumes.len()),
        failed: Vec::new(),
        report_failures: 0,
        report_path: config.output.clone(),
        duration: Default::default(),
    };

    if config.parallel_volumes {
        for outcome in scan_volumes(&volumes, config, progress) {
            record(outcome, &report, &mut summary, progress)?;
        }
    } else {
        for volume in &volumes {
            let outcome = scan_volume(volume, config, progress);
            record(outcome, &report, &mut summary, progress)?;
        }
    }

    summary.duration = start.elapsed();
    info!(
        "Scan complete: {} volume(s) in {:?}",
        summary.results.len(),
        summary.duration
    );
    emit(
        progress,
        ScanProgress::Complete {
            duration: summary.duration,
            volumes: volumes.len(),
        },
    );
    Ok(summary)
}

/// Scan every volume concurrently on rayon workers and return one outcome
/// per volume, in input order. A failing volume only affects its own slot.
pub fn scan_volumes(
    volumes: &[Volume],
    config: &ScanConfig,
    progress: Option<&Sender<ScanProgress>>,
) -> Vec<Result<ScanResult, ScanError>> {
    volumes
        .par_iter()
        .map(|volume| scan_volume(volume, config, progress))
        .collect()
}

/// Walk one volume and select its largest files.
pub fn scan_volume(
    volume: &Volume,
    config: &ScanConfig,
    progress: Option<&Sender<ScanProgress>>,
) -> Result<ScanResult, ScanError> {
    let mut top = TopK::new(config.top_k)?;

    info!("Processing {}", volume.id);
    emit(
        progress,
        ScanProgress::VolumeStarted {
            volume: volume.clone(),
        },
    );
    let start = Instant::now();

    let mut walk = TreeWalker::new(config.walk.clone()).walk(&volume.root);
    if let Some(tx) = progress {
        let tx = tx.clone();
        walk = walk.on_skip(move |err| {
            let _ = tx.send(ScanProgress::Skipped {
                path: err
                    .path
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                message: err.message.clone(),
            });
        });
    }

    for entry in walk.by_ref() {
        if (top.seen() + 1) % UPDATE_INTERVAL == 0 {
            emit(
                progress,
                ScanProgress::Update {
                    volume: volume.id.clone(),
                    files_found: top.seen() + 1,
                    current_path: entry.path.clone(),
                },
            );
        }
        top.push(entry);
    }

    let stats = walk.finish().map_err(|source| {
        warn!("Walk of {} aborted: {source}", volume.id);
        ScanError::Walk {
            volume: volume.id.clone(),
            source,
        }
    })?;
    let elapsed = start.elapsed();

    info!(
        "Scanned {} in {:.1} seconds: {} files, {} skipped",
        volume.id,
        elapsed.as_secs_f64(),
        stats.files,
        stats.skipped
    );
    emit(
        progress,
        ScanProgress::VolumeComplete {
            volume: volume.clone(),
            files: stats.files,
            bytes: stats.bytes,
            skipped: stats.skipped,
            duration: elapsed,
        },
    );

    Ok(ScanResult {
        volume: volume.clone(),
        top: top.into_sorted_vec(),
        files_examined: stats.files,
        total_bytes: stats.bytes,
        skipped: stats.skipped,
        elapsed,
    })
}

/// Fold one volume outcome into the summary, writing its report block.
fn record(
    outcome: Result<ScanResult, ScanError>,
    report: &ReportWriter,
    summary: &mut ScanSummary,
    progress: Option<&Sender<ScanProgress>>,
) -> Result<(), ScanError> {
    match outcome {
        Ok(result) => {
            if let Err(err) = report.append(&result) {
                warn!("Results for {} were not saved: {err}", result.volume.id);
                summary.report_failures += 1;
                emit(
                    progress,
                    ScanProgress::ReportFailed {
                        volume: result.volume.id.clone(),
                        message: err.to_string(),
                    },
                );
            }
            summary.results.push(result);
            Ok(())
        }
        Err(ScanError::Walk { volume, source }) => {
            emit(
                progress,
                ScanProgress::VolumeFailed {
                    volume: volume.clone(),
                    message: source.to_string(),
                },
            );
            summary.failed.push(ScanError::Walk { volume, source });
            Ok(())
        }
        Err(other) => Err(other),
    }
}

fn emit(progress: Option<&Sender<ScanProgress>>, message: ScanProgress) {
    if let Some(tx) = progress {
        let _ = tx.send(message);
    }
}
