//! largest-files — reports the largest files on each local volume.
//!
//! Thin binary entry point. All logic lives in `largest-files-core`; this
//! file parses arguments, prints console progress and maps the outcome to
//! an exit code.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use largest_files_core::model::size::{format_count, format_size};
use largest_files_core::platform::{self, FixedRoots, VolumeSource};
use largest_files_core::scanner::{self, progress::ScanProgress};
use largest_files_core::ScanError;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.scan_config().context("invalid scan settings")?;
    let source: Box<dyn VolumeSource + Send + Sync> = if cli.roots.is_empty() {
        platform::system_volumes()
    } else {
        Box::new(FixedRoots::new(cli.roots.clone()))
    };

    if cli.list_volumes {
        print_volumes(source.as_ref())?;
        return Ok(ExitCode::SUCCESS);
    }

    tracing::info!("largest-files starting");
    println!("File Scanner");
    println!("----------------------------------------");

    let handle = scanner::start_scan(config, source)?;
    for message in handle.progress_rx.iter() {
        print_progress(message);
    }

    match handle.join() {
        Ok(summary) => {
            if summary.report_failures > 0 {
                eprintln!(
                    "Results for {} volume(s) could not be saved",
                    summary.report_failures
                );
            }
            println!(
                "\nScan complete. Results saved to {}",
                summary.report_path.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(ScanError::NoEligibleVolumes) => {
            eprintln!("No suitable drives found!");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err).context("scan failed"),
    }
}

/// Default level is `warn` so log lines do not drown the console output.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_volumes(source: &dyn VolumeSource) -> anyhow::Result<()> {
    let volumes = platform::classify_all(source).context("volume enumeration failed")?;
    for volume in volumes {
        let marker = if volume.kind.is_eligible() { "scan" } else { "skip" };
        println!("{marker}  {:<10} {}", volume.kind.label(), volume.id);
    }
    Ok(())
}

fn print_progress(message: ScanProgress) {
    match message {
        ScanProgress::VolumesFound { volumes } => {
            println!("[Drive Scan]");
            for volume in &volumes {
                println!("Including drive: {}", volume.id);
            }
        }
        ScanProgress::VolumeStarted { volume } => {
            println!("\nProcessing {}", volume.id);
        }
        ScanProgress::Update {
            volume,
            files_found,
            current_path,
        } => {
            tracing::trace!("{volume}: {files_found} files, at {current_path}");
        }
        ScanProgress::Skipped { .. } => {}
        ScanProgress::VolumeComplete {
            volume,
            files,
            bytes,
            skipped,
            duration,
        } => {
            println!(
                "Scanned {} in {:.1} seconds",
                volume.id,
                duration.as_secs_f64()
            );
            if files == 0 {
                println!("No files found");
            } else {
                println!("Found {} files ({})", format_count(files), format_size(bytes));
            }
            if skipped > 0 {
                println!("Skipped {} unreadable entries", format_count(skipped));
            }
        }
        ScanProgress::VolumeFailed { volume, message } => {
            println!("Error processing {volume}: {message}");
        }
        ScanProgress::ReportFailed { volume, message } => {
            println!("Failed to save results for {volume}: {message}");
        }
        ScanProgress::Complete { duration, volumes } => {
            tracing::info!(
                "{volumes} volume(s) processed in {:.1}s",
                duration.as_secs_f64()
            );
        }
    }
}
