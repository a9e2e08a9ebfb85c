//! Command-line arguments.
//!
//! Flags override values from the optional `--config` JSON file, which in
//! turn override the built-in defaults.

use clap::{ArgAction, Parser};
use largest_files_core::report::ReportFormat;
use largest_files_core::scanner::ErrorPolicy;
use largest_files_core::{ScanConfig, ScanError};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "largest-files", version)]
#[command(about = "List the largest files on every fixed and removable volume")]
pub struct Cli {
    /// Files to report per volume [default: 100]
    #[arg(short = 'n', long = "top", env = "LARGEST_FILES_TOP", allow_negative_numbers = true)]
    pub top: Option<i64>,

    /// Results file [default: largest_files.txt]
    #[arg(short, long, env = "LARGEST_FILES_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Results layout: text, json or csv
    #[arg(long)]
    pub format: Option<ReportFormat>,

    /// Scan a directory instead of the system volumes (repeatable)
    #[arg(long = "root", value_name = "PATH")]
    pub roots: Vec<PathBuf>,

    /// Walk all volumes at the same time
    #[arg(long)]
    pub parallel: bool,

    /// Directory-reading threads per volume (0 = one per CPU)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Skip hidden files and directories
    #[arg(long)]
    pub skip_hidden: bool,

    /// Give up on a volume at its first unreadable entry
    #[arg(long)]
    pub abort_on_error: bool,

    /// Descend into other filesystems mounted below a volume
    #[arg(long)]
    pub cross_filesystems: bool,

    /// JSON file with scan settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print every volume with its type and exit
    #[arg(long)]
    pub list_volumes: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Build the scan settings from the config file and flags.
    pub fn scan_config(&self) -> Result<ScanConfig, ScanError> {
        let mut config = match &self.config {
            Some(path) => ScanConfig::from_json_file(path)?,
            None => ScanConfig::default(),
        };

        if let Some(top) = self.top {
            config.top_k = top;
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(threads) = self.threads {
            config.walk.threads = threads;
        }
        if self.parallel {
            config.parallel_volumes = true;
        }
        if self.skip_hidden {
            config.walk.skip_hidden = true;
        }
        if self.abort_on_error {
            config.walk.on_error = ErrorPolicy::Abort;
        }
        if self.cross_filesystems {
            config.walk.stay_on_volume = false;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "largest-files",
            "--top",
            "5",
            "--format",
            "json",
            "--parallel",
            "--abort-on-error",
            "--root",
            "/a",
            "--root",
            "/b",
        ])
        .unwrap();

        let config = cli.scan_config().unwrap();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.format, ReportFormat::Json);
        assert!(config.parallel_volumes);
        assert_eq!(config.walk.on_error, ErrorPolicy::Abort);
        assert_eq!(cli.roots, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn negative_top_is_parsed_then_rejected() {
        let cli = Cli::try_parse_from(["largest-files", "--top", "-1"]).unwrap();
        assert!(matches!(cli.scan_config(), Err(ScanError::Selector(_))));
    }

    #[test]
    fn unknown_format_is_a_parse_error() {
        assert!(Cli::try_parse_from(["largest-files", "--format", "xml"]).is_err());
    }
}
