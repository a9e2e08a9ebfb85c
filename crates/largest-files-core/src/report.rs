/// Results file writer.
///
/// The file is truncated once when the writer is created, then receives
/// one block per volume. Each block is rendered in memory and appended
/// with a single write while holding the writer's lock, so blocks from
/// different volumes never interleave.
///
/// Volumes that produced no files get no block. Appending never creates
/// the file, so a results file that could not be truncated fails every
/// append instead of collecting a partial report.
use crate::error::ReportError;
use crate::model::size::format_mb;
use crate::model::{FileEntry, ScanResult};
use crate::platform::VolumeKind;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CSV_HEADER: &[u8] = b"volume,path,size_bytes\n";

/// Layout of the results file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// `Largest files on C:` blocks with sizes in MB.
    #[default]
    Text,
    /// One JSON object per volume per line.
    Json,
    /// `volume,path,size_bytes` rows.
    Csv,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" | "jsonl" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown report format '{other}' (expected text, json or csv)")),
        }
    }
}

/// One volume's JSON line.
#[derive(Serialize)]
struct VolumeRecord<'a> {
    volume: &'a str,
    kind: VolumeKind,
    scanned_at: DateTime<Local>,
    files_examined: u64,
    total_bytes: u64,
    skipped: u64,
    elapsed_ms: u64,
    top: &'a [FileEntry],
}

/// Appends per-volume blocks to the results file.
pub struct ReportWriter {
    path: PathBuf,
    format: ReportFormat,
    started_at: DateTime<Local>,
    lock: Mutex<()>,
}

impl ReportWriter {
    /// A writer for `path`. Nothing is touched on disk until
    /// [`truncate`](Self::truncate) or [`append`](Self::append).
    pub fn new(path: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self {
            path: path.into(),
            format,
            started_at: Local::now(),
            lock: Mutex::new(()),
        }
    }

    /// Create or truncate the results file.
    pub fn create(path: impl Into<PathBuf>, format: ReportFormat) -> Result<Self, ReportError> {
        let writer = Self::new(path, format);
        writer.truncate()?;
        Ok(writer)
    }

    /// Empty the results file, creating it if needed. CSV output gets its
    /// header row here.
    pub fn truncate(&self) -> Result<(), ReportError> {
        let _guard = self.lock.lock();
        let mut file = File::create(&self.path).map_err(|source| io_error(&self.path, source))?;
        if self.format == ReportFormat::Csv {
            file.write_all(CSV_HEADER)
                .map_err(|source| io_error(&self.path, source))?;
        }
        Ok(())
    }

    /// Append the block for one volume.
    ///
    /// Returns `false` when the volume had no entries and nothing was written.
    pub fn append(&self, result: &ScanResult) -> Result<bool, ReportError> {
        let block = self.render(result)?;
        if block.is_empty() {
            return Ok(false);
        }

        let _guard = self.lock.lock();
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|source| io_error(&self.path, source))?;
        file.write_all(&block)
            .map_err(|source| io_error(&self.path, source))?;
        Ok(true)
    }

    /// Render the block for one volume without writing it.
    pub fn render(&self, result: &ScanResult) -> Result<Vec<u8>, ReportError> {
        if result.top.is_empty() {
            return Ok(Vec::new());
        }
        match self.format {
            ReportFormat::Text => Ok(render_text(result).into_bytes()),
            ReportFormat::Json => {
                let record = VolumeRecord {
                    volume: result.volume.short_id(),
                    kind: result.volume.kind,
                    scanned_at: self.started_at,
                    files_examined: result.files_examined,
                    total_bytes: result.total_bytes,
                    skipped: result.skipped,
                    elapsed_ms: u64::try_from(result.elapsed.as_millis()).unwrap_or(u64::MAX),
                    top: &result.top,
                };
                let mut line = serde_json::to_vec(&record)?;
                line.push(b'\n');
                Ok(line)
            }
            ReportFormat::Csv => {
                let mut wtr = csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(Vec::new());
                let volume = result.volume.short_id();
                for entry in &result.top {
                    let size = entry.size.to_string();
                    wtr.write_record([volume, entry.path.as_str(), size.as_str()])?;
                }
                wtr.into_inner()
                    .map_err(|e| io_error(&self.path, e.into_error()))
            }
        }
    }
}

fn render_text(result: &ScanResult) -> String {
    let mut block = String::with_capacity(64 + result.top.len() * 96);
    // Writing to a String cannot fail.
    let _ = writeln!(block, "Largest files on {}:", result.volume.short_id());
    for entry in &result.top {
        let _ = writeln!(block, "{}: {}", entry.path, format_mb(entry.size));
    }
    block.push('\n');
    block
}

fn io_error(path: &Path, source: io::Error) -> ReportError {
    ReportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Volume;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn result(id: &str, entries: &[(&str, u64)]) -> ScanResult {
        let top: Vec<FileEntry> = entries
            .iter()
            .map(|&(path, size)| FileEntry::new(path, size))
            .collect();
        ScanResult {
            volume: Volume::new(id, VolumeKind::Fixed),
            files_examined: top.len() as u64,
            total_bytes: top.iter().map(|e| e.size).sum(),
            skipped: 0,
            elapsed: Duration::from_millis(1_500),
            top,
        }
    }

    #[test]
    fn text_blocks_follow_the_classic_layout() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("largest_files.txt");
        let writer = ReportWriter::create(&path, ReportFormat::Text).unwrap();

        writer
            .append(&result(
                "C:\\",
                &[("C:\\big.iso", 3 * 1_048_576), ("C:\\notes.txt", 524_288)],
            ))
            .unwrap();
        writer
            .append(&result("D:\\", &[("D:\\a.bin", 1_048_576)]))
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Largest files on C::\nC:\\big.iso: 3.00 MB\nC:\\notes.txt: 0.50 MB\n\n\
             Largest files on D::\nD:\\a.bin: 1.00 MB\n\n"
        );
    }

    #[test]
    fn empty_volume_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.txt");
        let writer = ReportWriter::create(&path, ReportFormat::Text).unwrap();

        assert!(!writer.append(&result("E:\\", &[])).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn create_truncates_previous_contents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.txt");
        fs::write(&path, "stale results\n").unwrap();

        ReportWriter::create(&path, ReportFormat::Text).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn json_lines_carry_metadata() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.jsonl");
        let writer = ReportWriter::create(&path, ReportFormat::Json).unwrap();
        writer
            .append(&result("/data", &[("/data/x", 10), ("/data/y", 5)]))
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let line: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(line["volume"], "/data");
        assert_eq!(line["kind"], "fixed");
        assert_eq!(line["files_examined"], 2);
        assert_eq!(line["elapsed_ms"], 1_500);
        assert_eq!(line["top"][0]["path"], "/data/x");
        assert_eq!(line["top"][1]["size"], 5);
    }

    #[test]
    fn csv_rows_are_quoted_when_needed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.csv");
        let writer = ReportWriter::create(&path, ReportFormat::Csv).unwrap();
        writer
            .append(&result("/data", &[("/data/a,b.txt", 42)]))
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "volume,path,size_bytes\n/data,\"/data/a,b.txt\",42\n"
        );
    }

    #[test]
    fn append_fails_when_the_file_disappears() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.txt");
        let writer = ReportWriter::create(&path, ReportFormat::Text).unwrap();
        fs::remove_file(&path).unwrap();

        let err = writer.append(&result("C:\\", &[("C:\\x", 1)])).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }

    #[test]
    fn unwritable_location_fails_on_truncate_and_append() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing-dir").join("out.txt");
        let writer = ReportWriter::new(&path, ReportFormat::Text);

        assert!(matches!(writer.truncate(), Err(ReportError::Io { .. })));
        let err = writer.append(&result("C:\\", &[("C:\\x", 1)])).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!("TEXT".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert_eq!("jsonl".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("csv".parse::<ReportFormat>().unwrap(), ReportFormat::Csv);
        assert!("xml".parse::<ReportFormat>().is_err());
    }
}
