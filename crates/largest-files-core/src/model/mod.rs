/// Data model for a scan pass.
///
/// Entries are produced by the walker, selected by the top-K analysis and
/// bundled per volume into a [`ScanResult`].
pub mod entry;
pub mod scan_result;
pub mod size;

pub use entry::FileEntry;
pub use scan_result::{ScanResult, ScanSummary};
