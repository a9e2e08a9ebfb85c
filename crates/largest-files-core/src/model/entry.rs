/// A single regular file discovered during traversal.
use serde::Serialize;

/// One regular file: absolute path plus size in bytes.
///
/// Created by the walker and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Absolute path, lossily converted to UTF-8.
    pub path: String,
    /// File size in bytes.
    pub size: u64,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}
