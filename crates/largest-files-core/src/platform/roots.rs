/// Explicit scan roots supplied by the user instead of system volumes.
use crate::error::{ClassificationError, EnumerationError};
use crate::platform::{VolumeKind, VolumeSource};
use std::fs;
use std::path::PathBuf;

/// A fixed list of directories, each treated as its own volume.
///
/// Existing directories classify as [`VolumeKind::Fixed`]; anything else is
/// [`VolumeKind::Unknown`] and therefore skipped.
#[derive(Debug, Clone)]
pub struct FixedRoots {
    roots: Vec<PathBuf>,
}

impl FixedRoots {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl VolumeSource for FixedRoots {
    fn list_volumes(&self) -> Result<Vec<String>, EnumerationError> {
        Ok(self
            .roots
            .iter()
            .map(|root| root.to_string_lossy().into_owned())
            .collect())
    }

    fn classify(&self, id: &str) -> Result<VolumeKind, ClassificationError> {
        match fs::metadata(id) {
            Ok(meta) if meta.is_dir() => Ok(VolumeKind::Fixed),
            Ok(_) => Ok(VolumeKind::Unknown),
            Err(source) => Err(ClassificationError::Io {
                id: id.to_string(),
                source,
            }),
        }
    }
}
