/// Volume model and the capability interface every platform backend implements.
use crate::error::{ClassificationError, EnumerationError};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// Storage classification of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeKind {
    Fixed,
    Removable,
    Network,
    Optical,
    Ram,
    Unknown,
}

impl VolumeKind {
    /// Only local fixed and removable storage is scanned.
    pub fn is_eligible(self) -> bool {
        matches!(self, Self::Fixed | Self::Removable)
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Fixed => "Fixed",
            Self::Removable => "Removable",
            Self::Network => "Network",
            Self::Optical => "Optical",
            Self::Ram => "RAM disk",
            Self::Unknown => "Unknown",
        }
    }
}

/// A discovered volume. Immutable for the lifetime of one scan pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Volume {
    /// Identifier as reported by the source, e.g. `C:\` or `/mnt/data`.
    pub id: String,
    /// Directory the walker starts from.
    pub root: PathBuf,
    pub kind: VolumeKind,
}

impl Volume {
    pub fn new(id: impl Into<String>, kind: VolumeKind) -> Self {
        let id = id.into();
        Self {
            root: PathBuf::from(&id),
            id,
            kind,
        }
    }

    /// Short display form used in report headers: `C:\` becomes `C:`,
    /// `/mnt/usb/` becomes `/mnt/usb`, `/` stays `/`.
    pub fn short_id(&self) -> &str {
        let trimmed = self.id.trim_end_matches(['\\', '/']);
        if trimmed.is_empty() {
            &self.id
        } else {
            trimmed
        }
    }
}

/// Boundary to the operating system's volume queries.
pub trait VolumeSource {
    /// Every volume identifier currently known to the host.
    fn list_volumes(&self) -> Result<Vec<String>, EnumerationError>;

    /// Storage type of one volume.
    fn classify(&self, id: &str) -> Result<VolumeKind, ClassificationError>;
}

/// List and classify every volume the source knows about, in source order.
///
/// A volume that cannot be classified is reported as [`VolumeKind::Unknown`]
/// rather than aborting the listing.
pub fn classify_all(source: &dyn VolumeSource) -> Result<Vec<Volume>, EnumerationError> {
    let ids = source.list_volumes()?;
    let volumes = ids
        .into_iter()
        .map(|id| {
            let kind = match source.classify(&id) {
                Ok(kind) => kind,
                Err(err) => {
                    debug!("Treating {id} as unknown: {err}");
                    VolumeKind::Unknown
                }
            };
            Volume::new(id, kind)
        })
        .collect();
    Ok(volumes)
}

/// Volumes eligible for scanning (fixed or removable), in source order.
///
/// An empty result is not an error; the caller decides whether it is fatal.
pub fn list_eligible_volumes(source: &dyn VolumeSource) -> Result<Vec<Volume>, EnumerationError> {
    let volumes: Vec<Volume> = classify_all(source)?
        .into_iter()
        .filter(|v| {
            let eligible = v.kind.is_eligible();
            if eligible {
                debug!("Including volume {} ({})", v.id, v.kind.label());
            } else {
                debug!("Skipping volume {} ({})", v.id, v.kind.label());
            }
            eligible
        })
        .collect();
    Ok(volumes)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory source: ids with either a kind or a classification failure.
    struct FakeSource {
        volumes: Vec<(&'static str, Option<VolumeKind>)>,
        fail_listing: bool,
    }

    impl VolumeSource for FakeSource {
        fn list_volumes(&self) -> Result<Vec<String>, EnumerationError> {
            if self.fail_listing {
                return Err(EnumerationError::Os("bitmap query failed".into()));
            }
            Ok(self.volumes.iter().map(|(id, _)| id.to_string()).collect())
        }

        fn classify(&self, id: &str) -> Result<VolumeKind, ClassificationError> {
            self.volumes
                .iter()
                .find(|(v, _)| *v == id)
                .and_then(|(_, kind)| *kind)
                .ok_or_else(|| ClassificationError::NoRootDirectory(id.to_string()))
        }
    }

    #[test]
    fn only_fixed_and_removable_are_eligible() {
        let source = FakeSource {
            volumes: vec![
                ("A:\\", Some(VolumeKind::Removable)),
                ("C:\\", Some(VolumeKind::Fixed)),
                ("D:\\", Some(VolumeKind::Optical)),
                ("N:\\", Some(VolumeKind::Network)),
                ("R:\\", Some(VolumeKind::Ram)),
                ("U:\\", Some(VolumeKind::Unknown)),
            ],
            fail_listing: false,
        };

        let ids: Vec<String> = list_eligible_volumes(&source)
            .unwrap()
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec!["A:\\", "C:\\"]);
    }

    #[test]
    fn classification_failure_excludes_only_that_volume() {
        let source = FakeSource {
            volumes: vec![
                ("C:\\", Some(VolumeKind::Fixed)),
                ("E:\\", None),
                ("F:\\", Some(VolumeKind::Removable)),
            ],
            fail_listing: false,
        };

        let eligible = list_eligible_volumes(&source).unwrap();
        assert_eq!(eligible.len(), 2);
        assert_eq!(eligible[1].id, "F:\\");

        let all = classify_all(&source).unwrap();
        assert_eq!(all[1].kind, VolumeKind::Unknown);
    }

    #[test]
    fn no_eligible_volumes_is_not_an_error() {
        let source = FakeSource {
            volumes: vec![("N:\\", Some(VolumeKind::Network))],
            fail_listing: false,
        };
        assert!(list_eligible_volumes(&source).unwrap().is_empty());
    }

    #[test]
    fn listing_failure_propagates() {
        let source = FakeSource {
            volumes: vec![],
            fail_listing: true,
        };
        assert!(matches!(
            list_eligible_volumes(&source),
            Err(EnumerationError::Os(_))
        ));
    }

    #[test]
    fn short_id_trims_trailing_separators() {
        assert_eq!(Volume::new("C:\\", VolumeKind::Fixed).short_id(), "C:");
        assert_eq!(Volume::new("/mnt/usb/", VolumeKind::Removable).short_id(), "/mnt/usb");
        assert_eq!(Volume::new("/", VolumeKind::Fixed).short_id(), "/");
    }
}
