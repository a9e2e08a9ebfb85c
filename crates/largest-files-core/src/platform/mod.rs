/// Volume discovery — which storage volumes exist and which may be scanned.
///
/// The walker and selector never touch these APIs directly; they only see
/// the [`Volume`] values produced here. Each host gets its own
/// [`VolumeSource`] backend:
///
/// - [`DriveLetters`] — Windows logical drives (`cfg(windows)`).
/// - [`MountTable`] — Linux `/proc/self/mounts`.
/// - [`FixedRoots`] — explicit directories supplied by the user.
pub mod drives;
pub mod mounts;
pub mod roots;
pub mod volumes;

#[cfg(windows)]
pub use drives::DriveLetters;
pub use mounts::{MountEntry, MountTable};
pub use roots::FixedRoots;
pub use volumes::{classify_all, list_eligible_volumes, Volume, VolumeKind, VolumeSource};

/// The volume source for the current host.
pub fn system_volumes() -> Box<dyn VolumeSource + Send + Sync> {
    #[cfg(windows)]
    {
        Box::new(DriveLetters)
    }
    #[cfg(target_os = "linux")]
    {
        Box::new(MountTable::new())
    }
    #[cfg(not(any(windows, target_os = "linux")))]
    {
        Box::new(FixedRoots::new(vec![std::path::PathBuf::from("/")]))
    }
}
