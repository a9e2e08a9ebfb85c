/// Drive-letter volume source using the Windows API.
///
/// Drives come from the `GetLogicalDrives` bitmap (bit 0 = `A:`), and each
/// root is classified with `GetDriveTypeW`. The bitmap decoding and type
/// mapping are plain functions so they can be tested on any host.
use crate::platform::VolumeKind;

// Drive type constants from the Windows API.
const DRIVE_NO_ROOT_DIR_VAL: u32 = 1;
const DRIVE_REMOVABLE_VAL: u32 = 2;
const DRIVE_FIXED_VAL: u32 = 3;
const DRIVE_REMOTE_VAL: u32 = 4;
const DRIVE_CDROM_VAL: u32 = 5;
const DRIVE_RAMDISK_VAL: u32 = 6;

/// Expand a logical drive bitmap into drive roots (`"C:\"`), `A:` first.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn drive_roots_from_mask(mask: u32) -> Vec<String> {
    (b'A'..=b'Z')
        .filter(|letter| mask & (1 << (letter - b'A')) != 0)
        .map(|letter| format!("{}:\\", letter as char))
        .collect()
}

/// Map a `GetDriveTypeW` result onto [`VolumeKind`].
///
/// Returns `None` for `DRIVE_NO_ROOT_DIR`: the path is not a volume root.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn kind_from_drive_type(raw: u32) -> Option<VolumeKind> {
    match raw {
        DRIVE_NO_ROOT_DIR_VAL => None,
        DRIVE_FIXED_VAL => Some(VolumeKind::Fixed),
        DRIVE_REMOVABLE_VAL => Some(VolumeKind::Removable),
        DRIVE_REMOTE_VAL => Some(VolumeKind::Network),
        DRIVE_CDROM_VAL => Some(VolumeKind::Optical),
        DRIVE_RAMDISK_VAL => Some(VolumeKind::Ram),
        // DRIVE_UNKNOWN (0) and any value newer than this table.
        _ => Some(VolumeKind::Unknown),
    }
}

#[cfg(windows)]
pub use win::DriveLetters;

#[cfg(windows)]
mod win {
    use super::{drive_roots_from_mask, kind_from_drive_type};
    use crate::error::{ClassificationError, EnumerationError};
    use crate::platform::{VolumeKind, VolumeSource};
    use windows::core::PCWSTR;
    use windows::Win32::Storage::FileSystem::{GetDriveTypeW, GetLogicalDrives};

    /// Logical drives `A:` through `Z:`.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct DriveLetters;

    impl VolumeSource for DriveLetters {
        fn list_volumes(&self) -> Result<Vec<String>, EnumerationError> {
            let mask = unsafe { GetLogicalDrives() };
            if mask == 0 {
                let err = windows::core::Error::from_win32();
                tracing::warn!("GetLogicalDrives returned 0: {err}");
                return Err(EnumerationError::Os(err.to_string()));
            }
            Ok(drive_roots_from_mask(mask))
        }

        fn classify(&self, id: &str) -> Result<VolumeKind, ClassificationError> {
            let root_wide: Vec<u16> = id.encode_utf16().chain(std::iter::once(0)).collect();
            let raw_type = unsafe { GetDriveTypeW(PCWSTR(root_wide.as_ptr())) };
            kind_from_drive_type(raw_type)
                .ok_or_else(|| ClassificationError::NoRootDirectory(id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_expands_in_letter_order() {
        // Bits for A:, C:, Z:.
        let mask = 1 | (1 << 2) | (1 << 25);
        assert_eq!(drive_roots_from_mask(mask), vec!["A:\\", "C:\\", "Z:\\"]);
    }

    #[test]
    fn empty_mask_yields_no_drives() {
        assert!(drive_roots_from_mask(0).is_empty());
    }

    #[test]
    fn drive_types_map_to_kinds() {
        assert_eq!(kind_from_drive_type(3), Some(VolumeKind::Fixed));
        assert_eq!(kind_from_drive_type(2), Some(VolumeKind::Removable));
        assert_eq!(kind_from_drive_type(4), Some(VolumeKind::Network));
        assert_eq!(kind_from_drive_type(5), Some(VolumeKind::Optical));
        assert_eq!(kind_from_drive_type(6), Some(VolumeKind::Ram));
        assert_eq!(kind_from_drive_type(0), Some(VolumeKind::Unknown));
        assert_eq!(kind_from_drive_type(42), Some(VolumeKind::Unknown));
        assert_eq!(kind_from_drive_type(1), None);
    }
}
