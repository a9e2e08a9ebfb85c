/// Mount-table volume source for Linux.
///
/// Volumes are the mount points listed in `/proc/self/mounts`. The
/// filesystem type decides the classification; block-device mounts are
/// fixed unless `/sys/block/<disk>/removable` says otherwise.
use crate::error::{ClassificationError, EnumerationError};
use crate::platform::{VolumeKind, VolumeSource};
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const PROC_MOUNTS: &str = "/proc/self/mounts";
const SYS_BLOCK: &str = "/sys/block";

const NETWORK_FS: &[&str] = &[
    "nfs", "nfs4", "cifs", "smb3", "smbfs", "sshfs", "fuse.sshfs", "9p", "afs", "ceph",
    "glusterfs", "fuse.glusterfs", "davfs", "fuse.rclone",
];
const OPTICAL_FS: &[&str] = &["iso9660", "udf"];
const RAM_FS: &[&str] = &["tmpfs", "ramfs"];
/// Disk-backed filesystems whose source is not a `/dev` node.
const POOLED_FS: &[&str] = &["zfs", "overlay"];

/// One line of the mount table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
}

/// Parse mount-table text (`fstab(5)` field layout).
///
/// Malformed lines are ignored. When a mount point appears more than once
/// the last mount wins, keeping the position of the first.
pub fn parse_mounts(text: &str) -> Vec<MountEntry> {
    let mut entries: Vec<MountEntry> = Vec::new();
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        let (Some(device), Some(mount_point), Some(fs_type)) =
            (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        let entry = MountEntry {
            device: unescape(device),
            mount_point: unescape(mount_point),
            fs_type: fs_type.to_string(),
        };
        match entries
            .iter_mut()
            .find(|e| e.mount_point == entry.mount_point)
        {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
    }
    entries
}

/// Decode the kernel's octal escapes (`\040` for space, `\011` for tab, ...).
fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && bytes.get(i + 1..i + 4).is_some_and(is_octal_escape) {
            let value = (bytes[i + 1] - b'0') * 64 + (bytes[i + 2] - b'0') * 8 + (bytes[i + 3] - b'0');
            out.push(value);
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn is_octal_escape(digits: &[u8]) -> bool {
    digits[0] <= b'3' && digits.iter().all(|d| (b'0'..=b'7').contains(d))
}

/// Volumes from the Linux mount table.
pub struct MountTable {
    mounts_path: PathBuf,
    sys_block: PathBuf,
    /// Entries from the most recent `list_volumes` call.
    entries: RwLock<Vec<MountEntry>>,
}

impl MountTable {
    pub fn new() -> Self {
        Self::with_paths(PROC_MOUNTS, SYS_BLOCK)
    }

    /// Read the table from `mounts_path` and removable flags from `sys_block`.
    pub fn with_paths(mounts_path: impl Into<PathBuf>, sys_block: impl Into<PathBuf>) -> Self {
        Self {
            mounts_path: mounts_path.into(),
            sys_block: sys_block.into(),
            entries: RwLock::new(Vec::new()),
        }
    }

    fn kind_of(&self, entry: &MountEntry) -> VolumeKind {
        let fs_type = entry.fs_type.as_str();
        if NETWORK_FS.contains(&fs_type) {
            VolumeKind::Network
        } else if OPTICAL_FS.contains(&fs_type) {
            VolumeKind::Optical
        } else if RAM_FS.contains(&fs_type) {
            VolumeKind::Ram
        } else if let Some(dev_name) = entry.device.strip_prefix("/dev/") {
            if self.is_removable(dev_name) {
                VolumeKind::Removable
            } else {
                VolumeKind::Fixed
            }
        } else if POOLED_FS.contains(&fs_type) {
            VolumeKind::Fixed
        } else {
            // proc, sysfs, cgroup2, devpts and other pseudo filesystems.
            VolumeKind::Unknown
        }
    }

    fn is_removable(&self, dev_name: &str) -> bool {
        let disk = parent_disk(&self.sys_block, dev_name);
        fs::read_to_string(self.sys_block.join(disk).join("removable"))
            .map(|flag| flag.trim() == "1")
            .unwrap_or(false)
    }
}

impl Default for MountTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a partition name to its whole-disk name under `/sys/block`:
/// `sdb1` → `sdb`, `nvme0n1p2` → `nvme0n1`, `mmcblk0p1` → `mmcblk0`.
fn parent_disk(sys_block: &Path, dev_name: &str) -> String {
    if sys_block.join(dev_name).exists() {
        return dev_name.to_string();
    }
    let without_digits = dev_name.trim_end_matches(|c: char| c.is_ascii_digit());
    if without_digits.len() == dev_name.len() {
        return dev_name.to_string();
    }
    match without_digits.strip_suffix('p') {
        Some(stem) if stem.ends_with(|c: char| c.is_ascii_digit()) => stem.to_string(),
        _ => without_digits.to_string(),
    }
}

impl VolumeSource for MountTable {
    fn list_volumes(&self) -> Result<Vec<String>, EnumerationError> {
        let text =
            fs::read_to_string(&self.mounts_path).map_err(|source| EnumerationError::MountTable {
                path: self.mounts_path.clone(),
                source,
            })?;
        let parsed = parse_mounts(&text);
        debug!(
            "Read {} mounts from {}",
            parsed.len(),
            self.mounts_path.display()
        );
        let ids = parsed.iter().map(|e| e.mount_point.clone()).collect();
        *self.entries.write() = parsed;
        Ok(ids)
    }

    fn classify(&self, id: &str) -> Result<VolumeKind, ClassificationError> {
        let entries = self.entries.read();
        entries
            .iter()
            .find(|e| e.mount_point == id)
            .map(|e| self.kind_of(e))
            .ok_or_else(|| ClassificationError::UnknownVolume(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
/dev/nvme0n1p2 / ext4 rw,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
tmpfs /run tmpfs rw,nosuid,nodev 0 0
/dev/sdb1 /media/usb\\040stick vfat rw,nosuid 0 0
server:/export /mnt/nfs nfs4 rw,relatime 0 0
/dev/sr0 /media/cdrom iso9660 ro 0 0
tank/home /home zfs rw 0 0
";

    /// Fake `/sys/block` with one removable and one fixed disk.
    fn fake_sys_block() -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (disk, flag) in [("nvme0n1", "0"), ("sdb", "1")] {
            let dir = tmp.path().join(disk);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("removable"), format!("{flag}\n")).unwrap();
        }
        tmp
    }

    fn table_from(text: &str, sys_block: &Path) -> (TempDir, MountTable) {
        let tmp = TempDir::new().unwrap();
        let mounts = tmp.path().join("mounts");
        fs::write(&mounts, text).unwrap();
        (tmp, MountTable::with_paths(mounts, sys_block))
    }

    #[test]
    fn parse_decodes_escapes_and_skips_malformed_lines() {
        let entries = parse_mounts("garbage\n/dev/sda1 /mnt/my\\040disk ext4 rw 0 0\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mount_point, "/mnt/my disk");
        assert_eq!(entries[0].fs_type, "ext4");
    }

    #[test]
    fn parse_keeps_last_mount_for_stacked_mount_points() {
        let entries = parse_mounts(
            "/dev/sda1 /data ext4 rw 0 0\n/dev/sdc1 /boot ext4 rw 0 0\ntmpfs /data tmpfs rw 0 0\n",
        );
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].mount_point, "/data");
        assert_eq!(entries[0].fs_type, "tmpfs");
    }

    #[test]
    fn unescape_leaves_plain_backslashes_alone() {
        assert_eq!(unescape("a\\b"), "a\\b");
        assert_eq!(unescape("tab\\011end"), "tab\tend");
        assert_eq!(unescape("trailing\\04"), "trailing\\04");
    }

    #[test]
    fn partition_names_resolve_to_disks() {
        let sys = fake_sys_block();
        assert_eq!(parent_disk(sys.path(), "sdb1"), "sdb");
        assert_eq!(parent_disk(sys.path(), "nvme0n1p2"), "nvme0n1");
        assert_eq!(parent_disk(sys.path(), "mmcblk0p1"), "mmcblk0");
        assert_eq!(parent_disk(sys.path(), "sdb"), "sdb");
    }

    #[test]
    fn classifies_by_filesystem_and_removable_flag() {
        let sys = fake_sys_block();
        let (_tmp, table) = table_from(SAMPLE, sys.path());

        let ids = table.list_volumes().unwrap();
        assert_eq!(ids.len(), 7);

        let kind = |id: &str| table.classify(id).unwrap();
        assert_eq!(kind("/"), VolumeKind::Fixed);
        assert_eq!(kind("/proc"), VolumeKind::Unknown);
        assert_eq!(kind("/run"), VolumeKind::Ram);
        assert_eq!(kind("/media/usb stick"), VolumeKind::Removable);
        assert_eq!(kind("/mnt/nfs"), VolumeKind::Network);
        assert_eq!(kind("/media/cdrom"), VolumeKind::Optical);
        assert_eq!(kind("/home"), VolumeKind::Fixed);
    }

    #[test]
    fn eligible_volumes_keep_table_order() {
        let sys = fake_sys_block();
        let (_tmp, table) = table_from(SAMPLE, sys.path());

        let ids: Vec<String> = crate::platform::list_eligible_volumes(&table)
            .unwrap()
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec!["/", "/media/usb stick", "/home"]);
    }

    #[test]
    fn unreadable_table_is_an_enumeration_error() {
        let table = MountTable::with_paths("/nonexistent/mounts", "/nonexistent/block");
        assert!(matches!(
            table.list_volumes(),
            Err(EnumerationError::MountTable { .. })
        ));
    }

    #[test]
    fn classify_before_listing_is_a_classification_error() {
        let table = MountTable::with_paths("/nonexistent/mounts", "/nonexistent/block");
        assert!(matches!(
            table.classify("/"),
            Err(ClassificationError::UnknownVolume(_))
        ));
    }
}
