/// Tree walker — streams every regular file under a root using `jwalk`.
///
/// `jwalk` reads directories on a rayon pool while the caller consumes
/// entries in depth-first order, so the top-K selector can start
/// accumulating before the walk finishes.
///
/// # Error policy
///
/// A node that cannot be read (permission denied, broken reparse point,
/// vanished file) is handled by [`ErrorPolicy`]:
///
/// - [`ErrorPolicy::Skip`] — count it, log it at `debug`, and continue with
///   the siblings. An unreadable directory drops its whole subtree.
/// - [`ErrorPolicy::Abort`] — stop the walk; [`Walk::finish`] returns the error.
///
/// A walker holds no state between walks; calling [`TreeWalker::walk`]
/// twice on an unchanged tree yields the same entries.
use crate::error::WalkError;
use crate::model::FileEntry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What the walker does with a node it cannot read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    #[default]
    Skip,
    Abort,
}

/// Traversal settings shared by every walk of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalkOptions {
    pub on_error: ErrorPolicy,
    /// Skip dot-files, and on Windows entries marked hidden, system,
    /// temporary or reparse point.
    pub skip_hidden: bool,
    /// Do not descend into directories that live on another filesystem.
    /// Only effective on Unix, where one mount point may contain others.
    pub stay_on_volume: bool,
    /// Yield siblings sorted by name so repeated walks agree on order.
    pub sort_siblings: bool,
    /// Directory-reading threads per walk. 0 means one per CPU, 1 reads
    /// on the calling thread.
    pub threads: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            on_error: ErrorPolicy::Skip,
            skip_hidden: false,
            stay_on_volume: true,
            sort_siblings: true,
            threads: 0,
        }
    }
}

/// Counters for one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Regular files yielded.
    pub files: u64,
    /// Directories entered below the root.
    pub dirs: u64,
    /// Nodes skipped under [`ErrorPolicy::Skip`].
    pub skipped: u64,
    /// Sum of yielded file sizes.
    pub bytes: u64,
}

/// Produces [`Walk`]s with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct TreeWalker {
    options: WalkOptions,
}

impl TreeWalker {
    pub fn new(options: WalkOptions) -> Self {
        Self { options }
    }

    /// Start walking `root`. Nothing is read until the walk is iterated.
    pub fn walk(&self, root: &Path) -> Walk {
        let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());

        // An unreadable root is the first skipped node; there is nothing to
        // hand to jwalk.
        if let Err(err) = fs::symlink_metadata(&root) {
            return Walk {
                pending: Some(WalkError::new(Some(root.clone()), err.to_string())),
                root,
                inner: None,
                policy: self.options.on_error,
                stats: WalkStats::default(),
                failure: None,
                skip_hook: None,
            };
        }

        let parallelism = match self.options.threads {
            1 => jwalk::Parallelism::Serial,
            0 => jwalk::Parallelism::RayonNewPool(num_cpus::get()),
            n => jwalk::Parallelism::RayonNewPool(n),
        };

        let mut walk_dir = jwalk::WalkDir::new(&root)
            .skip_hidden(self.options.skip_hidden)
            .follow_links(false)
            .sort(self.options.sort_siblings)
            .parallelism(parallelism);

        let filter = ChildFilter::for_root(&root, &self.options);
        if filter.is_active() {
            walk_dir = walk_dir.process_read_dir(move |_depth, _path, _state, children| {
                filter.apply(children);
            });
        }

        Walk {
            root,
            inner: Some(walk_dir.into_iter()),
            pending: None,
            policy: self.options.on_error,
            stats: WalkStats::default(),
            failure: None,
            skip_hook: None,
        }
    }
}

/// A lazy walk over one root. Iterating yields one [`FileEntry`] per
/// regular file; directories, symlinks and special files are not yielded.
pub struct Walk {
    root: PathBuf,
    inner: Option<jwalk::DirEntryIter<((), ())>>,
    /// Error found before iteration started, reported on the first `next`.
    pending: Option<WalkError>,
    policy: ErrorPolicy,
    stats: WalkStats,
    failure: Option<WalkError>,
    skip_hook: Option<Box<dyn FnMut(&WalkError) + Send>>,
}

impl Walk {
    /// Call `hook` for every node skipped under [`ErrorPolicy::Skip`].
    pub fn on_skip(mut self, hook: impl FnMut(&WalkError) + Send + 'static) -> Self {
        self.skip_hook = Some(Box::new(hook));
        self
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// Counters for the walk, or the error that aborted it.
    pub fn finish(self) -> Result<WalkStats, WalkError> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(self.stats),
        }
    }

    /// Apply the error policy. Returns `true` if the walk may continue.
    fn absorb(&mut self, err: WalkError) -> bool {
        match self.policy {
            ErrorPolicy::Skip => {
                self.stats.skipped += 1;
                debug!("Skipping unreadable node {err}");
                if let Some(hook) = self.skip_hook.as_mut() {
                    hook(&err);
                }
                true
            }
            ErrorPolicy::Abort => {
                debug!("Aborting walk of {} at {err}", self.root.display());
                self.failure = Some(err);
                false
            }
        }
    }
}

impl Iterator for Walk {
    type Item = FileEntry;

    fn next(&mut self) -> Option<FileEntry> {
        if self.failure.is_some() {
            return None;
        }
        if let Some(err) = self.pending.take() {
            self.absorb(err);
            return None;
        }
        loop {
            let mut entry = match self.inner.as_mut()?.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    if self.absorb(WalkError::from(err)) {
                        continue;
                    }
                    return None;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                if entry.depth > 0 {
                    self.stats.dirs += 1;
                }
                if let Some(err) = entry.read_children_error.take() {
                    if !self.absorb(WalkError::from(err)) {
                        return None;
                    }
                }
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let path = entry.path();
            match fs::symlink_metadata(&path) {
                Ok(meta) => {
                    let size = meta.len();
                    self.stats.files += 1;
                    self.stats.bytes += size;
                    return Some(FileEntry::new(path.to_string_lossy(), size));
                }
                Err(err) => {
                    if !self.absorb(WalkError::new(Some(path), err.to_string())) {
                        return None;
                    }
                }
            }
        }
    }
}

type Children = Vec<Result<jwalk::DirEntry<((), ())>, jwalk::Error>>;

/// Per-directory pruning applied on the `jwalk` worker threads.
struct ChildFilter {
    /// Device id of the root; directories on other devices are not entered.
    root_device: Option<u64>,
    /// Drop entries with hidden/system/temporary/reparse-point attributes.
    skip_special: bool,
}

impl ChildFilter {
    fn for_root(root: &Path, options: &WalkOptions) -> Self {
        Self {
            root_device: if options.stay_on_volume {
                device_of(root)
            } else {
                None
            },
            skip_special: options.skip_hidden && cfg!(windows),
        }
    }

    fn is_active(&self) -> bool {
        self.root_device.is_some() || self.skip_special
    }

    fn apply(&self, children: &mut Children) {
        if self.skip_special {
            children.retain(|child| match child {
                Ok(entry) => !has_special_attributes(&entry.path()),
                Err(_) => true,
            });
        }
        if let Some(root_device) = self.root_device {
            for entry in children.iter_mut().flatten() {
                if !entry.file_type().is_dir() {
                    continue;
                }
                let path = entry.path();
                if device_of(&path).is_some_and(|dev| dev != root_device) {
                    debug!("Not crossing into other filesystem at {}", path.display());
                    entry.read_children_path = None;
                }
            }
        }
    }
}

#[cfg(unix)]
fn device_of(path: &Path) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    fs::symlink_metadata(path).ok().map(|meta| meta.dev())
}

#[cfg(not(unix))]
fn device_of(_path: &Path) -> Option<u64> {
    None
}

#[cfg(windows)]
fn has_special_attributes(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;
    const FILE_ATTRIBUTE_TEMPORARY: u32 = 0x100;
    const FILE_ATTRIBUTE_REPARSE_POINT: u32 = 0x400;
    const SPECIAL: u32 = FILE_ATTRIBUTE_HIDDEN
        | FILE_ATTRIBUTE_SYSTEM
        | FILE_ATTRIBUTE_TEMPORARY
        | FILE_ATTRIBUTE_REPARSE_POINT;

    fs::symlink_metadata(path)
        .map(|meta| meta.file_attributes() & SPECIAL != 0)
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn has_special_attributes(_path: &Path) -> bool {
    false
}
