/// Top-K largest files selection.
///
/// Entries are consumed as a stream and only the `k` best are retained, so
/// a volume with millions of files never needs its full listing in memory.
///
/// Ordering is by size descending. Equal sizes keep the order in which the
/// entries were encountered, which makes output deterministic for repeated
/// runs over an unchanged tree.
use crate::error::SelectError;
use crate::model::FileEntry;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Default number of files reported per volume.
pub const DEFAULT_TOP_K: i64 = 100;

/// Check a requested limit. Zero and negative limits are caller errors.
pub fn validate_limit(k: i64) -> Result<usize, SelectError> {
    if k <= 0 {
        return Err(SelectError::InvalidLimit(k));
    }
    Ok(usize::try_from(k).unwrap_or(usize::MAX))
}

/// An entry tagged with its encounter position.
///
/// `Ord` ranks larger sizes higher and, among equal sizes, earlier entries
/// higher.
#[derive(Debug)]
struct Ranked {
    seq: u64,
    entry: FileEntry,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.entry
            .size
            .cmp(&other.entry.size)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

/// Streaming top-K accumulator.
///
/// Keeps a min-heap of at most `k` entries whose root is the current worst
/// survivor; each new entry either replaces it or is dropped.
#[derive(Debug)]
pub struct TopK {
    limit: usize,
    seen: u64,
    heap: BinaryHeap<Reverse<Ranked>>,
}

impl TopK {
    pub fn new(k: i64) -> Result<Self, SelectError> {
        let limit = validate_limit(k)?;
        Ok(Self {
            limit,
            seen: 0,
            heap: BinaryHeap::with_capacity(limit.min(4_096)),
        })
    }

    /// Offer one entry.
    pub fn push(&mut self, entry: FileEntry) {
        let ranked = Ranked {
            seq: self.seen,
            entry,
        };
        self.seen += 1;

        if self.heap.len() < self.limit {
            self.heap.push(Reverse(ranked));
        } else if let Some(mut worst) = self.heap.peek_mut() {
            if ranked > worst.0 {
                *worst = Reverse(ranked);
            }
        }
    }

    /// Number of entries offered so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// The retained entries, largest first.
    pub fn into_sorted_vec(self) -> Vec<FileEntry> {
        let mut ranked: Vec<Ranked> = self.heap.into_iter().map(|r| r.0).collect();
        // `seq` is unique, so the order is total and an unstable sort is exact.
        ranked.sort_unstable_by(|a, b| b.cmp(a));
        ranked.into_iter().map(|r| r.entry).collect()
    }
}

impl Extend<FileEntry> for TopK {
    fn extend<I: IntoIterator<Item = FileEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}

/// The `k` largest entries, largest first.
///
/// Fewer than `k` entries is not an error: all of them are returned, sorted.
/// `k` is checked before `entries` is consumed.
pub fn top_k<I>(entries: I, k: i64) -> Result<Vec<FileEntry>, SelectError>
where
    I: IntoIterator<Item = FileEntry>,
{
    let mut top = TopK::new(k)?;
    top.extend(entries);
    Ok(top.into_sorted_vec())
}
