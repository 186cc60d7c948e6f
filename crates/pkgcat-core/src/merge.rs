//! Sorted merge-diff between a package's scanned files and its catalog rows.
//!
//! Both inputs must be strictly ascending by path (byte order). One linear
//! pass with a cursor per side classifies every path:
//!
//! | filesystem | catalog | action                                        |
//! |------------|---------|-----------------------------------------------|
//! | present    | absent  | insert                                        |
//! | absent     | present | delete                                        |
//! | present    | present | update if size/mtime differ or mode is `Full` |
//!
//! The engine does no I/O itself; every action goes through a [`MergeSink`].

use crate::catalog::FileRecord;
use crate::error::{CatalogError, Result};
use crate::scanner::ScanEntry;
use std::cmp::Ordering;

/// Whether unchanged-looking files are rehashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexMode {
    /// Rehash only files whose size or modification time changed.
    #[default]
    Incremental,
    /// Rehash every file.
    Full,
}

/// Per-package outcome of one merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeStats {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
}

impl MergeStats {
    /// True if any file was written, which means the aggregate is stale.
    pub fn is_dirty(&self) -> bool {
        self.inserted + self.updated + self.deleted > 0
    }

    pub fn add(&mut self, other: &MergeStats) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.deleted += other.deleted;
        self.unchanged += other.unchanged;
    }
}

/// Receives the writes a merge decides on.
pub trait MergeSink {
    /// `entry` exists on disk only.
    fn insert(&mut self, entry: &ScanEntry) -> Result<()>;
    /// `entry` replaces the stale `record`.
    fn update(&mut self, record: &FileRecord, entry: &ScanEntry) -> Result<()>;
    /// `record` no longer exists on disk.
    fn delete(&mut self, record: &FileRecord) -> Result<()>;
}

/// Merge `fs` (scanner output) against `db` (catalog rows) for `package`.
///
/// Both slices are checked for strict ascending order before the first sink
/// call, so an unsorted input fails without having written anything.
pub fn merge(
    package: &str,
    fs: &[ScanEntry],
    db: &[FileRecord],
    mode: IndexMode,
    sink: &mut dyn MergeSink,
) -> Result<MergeStats> {
    ensure_sorted(package, "filesystem", fs.iter().map(|e| e.path.as_str()))?;
    ensure_sorted(package, "catalog", db.iter().map(|r| r.path.as_str()))?;

    let mut stats = MergeStats::default();
    let (mut i, mut j) = (0, 0);

    loop {
        match (fs.get(i), db.get(j)) {
            (None, None) => break,
            (Some(entry), None) => {
                sink.insert(entry)?;
                stats.inserted += 1;
                i += 1;
            }
            (None, Some(record)) => {
                sink.delete(record)?;
                stats.deleted += 1;
                j += 1;
            }
            (Some(entry), Some(record)) => match entry.path.as_bytes().cmp(record.path.as_bytes()) {
                Ordering::Equal => {
                    if mode == IndexMode::Full || is_modified(entry, record) {
                        sink.update(record, entry)?;
                        stats.updated += 1;
                    } else {
                        stats.unchanged += 1;
                    }
                    i += 1;
                    j += 1;
                }
                Ordering::Less => {
                    sink.insert(entry)?;
                    stats.inserted += 1;
                    i += 1;
                }
                Ordering::Greater => {
                    sink.delete(record)?;
                    stats.deleted += 1;
                    j += 1;
                }
            },
        }
    }

    Ok(stats)
}

fn is_modified(entry: &ScanEntry, record: &FileRecord) -> bool {
    entry.size != record.size || entry.modified_at != record.modified_at
}

fn ensure_sorted<'a>(
    package: &str,
    side: &str,
    paths: impl Iterator<Item = &'a str>,
) -> Result<()> {
    let mut prev: Option<&str> = None;
    for path in paths {
        if let Some(prev) = prev
            && prev.as_bytes() >= path.as_bytes()
        {
            return Err(CatalogError::InvariantViolation {
                package: package.to_string(),
                detail: format!("{side} paths not strictly ascending: {prev:?} then {path:?}"),
            });
        }
        prev = Some(path);
    }
    Ok(())
}
