//! Filesystem scanner.
//!
//! Walks a package directory on a worker thread and streams one [`ScanEntry`]
//! per regular file through a bounded channel. Traversal order is whatever the
//! walker yields; [`scan_sorted`] drains the stream and sorts it by path for
//! the merge.
//!
//! The first walk error ends the stream: the worker sends it and stops, so a
//! partially read directory never looks like a complete one.
//!
//! Symlinks are not followed during the walk. A link to a regular file is
//! emitted under the link's own path with the target's size and mtime; a
//! link to a directory is skipped; a dangling link is an error.

use crate::config::Config;
use crate::error::{CatalogError, Result};
use ignore::{DirEntry, WalkBuilder};
use log::debug;
use regex::Regex;
use std::fs::{self, Metadata};
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::UNIX_EPOCH;

/// One regular file found under a package root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    /// Path relative to the package root, `/`-separated.
    pub path: String,
    pub size: i64,
    /// Nanoseconds since the Unix epoch (negative before it).
    pub modified_at: i64,
}

/// Which files the scanner leaves out.
#[derive(Debug, Clone, Default)]
pub struct ScanPolicy {
    ignore: Vec<Regex>,
}

impl ScanPolicy {
    pub fn new(ignore: Vec<Regex>) -> Self {
        Self { ignore }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.compiled_ignore_patterns()?))
    }

    fn excludes(&self, rel_path: &str) -> bool {
        self.ignore.iter().any(|re| re.is_match(rel_path))
    }
}

/// Streamed scanner output. Not restartable: once drained it stays empty.
pub struct ScanStream {
    root: PathBuf,
    rx: Option<Receiver<Result<ScanEntry>>>,
    worker: Option<JoinHandle<()>>,
}

impl Iterator for ScanStream {
    type Item = Result<ScanEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let rx = self.rx.as_ref()?;
        match rx.recv() {
            Ok(item) => Some(item),
            Err(_) => {
                // Channel closed: the worker is done, or it died mid-walk.
                self.rx = None;
                if let Some(worker) = self.worker.take()
                    && worker.join().is_err()
                {
                    return Some(Err(CatalogError::InvariantViolation {
                        package: self.root.display().to_string(),
                        detail: "scanner worker panicked".to_string(),
                    }));
                }
                None
            }
        }
    }
}

impl Drop for ScanStream {
    fn drop(&mut self) {
        // Hang up first so a blocked worker sees the send fail and exits.
        self.rx = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Start walking `root` on a worker thread.
pub fn scan(root: &Path, policy: &ScanPolicy, queue_depth: usize) -> ScanStream {
    let (tx, rx) = mpsc::sync_channel(queue_depth.max(1));
    let walk_root = root.to_path_buf();
    let walk_policy = policy.clone();
    let worker = thread::spawn(move || walk(&walk_root, &walk_policy, &tx));
    ScanStream {
        root: root.to_path_buf(),
        rx: Some(rx),
        worker: Some(worker),
    }
}

/// Scan `root` to completion and return its files sorted by path.
pub fn scan_sorted(root: &Path, policy: &ScanPolicy, queue_depth: usize) -> Result<Vec<ScanEntry>> {
    let mut entries = scan(root, policy, queue_depth).collect::<Result<Vec<_>>>()?;
    entries.sort_unstable_by(|a, b| a.path.cmp(&b.path));
    debug!("scanned {} file(s) under {}", entries.len(), root.display());
    Ok(entries)
}

fn walk(root: &Path, policy: &ScanPolicy, tx: &SyncSender<Result<ScanEntry>>) {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for entry in walker {
        let item = match entry {
            Ok(entry) => match scan_entry(root, &entry, policy) {
                Ok(Some(found)) => Ok(found),
                Ok(None) => continue,
                Err(e) => Err(e),
            },
            Err(source) => Err(CatalogError::Walk {
                root: root.to_path_buf(),
                source,
            }),
        };
        let failed = item.is_err();
        if tx.send(item).is_err() || failed {
            return;
        }
    }
}

fn scan_entry(root: &Path, entry: &DirEntry, policy: &ScanPolicy) -> Result<Option<ScanEntry>> {
    let is_link = entry.path_is_symlink();
    if !is_link && !entry.file_type().is_some_and(|t| t.is_file()) {
        return Ok(None);
    }
    let path = relative_path(root, entry.path())?;
    if policy.excludes(&path) {
        debug!("skipping {path}: matches ignore pattern");
        return Ok(None);
    }
    let meta = if is_link {
        let meta = fs::metadata(entry.path()).map_err(|e| CatalogError::io(entry.path(), e))?;
        if !meta.is_file() {
            debug!("skipping {path}: symlink to a non-file");
            return Ok(None);
        }
        meta
    } else {
        entry.metadata().map_err(|source| CatalogError::Walk {
            root: root.to_path_buf(),
            source,
        })?
    };
    Ok(Some(ScanEntry {
        modified_at: modified_nanos(entry.path(), &meta)?,
        size: meta.len() as i64,
        path,
    }))
}

/// `path` relative to `root`, joined with `/` regardless of platform.
pub(crate) fn relative_path(root: &Path, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut parts = Vec::new();
    for component in rel.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| CatalogError::NonUtf8Path {
                path: path.to_path_buf(),
            })?;
            parts.push(part);
        }
    }
    Ok(parts.join("/"))
}

fn modified_nanos(path: &Path, meta: &Metadata) -> Result<i64> {
    let modified = meta.modified().map_err(|e| CatalogError::io(path, e))?;
    Ok(match modified.duration_since(UNIX_EPOCH) {
        Ok(since) => since.as_nanos() as i64,
        Err(before) => -(before.duration().as_nanos() as i64),
    })
}
