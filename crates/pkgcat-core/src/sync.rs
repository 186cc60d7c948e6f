//! Synchronize one package: scan, merge, hash, write, re-aggregate.
//!
//! All catalog writes for the package run in one transaction. Any error rolls
//! the package back to the state it had before the call.

use crate::catalog::{Catalog, FileRecord, FileWriter, PackageAggregate};
use crate::error::Result;
use crate::hasher;
use crate::merge::{self, IndexMode, MergeSink, MergeStats};
use crate::report::{IndexEvent, IndexReporter};
use crate::scanner::{self, ScanEntry, ScanPolicy};
use log::{debug, info};
use std::path::Path;

/// What one package sync changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSync {
    pub package: String,
    pub stats: MergeStats,
    /// Recomputed aggregate, present only when a file changed.
    pub aggregate: Option<PackageAggregate>,
}

/// Scan options shared by every package of a run.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions<'a> {
    pub mode: IndexMode,
    pub policy: &'a ScanPolicy,
    pub queue_depth: usize,
}

/// Sync `package`, whose directory is `package_root`, into `catalog`.
///
/// `writer` must come from `catalog` and is reused across packages.
pub fn sync_package(
    catalog: &Catalog,
    writer: &mut FileWriter<'_>,
    package: &str,
    package_root: &Path,
    options: SyncOptions<'_>,
    reporter: &dyn IndexReporter,
) -> Result<PackageSync> {
    reporter.emit(IndexEvent::PackageStarted {
        package: package.to_string(),
    });

    // Drained and sorted before the transaction opens.
    let on_disk = scanner::scan_sorted(package_root, options.policy, options.queue_depth)?;
    let result = apply_scan(catalog, writer, package, package_root, &on_disk, options.mode, reporter)?;

    info!(
        "{package}: {} added, {} updated, {} removed, {} unchanged",
        result.stats.inserted, result.stats.updated, result.stats.deleted, result.stats.unchanged
    );
    reporter.emit(IndexEvent::PackageFinished {
        package: package.to_string(),
        stats: result.stats,
    });
    Ok(result)
}

/// Merge a sorted scan of `package` into the catalog inside one transaction.
/// Files are hashed as the merge reaches them, so a file that vanished after
/// the scan fails here and rolls back every write made for the package.
fn apply_scan(
    catalog: &Catalog,
    writer: &mut FileWriter<'_>,
    package: &str,
    package_root: &Path,
    on_disk: &[ScanEntry],
    mode: IndexMode,
    reporter: &dyn IndexReporter,
) -> Result<PackageSync> {
    let tx = catalog.begin()?;
    let package_id = match catalog.package_id(package)? {
        Some(id) => id,
        None => {
            debug!("{package}: first index, creating catalog entry");
            catalog.create_package(package)?
        }
    };
    let cataloged = catalog.files_of_package(package_id)?;

    let mut sink = CatalogSink {
        writer,
        package,
        package_id,
        package_root,
        reporter,
    };
    let stats = merge::merge(package, on_disk, &cataloged, mode, &mut sink)?;

    let aggregate = if stats.is_dirty() {
        Some(catalog.recompute_package_aggregate(package_id)?)
    } else {
        None
    };
    tx.commit()?;

    Ok(PackageSync {
        package: package.to_string(),
        stats,
        aggregate,
    })
}

/// Applies merge decisions to the catalog, hashing files as it goes.
struct CatalogSink<'w, 'conn, 'a> {
    writer: &'w mut FileWriter<'conn>,
    package: &'a str,
    package_id: i64,
    package_root: &'a Path,
    reporter: &'a dyn IndexReporter,
}

impl CatalogSink<'_, '_, '_> {
    fn digest(&self, entry: &ScanEntry) -> Result<String> {
        hasher::file_digest(&self.package_root.join(&entry.path))
    }
}

impl MergeSink for CatalogSink<'_, '_, '_> {
    fn insert(&mut self, entry: &ScanEntry) -> Result<()> {
        let hash = self.digest(entry)?;
        self.writer.insert(self.package_id, entry, &hash)?;
        self.reporter.emit(IndexEvent::FileAdded {
            package: self.package.to_string(),
            path: entry.path.clone(),
        });
        Ok(())
    }

    fn update(&mut self, record: &FileRecord, entry: &ScanEntry) -> Result<()> {
        let hash = self.digest(entry)?;
        self.writer.update(record.id, entry, &hash)?;
        if hash == record.hash {
            debug!("{}: {} rewritten with identical content", self.package, entry.path);
        }
        self.reporter.emit(IndexEvent::FileUpdated {
            package: self.package.to_string(),
            path: entry.path.clone(),
        });
        Ok(())
    }

    fn delete(&mut self, record: &FileRecord) -> Result<()> {
        self.writer.delete(record.id)?;
        self.reporter.emit(IndexEvent::FileRemoved {
            package: self.package.to_string(),
            path: record.path.clone(),
        });
        Ok(())
    }
}
