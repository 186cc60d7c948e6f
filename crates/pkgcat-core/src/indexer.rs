//! Indexing run: validate targets, sync each package, prune.
//!
//! Packages are processed one after another. The file writer is prepared once
//! and shared by every package of the run. After the last package the
//! lifecycle prune removes catalog entries for packages that are gone or
//! blocked.

use crate::error::{CatalogError, Result};
use crate::lifecycle::{self, PackageSets};
use crate::merge::{IndexMode, MergeStats};
use crate::report::{IndexEvent, IndexReporter};
use crate::repo::Repository;
use crate::scanner::ScanPolicy;
use crate::sync::{self, PackageSync, SyncOptions};
use log::{info, warn};

/// Parameters of one indexing run.
#[derive(Debug, Clone, Default)]
pub struct IndexRequest {
    pub mode: IndexMode,
    /// Packages to index. Empty means every active package.
    pub targets: Vec<String>,
    /// Whether the caller holds the maintenance gate.
    pub maintenance_engaged: bool,
}

/// What an indexing run did.
#[derive(Debug, Default)]
pub struct IndexReport {
    /// Packages synced successfully, in processing order.
    pub synced: Vec<PackageSync>,
    /// Packages that failed, when `continue_on_error` is set.
    pub failed: Vec<(String, CatalogError)>,
    /// Packages removed from the catalog by the final prune.
    pub pruned: Vec<String>,
    /// Cataloged packages whose exec marker is still unset.
    pub missing_exec: Vec<String>,
}

impl IndexReport {
    pub fn totals(&self) -> MergeStats {
        let mut total = MergeStats::default();
        for package in &self.synced {
            total.add(&package.stats);
        }
        total
    }

    /// Names of the packages with at least one file change.
    pub fn changed(&self) -> Vec<&str> {
        self.synced
            .iter()
            .filter(|p| p.stats.is_dirty())
            .map(|p| p.package.as_str())
            .collect()
    }
}

/// Run an index over `repo`.
///
/// Fails before any write if the gate is not engaged, the schema does not
/// match, or a target is empty, blocked or missing. With
/// `continue_on_error` unset, the first failing package ends the run;
/// packages already synced stay committed.
pub fn run_index(
    repo: &Repository,
    request: &IndexRequest,
    reporter: &dyn IndexReporter,
) -> Result<IndexReport> {
    if !request.maintenance_engaged {
        return Err(CatalogError::MaintenanceModeOff {
            repo: repo.root().to_path_buf(),
        });
    }
    let catalog = repo.catalog();
    catalog.check_compatible()?;

    let sets = PackageSets::load(repo)?;
    let targets = if request.targets.is_empty() {
        sets.active()
    } else {
        for name in &request.targets {
            sets.ensure_active(name)?;
        }
        let mut targets = request.targets.clone();
        targets.sort();
        targets.dedup();
        targets
    };
    info!(
        "indexing {} package(s), {:?} mode",
        targets.len(),
        request.mode
    );

    let config = repo.config();
    let policy = ScanPolicy::from_config(config)?;
    let options = SyncOptions {
        mode: request.mode,
        policy: &policy,
        queue_depth: config.scan_queue_depth,
    };

    let mut report = IndexReport::default();
    {
        let mut writer = catalog.file_writer()?;
        for package in &targets {
            match sync::sync_package(
                catalog,
                &mut writer,
                package,
                &repo.package_dir(package),
                options,
                reporter,
            ) {
                Ok(synced) => report.synced.push(synced),
                Err(e) if config.continue_on_error => {
                    warn!("{package}: {e}; continuing");
                    report.failed.push((package.clone(), e));
                }
                Err(e) => return Err(e),
            }
        }
    }

    // Indexing changed the cataloged set; take a fresh snapshot.
    report.pruned = lifecycle::prune(catalog, &PackageSets::load(repo)?)?;
    for package in &report.pruned {
        reporter.emit(IndexEvent::PackagePruned {
            package: package.clone(),
        });
    }

    report.missing_exec = catalog.packages_missing_exec()?;
    if !report.missing_exec.is_empty() {
        warn!(
            "exec file not set for {} package(s)",
            report.missing_exec.len()
        );
    }
    Ok(report)
}
