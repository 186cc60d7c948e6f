//! Package lifecycle: status derivation, pruning and status-changing operations.
//!
//! Status is a pure function of three name sets: blocked, on disk, and
//! cataloged. [`PackageSets`] snapshots them once per command. Anything that
//! changes one of them (indexing, blocking) takes a fresh snapshot afterwards
//! rather than patching the old one.

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use crate::repo::Repository;
use log::info;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    Blocked,
    NotIndexed,
    Indexed,
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PackageStatus::Blocked => "blocked",
            PackageStatus::NotIndexed => "not indexed",
            PackageStatus::Indexed => "indexed",
        })
    }
}

/// Blocked wins over everything; otherwise cataloged means indexed.
pub fn derive_status(
    name: &str,
    blocked: &BTreeSet<String>,
    indexed: &BTreeSet<String>,
) -> PackageStatus {
    if blocked.contains(name) {
        PackageStatus::Blocked
    } else if indexed.contains(name) {
        PackageStatus::Indexed
    } else {
        PackageStatus::NotIndexed
    }
}

/// Snapshot of the three package name sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSets {
    pub on_disk: BTreeSet<String>,
    pub blocked: BTreeSet<String>,
    pub indexed: BTreeSet<String>,
}

impl PackageSets {
    pub fn load(repo: &Repository) -> Result<Self> {
        let catalog = repo.catalog();
        Ok(Self {
            on_disk: repo.disk_packages()?,
            blocked: catalog.blocked_names()?,
            indexed: catalog.known_package_names()?.into_iter().collect(),
        })
    }

    /// Present on disk and not blocked.
    pub fn is_active(&self, name: &str) -> bool {
        self.on_disk.contains(name) && !self.blocked.contains(name)
    }

    /// Active packages, ascending.
    pub fn active(&self) -> Vec<String> {
        self.on_disk
            .iter()
            .filter(|name| !self.blocked.contains(*name))
            .cloned()
            .collect()
    }

    /// Active packages not yet in the catalog, ascending.
    pub fn not_indexed(&self) -> Vec<String> {
        self.active()
            .into_iter()
            .filter(|name| !self.indexed.contains(name))
            .collect()
    }

    /// Cataloged packages that are no longer active, ascending.
    pub fn stale(&self) -> Vec<String> {
        self.indexed
            .iter()
            .filter(|name| !self.is_active(name))
            .cloned()
            .collect()
    }

    pub fn status(&self, name: &str) -> PackageStatus {
        derive_status(name, &self.blocked, &self.indexed)
    }

    /// Fail unless `name` can be targeted by an operation on active packages.
    pub fn ensure_active(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(CatalogError::EmptyPackageName);
        }
        if self.blocked.contains(name) {
            return Err(CatalogError::BlockedPackageTargeted {
                name: name.to_string(),
            });
        }
        if !self.on_disk.contains(name) {
            return Err(CatalogError::UnknownPackage {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Every on-disk package matching `filter`, with alias and status.
    pub fn listing(
        &self,
        aliases: &BTreeMap<String, String>,
        filter: ListFilter,
    ) -> Vec<PackageListing> {
        self.on_disk
            .iter()
            .map(|name| PackageListing {
                name: name.clone(),
                alias: aliases.get(name).cloned(),
                status: self.status(name),
            })
            .filter(|entry| filter.admits(entry.status))
            .collect()
    }
}

/// Which packages a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFilter {
    #[default]
    All,
    Indexed,
    NotIndexed,
    Blocked,
}

impl ListFilter {
    fn admits(self, status: PackageStatus) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::Indexed => status == PackageStatus::Indexed,
            ListFilter::NotIndexed => status == PackageStatus::NotIndexed,
            ListFilter::Blocked => status == PackageStatus::Blocked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageListing {
    pub name: String,
    pub alias: Option<String>,
    pub status: PackageStatus,
}

/// List on-disk packages of `repo`.
pub fn list_packages(repo: &Repository, filter: ListFilter) -> Result<Vec<PackageListing>> {
    let sets = PackageSets::load(repo)?;
    let aliases = repo
        .catalog()
        .aliases()?
        .into_iter()
        .map(|entry| (entry.package, entry.alias))
        .collect();
    Ok(sets.listing(&aliases, filter))
}

/// Drop every cataloged package that is gone from disk or blocked.
pub fn prune(catalog: &Catalog, sets: &PackageSets) -> Result<Vec<String>> {
    let removed = catalog.prune_stale_packages(|name| sets.is_active(name))?;
    for name in &removed {
        info!("{name}: removed from catalog");
    }
    Ok(removed)
}

/// Block `name`, then prune so it leaves the catalog. Returns false if it
/// was already blocked.
pub fn block(repo: &Repository, name: &str) -> Result<bool> {
    if name.is_empty() {
        return Err(CatalogError::EmptyPackageName);
    }
    if !repo.package_dir(name).is_dir() {
        return Err(CatalogError::UnknownPackage {
            name: name.to_string(),
        });
    }
    let changed = repo.catalog().block_package(name)?;
    prune(repo.catalog(), &PackageSets::load(repo)?)?;
    Ok(changed)
}

/// Unblock `name`. Returns false if it was not blocked. The package is
/// cataloged again on the next index run.
pub fn unblock(repo: &Repository, name: &str) -> Result<bool> {
    if name.is_empty() {
        return Err(CatalogError::EmptyPackageName);
    }
    repo.catalog().unblock_package(name)
}

/// Give the active package `package` the alias `alias`.
pub fn set_alias(repo: &Repository, package: &str, alias: &str) -> Result<()> {
    PackageSets::load(repo)?.ensure_active(package)?;
    repo.catalog().set_alias(package, alias)
}
