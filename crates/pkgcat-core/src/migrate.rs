//! Catalog migration across a minor schema bump.
//!
//! A minor bump is handled by rebuilding: blocked names and aliases are saved,
//! the catalog and the export outputs are deleted, a fresh catalog is created
//! and the saved rows are restored. File records are not carried over; the
//! repository has to be re-indexed afterwards.

use crate::catalog::{AliasEntry, Catalog};
use crate::error::{CatalogError, Result, VersionMismatch};
use crate::repo::{CATALOG_FILE, EXPORT_DIGEST_FILE, EXPORT_FILE};
use crate::version::{self, CURRENT_SCHEMA, SchemaVersion};
use log::{info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The catalog already has the current schema.
    UpToDate,
    /// The catalog was rebuilt from `from`; this many rows were restored.
    Migrated {
        from: SchemaVersion,
        aliases: usize,
        blocked: usize,
    },
}

/// Bring the catalog under `root` to [`CURRENT_SCHEMA`].
///
/// An older major version cannot be migrated (`RequiresReindex`), and a
/// newer catalog is never downgraded (`BinaryTooOld`).
pub fn migrate(root: &Path, maintenance_engaged: bool) -> Result<MigrationOutcome> {
    if !maintenance_engaged {
        return Err(CatalogError::MaintenanceModeOff {
            repo: root.to_path_buf(),
        });
    }

    let catalog_path = root.join(CATALOG_FILE);
    let catalog = Catalog::open(&catalog_path)?;
    let found = catalog.schema_version()?;
    match version::check_compatible(found, CURRENT_SCHEMA) {
        Ok(()) => {
            catalog.close()?;
            return Ok(MigrationOutcome::UpToDate);
        }
        Err(CatalogError::SchemaVersionMismatch(VersionMismatch::RequiresMigration { .. })) => {}
        Err(e) => return Err(e),
    }

    let blocked = catalog.blocked_names()?;
    let aliases = catalog.aliases()?;
    catalog.close()?;
    info!(
        "migrating catalog {found} -> {CURRENT_SCHEMA}: saved {} alias(es), {} blocked name(s)",
        aliases.len(),
        blocked.len()
    );

    for name in [
        CATALOG_FILE.to_string(),
        format!("{CATALOG_FILE}-wal"),
        format!("{CATALOG_FILE}-shm"),
        EXPORT_FILE.to_string(),
        EXPORT_DIGEST_FILE.to_string(),
    ] {
        remove_if_present(&root.join(name))?;
    }

    let catalog = Catalog::initialize(&catalog_path)?;
    let tx = catalog.begin()?;
    for name in &blocked {
        catalog.block_package(name)?;
    }
    for AliasEntry { package, alias } in &aliases {
        catalog.set_alias(package, alias)?;
    }
    tx.commit()?;
    catalog.close()?;

    warn!("catalog rebuilt; every package must be re-indexed");
    Ok(MigrationOutcome::Migrated {
        from: found,
        aliases: aliases.len(),
        blocked: blocked.len(),
    })
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CatalogError::io(path, e)),
    }
}
