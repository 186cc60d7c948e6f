//! Manifest export: `index.gz` plus its detached SHA-256 in `index.gz.sha256`.
//!
//! The manifest is a JSON object keyed by package name, sorted, pretty-printed
//! and gzip-compressed. The digest file holds the lowercase hex SHA-256 of the
//! compressed bytes, so consumers can verify the download before inflating it.

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use crate::hasher;
use crate::repo::Repository;
use crate::safe_io;
use flate2::Compression;
use flate2::write::GzEncoder;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// One package in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub alias: Option<String>,
    /// Aggregate hash of the package.
    pub phash: String,
    /// Executable file, or `noexec`.
    pub execf: String,
    /// Relative path to content hash.
    pub files: BTreeMap<String, String>,
}

pub type Manifest = BTreeMap<String, ManifestEntry>;

/// What [`run_export`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub packages: usize,
    pub files: usize,
    pub compressed_bytes: usize,
    pub digest: String,
}

/// Build the manifest from the catalog.
///
/// Fails with `EmptyCatalog` when nothing is cataloged and with
/// `MissingExecFiles` when any package has no exec marker yet.
pub fn build_manifest(catalog: &Catalog) -> Result<Manifest> {
    let packages = catalog.exported_packages()?;
    if packages.is_empty() {
        return Err(CatalogError::EmptyCatalog);
    }

    let mut missing = Vec::new();
    let mut manifest = Manifest::new();
    for package in packages {
        let Some(execf) = package.exec else {
            missing.push(package.name);
            continue;
        };
        manifest.insert(
            package.name,
            ManifestEntry {
                alias: package.alias,
                phash: package.hash,
                execf,
                files: package.files,
            },
        );
    }
    if !missing.is_empty() {
        return Err(CatalogError::MissingExecFiles { packages: missing });
    }
    Ok(manifest)
}

/// Pretty JSON, gzip-compressed. `dest` only labels I/O errors.
pub fn compress_manifest(manifest: &Manifest, dest: &Path) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    serde_json::to_writer_pretty(&mut encoder, manifest)?;
    encoder
        .write_all(b"\n")
        .map_err(|e| CatalogError::io(dest, e))?;
    encoder.finish().map_err(|e| CatalogError::io(dest, e))
}

/// Export the catalog of `repo`.
///
/// Requires the maintenance gate and a compatible schema. The archive is
/// written before its digest file; both are replaced atomically.
pub fn run_export(repo: &Repository, maintenance_engaged: bool) -> Result<ExportSummary> {
    if !maintenance_engaged {
        return Err(CatalogError::MaintenanceModeOff {
            repo: repo.root().to_path_buf(),
        });
    }
    let catalog = repo.catalog();
    catalog.check_compatible()?;

    let manifest = build_manifest(catalog)?;
    let export_path = repo.export_path();
    let compressed = compress_manifest(&manifest, &export_path)?;
    let digest = hasher::bytes_digest(&compressed);

    safe_io::atomic_write(&export_path, &compressed)?;
    safe_io::atomic_write(&repo.export_digest_path(), digest.as_bytes())?;

    let summary = ExportSummary {
        packages: manifest.len(),
        files: manifest.values().map(|entry| entry.files.len()).sum(),
        compressed_bytes: compressed.len(),
        digest,
    };
    info!(
        "exported {} package(s), {} file(s), {} bytes",
        summary.packages, summary.files, summary.compressed_bytes
    );
    Ok(summary)
}
