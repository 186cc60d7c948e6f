//! Repository status report.

use crate::error::{CatalogError, Result};
use crate::lifecycle::PackageSets;
use crate::repo::Repository;
use crate::version::{CURRENT_SCHEMA, SchemaVersion};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

/// Size and modification time of a repository file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub size: u64,
    pub modified: SystemTime,
}

impl FileStamp {
    /// `None` if `path` does not exist.
    pub fn of(path: &Path) -> Result<Option<Self>> {
        match fs::metadata(path) {
            Ok(meta) => Ok(Some(Self {
                size: meta.len(),
                modified: meta.modified().map_err(|e| CatalogError::io(path, e))?,
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CatalogError::io(path, e)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStatus {
    pub on_disk: usize,
    pub indexed: usize,
    pub blocked: usize,
    /// Active packages minus indexed ones. Negative when cataloged packages
    /// are gone from disk.
    pub not_indexed: i64,
    /// Active packages missing from the catalog.
    pub pending: Vec<String>,
    /// Cataloged packages that are gone from disk or blocked.
    pub stale: Vec<String>,
    pub catalog: Option<FileStamp>,
    pub export: Option<FileStamp>,
    pub export_digest: Option<FileStamp>,
    pub schema: SchemaVersion,
    pub required_schema: SchemaVersion,
    pub missing_exec: Vec<String>,
}

impl RepoStatus {
    /// Indexing would change the catalog: packages are missing from it, or
    /// it still holds packages that are gone or blocked.
    pub fn needs_index(&self) -> bool {
        !self.pending.is_empty() || !self.stale.is_empty()
    }

    /// The export is absent or older than the catalog.
    pub fn needs_export(&self) -> bool {
        match (self.catalog, self.export, self.export_digest) {
            (Some(catalog), Some(export), Some(_)) => export.modified < catalog.modified,
            _ => true,
        }
    }

    pub fn schema_compatible(&self) -> bool {
        self.schema == self.required_schema
    }
}

pub fn repo_status(repo: &Repository) -> Result<RepoStatus> {
    let sets = PackageSets::load(repo)?;
    let active = sets.active().len() as i64;
    let blocked_on_disk = sets
        .blocked
        .iter()
        .filter(|name| sets.on_disk.contains(*name))
        .count();

    Ok(RepoStatus {
        on_disk: sets.on_disk.len(),
        indexed: sets.indexed.len(),
        blocked: blocked_on_disk,
        not_indexed: active - sets.indexed.len() as i64,
        pending: sets.not_indexed(),
        stale: sets.stale(),
        catalog: FileStamp::of(repo.catalog().path())?,
        export: FileStamp::of(&repo.export_path())?,
        export_digest: FileStamp::of(&repo.export_digest_path())?,
        schema: repo.catalog().schema_version()?,
        required_schema: CURRENT_SCHEMA,
        missing_exec: repo.catalog().packages_missing_exec()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NO_EXEC;
    use crate::export::run_export;
    use crate::indexer::{IndexRequest, run_index};
    use crate::report::NoopReporter;
    use tempfile::TempDir;

    fn repo(packages: &[&str]) -> (Repository, TempDir) {
        let dir = TempDir::new().unwrap();
        for p in packages {
            fs::create_dir(dir.path().join(p)).unwrap();
            fs::write(dir.path().join(p).join("f.txt"), p).unwrap();
        }
        (Repository::init(dir.path()).unwrap(), dir)
    }

    fn index(repo: &Repository) {
        let request = IndexRequest {
            maintenance_engaged: true,
            ..IndexRequest::default()
        };
        run_index(repo, &request, &NoopReporter).unwrap();
    }

    #[test]
    fn fresh_repository() {
        let (repo, _dir) = repo(&["alpha", "beta", "gamma"]);
        repo.catalog().block_package("gamma").unwrap();

        let status = repo_status(&repo).unwrap();
        assert_eq!(status.on_disk, 3);
        assert_eq!(status.blocked, 1);
        assert_eq!(status.indexed, 0);
        assert_eq!(status.not_indexed, 2);
        assert_eq!(status.pending, vec!["alpha", "beta"]);
        assert!(status.needs_index());
        assert!(status.needs_export());
        assert!(status.catalog.is_some());
        assert!(status.export.is_none());
        assert!(status.schema_compatible());
    }

    #[test]
    fn balance_goes_negative_when_packages_vanish() {
        let (repo, dir) = repo(&["alpha", "beta"]);
        index(&repo);
        fs::remove_dir_all(dir.path().join("beta")).unwrap();

        let status = repo_status(&repo).unwrap();
        assert_eq!(status.indexed, 2);
        assert_eq!(status.not_indexed, -1);
        assert_eq!(status.stale, vec!["beta"]);
        assert!(status.needs_index());
    }

    #[test]
    fn up_to_date_after_index_and_export() {
        let (repo, _dir) = repo(&["alpha"]);
        index(&repo);
        assert_eq!(repo_status(&repo).unwrap().missing_exec, vec!["alpha"]);

        repo.catalog().set_exec_file("alpha", NO_EXEC).unwrap();
        run_export(&repo, true).unwrap();
        let status = repo_status(&repo).unwrap();
        assert!(!status.needs_index());
        assert!(status.missing_exec.is_empty());
        assert!(status.export.unwrap().size > 0);
        assert!(status.export_digest.is_some());
    }

    #[test]
    fn stamp_of_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(FileStamp::of(&dir.path().join("absent")).unwrap(), None);
    }
}
