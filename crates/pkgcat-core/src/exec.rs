//! Executable-file marker detection and assignment.

use crate::catalog::NO_EXEC;
use crate::error::{CatalogError, Result};
use crate::lifecycle::PackageSets;
use crate::repo::Repository;
use crate::scanner::{self, ScanPolicy};
use log::{debug, info};
use regex::Regex;
use std::io;
use std::path::Path;

/// Outcome of looking for a package's executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecResolution {
    /// No file matches; the package gets [`NO_EXEC`].
    NoExec,
    /// Exactly one match.
    Found(String),
    /// Several matches; someone has to pick.
    Ambiguous(Vec<String>),
}

impl ExecResolution {
    /// The marker to store, if the resolution settles it.
    pub fn marker(&self) -> Option<&str> {
        match self {
            ExecResolution::NoExec => Some(NO_EXEC),
            ExecResolution::Found(path) => Some(path.as_str()),
            ExecResolution::Ambiguous(_) => None,
        }
    }
}

/// Files under `package_root` whose relative path matches `pattern`, sorted.
pub fn find_exec_candidates(
    package_root: &Path,
    pattern: &Regex,
    policy: &ScanPolicy,
    queue_depth: usize,
) -> Result<Vec<String>> {
    Ok(scanner::scan_sorted(package_root, policy, queue_depth)?
        .into_iter()
        .map(|entry| entry.path)
        .filter(|path| pattern.is_match(path))
        .collect())
}

pub fn detect_exec(repo: &Repository, package: &str) -> Result<ExecResolution> {
    let config = repo.config();
    let mut candidates = find_exec_candidates(
        &repo.package_dir(package),
        &config.compiled_exec_pattern()?,
        &ScanPolicy::from_config(config)?,
        config.scan_queue_depth,
    )?;
    debug!("{package}: {} exec candidate(s)", candidates.len());
    Ok(match candidates.len() {
        0 => ExecResolution::NoExec,
        1 => ExecResolution::Found(candidates.remove(0)),
        _ => ExecResolution::Ambiguous(candidates),
    })
}

/// Result of [`check_exec`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecCheck {
    /// `(package, marker)` pairs stored by this check.
    pub assigned: Vec<(String, String)>,
    /// Packages left unset, with their candidates.
    pub ambiguous: Vec<(String, Vec<String>)>,
}

/// Resolve the marker of every cataloged package that has none yet. Packages
/// with a single candidate or none are settled; the rest are returned.
pub fn check_exec(repo: &Repository) -> Result<ExecCheck> {
    let mut check = ExecCheck::default();
    for package in repo.catalog().packages_missing_exec()? {
        match detect_exec(repo, &package)? {
            ExecResolution::Ambiguous(candidates) => check.ambiguous.push((package, candidates)),
            settled => {
                if let Some(marker) = settled.marker() {
                    repo.catalog().set_exec_file(&package, marker)?;
                    info!("{package}: exec file set to {marker}");
                    check.assigned.push((package, marker.to_string()));
                }
            }
        }
    }
    Ok(check)
}

/// Set `package`'s marker to `file`, which must exist inside the package
/// unless it is [`NO_EXEC`].
pub fn set_exec(repo: &Repository, package: &str, file: &str) -> Result<()> {
    PackageSets::load(repo)?.ensure_active(package)?;
    if file != NO_EXEC {
        let path = repo.package_dir(package).join(file);
        if !path.is_file() {
            return Err(CatalogError::io(path, io::Error::from(io::ErrorKind::NotFound)));
        }
    }
    repo.catalog().set_exec_file(package, file)
}

/// Mark `package` as having no executable.
pub fn clear_exec(repo: &Repository, package: &str) -> Result<()> {
    set_exec(repo, package, NO_EXEC)
}
