//! Repository root: package directories, the catalog file and export outputs.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{CatalogError, Result};
use log::warn;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CATALOG_FILE: &str = "index.db";
pub const EXPORT_FILE: &str = "index.gz";
pub const EXPORT_DIGEST_FILE: &str = "index.gz.sha256";

/// An open repository. Owns the catalog connection for the whole command.
pub struct Repository {
    root: PathBuf,
    catalog: Catalog,
    config: Config,
}

impl Repository {
    /// Create the catalog under `root`.
    pub fn init(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;
        let catalog = Catalog::initialize(&root.join(CATALOG_FILE))?;
        Ok(Self {
            root: root.to_path_buf(),
            catalog,
            config,
        })
    }

    /// Open the catalog under `root` with `pkgcat.toml` applied.
    pub fn open(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;
        Self::open_with_config(root, config)
    }

    pub fn open_with_config(root: &Path, config: Config) -> Result<Self> {
        let catalog = Catalog::open(&root.join(CATALOG_FILE))?;
        Ok(Self {
            root: root.to_path_buf(),
            catalog,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn export_path(&self) -> PathBuf {
        self.root.join(EXPORT_FILE)
    }

    pub fn export_digest_path(&self) -> PathBuf {
        self.root.join(EXPORT_DIGEST_FILE)
    }

    /// Names of the package directories directly under the root.
    ///
    /// Dot-directories are not packages. Names that are not valid UTF-8 are
    /// skipped with a warning since they cannot be cataloged.
    pub fn disk_packages(&self) -> Result<BTreeSet<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| CatalogError::io(&self.root, e))?;
        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| CatalogError::io(&self.root, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| CatalogError::io(entry.path(), e))?;
            if !file_type.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if name.starts_with('.') => {}
                Ok(name) => {
                    names.insert(name);
                }
                Err(raw) => warn!("skipping package directory with non-UTF-8 name {raw:?}"),
            }
        }
        Ok(names)
    }

    /// Close the catalog connection.
    pub fn close(self) -> Result<()> {
        self.catalog.close()
    }
}
