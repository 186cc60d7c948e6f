//! Error taxonomy for catalog operations.
//!
//! Every fallible operation in this crate returns [`Result<T>`]. Callers branch
//! on the variant (`matches!(err, CatalogError::BlockedPackageTargeted { .. })`),
//! never on the rendered message.

use crate::version::SchemaVersion;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Why a catalog's schema version is unusable by this binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VersionMismatch {
    #[error("catalog schema {found} predates {required}; the repository must be re-indexed")]
    RequiresReindex {
        found: SchemaVersion,
        required: SchemaVersion,
    },
    #[error("catalog schema {found} predates {required}; run `migrate`")]
    RequiresMigration {
        found: SchemaVersion,
        required: SchemaVersion,
    },
    #[error("catalog schema {found} is newer than {required}; this binary is outdated")]
    BinaryTooOld {
        found: SchemaVersion,
        required: SchemaVersion,
    },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("repository is not initialized: {} not found", path.display())]
    NotInitialized { path: PathBuf },

    #[error("repository is already initialized: {} exists", path.display())]
    AlreadyInitialized { path: PathBuf },

    #[error(transparent)]
    SchemaVersionMismatch(#[from] VersionMismatch),

    /// A write touched an unexpected number of rows.
    #[error("{operation}: expected {expected} affected row(s), got {affected}")]
    StorageInconsistency {
        operation: &'static str,
        expected: usize,
        affected: usize,
    },

    #[error("catalog integrity check failed: {detail}")]
    CorruptCatalog { detail: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("walking {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: ignore::Error,
    },

    #[error("path is not valid UTF-8: {}", path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("package {name:?} is blocked")]
    BlockedPackageTargeted { name: String },

    #[error("package {name:?} not found")]
    UnknownPackage { name: String },

    #[error("empty package name")]
    EmptyPackageName,

    #[error("invariant violated in package {package:?}: {detail}")]
    InvariantViolation { package: String, detail: String },

    #[error("maintenance mode is not engaged for {}", repo.display())]
    MaintenanceModeOff { repo: PathBuf },

    #[error("alias {alias:?} or an alias for {package:?} already exists")]
    AliasTaken { package: String, alias: String },

    #[error("alias {0:?} not found")]
    AliasNotFound(String),

    #[error("executable file not determined for: {}", packages.join(", "))]
    MissingExecFiles { packages: Vec<String> },

    #[error("catalog has no packages; index the repository first")]
    EmptyCatalog,

    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("catalog storage: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serializing export: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Fail with `StorageInconsistency` unless exactly `expected` rows were touched.
pub(crate) fn expect_rows(operation: &'static str, expected: usize, affected: usize) -> Result<()> {
    if affected == expected {
        Ok(())
    } else {
        Err(CatalogError::StorageInconsistency {
            operation,
            expected,
            affected,
        })
    }
}
