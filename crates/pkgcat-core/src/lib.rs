//! pkgcat-core: content-addressed catalog of the packages in a repository.
//!
//! Each directory under the repository root is a package. Indexing walks the
//! package, diffs the result against the catalog (SQLite) and rehashes only
//! what changed; export turns the catalog into a gzip-compressed JSON
//! manifest with a detached SHA-256.
//!
//! # Quick Start
//!
//! ```no_run
//! use pkgcat_core::{IndexRequest, NoopReporter, Repository, run_index};
//!
//! fn main() -> pkgcat_core::Result<()> {
//!     let repo = Repository::open(std::path::Path::new("/srv/packages"))?;
//!     let request = IndexRequest {
//!         maintenance_engaged: true,
//!         ..IndexRequest::default()
//!     };
//!     let report = run_index(&repo, &request, &NoopReporter)?;
//!     println!("{} package(s) changed", report.changed().len());
//!     repo.close()
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod exec;
pub mod export;
pub mod hasher;
pub mod indexer;
pub mod lifecycle;
pub mod merge;
pub mod migrate;
pub mod report;
pub mod repo;
mod safe_io;
pub mod scanner;
pub mod status;
pub mod sync;
pub mod version;

pub use catalog::{Catalog, FileRecord, NO_EXEC, PackageRecord};
pub use config::{CONFIG_FILE, Config};
pub use error::{CatalogError, Result, VersionMismatch};
pub use exec::{ExecCheck, ExecResolution};
pub use export::{ExportSummary, Manifest, ManifestEntry, run_export};
pub use indexer::{IndexReport, IndexRequest, run_index};
pub use lifecycle::{ListFilter, PackageListing, PackageSets, PackageStatus};
pub use merge::{IndexMode, MergeStats};
pub use migrate::{MigrationOutcome, migrate};
pub use report::{IndexEvent, IndexReporter, NoopReporter};
pub use repo::Repository;
pub use status::{FileStamp, RepoStatus, repo_status};
pub use version::{CURRENT_SCHEMA, SchemaVersion};
