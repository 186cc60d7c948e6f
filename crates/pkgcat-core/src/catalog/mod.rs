//! Catalog store: the persisted record of packages, their files, aliases and
//! blocked names.
//!
//! Backed by a single SQLite file owned by one [`Catalog`] for the lifetime of
//! a command. Reads come back ordered (files by path, packages by name) since
//! the merge relies on it. Every targeted write checks its affected-row count
//! and fails with `StorageInconsistency` when the count is off.

mod schema;
mod writer;

pub use writer::FileWriter;

use crate::error::{CatalogError, Result, expect_rows};
use crate::hasher;
use crate::version::{self, CURRENT_SCHEMA, SchemaVersion};
use log::{debug, warn};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Transaction};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Exec marker for packages that have no executable file.
pub const NO_EXEC: &str = "noexec";

/// One cataloged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: i64,
    pub package_id: i64,
    pub path: String,
    pub size: i64,
    pub modified_at: i64,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub id: i64,
    pub name: String,
    pub hash: String,
    pub size: i64,
    pub file_count: i64,
    /// `None` until determined; [`NO_EXEC`] when the package has none.
    pub exec: Option<String>,
}

/// Package-level values derived from its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageAggregate {
    pub hash: String,
    pub size: i64,
    pub file_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub package: String,
    pub alias: String,
}

/// Everything the export needs about one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPackage {
    pub name: String,
    pub alias: Option<String>,
    pub hash: String,
    pub exec: Option<String>,
    pub files: BTreeMap<String, String>,
}

pub struct Catalog {
    conn: Connection,
    path: PathBuf,
}

impl Catalog {
    /// Create a new catalog file. Fails with `AlreadyInitialized` if it exists.
    pub fn initialize(path: &Path) -> Result<Self> {
        let conn = schema::initialize(path)?;
        debug!("initialized catalog {} at schema {CURRENT_SCHEMA}", path.display());
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Open an existing catalog. The schema version is not checked here; see
    /// [`Catalog::check_compatible`].
    pub fn open(path: &Path) -> Result<Self> {
        let conn = schema::open_connection(path)?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `PRAGMA optimize` and close the connection.
    pub fn close(self) -> Result<()> {
        if let Err(e) = self.conn.execute_batch("PRAGMA optimize;") {
            warn!("optimizing catalog before close: {e}");
        }
        self.conn.close().map_err(|(_, e)| CatalogError::Storage(e))
    }

    /// Rebuild the database file and its indexes.
    pub fn compact(&self) -> Result<()> {
        self.conn.execute_batch("VACUUM; REINDEX;")?;
        Ok(())
    }

    pub fn schema_version(&self) -> Result<SchemaVersion> {
        schema::read_version(&self.conn)
    }

    /// Fail unless the stored schema version equals [`CURRENT_SCHEMA`].
    pub fn check_compatible(&self) -> Result<()> {
        version::check_compatible(self.schema_version()?, CURRENT_SCHEMA)
    }

    /// Start a transaction. Dropping it without `commit` rolls back.
    pub(crate) fn begin(&self) -> Result<Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Compile the per-file write statements for one indexing run.
    pub fn file_writer(&self) -> Result<FileWriter<'_>> {
        FileWriter::prepare(&self.conn)
    }

    // ------------------------------------------------------------------
    // Packages and files
    // ------------------------------------------------------------------

    pub fn package_id(&self, name: &str) -> Result<Option<i64>> {
        Ok(self
            .conn
            .query_row("SELECT id FROM packages WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?)
    }

    fn require_package_id(&self, name: &str) -> Result<i64> {
        self.package_id(name)?
            .ok_or_else(|| CatalogError::UnknownPackage {
                name: name.to_string(),
            })
    }

    /// Insert a package with no files. Its aggregate is the digest of the
    /// empty file set until files are added.
    pub fn create_package(&self, name: &str) -> Result<i64> {
        let empty = hasher::combine_digests(std::iter::empty::<&str>());
        let affected = self.conn.execute(
            "INSERT INTO packages (name, hash) VALUES (?1, ?2)",
            (name, &empty),
        )?;
        expect_rows("create package", 1, affected)?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn package(&self, name: &str) -> Result<Option<PackageRecord>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, hash, size, file_count, exec FROM packages WHERE name = ?1",
                [name],
                |row| {
                    Ok(PackageRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        hash: row.get(2)?,
                        size: row.get(3)?,
                        file_count: row.get(4)?,
                        exec: row.get(5)?,
                    })
                },
            )
            .optional()?)
    }

    /// Files of a package, ascending by path.
    pub fn files_of_package(&self, package_id: i64) -> Result<Vec<FileRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, package_id, path, size, modified_at, hash
             FROM files WHERE package_id = ?1 ORDER BY path",
        )?;
        let rows = stmt.query_map([package_id], |row| {
            Ok(FileRecord {
                id: row.get(0)?,
                package_id: row.get(1)?,
                path: row.get(2)?,
                size: row.get(3)?,
                modified_at: row.get(4)?,
                hash: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Recompute and store a package's hash, size and file count from its
    /// current files, combined in path order.
    pub fn recompute_package_aggregate(&self, package_id: i64) -> Result<PackageAggregate> {
        let files = self.files_of_package(package_id)?;
        let aggregate = PackageAggregate {
            hash: hasher::combine_digests(files.iter().map(|f| &f.hash)),
            size: files.iter().map(|f| f.size).sum(),
            file_count: files.len() as i64,
        };
        let affected = self.conn.execute(
            "UPDATE packages SET hash = ?1, size = ?2, file_count = ?3 WHERE id = ?4",
            (&aggregate.hash, aggregate.size, aggregate.file_count, package_id),
        )?;
        expect_rows("update package aggregate", 1, affected)?;
        Ok(aggregate)
    }

    /// Names of all cataloged packages, ascending.
    pub fn known_package_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM packages ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Delete a package; its files go with it through the foreign key.
    pub fn remove_package(&self, name: &str) -> Result<()> {
        let affected = self
            .conn
            .execute("DELETE FROM packages WHERE name = ?1", [name])?;
        expect_rows("remove package", 1, affected)
    }

    /// Remove every cataloged package for which `is_active` is false.
    /// Returns the removed names.
    pub fn prune_stale_packages(&self, is_active: impl Fn(&str) -> bool) -> Result<Vec<String>> {
        let mut removed = Vec::new();
        for name in self.known_package_names()? {
            if !is_active(&name) {
                self.remove_package(&name)?;
                removed.push(name);
            }
        }
        Ok(removed)
    }

    pub fn clear_packages(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM packages", [])?)
    }

    // ------------------------------------------------------------------
    // Blocked set
    // ------------------------------------------------------------------

    pub fn blocked_names(&self) -> Result<BTreeSet<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM excludes")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<BTreeSet<String>>>()?;
        Ok(names)
    }

    /// Returns false if the name was already blocked.
    pub fn block_package(&self, name: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("INSERT OR IGNORE INTO excludes (name) VALUES (?1)", [name])?;
        Ok(affected == 1)
    }

    /// Returns false if the name was not blocked.
    pub fn unblock_package(&self, name: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM excludes WHERE name = ?1", [name])?;
        Ok(affected == 1)
    }

    pub fn clear_blocked(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM excludes", [])?)
    }

    // ------------------------------------------------------------------
    // Aliases
    // ------------------------------------------------------------------

    /// All alias pairs, ordered by alias.
    pub fn aliases(&self) -> Result<Vec<AliasEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, alias FROM aliases ORDER BY alias")?;
        let entries = stmt
            .query_map([], |row| {
                Ok(AliasEntry {
                    package: row.get(0)?,
                    alias: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn alias_of(&self, package: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT alias FROM aliases WHERE name = ?1", [package], |row| {
                row.get(0)
            })
            .optional()?)
    }

    /// Record `alias` for `package`. Both sides are unique; a clash on either
    /// fails with `AliasTaken`. Whether the package is active is the caller's
    /// concern.
    pub fn set_alias(&self, package: &str, alias: &str) -> Result<()> {
        match self.conn.execute(
            "INSERT INTO aliases (name, alias) VALUES (?1, ?2)",
            [package, alias],
        ) {
            Ok(affected) => expect_rows("set alias", 1, affected),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(CatalogError::AliasTaken {
                    package: package.to_string(),
                    alias: alias.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the alias named `key`, or the alias of the package named `key`.
    pub fn remove_alias(&self, key: &str) -> Result<()> {
        let affected = self
            .conn
            .execute("DELETE FROM aliases WHERE alias = ?1 OR name = ?1", [key])?;
        if affected == 0 {
            return Err(CatalogError::AliasNotFound(key.to_string()));
        }
        Ok(())
    }

    pub fn clear_aliases(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM aliases", [])?)
    }

    // ------------------------------------------------------------------
    // Executable-file marker
    // ------------------------------------------------------------------

    pub fn exec_file(&self, package: &str) -> Result<Option<String>> {
        let id = self.require_package_id(package)?;
        Ok(self
            .conn
            .query_row("SELECT exec FROM packages WHERE id = ?1", [id], |row| {
                row.get(0)
            })?)
    }

    pub fn set_exec_file(&self, package: &str, exec: &str) -> Result<()> {
        let id = self.require_package_id(package)?;
        let affected = self.conn.execute(
            "UPDATE packages SET exec = ?1 WHERE id = ?2",
            (exec, id),
        )?;
        expect_rows("set exec file", 1, affected)
    }

    /// Packages whose exec marker has not been determined yet, ascending.
    pub fn packages_missing_exec(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM packages WHERE exec IS NULL ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Every package with its alias, aggregate hash, exec marker and
    /// `path -> hash` map, ordered by name.
    pub fn exported_packages(&self) -> Result<Vec<ExportedPackage>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.name, a.alias, p.hash, p.exec
             FROM packages p LEFT JOIN aliases a ON a.name = p.name
             ORDER BY p.name",
        )?;
        let heads = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    ExportedPackage {
                        name: row.get(1)?,
                        alias: row.get(2)?,
                        hash: row.get(3)?,
                        exec: row.get(4)?,
                        files: BTreeMap::new(),
                    },
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut packages = Vec::with_capacity(heads.len());
        for (id, mut package) in heads {
            package.files = self
                .files_of_package(id)?
                .into_iter()
                .map(|f| (f.path, f.hash))
                .collect();
            packages.push(package);
        }
        Ok(packages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ScanEntry;
    use tempfile::TempDir;

    fn temp_catalog() -> (Catalog, TempDir) {
        let dir = TempDir::new().unwrap();
        let catalog = Catalog::initialize(&dir.path().join("index.db")).unwrap();
        (catalog, dir)
    }

    fn entry(path: &str, size: i64, modified_at: i64) -> ScanEntry {
        ScanEntry {
            path: path.to_string(),
            size,
            modified_at,
        }
    }

    fn file_count(catalog: &Catalog) -> i64 {
        catalog
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn open_reports_current_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.db");
        Catalog::initialize(&path).unwrap().close().unwrap();
        let catalog = Catalog::open(&path).unwrap();
        assert_eq!(catalog.schema_version().unwrap(), CURRENT_SCHEMA);
        assert!(catalog.check_compatible().is_ok());
    }

    #[test]
    fn check_compatible_rejects_older_minor() {
        let (catalog, _dir) = temp_catalog();
        catalog
            .conn
            .execute("UPDATE info SET vers_minor = vers_minor - 1", [])
            .unwrap();
        let err = catalog.check_compatible().unwrap_err();
        assert!(matches!(
            err,
            CatalogError::SchemaVersionMismatch(crate::error::VersionMismatch::RequiresMigration { .. })
        ));
    }

    #[test]
    fn package_id_lookup_and_create() {
        let (catalog, _dir) = temp_catalog();
        assert_eq!(catalog.package_id("alpha").unwrap(), None);
        let id = catalog.create_package("alpha").unwrap();
        assert_eq!(catalog.package_id("alpha").unwrap(), Some(id));

        let record = catalog.package("alpha").unwrap().unwrap();
        assert_eq!(record.hash, hasher::bytes_digest(b""));
        assert_eq!(record.size, 0);
        assert_eq!(record.file_count, 0);
        assert_eq!(record.exec, None);
    }

    #[test]
    fn create_duplicate_package_fails() {
        let (catalog, _dir) = temp_catalog();
        catalog.create_package("alpha").unwrap();
        assert!(matches!(
            catalog.create_package("alpha").unwrap_err(),
            CatalogError::Storage(_)
        ));
    }

    #[test]
    fn files_come_back_sorted_by_path() {
        let (catalog, _dir) = temp_catalog();
        let id = catalog.create_package("alpha").unwrap();
        let mut writer = catalog.file_writer().unwrap();
        for path in ["b.txt", "a/z.txt", "B.txt", "a.txt"] {
            writer.insert(id, &entry(path, 1, 1), "h").unwrap();
        }
        drop(writer);

        let paths: Vec<String> = catalog
            .files_of_package(id)
            .unwrap()
            .into_iter()
            .map(|f| f.path)
            .collect();
        assert_eq!(paths, vec!["B.txt", "a.txt", "a/z.txt", "b.txt"]);
    }

    #[test]
    fn writer_update_and_delete_touch_one_row() {
        let (catalog, _dir) = temp_catalog();
        let id = catalog.create_package("alpha").unwrap();
        let mut writer = catalog.file_writer().unwrap();
        writer.insert(id, &entry("a.txt", 1, 10), "old").unwrap();
        let file = catalog.files_of_package(id).unwrap().remove(0);

        writer.update(file.id, &entry("a.txt", 2, 20), "new").unwrap();
        let updated = catalog.files_of_package(id).unwrap().remove(0);
        assert_eq!((updated.size, updated.modified_at, updated.hash.as_str()), (2, 20, "new"));

        writer.delete(file.id).unwrap();
        assert!(catalog.files_of_package(id).unwrap().is_empty());
    }

    #[test]
    fn writer_zero_row_writes_are_inconsistencies() {
        let (catalog, _dir) = temp_catalog();
        let mut writer = catalog.file_writer().unwrap();
        assert!(matches!(
            writer.update(999, &entry("x", 0, 0), "h").unwrap_err(),
            CatalogError::StorageInconsistency { operation: "update file", affected: 0, .. }
        ));
        assert!(matches!(
            writer.delete(999).unwrap_err(),
            CatalogError::StorageInconsistency { operation: "delete file", .. }
        ));
    }

    #[test]
    fn writer_insert_for_missing_package_violates_foreign_key() {
        let (catalog, _dir) = temp_catalog();
        let mut writer = catalog.file_writer().unwrap();
        assert!(writer.insert(42, &entry("x", 0, 0), "h").is_err());
    }

    #[test]
    fn aggregate_combines_hashes_in_path_order() {
        let (catalog, _dir) = temp_catalog();
        let id = catalog.create_package("alpha").unwrap();
        let mut writer = catalog.file_writer().unwrap();
        writer.insert(id, &entry("c.txt", 3, 0), "hc").unwrap();
        writer.insert(id, &entry("a.txt", 5, 0), "ha").unwrap();
        drop(writer);

        let aggregate = catalog.recompute_package_aggregate(id).unwrap();
        assert_eq!(aggregate.hash, hasher::combine_digests(["ha", "hc"]));
        assert_eq!(aggregate.size, 8);
        assert_eq!(aggregate.file_count, 2);

        let stored = catalog.package("alpha").unwrap().unwrap();
        assert_eq!(stored.hash, aggregate.hash);
        assert_eq!(stored.size, 8);
        assert_eq!(stored.file_count, 2);
    }

    #[test]
    fn aggregate_of_missing_package_is_inconsistency() {
        let (catalog, _dir) = temp_catalog();
        assert!(matches!(
            catalog.recompute_package_aggregate(7).unwrap_err(),
            CatalogError::StorageInconsistency { .. }
        ));
    }

    #[test]
    fn prune_removes_inactive_packages_and_their_files() {
        let (catalog, _dir) = temp_catalog();
        let keep = catalog.create_package("keep").unwrap();
        let gone = catalog.create_package("gone").unwrap();
        let mut writer = catalog.file_writer().unwrap();
        writer.insert(keep, &entry("k", 0, 0), "h").unwrap();
        writer.insert(gone, &entry("g1", 0, 0), "h").unwrap();
        writer.insert(gone, &entry("g2", 0, 0), "h").unwrap();
        drop(writer);

        let removed = catalog.prune_stale_packages(|name| name == "keep").unwrap();
        assert_eq!(removed, vec!["gone"]);
        assert_eq!(catalog.known_package_names().unwrap(), vec!["keep"]);
        assert_eq!(file_count(&catalog), 1);
    }

    #[test]
    fn remove_unknown_package_is_inconsistency() {
        let (catalog, _dir) = temp_catalog();
        assert!(matches!(
            catalog.remove_package("ghost").unwrap_err(),
            CatalogError::StorageInconsistency { .. }
        ));
    }

    #[test]
    fn rolled_back_transaction_leaves_no_trace() {
        let (catalog, _dir) = temp_catalog();
        {
            let _tx = catalog.begin().unwrap();
            catalog.create_package("temp").unwrap();
        }
        assert_eq!(catalog.package_id("temp").unwrap(), None);

        let tx = catalog.begin().unwrap();
        catalog.create_package("kept").unwrap();
        tx.commit().unwrap();
        assert!(catalog.package_id("kept").unwrap().is_some());
    }

    #[test]
    fn block_and_unblock_report_changes() {
        let (catalog, _dir) = temp_catalog();
        assert!(catalog.block_package("beta").unwrap());
        assert!(!catalog.block_package("beta").unwrap());
        assert!(catalog.blocked_names().unwrap().contains("beta"));
        assert!(catalog.unblock_package("beta").unwrap());
        assert!(!catalog.unblock_package("beta").unwrap());
        assert!(catalog.blocked_names().unwrap().is_empty());
    }

    #[test]
    fn aliases_are_unique_on_both_sides() {
        let (catalog, _dir) = temp_catalog();
        catalog.set_alias("alpha", "a").unwrap();
        assert!(matches!(
            catalog.set_alias("alpha", "other").unwrap_err(),
            CatalogError::AliasTaken { .. }
        ));
        assert!(matches!(
            catalog.set_alias("beta", "a").unwrap_err(),
            CatalogError::AliasTaken { .. }
        ));
        catalog.set_alias("beta", "b").unwrap();

        let aliases = catalog.aliases().unwrap();
        assert_eq!(aliases.len(), 2);
        assert_eq!(aliases[0].alias, "a");
        assert_eq!(catalog.alias_of("beta").unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn remove_alias_by_alias_or_package() {
        let (catalog, _dir) = temp_catalog();
        catalog.set_alias("alpha", "a").unwrap();
        catalog.set_alias("beta", "b").unwrap();
        catalog.remove_alias("a").unwrap();
        catalog.remove_alias("beta").unwrap();
        assert!(catalog.aliases().unwrap().is_empty());
        assert!(matches!(
            catalog.remove_alias("a").unwrap_err(),
            CatalogError::AliasNotFound(_)
        ));
    }

    #[test]
    fn exec_marker_round_trip() {
        let (catalog, _dir) = temp_catalog();
        catalog.create_package("alpha").unwrap();
        catalog.create_package("beta").unwrap();
        assert_eq!(catalog.packages_missing_exec().unwrap(), vec!["alpha", "beta"]);

        catalog.set_exec_file("alpha", "bin/run.exe").unwrap();
        catalog.set_exec_file("beta", NO_EXEC).unwrap();
        assert_eq!(catalog.exec_file("alpha").unwrap().as_deref(), Some("bin/run.exe"));
        assert!(catalog.packages_missing_exec().unwrap().is_empty());
        assert!(matches!(
            catalog.exec_file("ghost").unwrap_err(),
            CatalogError::UnknownPackage { .. }
        ));
    }

    #[test]
    fn exported_packages_join_alias_and_files() {
        let (catalog, _dir) = temp_catalog();
        let b = catalog.create_package("beta").unwrap();
        let a = catalog.create_package("alpha").unwrap();
        let mut writer = catalog.file_writer().unwrap();
        writer.insert(a, &entry("x.txt", 1, 1), "hx").unwrap();
        writer.insert(b, &entry("y.txt", 1, 1), "hy").unwrap();
        drop(writer);
        catalog.recompute_package_aggregate(a).unwrap();
        catalog.set_alias("alpha", "al").unwrap();
        catalog.set_exec_file("alpha", NO_EXEC).unwrap();

        let exported = catalog.exported_packages().unwrap();
        assert_eq!(exported.len(), 2);
        assert_eq!(exported[0].name, "alpha");
        assert_eq!(exported[0].alias.as_deref(), Some("al"));
        assert_eq!(exported[0].exec.as_deref(), Some(NO_EXEC));
        assert_eq!(exported[0].files.get("x.txt").map(String::as_str), Some("hx"));
        assert_eq!(exported[1].name, "beta");
        assert_eq!(exported[1].alias, None);
    }

    #[test]
    fn clear_operations_are_independent() {
        let (catalog, _dir) = temp_catalog();
        catalog.create_package("alpha").unwrap();
        catalog.set_alias("alpha", "a").unwrap();
        catalog.block_package("beta").unwrap();

        assert_eq!(catalog.clear_packages().unwrap(), 1);
        assert_eq!(catalog.aliases().unwrap().len(), 1);
        assert_eq!(catalog.clear_aliases().unwrap(), 1);
        assert_eq!(catalog.clear_blocked().unwrap(), 1);
        assert!(catalog.blocked_names().unwrap().is_empty());
    }

    #[test]
    fn compact_keeps_data() {
        let (catalog, _dir) = temp_catalog();
        catalog.create_package("alpha").unwrap();
        catalog.compact().unwrap();
        assert_eq!(catalog.known_package_names().unwrap(), vec!["alpha"]);
    }
}
