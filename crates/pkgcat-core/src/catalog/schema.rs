//! Catalog schema and connection setup.
//!
//! `initialize` creates the tables and stamps [`CURRENT_SCHEMA`] into `info`;
//! `open_connection` is the single entry point for an existing catalog: it
//! enables WAL and foreign keys and verifies integrity. There is no in-place
//! migration here; a schema change bumps the version and goes through
//! `migrate`.

use crate::error::{CatalogError, Result};
use crate::version::{CURRENT_SCHEMA, SchemaVersion};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

const SCHEMA_SQL: &str = "
    CREATE TABLE packages (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        name       TEXT    NOT NULL UNIQUE,
        hash       TEXT    NOT NULL DEFAULT '',
        size       INTEGER NOT NULL DEFAULT 0,
        file_count INTEGER NOT NULL DEFAULT 0,
        exec       TEXT
    );

    CREATE TABLE files (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        package_id  INTEGER NOT NULL REFERENCES packages(id)
                            ON DELETE CASCADE ON UPDATE CASCADE,
        path        TEXT    NOT NULL,
        size        INTEGER NOT NULL,
        modified_at INTEGER NOT NULL,
        hash        TEXT    NOT NULL
    );

    CREATE TABLE aliases (
        name  TEXT NOT NULL UNIQUE,
        alias TEXT NOT NULL UNIQUE
    );

    CREATE TABLE excludes (
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE info (
        id         INTEGER PRIMARY KEY CHECK (id = 1),
        vers_major INTEGER NOT NULL,
        vers_minor INTEGER NOT NULL
    );

    CREATE UNIQUE INDEX idx_files_package_path ON files(package_id, path);
";

fn configure(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "wal")?;
    conn.pragma_update(None, "foreign_keys", "on")?;
    Ok(())
}

/// Create a fresh catalog at `path` and stamp the current schema version.
pub(crate) fn initialize(path: &Path) -> Result<Connection> {
    if path.exists() {
        return Err(CatalogError::AlreadyInitialized {
            path: path.to_path_buf(),
        });
    }
    let conn = Connection::open(path)?;
    configure(&conn)?;

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute(
        "INSERT INTO info (id, vers_major, vers_minor) VALUES (1, ?1, ?2)",
        (CURRENT_SCHEMA.major, CURRENT_SCHEMA.minor),
    )?;
    tx.commit()?;
    Ok(conn)
}

/// Open an existing catalog without checking its schema version.
pub(crate) fn open_connection(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        return Err(CatalogError::NotInitialized {
            path: path.to_path_buf(),
        });
    }
    let conn = Connection::open(path)?;
    configure(&conn)?;
    check_integrity(&conn)?;
    Ok(conn)
}

fn check_integrity(conn: &Connection) -> Result<()> {
    let verdict: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
    if verdict == "ok" {
        Ok(())
    } else {
        Err(CatalogError::CorruptCatalog { detail: verdict })
    }
}

pub(crate) fn read_version(conn: &Connection) -> Result<SchemaVersion> {
    let version = conn
        .query_row(
            "SELECT vers_major, vers_minor FROM info WHERE id = 1",
            [],
            |row| Ok(SchemaVersion::new(row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    version.ok_or_else(|| CatalogError::CorruptCatalog {
        detail: "no schema version recorded".to_string(),
    })
}
