//! Prepared file-row writes, compiled once per indexing run.

use crate::error::{Result, expect_rows};
use crate::scanner::ScanEntry;
use rusqlite::{Connection, Statement};

/// Insert/update/delete statements for `files`, reused for every file of
/// every package in one run. Statements are finalized when this is dropped,
/// which the borrow on the connection forces to happen before it closes.
pub struct FileWriter<'conn> {
    insert: Statement<'conn>,
    update: Statement<'conn>,
    delete: Statement<'conn>,
}

impl<'conn> FileWriter<'conn> {
    pub(crate) fn prepare(conn: &'conn Connection) -> Result<Self> {
        Ok(Self {
            insert: conn.prepare(
                "INSERT INTO files (package_id, path, size, modified_at, hash)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?,
            update: conn
                .prepare("UPDATE files SET size = ?1, modified_at = ?2, hash = ?3 WHERE id = ?4")?,
            delete: conn.prepare("DELETE FROM files WHERE id = ?1")?,
        })
    }

    pub fn insert(&mut self, package_id: i64, entry: &ScanEntry, hash: &str) -> Result<()> {
        let affected = self.insert.execute((
            package_id,
            &entry.path,
            entry.size,
            entry.modified_at,
            hash,
        ))?;
        expect_rows("insert file", 1, affected)
    }

    pub fn update(&mut self, file_id: i64, entry: &ScanEntry, hash: &str) -> Result<()> {
        let affected = self
            .update
            .execute((entry.size, entry.modified_at, hash, file_id))?;
        expect_rows("update file", 1, affected)
    }

    pub fn delete(&mut self, file_id: i64) -> Result<()> {
        let affected = self.delete.execute([file_id])?;
        expect_rows("delete file", 1, affected)
    }
}
