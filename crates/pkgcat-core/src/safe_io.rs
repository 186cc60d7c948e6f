//! Atomic file writes: temp file, fsync, rename.

use crate::error::{CatalogError, Result};
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Sibling of `path` with `.tmp` appended to the full file name.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `contents` to `path` so that readers see either the old file or the
/// complete new one.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp)
        .map_err(|e| CatalogError::io(&tmp, e))?;

    {
        let mut writer = BufWriter::new(&mut file);
        writer
            .write_all(contents)
            .and_then(|()| writer.flush())
            .map_err(|e| CatalogError::io(&tmp, e))?;
    }
    file.sync_all().map_err(|e| CatalogError::io(&tmp, e))?;

    fs::rename(&tmp, path).map_err(|e| CatalogError::io(path, e))
}
