//! Maintenance mode: an advisory single-writer sentinel in the repository root.
//!
//! The sentinel file holds the pid that engaged it and an RFC 3339 timestamp.
//! It is advisory only; nothing stops a second process from ignoring it.

use chrono::{DateTime, Local};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process;

pub const SENTINEL_FILE: &str = "__MAINTENANCE__";

/// Contents of an engaged sentinel. Fields are `None` when the file exists but
/// does not parse; it still counts as engaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceInfo {
    pub pid: Option<u32>,
    pub since: Option<DateTime<Local>>,
}

fn sentinel_path(root: &Path) -> PathBuf {
    root.join(SENTINEL_FILE)
}

pub fn is_engaged(root: &Path) -> bool {
    sentinel_path(root).is_file()
}

/// Create the sentinel. Returns false if it already existed.
pub fn engage(root: &Path) -> io::Result<bool> {
    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(sentinel_path(root))
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e),
    };
    writeln!(file, "{}", process::id())?;
    writeln!(file, "{}", Local::now().to_rfc3339())?;
    file.sync_all()?;
    Ok(true)
}

/// Remove the sentinel. Returns false if it was not there.
pub fn release(root: &Path) -> io::Result<bool> {
    match fs::remove_file(sentinel_path(root)) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

pub fn status(root: &Path) -> io::Result<Option<MaintenanceInfo>> {
    let content = match fs::read_to_string(sentinel_path(root)) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let mut lines = content.lines();
    let pid = lines.next().and_then(|l| l.trim().parse().ok());
    let since = lines
        .next()
        .and_then(|l| DateTime::parse_from_rfc3339(l.trim()).ok())
        .map(|t| t.with_timezone(&Local));
    Ok(Some(MaintenanceInfo { pid, since }))
}
