//! Schema version guard.
//!
//! The catalog stamps its `(major, minor)` schema version once, at
//! initialization. Every mutating operation compares it against
//! [`CURRENT_SCHEMA`] first and refuses to touch a catalog it does not match
//! exactly.

use crate::error::{Result, VersionMismatch};
use std::cmp::Ordering;
use std::fmt;

/// Schema version this binary reads and writes.
pub const CURRENT_SCHEMA: SchemaVersion = SchemaVersion { major: 1, minor: 4 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaVersion {
    pub major: i64,
    pub minor: i64,
}

impl SchemaVersion {
    pub const fn new(major: i64, minor: i64) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Compare a catalog's version against the one this binary requires.
///
/// Major is decided before minor, so a catalog from a newer major release is
/// reported as `BinaryTooOld` even if its minor number happens to be lower.
pub fn check_compatible(found: SchemaVersion, required: SchemaVersion) -> Result<()> {
    let mismatch = match found.major.cmp(&required.major) {
        Ordering::Less => Some(VersionMismatch::RequiresReindex { found, required }),
        Ordering::Greater => Some(VersionMismatch::BinaryTooOld { found, required }),
        Ordering::Equal => match found.minor.cmp(&required.minor) {
            Ordering::Less => Some(VersionMismatch::RequiresMigration { found, required }),
            Ordering::Greater => Some(VersionMismatch::BinaryTooOld { found, required }),
            Ordering::Equal => None,
        },
    };
    match mismatch {
        Some(m) => Err(m.into()),
        None => Ok(()),
    }
}
