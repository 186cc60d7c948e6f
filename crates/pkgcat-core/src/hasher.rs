//! Content digests for files and package aggregates.
//!
//! All digests are SHA-256 rendered as lowercase hex. They are compared as
//! opaque strings, so every producer and consumer must agree on this scheme.

use crate::error::{CatalogError, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

/// Digest the full contents of the file at `path`.
pub fn file_digest(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| CatalogError::io(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| CatalogError::io(path, e))?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Digest an in-memory buffer.
pub fn bytes_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Digest the ordered concatenation of `digests`.
///
/// Order-sensitive: callers pass file digests sorted by file path so the
/// package aggregate is reproducible.
pub fn combine_digests<I, S>(digests: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha256::new();
    for digest in digests {
        hasher.update(digest.as_ref().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
