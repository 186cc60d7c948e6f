//! Repository-level configuration.
//!
//! Read from an optional `pkgcat.toml` at the repository root. Every field has
//! a default, so a missing file and an empty file behave the same.

use crate::error::{CatalogError, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const CONFIG_FILE: &str = "pkgcat.toml";

fn default_scan_queue_depth() -> usize {
    256
}

fn default_exec_pattern() -> String {
    r"^.+\.exe$".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Entries buffered between the directory walker and the merge.
    #[serde(default = "default_scan_queue_depth")]
    pub scan_queue_depth: usize,
    /// Regexes over package-relative paths; matching files are never cataloged.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    /// Regex selecting executable-file candidates inside a package.
    #[serde(default = "default_exec_pattern")]
    pub exec_pattern: String,
    /// Keep indexing the remaining packages after one fails.
    #[serde(default)]
    pub continue_on_error: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_queue_depth: default_scan_queue_depth(),
            ignore_patterns: Vec::new(),
            exec_pattern: default_exec_pattern(),
            continue_on_error: false,
        }
    }
}

impl Config {
    /// Load `pkgcat.toml` from `repo_root`, falling back to defaults if absent.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let path = repo_root.join(CONFIG_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(CatalogError::io(path, e)),
        };
        let config: Config =
            toml::from_str(&content).map_err(|source| CatalogError::Config { path, source })?;
        // Surface bad patterns at load time rather than mid-run.
        config.compiled_ignore_patterns()?;
        config.compiled_exec_pattern()?;
        Ok(config)
    }

    pub fn compiled_ignore_patterns(&self) -> Result<Vec<Regex>> {
        self.ignore_patterns.iter().map(|p| compile(p)).collect()
    }

    pub fn compiled_exec_pattern(&self) -> Result<Regex> {
        compile(&self.exec_pattern)
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| CatalogError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
