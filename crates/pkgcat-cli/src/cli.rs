//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use pkgcat_core::ListFilter;
use std::path::PathBuf;

const CLI_AFTER_HELP: &str = "\
Indexing, export and migration require maintenance mode:
  pkgcat maintenance on
  pkgcat index
  pkgcat export
  pkgcat maintenance off

The repository root is taken from --repo, then $PKGCAT_REPO, then the
current directory.";

/// pkgcat - keep a content-addressed catalog of repository packages
#[derive(Parser, Debug)]
#[command(name = "pkgcat", version, after_help = CLI_AFTER_HELP)]
pub struct Cli {
    /// Repository root
    #[arg(long, global = true, value_name = "PATH", env = "PKGCAT_REPO")]
    pub repo: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the catalog in the repository root
    Init,

    /// Sync packages into the catalog
    Index {
        /// Rehash every file, not only those whose size or mtime changed
        #[arg(long)]
        full: bool,
        /// Packages to index (default: all active packages)
        #[arg(value_name = "PKG")]
        packages: Vec<String>,
    },

    /// Write index.gz and index.gz.sha256
    Export,

    /// Summarize catalog and export state
    Status,

    /// List packages on disk
    List {
        #[arg(value_enum, default_value_t = ListKind::All)]
        which: ListKind,
    },

    /// Exclude packages from indexing and export
    Block {
        #[arg(required = true, value_name = "PKG")]
        packages: Vec<String>,
    },

    /// Re-include blocked packages
    Unblock {
        #[arg(required = true, value_name = "PKG")]
        packages: Vec<String>,
    },

    /// Manage package aliases
    Alias {
        #[command(subcommand)]
        action: Option<AliasAction>,
    },

    /// Manage executable-file markers
    Exec {
        #[command(subcommand)]
        action: Option<ExecAction>,
    },

    /// Engage, release or inspect maintenance mode
    Maintenance {
        #[arg(value_enum, default_value_t = MaintenanceAction::Status)]
        action: MaintenanceAction,
    },

    /// Delete catalog rows
    Clear(ClearArgs),

    /// Rebuild the catalog for the current schema version
    Migrate {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Vacuum and reindex the catalog database
    Compact,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    All,
    Indexed,
    Noindexed,
    Blocked,
}

impl From<ListKind> for ListFilter {
    fn from(kind: ListKind) -> Self {
        match kind {
            ListKind::All => ListFilter::All,
            ListKind::Indexed => ListFilter::Indexed,
            ListKind::Noindexed => ListFilter::NotIndexed,
            ListKind::Blocked => ListFilter::Blocked,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum AliasAction {
    /// List aliases (default)
    Show,
    /// Assign aliases, as PKG=ALIAS
    Set {
        #[arg(required = true, value_name = "PKG=ALIAS", value_parser = parse_assignment)]
        pairs: Vec<(String, String)>,
    },
    /// Remove aliases, by alias or package name
    Del {
        #[arg(required = true, value_name = "ALIAS")]
        names: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExecAction {
    /// Detect markers for packages that have none (default)
    Check,
    /// Show every package's marker
    Show,
    /// Set a marker explicitly, as PKG=FILE
    Set {
        #[arg(required = true, value_name = "PKG=FILE", value_parser = parse_assignment)]
        pairs: Vec<(String, String)>,
    },
    /// Mark packages as having no executable
    Del {
        #[arg(required = true, value_name = "PKG")]
        packages: Vec<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceAction {
    On,
    Off,
    Status,
}

#[derive(Args, Debug)]
pub struct ClearArgs {
    #[arg(value_enum)]
    pub what: ClearTarget,
    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    /// Packages and their files
    Index,
    Alias,
    Blocked,
    All,
}

/// Parse `KEY=VALUE` with both sides non-empty.
fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => {
            Ok((key.to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got {s:?}")),
    }
}
