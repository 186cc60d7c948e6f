mod cli;
mod maintenance;
mod output;

use clap::Parser;
use cli::{AliasAction, ClearTarget, Cli, Command, ExecAction, MaintenanceAction};
use log::debug;
use pkgcat_core::{
    IndexMode, IndexRequest, MigrationOutcome, Repository, exec, lifecycle, migrate, repo_status,
    run_export, run_index,
};
use std::error::Error;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CliResult = Result<(), Box<dyn Error>>;

/// Prompt user for confirmation. Returns false when stdin is not a terminal.
fn confirm_action(prompt: &str) -> bool {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return false;
    }

    eprint!("{} [y/N] ", prompt);
    io::stderr().flush().ok();

    let mut input = String::new();
    if stdin.lock().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn resolve_root(repo: Option<PathBuf>) -> io::Result<PathBuf> {
    match repo {
        Some(path) => Ok(path),
        None => std::env::current_dir(),
    }
}

/// Open the repository and refuse to continue on a schema mismatch.
fn open_for_write(root: &Path) -> Result<Repository, Box<dyn Error>> {
    let repo = Repository::open(root)?;
    repo.catalog().check_compatible()?;
    Ok(repo)
}

fn cmd_index(root: &Path, full: bool, packages: Vec<String>, verbose: u8) -> CliResult {
    let repo = Repository::open(root)?;
    let request = IndexRequest {
        mode: if full {
            IndexMode::Full
        } else {
            IndexMode::Incremental
        },
        targets: packages,
        maintenance_engaged: maintenance::is_engaged(root),
    };
    let reporter = output::LineReporter::stdout(verbose > 0);
    let report = run_index(&repo, &request, &reporter)?;
    reporter.finish()?;
    println!("{}", output::render_index_report(&report));
    let failed = report.failed.len();
    repo.close()?;
    if failed > 0 {
        return Err(format!("{failed} package(s) failed to index").into());
    }
    Ok(())
}

fn cmd_export(root: &Path) -> CliResult {
    let repo = Repository::open(root)?;
    let summary = run_export(&repo, maintenance::is_engaged(root))?;
    println!(
        "exported {} package(s), {} file(s), {} bytes",
        summary.packages, summary.files, summary.compressed_bytes
    );
    println!("sha256 {}", summary.digest);
    repo.close()?;
    Ok(())
}

fn cmd_alias(root: &Path, action: AliasAction) -> CliResult {
    match action {
        AliasAction::Show => {
            let repo = Repository::open(root)?;
            for entry in repo.catalog().aliases()? {
                println!("{}  {}", entry.alias, entry.package);
            }
        }
        AliasAction::Set { pairs } => {
            let repo = open_for_write(root)?;
            for (package, alias) in pairs {
                lifecycle::set_alias(&repo, &package, &alias)?;
                println!("{package}: alias {alias}");
            }
        }
        AliasAction::Del { names } => {
            let repo = open_for_write(root)?;
            for name in names {
                repo.catalog().remove_alias(&name)?;
                println!("{name}: alias removed");
            }
        }
    }
    Ok(())
}

fn cmd_exec(root: &Path, action: ExecAction) -> CliResult {
    match action {
        ExecAction::Check => {
            let repo = open_for_write(root)?;
            let check = exec::check_exec(&repo)?;
            for (package, marker) in &check.assigned {
                println!("{package}: {marker}");
            }
            for (package, candidates) in &check.ambiguous {
                println!("{package}: ambiguous, pick one with `pkgcat exec set {package}=FILE`");
                for candidate in candidates {
                    println!("    {candidate}");
                }
            }
            if check.assigned.is_empty() && check.ambiguous.is_empty() {
                println!("every package has an exec file");
            }
        }
        ExecAction::Show => {
            let repo = Repository::open(root)?;
            for package in repo.catalog().known_package_names()? {
                let marker = repo.catalog().exec_file(&package)?;
                println!("{package}  {}", marker.as_deref().unwrap_or("-"));
            }
        }
        ExecAction::Set { pairs } => {
            let repo = open_for_write(root)?;
            for (package, file) in pairs {
                exec::set_exec(&repo, &package, &file)?;
                println!("{package}: exec file set to {file}");
            }
        }
        ExecAction::Del { packages } => {
            let repo = open_for_write(root)?;
            for package in packages {
                exec::clear_exec(&repo, &package)?;
                println!("{package}: no exec file");
            }
        }
    }
    Ok(())
}

fn cmd_maintenance(root: &Path, action: MaintenanceAction) -> CliResult {
    match action {
        MaintenanceAction::On => {
            if maintenance::engage(root)? {
                println!("maintenance mode on");
            } else {
                println!("maintenance mode already on");
            }
        }
        MaintenanceAction::Off => {
            if maintenance::release(root)? {
                println!("maintenance mode off");
            } else {
                println!("maintenance mode already off");
            }
        }
        MaintenanceAction::Status => match maintenance::status(root)? {
            Some(info) => {
                let pid = info
                    .pid
                    .map_or_else(|| "unknown".to_string(), |pid| pid.to_string());
                let since = info.since.map_or_else(
                    || "unknown".to_string(),
                    |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
                );
                println!("maintenance mode on since {since} (pid {pid})");
                println!(
                    "remove {} to release it",
                    root.join(maintenance::SENTINEL_FILE).display()
                );
            }
            None => println!("maintenance mode off"),
        },
    }
    Ok(())
}

fn cmd_clear(root: &Path, what: ClearTarget, yes: bool) -> CliResult {
    let repo = open_for_write(root)?;
    let prompt = match what {
        ClearTarget::Index => "Delete every package and file from the catalog?",
        ClearTarget::Alias => "Delete every alias?",
        ClearTarget::Blocked => "Unblock every package?",
        ClearTarget::All => "Delete packages, files, aliases and the blocked list?",
    };
    if !yes && !confirm_action(prompt) {
        return Err("aborted".into());
    }

    let catalog = repo.catalog();
    if matches!(what, ClearTarget::Index | ClearTarget::All) {
        println!("{} package(s) removed", catalog.clear_packages()?);
    }
    if matches!(what, ClearTarget::Alias | ClearTarget::All) {
        println!("{} alias(es) removed", catalog.clear_aliases()?);
    }
    if matches!(what, ClearTarget::Blocked | ClearTarget::All) {
        println!("{} package(s) unblocked", catalog.clear_blocked()?);
    }
    repo.close()?;
    Ok(())
}

fn cmd_migrate(root: &Path, yes: bool) -> CliResult {
    if !yes
        && !confirm_action("Rebuild the catalog? Files are rehashed on the next index run.")
    {
        return Err("aborted".into());
    }
    match migrate(root, maintenance::is_engaged(root))? {
        MigrationOutcome::UpToDate => println!("catalog is up to date"),
        MigrationOutcome::Migrated {
            from,
            aliases,
            blocked,
        } => {
            println!("migrated from schema {from}: kept {aliases} alias(es), {blocked} blocked");
            println!("run `pkgcat index` to rebuild the catalog");
        }
    }
    Ok(())
}

fn run(cli: Cli) -> CliResult {
    let root = resolve_root(cli.repo)?;
    debug!("repository root: {}", root.display());

    match cli.command {
        Command::Init => {
            Repository::init(&root)?.close()?;
            println!("initialized {}", root.display());
        }
        Command::Index { full, packages } => cmd_index(&root, full, packages, cli.verbose)?,
        Command::Export => cmd_export(&root)?,
        Command::Status => {
            let repo = Repository::open(&root)?;
            let status = repo_status(&repo)?;
            println!(
                "{}",
                output::render_status(&status, maintenance::is_engaged(&root))
            );
        }
        Command::List { which } => {
            let repo = Repository::open(&root)?;
            let listing = lifecycle::list_packages(&repo, which.into())?;
            if !listing.is_empty() {
                println!("{}", output::render_listing(&listing));
            }
        }
        Command::Block { packages } => {
            let repo = open_for_write(&root)?;
            for package in packages {
                if lifecycle::block(&repo, &package)? {
                    println!("{package}: blocked");
                } else {
                    println!("{package}: already blocked");
                }
            }
        }
        Command::Unblock { packages } => {
            let repo = open_for_write(&root)?;
            for package in packages {
                if lifecycle::unblock(&repo, &package)? {
                    println!("{package}: unblocked");
                } else {
                    println!("{package}: not blocked");
                }
            }
        }
        Command::Alias { action } => cmd_alias(&root, action.unwrap_or(AliasAction::Show))?,
        Command::Exec { action } => cmd_exec(&root, action.unwrap_or(ExecAction::Check))?,
        Command::Maintenance { action } => cmd_maintenance(&root, action)?,
        Command::Clear(args) => cmd_clear(&root, args.what, args.yes)?,
        Command::Migrate { yes } => cmd_migrate(&root, yes)?,
        Command::Compact => {
            let repo = open_for_write(&root)?;
            repo.catalog().compact()?;
            println!("catalog compacted");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
