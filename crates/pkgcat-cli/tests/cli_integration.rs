//! Drives the `pkgcat` binary against a scratch repository.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn pkgcat(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pkgcat"))
        .arg("--repo")
        .arg(root)
        .args(args)
        .env_remove("PKGCAT_REPO")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run pkgcat")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("alpha/bin")).unwrap();
    fs::write(dir.path().join("alpha/bin/run.exe"), "MZ").unwrap();
    fs::write(dir.path().join("alpha/readme.txt"), "alpha").unwrap();
    fs::create_dir_all(dir.path().join("beta")).unwrap();
    fs::write(dir.path().join("beta/data.txt"), "beta").unwrap();
    let init = pkgcat(dir.path(), &["init"]);
    assert!(init.status.success(), "{}", stderr(&init));
    dir
}

#[test]
fn init_twice_fails() {
    let dir = repo();
    let again = pkgcat(dir.path(), &["init"]);
    assert!(!again.status.success());
    assert!(stderr(&again).contains("already initialized"));
}

#[test]
fn commands_fail_on_uninitialized_repository() {
    let dir = TempDir::new().unwrap();
    let out = pkgcat(dir.path(), &["status"]);
    assert!(!out.status.success());
    assert!(stderr(&out).starts_with("error: repository is not initialized"));
}

#[test]
fn index_requires_maintenance_mode() {
    let dir = repo();
    let out = pkgcat(dir.path(), &["index"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("maintenance mode is not engaged"));
}

#[test]
fn index_then_export() {
    let dir = repo();
    assert!(pkgcat(dir.path(), &["maintenance", "on"]).status.success());

    let index = pkgcat(dir.path(), &["index"]);
    assert!(index.status.success(), "{}", stderr(&index));
    let text = stdout(&index);
    assert!(text.contains("  + readme.txt"));
    assert!(text.contains("  + data.txt"));
    assert!(text.contains("2 package(s) synced"));

    let again = pkgcat(dir.path(), &["index"]);
    assert!(stdout(&again).contains("0 changed"));

    let check = pkgcat(dir.path(), &["exec", "check"]);
    assert!(check.status.success(), "{}", stderr(&check));
    assert!(stdout(&check).contains("alpha: bin/run.exe"));
    assert!(stdout(&check).contains("beta: noexec"));

    let export = pkgcat(dir.path(), &["export"]);
    assert!(export.status.success(), "{}", stderr(&export));
    assert!(stdout(&export).contains("exported 2 package(s), 3 file(s)"));
    assert!(dir.path().join("index.gz").is_file());
    assert!(dir.path().join("index.gz.sha256").is_file());

    assert!(pkgcat(dir.path(), &["maintenance", "off"]).status.success());
    let export = pkgcat(dir.path(), &["export"]);
    assert!(!export.status.success());
}

#[test]
fn maintenance_status_reports_sentinel() {
    let dir = repo();
    assert!(stdout(&pkgcat(dir.path(), &["maintenance"])).contains("maintenance mode off"));
    pkgcat(dir.path(), &["maintenance", "on"]);
    let text = stdout(&pkgcat(dir.path(), &["maintenance", "status"]));
    assert!(text.contains("maintenance mode on since"));
    assert!(text.contains("__MAINTENANCE__"));
    assert!(stdout(&pkgcat(dir.path(), &["maintenance", "on"])).contains("already on"));
}

#[test]
fn block_and_list() {
    let dir = repo();
    let block = pkgcat(dir.path(), &["block", "beta"]);
    assert!(block.status.success(), "{}", stderr(&block));

    let blocked = stdout(&pkgcat(dir.path(), &["list", "blocked"]));
    assert_eq!(blocked.trim(), "beta  blocked");

    let all = stdout(&pkgcat(dir.path(), &["list"]));
    assert!(all.contains("alpha  not indexed"));

    let missing = pkgcat(dir.path(), &["block", "ghost"]);
    assert!(!missing.status.success());
    assert!(stderr(&missing).contains("\"ghost\" not found"));

    assert!(stdout(&pkgcat(dir.path(), &["unblock", "beta"])).contains("beta: unblocked"));
}

#[test]
fn alias_round_trip() {
    let dir = repo();
    assert!(pkgcat(dir.path(), &["alias", "set", "alpha=a"]).status.success());
    assert_eq!(stdout(&pkgcat(dir.path(), &["alias"])).trim(), "a  alpha");

    let taken = pkgcat(dir.path(), &["alias", "set", "beta=a"]);
    assert!(!taken.status.success());

    assert!(pkgcat(dir.path(), &["alias", "del", "alpha"]).status.success());
    assert!(stdout(&pkgcat(dir.path(), &["alias"])).trim().is_empty());
}

#[test]
fn clear_without_terminal_needs_yes() {
    let dir = repo();
    let refused = pkgcat(dir.path(), &["clear", "all"]);
    assert!(!refused.status.success());
    assert!(stderr(&refused).contains("aborted"));

    let cleared = pkgcat(dir.path(), &["clear", "all", "--yes"]);
    assert!(cleared.status.success(), "{}", stderr(&cleared));
    assert!(stdout(&cleared).contains("0 package(s) removed"));
}

#[test]
fn status_suggests_next_steps() {
    let dir = repo();
    let text = stdout(&pkgcat(dir.path(), &["status"]));
    assert!(text.contains("packages on disk  2"));
    assert!(text.contains("run `pkgcat index`"));
    assert!(text.contains("maintenance mode  off"));
}

#[cfg(unix)]
#[test]
fn dangling_symlink_fails_the_index_run() {
    let dir = repo();
    std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("beta/broken"))
        .unwrap();
    pkgcat(dir.path(), &["maintenance", "on"]);

    let out = pkgcat(dir.path(), &["index"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("broken"));
    assert!(!stdout(&out).contains("2 package(s) synced"));
}
