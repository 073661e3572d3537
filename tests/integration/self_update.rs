use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const DEAD_SERVER: &str = "http://127.0.0.1:1";

fn primer(cache: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("primer").unwrap();
    cmd.env("PRIMER_RELEASE_BASE_URL", DEAD_SERVER);
    cmd.env("PRIMER_CACHE_DIR", cache.path().join("cache"));
    cmd
}

#[test]
fn test_self_update_help_documents_flags() {
    let cache = TempDir::new().unwrap();
    primer(&cache)
        .args(["self-update", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force-update"))
        .stdout(predicate::str::contains("--check"));
}

#[test]
fn test_check_fails_cleanly_when_server_unreachable() {
    let cache = TempDir::new().unwrap();
    primer(&cache)
        .args(["self-update", "--check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not download"));
}

#[test]
fn test_unreachable_server_rolls_back_and_exits_nonzero() {
    let cache = TempDir::new().unwrap();

    // The version check is the first network access; with the server down
    // the pipeline rolls back trivially and must not touch the binary.
    primer(&cache)
        .arg("self-update")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("previous version was restored"));

    // The binary is still runnable after the failed update
    primer(&cache).arg("--version").assert().success();
}

#[test]
fn test_alias_reaches_same_command() {
    let cache = TempDir::new().unwrap();
    primer(&cache)
        .args(["selfupdate", "--check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not download"));
}
