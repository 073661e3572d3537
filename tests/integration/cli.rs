use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Base URL guaranteed to refuse connections immediately.
const DEAD_SERVER: &str = "http://127.0.0.1:1";

fn primer() -> Command {
    let mut cmd = Command::cargo_bin("primer").unwrap();
    cmd.env("PRIMER_RELEASE_BASE_URL", DEAD_SERVER);
    cmd
}

#[test]
fn test_help_lists_commands() {
    primer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("new"))
        .stdout(predicate::str::contains("self-update"));
}

#[test]
fn test_version_flag() {
    primer()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_command_fails() {
    primer().arg("frobnicate").assert().failure();
}

#[test]
fn test_new_requires_directory_argument() {
    primer()
        .arg("new")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DIRECTORY"));
}

#[test]
fn test_new_reports_download_failure_with_suggestion() {
    let temp = TempDir::new().unwrap();

    primer()
        .env("PRIMER_CACHE_DIR", temp.path().join("cache"))
        .current_dir(temp.path())
        .args(["new", "my-app", "--version", "1.0.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not download"))
        .stderr(predicate::str::contains("network"));

    // The failed run must not leave a half-created project behind beyond
    // the empty target directory
    assert!(!temp.path().join("my-app").join("primer.toml").exists());
}

#[test]
fn test_new_rejects_invalid_version() {
    let temp = TempDir::new().unwrap();

    primer()
        .env("PRIMER_CACHE_DIR", temp.path().join("cache"))
        .current_dir(temp.path())
        .args(["new", "my-app", "--version", "not-a-version"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid version string"));
}
