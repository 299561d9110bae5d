//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;

fn spookstudy_server() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("spookstudy-server").unwrap()
}

#[test]
fn help_lists_flags() {
    spookstudy_server()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--data-dir"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn version_prints() {
    spookstudy_server()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("spookstudy-server"));
}

#[test]
fn missing_config_file_fails() {
    spookstudy_server()
        .arg("--config")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
