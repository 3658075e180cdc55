use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("nbx")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("exec"))
        .stdout(predicate::str::contains("datasets"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--no-animation"));
}

#[test]
fn test_datasets_help_shows_subcommands() {
    cargo_bin_cmd!("nbx")
        .args(["datasets", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn test_notebook_requires_terminal() {
    let dir = tempfile::tempdir().unwrap();

    cargo_bin_cmd!("nbx")
        .env("NBX_HOME", dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a terminal"));
}
