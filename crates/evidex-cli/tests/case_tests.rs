//! Integration tests for case commands

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn evidex_cmd(cases: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("evidex").unwrap();
    cmd.env("EVIDEX_CASES_DIR", cases.path())
        .env("EVIDEX_CONFIG", cases.path().join("config.yml"));
    cmd
}

#[test]
fn test_case_create_and_list() {
    let cases = TempDir::new().unwrap();

    evidex_cmd(&cases)
        .args(["case", "create", "acme", "--investigator", "J. Doe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created case 'acme'"));

    evidex_cmd(&cases)
        .args(["case", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("acme"));

    evidex_cmd(&cases)
        .args(["case", "info", "acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("J. Doe"));
}

#[test]
fn test_case_create_duplicate_fails() {
    let cases = TempDir::new().unwrap();

    evidex_cmd(&cases)
        .args(["case", "create", "acme"])
        .assert()
        .success();

    evidex_cmd(&cases)
        .args(["case", "create", "acme"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_case_invalid_name_fails() {
    let cases = TempDir::new().unwrap();

    evidex_cmd(&cases)
        .args(["case", "create", "../escape"])
        .assert()
        .failure()
        .code(3);
}

#[test]
fn test_missing_case_fails_with_not_found() {
    let cases = TempDir::new().unwrap();

    evidex_cmd(&cases)
        .args(["case", "info", "nope"])
        .assert()
        .failure()
        .code(2);

    evidex_cmd(&cases)
        .args(["status", "nope"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_case_remove() {
    let cases = TempDir::new().unwrap();

    evidex_cmd(&cases)
        .args(["case", "create", "acme"])
        .assert()
        .success();

    evidex_cmd(&cases)
        .args(["case", "rm", "acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed case 'acme'"));

    evidex_cmd(&cases)
        .args(["case", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cases"));
}

#[test]
fn test_case_list_json() {
    let cases = TempDir::new().unwrap();

    for name in ["beta", "alpha"] {
        evidex_cmd(&cases)
            .args(["case", "create", name])
            .assert()
            .success();
    }

    let output = evidex_cmd(&cases)
        .args(["--format", "json", "case", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let names: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(names, vec!["alpha", "beta"]);
}
