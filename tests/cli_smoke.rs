//! Smoke tests for the bt binary against a throwaway board file.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn bt(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bt").expect("binary builds");
    cmd.arg("--db").arg(db);
    cmd
}

fn login(db: &Path, email: &str) {
    bt(db)
        .args(["login", email, "--password", "password123"])
        .assert()
        .success();
}

#[test]
fn commands_require_a_login() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("board.json");

    bt(&db)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn bad_credentials_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("board.json");

    bt(&db)
        .args(["login", "avery@example.dev", "--password", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Login failed"));
}

#[test]
fn add_then_list_shows_the_task() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("board.json");
    login(&db, "avery@example.dev");

    bt(&db)
        .args(["add", "Fix the flaky upload test", "--desc", "Retries mask a real timeout."])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added task 1"));

    bt(&db)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fix the flaky upload test"));
}

#[test]
fn approval_needs_a_manager() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("board.json");
    login(&db, "avery@example.dev");

    bt(&db)
        .args(["add", "Tighten the session timeout", "--desc", "30 minutes is too long."])
        .assert()
        .success();
    bt(&db).args(["start", "1"]).assert().success();
    bt(&db)
        .args(["complete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending Approval"));

    // the developer may not approve their own work
    bt(&db)
        .args(["approve", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid status transition"));

    login(&db, "morgan@example.dev");
    bt(&db)
        .args(["approve", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Closed"));
}

#[test]
fn logged_hours_show_up_in_the_total() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("board.json");
    login(&db, "avery@example.dev");

    bt(&db)
        .args(["add", "Profile the slow dashboard query", "--desc", "Page takes seconds."])
        .assert()
        .success();
    bt(&db)
        .args(["log", "1", "2.5", "--desc", "Captured a query plan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2.5h total"));

    bt(&db)
        .args(["log", "1", "0", "--desc", "nothing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation failed"));
}

#[test]
fn seeded_board_reports_stats_to_the_manager() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("board.json");

    bt(&db)
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Seeded 5 demo tasks"));

    login(&db, "morgan@example.dev");
    bt(&db)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Team members"));

    bt(&db)
        .arg("trend")
        .assert()
        .success();
}
