use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("careterm")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn test_watch_without_session_cookie_exits_cleanly() {
    Command::cargo_bin("careterm")
        .unwrap()
        .env_remove("CARETERM_SESSION_COOKIE")
        .arg("watch")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not authenticated"));
}

#[test]
fn test_watch_rejects_zero_interval() {
    Command::cargo_bin("careterm")
        .unwrap()
        .args(["watch", "--interval", "0"])
        .assert()
        .failure();
}
