use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("knowthyself")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("send"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_serve_help_shows_addr() {
    cargo_bin_cmd!("knowthyself")
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--addr"))
        .stdout(predicate::str::contains("KNOWTHYSELF_GATEWAY_ADDR"));
}

#[test]
fn test_send_help_shows_thread_options() {
    cargo_bin_cmd!("knowthyself")
        .args(["send", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--thread"))
        .stdout(predicate::str::contains("--show-thread"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("knowthyself")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.2"));
}
