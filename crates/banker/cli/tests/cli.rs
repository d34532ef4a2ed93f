//! End-to-end tests for the `banker` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn banker() -> Command {
    let mut cmd = Command::cargo_bin("banker").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn show_reports_available_and_need() {
    let json = json_stdout(banker().args(["-o", "json", "show"]).arg(fixture("textbook.toml")));
    assert_eq!(json["state"]["available"], serde_json::json!([3, 3, 2]));
    assert_eq!(json["state"]["need"][0], serde_json::json!([7, 4, 3]));
    assert_eq!(json["invariants"], "ok");
}

#[test]
fn show_table_lists_processes() {
    banker()
        .arg("show")
        .arg(fixture("textbook.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Available"))
        .stdout(predicate::str::contains("P4"));
}

#[test]
fn check_prints_safe_sequence() {
    banker()
        .arg("check")
        .arg(fixture("textbook.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("SAFE"))
        .stdout(predicate::str::contains("<P1, P3, P0, P2, P4>"));
}

#[test]
fn request_is_granted() {
    let json = json_stdout(banker()
        .args(["-o", "json", "request"])
        .arg(fixture("textbook.toml"))
        .args(["--process", "1", "--units", "1,0,2"]));
    assert_eq!(json["result"], "granted");
    assert_eq!(json["sequence"], serde_json::json!([1, 3, 0, 2, 4]));
    assert_eq!(json["state"]["available"], serde_json::json!([2, 3, 0]));
}

#[test]
fn request_over_claim_exits_with_denial_status() {
    banker()
        .arg("request")
        .arg(fixture("textbook.toml"))
        .args(["-p", "3", "-u", "1,0,0"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("exceeds_claim"));
}

#[test]
fn release_more_than_held_is_denied() {
    banker()
        .args(["-o", "json", "release"])
        .arg(fixture("textbook.toml"))
        .args(["-p", "4", "-u", "0,0,3"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("exceeds_allocation"));
}

#[test]
fn unknown_process_is_an_error() {
    banker()
        .arg("request")
        .arg(fixture("textbook.toml"))
        .args(["-p", "9", "-u", "0,0,0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown process P9"));
}

#[test]
fn oversubscribed_configuration_is_rejected() {
    banker()
        .arg("show")
        .arg(fixture("oversubscribed.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("exceeds available units 1"));
}

#[test]
fn unsupported_extension_is_rejected() {
    banker()
        .arg("check")
        .arg(fixture("ledger.ini"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unsupported file format"));
}

#[test]
fn scenario_replay_reports_every_step() {
    let json = json_stdout(banker().args(["-o", "json", "run"]).arg(fixture("scenario.toml")));

    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 5);
    assert_eq!(steps[0]["outcome"]["result"], "granted");
    assert_eq!(steps[1]["outcome"]["result"], "denied");
    assert_eq!(steps[1]["outcome"]["reason"], "would_deadlock");
    assert_eq!(
        steps[1]["outcome"]["blocked"],
        serde_json::json!([0, 1, 2, 3, 4])
    );
    assert_eq!(steps[2]["outcome"]["reason"], "insufficient_resources");
    assert_eq!(steps[3]["outcome"]["result"], "released");
    assert_eq!(steps[4]["outcome"]["verdict"]["verdict"], "safe");

    assert_eq!(json["applied"], 2);
    assert_eq!(json["denied"], 2);
    assert_eq!(json["final_state"]["available"], serde_json::json!([5, 3, 2]));
}

#[test]
fn scenario_table_output() {
    banker()
        .arg("run")
        .arg(fixture("scenario.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("request P0 [0,2,0]"))
        .stdout(predicate::str::contains("DENIED"))
        .stdout(predicate::str::contains("applied"));
}
