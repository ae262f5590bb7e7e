//! End-to-end tests for the `banker` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TEXTBOOK_JSON: &str = r#"{
  "available": [3, 3, 2],
  "max": [[7, 5, 3], [3, 2, 2], [9, 0, 2], [2, 2, 2], [4, 3, 3]],
  "allocation": [[0, 1, 0], [2, 0, 0], [3, 0, 2], [2, 1, 1], [0, 0, 2]]
}"#;

const TEXTBOOK_EMPTY_YAML: &str = "available: [0, 0, 0]
max:
  - [7, 5, 3]
  - [3, 2, 2]
  - [9, 0, 2]
  - [2, 2, 2]
  - [4, 3, 3]
allocation:
  - [0, 1, 0]
  - [2, 0, 0]
  - [3, 0, 2]
  - [2, 1, 1]
  - [0, 0, 2]
";

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn banker() -> Command {
    let mut cmd = Command::cargo_bin("banker").unwrap();
    cmd.env_remove("BANKER_CONFIG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_safe_snapshot_exits_zero() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "state.json", TEXTBOOK_JSON);

    banker()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("SAFE"))
        .stdout(predicate::str::contains("P1 → P3 → P4 → P0 → P2"));
}

#[test]
fn check_unsafe_snapshot_exits_two() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "state.yaml", TEXTBOOK_EMPTY_YAML);

    banker()
        .arg("check")
        .arg(&path)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("UNSAFE"));
}

#[test]
fn check_json_output_is_machine_readable() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "state.json", TEXTBOOK_JSON);

    let output = banker()
        .args(["--output", "json", "check"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["report"]["verdict"], "SAFE");
    assert_eq!(value["report"]["sequence"].as_array().unwrap().len(), 5);
    assert_eq!(value["state"]["need"][0], serde_json::json!([7, 4, 3]));
}

#[test]
fn check_with_trace_prints_steps() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "state.json", TEXTBOOK_JSON);

    banker()
        .args(["check", "--trace"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("blocked"))
        .stdout(predicate::str::contains("R0 short by 4"));
}

#[test]
fn check_rejects_over_allocation() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "bad.json",
        r#"{"available":[1],"max":[[1]],"allocation":[[2]]}"#,
    );

    banker()
        .arg("check")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("declares a maximum of 1"));
}

#[test]
fn check_rejects_committed_sum_beyond_i64() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "huge.json",
        r#"{"available":[9223372036854775807],
            "max":[[9223372036854775807],[9223372036854775807]],
            "allocation":[[9223372036854775807],[9223372036854775807]]}"#,
    );

    banker()
        .arg("check")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("R0: available plus allocated instances exceed"));
}

#[test]
fn check_rejects_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "state.csv", "1,2,3");

    banker()
        .arg("check")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported snapshot format"));
}

// ---------------------------------------------------------------------------
// request
// ---------------------------------------------------------------------------

#[test]
fn request_granted_and_saved() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "state.json", TEXTBOOK_JSON);
    let saved = dir.path().join("after.toml");

    banker()
        .args(["request", "--process", "1", "--vector", "1,0,2", "--save"])
        .arg(&saved)
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("granted"));

    let after = std::fs::read_to_string(&saved).unwrap();
    assert!(after.contains("available = [2, 3, 0]"));
}

#[test]
fn request_unsafe_is_denied() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "state.json",
        r#"{
  "available": [2, 3, 0],
  "max": [[7, 5, 3], [3, 2, 2], [9, 0, 2], [2, 2, 2], [4, 3, 3]],
  "allocation": [[0, 1, 0], [3, 0, 2], [3, 0, 2], [2, 1, 1], [0, 0, 2]]
}"#,
    );

    let output = banker()
        .args(["-o", "json", "request", "--process", "0", "--vector", "0,2,0"])
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["outcome"], "denied");
    assert_eq!(value["reason"], "unsafe");
    assert_eq!(value["state"]["available"], serde_json::json!([2, 3, 0]));
}

#[test]
fn request_with_wrong_length_fails() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "state.json", TEXTBOOK_JSON);

    banker()
        .args(["request", "--process", "0", "--vector", "1,1"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("shape mismatch"));
}

// ---------------------------------------------------------------------------
// generate / config
// ---------------------------------------------------------------------------

#[test]
fn generate_is_reproducible_with_seed() {
    let run = || {
        banker()
            .args(["-o", "json", "generate", "-n", "4", "-m", "3", "--seed", "11"])
            .output()
            .unwrap()
    };
    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let value: serde_json::Value = serde_json::from_slice(&first.stdout).unwrap();
    assert_eq!(value["max"].as_array().unwrap().len(), 4);
    assert_eq!(value["available"].as_array().unwrap().len(), 3);
}

#[test]
fn generate_writes_file_that_check_accepts() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("random.yaml");

    banker()
        .args(["generate", "-n", "5", "-m", "2", "--seed", "3", "--out"])
        .arg(&out)
        .assert()
        .success();

    let status = banker().arg("check").arg(&out).output().unwrap().status;
    assert!(matches!(status.code(), Some(0) | Some(2)));
}

#[test]
fn config_file_sets_scan_order() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "banker.toml", "[evaluator]\nscan_order = \"descending\"\n");
    let path = write(&dir, "state.json", TEXTBOOK_JSON);

    banker()
        .arg("--config")
        .arg(&config)
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Safe sequence: P3"));
}

#[test]
fn config_command_prints_effective_config() {
    banker()
        .args(["-o", "json", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"scan_order\": \"ascending\""));
}
