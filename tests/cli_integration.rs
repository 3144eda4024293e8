//! CLI tests against recorded responses

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const RESPONSES: &str = r#"{"Items":[{"id":{"N":"1"},"name":{"S":"a"}}],"Count":1,"LastEvaluatedKey":{"id":{"N":"1"}}}
{"Items":[{"id":{"N":"2"},"name":{"S":"b"},"extra":{"M":{"z":{"N":"1"},"a":{"S":"q"}}}}],"Count":1}
"#;

fn dynaexport() -> Command {
    Command::cargo_bin("dynaexport").unwrap()
}

#[test]
fn test_csv_to_stdout() {
    let dir = tempdir().unwrap();
    let replay = dir.path().join("scan.jsonl");
    fs::write(&replay, RESPONSES).unwrap();

    dynaexport()
        .args(["--table", "people", "--limit", "1", "--replay"])
        .arg(&replay)
        .assert()
        .success()
        .stdout("id,name\r\n1,a\r\n2,b,\"{\"\"a\"\":\"\"q\"\",\"\"z\"\":1}\"\r\n");
}

#[test]
fn test_json_appends_to_file() {
    let dir = tempdir().unwrap();
    let replay = dir.path().join("scan.jsonl");
    let output = dir.path().join("out.json");
    fs::write(&replay, RESPONSES).unwrap();

    dynaexport()
        .args(["--table", "people", "--format", "json", "--replay"])
        .arg(&replay)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(
        written,
        "[{\"id\":1,\"name\":\"a\"}]\n[{\"id\":2,\"name\":\"b\",\"extra\":\"{\\\"a\\\":\\\"q\\\",\\\"z\\\":1}\"}]\n"
    );
}

#[test]
fn test_truncated_replay_fails_with_partial_output() {
    let dir = tempdir().unwrap();
    let replay = dir.path().join("scan.jsonl");
    let first_only = RESPONSES.lines().next().unwrap();
    fs::write(&replay, first_only).unwrap();

    dynaexport()
        .args(["--table", "people", "--replay"])
        .arg(&replay)
        .assert()
        .code(2)
        .stdout("id,name\r\n1,a\r\n")
        .stderr(predicate::str::contains("replay exhausted"));
}

#[test]
fn test_zero_limit_is_rejected() {
    dynaexport()
        .args(["--table", "people", "--limit", "0", "--replay", "missing.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("page limit"));
}

#[test]
fn test_missing_replay_file() {
    dynaexport()
        .args(["--table", "people", "--replay", "/nonexistent/scan.jsonl"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to open replay file"));
}
