// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `notesync enqueue`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use yare::parameterized;

fn notesync(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("notesync");
    cmd.arg("--state-dir").arg(temp.path()).env_remove("RUST_LOG");
    cmd
}

fn queue_file(temp: &TempDir) -> serde_json::Value {
    let contents = std::fs::read_to_string(temp.path().join("offline_queue.json")).unwrap();
    serde_json::from_str(&contents).unwrap()
}

#[test]
fn prints_generated_id() {
    let temp = TempDir::new().unwrap();
    let output = notesync(&temp)
        .args(["enqueue", "note_save", r#"{"id":"n1"}"#])
        .output()
        .unwrap();
    assert!(output.status.success());

    let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let (millis, hash) = id.split_once('-').unwrap();
    assert!(millis.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(hash.len(), 8);
}

#[test]
fn writes_queue_file() {
    let temp = TempDir::new().unwrap();
    notesync(&temp)
        .args(["enqueue", "document_scan", r#"{"pages":3}"#, "--max-retries", "5"])
        .assert()
        .success();

    let queue = queue_file(&temp);
    let ops = queue.as_array().unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0]["type"], "document_scan");
    assert_eq!(ops[0]["data"]["pages"], 3);
    assert_eq!(ops[0]["retryCount"], 0);
    assert_eq!(ops[0]["maxRetries"], 5);
}

#[test]
fn appends_in_order() {
    let temp = TempDir::new().unwrap();
    for n in 1..=3 {
        notesync(&temp)
            .args(["enqueue", "note_sync", &format!(r#"{{"n":{}}}"#, n)])
            .assert()
            .success();
    }

    let queue = queue_file(&temp);
    let order: Vec<_> = queue
        .as_array()
        .unwrap()
        .iter()
        .map(|op| op["data"]["n"].as_i64().unwrap())
        .collect();
    assert_eq!(order, vec![1, 2, 3]);
}

#[parameterized(
    snake = { "note_save" },
    kebab = { "note-save" },
    camel = { "NoteSave" },
)]
fn accepts_type_spellings(operation_type: &str) {
    let temp = TempDir::new().unwrap();
    notesync(&temp)
        .args(["enqueue", operation_type, "{}"])
        .assert()
        .success();
    assert_eq!(queue_file(&temp)[0]["type"], "note_save");
}

#[test]
fn rejects_unknown_type() {
    let temp = TempDir::new().unwrap();
    notesync(&temp)
        .args(["enqueue", "note_delete", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid operation type"))
        .stderr(predicate::str::contains("hint: valid types are"));
}

#[parameterized(
    malformed = { "{oops", "invalid operation data" },
    null = { "null", "operation payload is missing" },
)]
fn rejects_bad_data(data: &str, message: &str) {
    let temp = TempDir::new().unwrap();
    notesync(&temp)
        .args(["enqueue", "note_save", data])
        .assert()
        .failure()
        .stderr(predicate::str::contains(message));
    assert!(!temp.path().join("offline_queue.json").exists());
}

#[test]
fn rejects_retry_budget_above_limit() {
    let temp = TempDir::new().unwrap();
    notesync(&temp)
        .args(["enqueue", "note_save", "{}", "--max-retries", "11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid max retries: 11"));
}
