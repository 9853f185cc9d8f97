// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `notesync status`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn notesync(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("notesync");
    cmd.arg("--state-dir").arg(temp.path()).env_remove("RUST_LOG");
    cmd
}

fn enqueue(temp: &TempDir, operation_type: &str, data: &str) -> String {
    let output = notesync(temp)
        .args(["enqueue", operation_type, data])
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn empty_queue() {
    let temp = TempDir::new().unwrap();
    notesync(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout("queued: 0\n");
}

#[test]
fn lists_queued_operations() {
    let temp = TempDir::new().unwrap();
    let first = enqueue(&temp, "note_save", r#"{"id":"n1"}"#);
    let second = enqueue(&temp, "document_scan", r#"{"pages":2}"#);

    notesync(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("queued: 2\n"))
        .stdout(predicate::str::contains(format!("{}  note_save  retries 0/3", first)))
        .stdout(predicate::str::contains(format!(
            "{}  document_scan  retries 0/3",
            second
        )));
}

#[test]
fn json_output() {
    let temp = TempDir::new().unwrap();
    let id = enqueue(&temp, "note_sync", r#"{"id":"n7"}"#);

    let output = notesync(&temp)
        .args(["status", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["queued"], 1);
    assert_eq!(value["operations"][0]["id"], id.as_str());
    assert_eq!(value["operations"][0]["data"]["id"], "n7");
}

#[test]
fn corrupt_queue_file_reads_as_empty() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("offline_queue.json"), "not json").unwrap();

    notesync(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("queued: 0"));
}

#[test]
fn custom_storage_key_from_config() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("notesync.toml"),
        "[queue]\nstorage_key = \"outbox\"\n",
    )
    .unwrap();
    enqueue(&temp, "note_save", "{}");

    assert!(temp.path().join("outbox.json").exists());
    notesync(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("queued: 1"));
}

#[test]
fn invalid_config_is_reported() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("notesync.toml"), "[queue]\nmax_size = 0\n").unwrap();

    notesync(&temp).arg("status").assert().failure();
}
