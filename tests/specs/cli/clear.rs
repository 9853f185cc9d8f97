// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `notesync clear`.

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

#[test]
fn clears_queued_operations() {
    let temp = TempDir::new().unwrap();
    for _ in 0..2 {
        notesync(&temp)
            .args(["enqueue", "note_save", "{}"])
            .assert()
            .success();
    }

    notesync(&temp)
        .arg("clear")
        .assert()
        .success()
        .stdout("cleared 2 operation(s)\n");

    let contents = std::fs::read_to_string(temp.path().join("offline_queue.json")).unwrap();
    assert_eq!(contents, "[]");
    notesync(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout("queued: 0\n");
}

#[test]
fn clearing_empty_queue_succeeds() {
    let temp = TempDir::new().unwrap();
    notesync(&temp)
        .arg("clear")
        .assert()
        .success()
        .stdout("cleared 0 operation(s)\n");
}

#[test]
fn refused_while_queue_is_locked() {
    use fs2::FileExt;

    let temp = TempDir::new().unwrap();
    let lock = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(temp.path().join("notesync.lock"))
        .unwrap();
    lock.try_lock_exclusive().unwrap();

    notesync(&temp)
        .arg("clear")
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked by another notesync process"));

    lock.unlock().unwrap();
    notesync(&temp).arg("clear").assert().success();
}
