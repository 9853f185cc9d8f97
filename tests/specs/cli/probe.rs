// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `notesync probe` and the `run` preconditions.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::io::{Read, Write};
use std::net::TcpListener;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn notesync(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("notesync");
    cmd.arg("--state-dir").arg(temp.path()).env_remove("RUST_LOG");
    cmd
}

fn write_config(temp: &TempDir, contents: &str) {
    std::fs::write(temp.path().join("notesync.toml"), contents).unwrap();
}

/// Port with nothing listening.
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn unreachable_endpoints_report_offline() {
    let temp = TempDir::new().unwrap();
    write_config(
        &temp,
        &format!(
            "[probe]\nendpoints = [\"http://127.0.0.1:{}/\"]\ntimeout_ms = 1000\n",
            closed_port()
        ),
    );

    notesync(&temp)
        .arg("probe")
        .assert()
        .success()
        .stdout("offline\n");
}

#[test]
fn no_endpoints_report_offline() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "[probe]\nendpoints = []\n");

    notesync(&temp)
        .arg("probe")
        .assert()
        .success()
        .stdout("offline\n");
}

#[test]
fn responding_endpoint_reports_online() {
    let temp = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 204 No Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        }
    });
    write_config(
        &temp,
        &format!(
            "[probe]\nendpoints = [\"http://127.0.0.1:{}/generate_204\"]\ntimeout_ms = 2000\n",
            port
        ),
    );

    notesync(&temp)
        .arg("probe")
        .assert()
        .success()
        .stdout("online\n");
}

#[test]
fn run_without_backend_fails() {
    let temp = TempDir::new().unwrap();
    notesync(&temp)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no backend configured"))
        .stderr(predicate::str::contains("[backend]"));
}

#[test]
fn invalid_backend_url_is_rejected() {
    let temp = TempDir::new().unwrap();
    write_config(&temp, "[backend]\nendpoint = \"ftp://example.com\"\n");

    notesync(&temp).arg("run").assert().failure();
}
