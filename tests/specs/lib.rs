// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Black-box specs for the `notesync` binary.
//!
//! The files under `cli/` are compiled as test targets of the
//! `notesync` package so `cargo_bin_cmd!` can locate the binary.
