// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! State directory layout.
//!
//! ```text
//! <state dir>/
//!   notesync.toml        configuration (optional)
//!   offline_queue.json   persisted queue (FileStore)
//!   notesync.lock        held while the queue is being changed
//!   notesync.log         log of `notesync run`
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use ns_core::config::CONFIG_FILE_NAME;

use crate::error::{Error, Result};

const STATE_DIR_NAME: &str = "notesync";
const LOCK_FILE_NAME: &str = "notesync.lock";
const LOG_FILE_NAME: &str = "notesync.log";

/// Resolve the state directory: an explicit path wins, then the platform
/// state directory, then the local data directory.
pub fn resolve_state_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|base| base.join(STATE_DIR_NAME))
        .ok_or(Error::NoStateDir)
}

pub fn config_path(state_dir: &Path) -> PathBuf {
    state_dir.join(CONFIG_FILE_NAME)
}

pub fn log_path(state_dir: &Path) -> PathBuf {
    state_dir.join(LOG_FILE_NAME)
}

/// Take the exclusive queue lock, creating the state directory if needed.
///
/// The lock is released when the returned file is dropped.
pub fn acquire_lock(state_dir: &Path) -> Result<fs::File> {
    use fs2::FileExt;

    fs::create_dir_all(state_dir)?;
    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(state_dir.join(LOCK_FILE_NAME))?;
    file.try_lock_exclusive().map_err(|_| Error::QueueLocked)?;
    Ok(file)
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
