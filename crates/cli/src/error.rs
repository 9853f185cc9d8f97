// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the nsrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] ns_core::Error),

    #[error("invalid operation data: {0}\n  hint: pass the data as a JSON value, e.g. '{{\"id\":\"note-1\"}}'")]
    InvalidPayload(String),

    #[error("the offline queue is locked by another notesync process\n  hint: stop 'notesync run' before changing the queue")]
    QueueLocked,

    #[error("cannot determine a state directory\n  hint: pass --state-dir or set NOTESYNC_STATE_DIR")]
    NoStateDir,

    #[error("no backend configured\n  hint: set 'endpoint' under [backend] in {0}")]
    NoBackend(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A specialized Result type for nsrs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
