// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ns-core operations.

use thiserror::Error;

use crate::connectivity::SourceError;
use crate::operation::OperationType;
use crate::store::StoreError;

/// All possible errors that can occur in ns-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid operation type: '{0}'\n  hint: valid types are: document_scan, note_save, note_sync")]
    InvalidOperationType(String),

    #[error("operation payload is missing\n  hint: queued operations must carry a non-null payload")]
    MissingPayload,

    #[error("invalid max retries: {0}\n  hint: must be between 0 and 10")]
    InvalidMaxRetries(u32),

    #[error("{operation} failed after {attempts} attempt(s): {message}")]
    TransientExecution {
        operation: String,
        attempts: u32,
        message: String,
    },

    #[error("{operation} failed with a non-retryable error after {attempts} attempt(s): {message}")]
    NonRetryableExecution {
        operation: String,
        attempts: u32,
        message: String,
    },

    #[error("no handler registered for {0} operations")]
    NoHandler(OperationType),

    #[error("network service is not initialized\n  hint: call initialize() before using the queue")]
    NotInitialized,

    #[error("network service has been shut down")]
    ShutDown,

    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("connectivity source error: {0}")]
    Connectivity(#[from] SourceError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid config: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error indicates caller misuse of `enqueue`.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidOperationType(_) | Error::MissingPayload | Error::InvalidMaxRetries(_)
        )
    }

    /// Whether this error came out of a failed operation execution.
    pub fn is_execution(&self) -> bool {
        matches!(
            self,
            Error::TransientExecution { .. }
                | Error::NonRetryableExecution { .. }
                | Error::NoHandler(_)
        )
    }
}

/// A specialized Result type for ns-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
