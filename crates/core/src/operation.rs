// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued operations awaiting delivery.
//!
//! A queued operation is a deferred mutating request (saving a note, syncing
//! a note, submitting a scanned document). The queue never inspects the
//! payload; it only tracks ordering and the retry budget.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Upper bound for the per-operation retry budget.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Unique identifier for a queued operation.
///
/// Format: `{enqueue millis}-{hash}` so ids sort by creation time.
pub type OperationId = String;

/// Kinds of operations that can be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// Submit a scanned document for processing.
    DocumentScan,
    /// Persist a note to the backend.
    NoteSave,
    /// Reconcile a note with its remote copy.
    NoteSync,
}

impl OperationType {
    /// All operation types, in declaration order.
    pub const ALL: [OperationType; 3] = [
        OperationType::DocumentScan,
        OperationType::NoteSave,
        OperationType::NoteSync,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::DocumentScan => "document_scan",
            OperationType::NoteSave => "note_save",
            OperationType::NoteSync => "note_sync",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = Error;

    /// Parses `note_save`, `note-save` or `NoteSave` style names.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "documentscan" => Ok(OperationType::DocumentScan),
            "notesave" => Ok(OperationType::NoteSave),
            "notesync" => Ok(OperationType::NoteSync),
            _ => Err(Error::InvalidOperationType(s.to_string())),
        }
    }
}

/// A deferred mutating request with its retry bookkeeping.
///
/// Serialized as `{id, type, data, timestamp, retryCount, maxRetries}` with
/// `timestamp` in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedOperation {
    pub id: OperationId,
    #[serde(rename = "type")]
    pub operation_type: OperationType,
    #[serde(rename = "data")]
    pub payload: Value,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub enqueued_at: DateTime<Utc>,
    pub retry_count: u32,
    pub max_retries: u32,
}

impl QueuedOperation {
    /// Creates a validated operation with a zero retry count.
    pub fn new(
        id: OperationId,
        operation_type: OperationType,
        payload: Value,
        max_retries: u32,
        enqueued_at: DateTime<Utc>,
    ) -> Result<Self> {
        validate(&payload, max_retries)?;
        Ok(QueuedOperation {
            id,
            operation_type,
            payload,
            enqueued_at,
            retry_count: 0,
            max_retries,
        })
    }

    /// Number of failed passes left before the operation is dropped.
    pub fn retries_remaining(&self) -> u32 {
        self.max_retries.saturating_sub(self.retry_count)
    }
}

/// Validate the caller-supplied parts of a new operation.
pub fn validate(payload: &Value, max_retries: u32) -> Result<()> {
    if payload.is_null() {
        return Err(Error::MissingPayload);
    }
    if max_retries > MAX_RETRIES_LIMIT {
        return Err(Error::InvalidMaxRetries(max_retries));
    }
    Ok(())
}

/// Current time truncated to the millisecond precision used on disk.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate an operation ID.
/// Format: {millis}-{hash} where hash is the first 8 hex chars of
/// SHA256(type + timestamp + sequence + nonce)
pub fn generate_id(operation_type: OperationType, enqueued_at: &DateTime<Utc>) -> OperationId {
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let nonce: u64 = rand::random();
    let input = format!(
        "{}{}{}{}",
        operation_type,
        enqueued_at.to_rfc3339(),
        sequence,
        nonce
    );
    let hash = Sha256::digest(input.as_bytes());
    format!("{}-{}", enqueued_at.timestamp_millis(), hex::encode(&hash[..4]))
}

/// Generate an ID not accepted by `exists`, appending an incrementing suffix
/// on collision.
pub fn generate_unique_id<F>(
    operation_type: OperationType,
    enqueued_at: &DateTime<Utc>,
    exists: F,
) -> OperationId
where
    F: Fn(&str) -> bool,
{
    let base_id = generate_id(operation_type, enqueued_at);

    if !exists(&base_id) {
        return base_id;
    }

    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", base_id, suffix);
        if !exists(&id) {
            return id;
        }
        suffix += 1;
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
