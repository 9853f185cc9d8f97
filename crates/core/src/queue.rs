// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded, persisted queue of pending operations.
//!
//! The in-memory list is authoritative. It is mirrored to a
//! [`KeyValueStore`] as a single JSON array; a failed write is logged and the
//! next successful flush catches the store up.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::operation::{
    generate_unique_id, now_millis, OperationId, OperationType, QueuedOperation,
    MAX_RETRIES_LIMIT,
};
use crate::store::KeyValueStore;

/// Maximum number of operations held before the oldest are evicted.
pub const MAX_QUEUE_SIZE: usize = 100;

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "offline_queue";

/// Share of `max_size` evicted when the queue is full.
const EVICTION_RATIO: f64 = 0.1;

/// FIFO queue of operations awaiting dispatch.
pub struct OperationQueue {
    operations: Vec<QueuedOperation>,
    store: Arc<dyn KeyValueStore>,
    key: String,
    max_size: usize,
    evicted: u64,
}

impl OperationQueue {
    /// Create an empty queue persisted under `key`.
    ///
    /// Call [`load_from_storage`](Self::load_from_storage) to pick up
    /// operations left over from a previous run.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        OperationQueue {
            operations: Vec::new(),
            store,
            key: key.into(),
            max_size: MAX_QUEUE_SIZE,
            evicted: 0,
        }
    }

    /// Override the capacity. Values below 1 are raised to 1.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of operations dropped on overflow: `ceil(max_size * 0.1)`.
    pub fn eviction_count(&self) -> usize {
        ((self.max_size as f64 * EVICTION_RATIO).ceil() as usize).max(1)
    }

    /// Total operations evicted by overflow since this queue was created.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Append a new operation and persist the queue.
    ///
    /// Returns a validation error for a null payload or an out-of-range
    /// retry budget. Persistence failures are logged, not returned.
    pub async fn enqueue(
        &mut self,
        operation_type: OperationType,
        payload: Value,
        max_retries: u32,
    ) -> Result<OperationId> {
        let id = self.push(operation_type, payload, max_retries)?;
        self.persist_or_log().await;
        Ok(id)
    }

    /// Append without persisting. Callers that need to know whether the
    /// write succeeded follow up with [`persist`](Self::persist).
    pub fn push(
        &mut self,
        operation_type: OperationType,
        payload: Value,
        max_retries: u32,
    ) -> Result<OperationId> {
        let enqueued_at = now_millis();
        let id = generate_unique_id(operation_type, &enqueued_at, |candidate| {
            self.contains(candidate)
        });
        let operation = QueuedOperation::new(id, operation_type, payload, max_retries, enqueued_at)?;

        if self.operations.len() >= self.max_size {
            let count = self.eviction_count().min(self.operations.len());
            let dropped: Vec<_> = self.operations.drain(..count).collect();
            self.evicted += dropped.len() as u64;
            warn!(
                evicted = dropped.len(),
                oldest = %dropped[0].id,
                "offline queue full, evicting oldest operations"
            );
        }

        debug!(id = %operation.id, operation_type = %operation_type, "enqueued operation");
        let id = operation.id.clone();
        self.operations.push(operation);
        Ok(id)
    }

    /// Remove an operation by id. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.operations.len();
        self.operations.retain(|op| op.id != id);
        before != self.operations.len()
    }

    /// Record a failed execution pass.
    ///
    /// Returns the new retry count, or `None` when the operation has used up
    /// its budget and was removed (or was not queued at all).
    pub fn increment_retry(&mut self, id: &str) -> Option<u32> {
        let index = self.operations.iter().position(|op| op.id == id)?;
        let next = self.operations[index].retry_count + 1;

        if next >= self.operations[index].max_retries {
            let dropped = self.operations.remove(index);
            warn!(
                id = %dropped.id,
                operation_type = %dropped.operation_type,
                max_retries = dropped.max_retries,
                "dropping operation after exhausting retries"
            );
            return None;
        }

        self.operations[index].retry_count = next;
        Some(next)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.operations.iter().any(|op| op.id == id)
    }

    /// Copy of all operations in enqueue order.
    pub fn snapshot(&self) -> Vec<QueuedOperation> {
        self.operations.clone()
    }

    /// Copy of the oldest `count` operations.
    pub fn front(&self, count: usize) -> Vec<QueuedOperation> {
        self.operations.iter().take(count).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Drop every operation and persist the empty queue.
    pub async fn clear(&mut self) -> usize {
        let count = self.discard_all();
        self.persist_or_log().await;
        count
    }

    /// Drop every operation without persisting. Returns how many were
    /// dropped; follow up with [`persist`](Self::persist) to store the result.
    pub fn discard_all(&mut self) -> usize {
        let count = self.operations.len();
        self.operations.clear();
        count
    }

    /// Write the whole queue to the store.
    pub async fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.operations)?;
        self.store.set(&self.key, json).await?;
        Ok(())
    }

    pub(crate) async fn persist_or_log(&self) {
        if let Err(e) = self.persist().await {
            warn!(error = %e, key = %self.key, "failed to persist offline queue");
        }
    }

    /// Replace the in-memory queue with the stored one.
    ///
    /// Never fails: unreadable or corrupt data yields an empty queue.
    /// Entries that break queue invariants (duplicate ids, exhausted or
    /// out-of-range retry budgets) are discarded, and an oversized queue keeps its newest
    /// `max_size` entries. Returns the number of operations loaded.
    pub async fn load_from_storage(&mut self) -> usize {
        self.operations = match self.store.get(&self.key).await {
            Ok(Some(json)) => match serde_json::from_str::<Vec<QueuedOperation>>(&json) {
                Ok(operations) => self.repair(operations),
                Err(e) => {
                    warn!(error = %e, key = %self.key, "stored offline queue is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, key = %self.key, "failed to read offline queue, starting empty");
                Vec::new()
            }
        };

        debug!(count = self.operations.len(), "loaded offline queue");
        self.operations.len()
    }

    fn repair(&self, operations: Vec<QueuedOperation>) -> Vec<QueuedOperation> {
        let total = operations.len();
        let mut seen = HashSet::new();
        let mut kept: Vec<QueuedOperation> = operations
            .into_iter()
            .filter(|op| has_budget(op) && !op.payload.is_null() && seen.insert(op.id.clone()))
            .collect();

        if kept.len() > self.max_size {
            let excess = kept.len() - self.max_size;
            kept.drain(..excess);
        }

        if kept.len() != total {
            warn!(
                discarded = total - kept.len(),
                "discarded invalid or excess operations from stored queue"
            );
        }
        kept
    }
}

/// Whether a stored entry could still be queued: a budget within limits and
/// a retry count `increment_retry` would not already have dropped.
fn has_budget(op: &QueuedOperation) -> bool {
    op.max_retries <= MAX_RETRIES_LIMIT
        && (op.retry_count < op.max_retries || (op.max_retries == 0 && op.retry_count == 0))
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
