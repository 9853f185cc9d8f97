// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity-aware queue dispatcher.
//!
//! The dispatcher drains the [`OperationQueue`] through the registered
//! [`OperationHandler`]s whenever the device is online. A drain session runs
//! cycles until the queue is empty or the link drops:
//!
//! ```text
//! Idle ──trigger──► Draining ──queue empty / offline──► Idle
//!                     │  ▲
//!                     └──┘ cooldown, then next cycle
//! ```
//!
//! Each cycle takes the oldest `batch_size(quality)` operations and runs
//! them one at a time, waiting before each one on slow links. Successes are
//! removed, failures consume one unit of the operation's retry budget, and
//! the queue is persisted once per cycle. Only one session runs at a time; a
//! trigger during a session is a no-op.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connectivity::{ConnectionQuality, ConnectivitySnapshot};
use crate::error::{Error, Result};
use crate::guard::{lock, read, write};
use crate::operation::{OperationId, OperationType, QueuedOperation};
use crate::queue::OperationQueue;
use crate::retry::RetryPolicy;

/// Outcome of a single handler invocation.
pub type HandlerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Future returned by [`OperationHandler::handle`].
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

/// Performs the real effect of one operation type.
///
/// The error message decides retry behavior: messages matching the
/// non-retryable denylist end the attempt sequence immediately.
pub trait OperationHandler: Send + Sync {
    fn handle(&self, operation: QueuedOperation) -> HandlerFuture;
}

impl<F, Fut> OperationHandler for F
where
    F: Fn(QueuedOperation) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn handle(&self, operation: QueuedOperation) -> HandlerFuture {
        Box::pin(self(operation))
    }
}

fn default_max_attempts() -> u32 {
    2
}

fn default_attempt_timeout_ms() -> u64 {
    10_000
}

fn default_cooldown_ms() -> u64 {
    5_000
}

fn default_poor_pacing_ms() -> u64 {
    2_000
}

fn default_fair_pacing_ms() -> u64 {
    1_000
}

/// Tuning for drain sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Attempts per operation per cycle.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Hard limit on a single attempt (milliseconds).
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
    /// Wait between cycles of one session (milliseconds).
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Wait before each operation on a poor link (milliseconds).
    #[serde(default = "default_poor_pacing_ms")]
    pub poor_pacing_ms: u64,
    /// Wait before each operation on a fair link (milliseconds).
    #[serde(default = "default_fair_pacing_ms")]
    pub fair_pacing_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            max_attempts: default_max_attempts(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            cooldown_ms: default_cooldown_ms(),
            poor_pacing_ms: default_poor_pacing_ms(),
            fair_pacing_ms: default_fair_pacing_ms(),
        }
    }
}

impl DispatchConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Delay inserted before each operation of a batch.
    pub fn pacing(&self, quality: ConnectionQuality) -> Duration {
        match quality {
            ConnectionQuality::Poor => Duration::from_millis(self.poor_pacing_ms),
            ConnectionQuality::Fair => Duration::from_millis(self.fair_pacing_ms),
            ConnectionQuality::Good | ConnectionQuality::Excellent => Duration::ZERO,
        }
    }
}

/// Running totals since the dispatcher was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    /// Drain cycles that executed at least one batch.
    pub cycles: u64,
    /// Operations delivered and removed.
    pub succeeded: u64,
    /// Failed execution passes (each consumed one retry).
    pub failed: u64,
    /// Operations discarded after exhausting their retry budget.
    pub dropped: u64,
    /// Operations evicted because the queue was full.
    pub evicted: u64,
}

/// Result of one drain cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub dropped: usize,
    /// Queue length after the cycle.
    pub remaining: usize,
}

/// Why a drain request did or did not run a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    Offline,
    Empty,
    AlreadyDraining,
    Completed(BatchReport),
}

struct DispatcherInner {
    queue: tokio::sync::Mutex<OperationQueue>,
    handlers: RwLock<HashMap<OperationType, Arc<dyn OperationHandler>>>,
    link: RwLock<ConnectivitySnapshot>,
    draining: AtomicBool,
    session: Mutex<Option<JoinHandle<()>>>,
    config: DispatchConfig,
    retry: RetryPolicy,
    cycles: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    evicted: AtomicU64,
    cancel: CancellationToken,
}

/// Clears the draining flag when a session ends, however it ends.
struct DrainFlag(Arc<DispatcherInner>);

impl DrainFlag {
    fn acquire(inner: &Arc<DispatcherInner>) -> Option<Self> {
        inner
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DrainFlag(Arc::clone(inner)))
    }
}

impl Drop for DrainFlag {
    fn drop(&mut self) {
        self.0.draining.store(false, Ordering::Release);
    }
}

/// Drains queued operations while connectivity allows.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    pub fn new(queue: OperationQueue, config: DispatchConfig, retry: RetryPolicy) -> Self {
        Dispatcher {
            inner: Arc::new(DispatcherInner {
                queue: tokio::sync::Mutex::new(queue),
                handlers: RwLock::new(HashMap::new()),
                link: RwLock::new(ConnectivitySnapshot::offline()),
                draining: AtomicBool::new(false),
                session: Mutex::new(None),
                config,
                retry,
                cycles: AtomicU64::new(0),
                succeeded: AtomicU64::new(0),
                failed: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
                evicted: AtomicU64::new(0),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.inner.config
    }

    /// Register the handler for an operation type, replacing any previous one.
    pub fn register_handler(&self, operation_type: OperationType, handler: Arc<dyn OperationHandler>) {
        write(&self.inner.handlers).insert(operation_type, handler);
        debug!(operation_type = %operation_type, "registered operation handler");
    }

    /// Load persisted operations. Returns how many were loaded.
    pub async fn load(&self) -> usize {
        self.inner.queue.lock().await.load_from_storage().await
    }

    /// Cache a new connectivity snapshot without triggering a drain.
    ///
    /// Returns true on an offline to online transition.
    pub fn record_link(&self, snapshot: &ConnectivitySnapshot) -> bool {
        let mut link = write(&self.inner.link);
        let came_online = !link.is_online && snapshot.is_online;
        *link = snapshot.clone();
        came_online
    }

    /// Cache a new connectivity snapshot and drain if the device just came
    /// online. Returns true when a drain was triggered.
    pub fn update_link(&self, snapshot: &ConnectivitySnapshot) -> bool {
        if !self.record_link(snapshot) {
            return false;
        }
        info!(quality = %snapshot.quality, "connectivity restored, draining offline queue");
        self.request_drain()
    }

    pub fn is_online(&self) -> bool {
        read(&self.inner.link).is_online
    }

    pub fn quality(&self) -> ConnectionQuality {
        read(&self.inner.link).quality
    }

    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Acquire)
    }

    /// Queue a new operation, draining right away when online and idle.
    pub async fn enqueue(
        &self,
        operation_type: OperationType,
        payload: Value,
        max_retries: u32,
    ) -> Result<OperationId> {
        let id = {
            let mut queue = self.inner.queue.lock().await;
            let before = queue.evicted();
            let id = queue.enqueue(operation_type, payload, max_retries).await?;
            self.inner
                .evicted
                .fetch_add(queue.evicted() - before, Ordering::Relaxed);
            id
        };

        if self.is_online() && !self.is_draining() {
            self.request_drain();
        }
        Ok(id)
    }

    /// Remove one operation and persist. Returns whether it was queued.
    pub async fn remove(&self, id: &str) -> bool {
        let mut queue = self.inner.queue.lock().await;
        let removed = queue.remove(id);
        if removed {
            queue.persist_or_log().await;
        }
        removed
    }

    /// Drop every queued operation. Returns how many were dropped.
    pub async fn clear(&self) -> usize {
        self.inner.queue.lock().await.clear().await
    }

    pub async fn queue_size(&self) -> usize {
        self.inner.queue.lock().await.len()
    }

    /// Queued operations in drain order.
    pub async fn queued_operations(&self) -> Vec<QueuedOperation> {
        self.inner.queue.lock().await.snapshot()
    }

    pub async fn persist(&self) -> Result<()> {
        self.inner.queue.lock().await.persist().await
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            cycles: self.inner.cycles.load(Ordering::Relaxed),
            succeeded: self.inner.succeeded.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
            dropped: self.inner.dropped.load(Ordering::Relaxed),
            evicted: self.inner.evicted.load(Ordering::Relaxed),
        }
    }

    /// Start a drain session in the background.
    ///
    /// Returns false when a session is already running, the dispatcher has
    /// been shut down, or there is no runtime to spawn on.
    pub fn request_drain(&self) -> bool {
        if self.inner.cancel.is_cancelled() {
            return false;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime available, drain request ignored");
            return false;
        };
        let Some(flag) = DrainFlag::acquire(&self.inner) else {
            debug!("drain already in progress");
            return false;
        };

        let dispatcher = self.clone();
        let handle = runtime.spawn(async move { dispatcher.run_session(flag).await });
        *lock(&self.inner.session) = Some(handle);
        true
    }

    /// Run a single cycle in the caller's task, without rescheduling.
    pub async fn drain_once(&self) -> DrainOutcome {
        let Some(_flag) = DrainFlag::acquire(&self.inner) else {
            return DrainOutcome::AlreadyDraining;
        };
        self.run_cycle().await
    }

    /// Stop scheduling new cycles and wait for an in-flight batch to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let session = lock(&self.inner.session).take();
        if let Some(session) = session {
            if let Err(e) = session.await {
                warn!(error = %e, "drain session ended abnormally");
            }
        }
    }

    async fn run_session(self, flag: DrainFlag) {
        loop {
            let report = match self.run_cycle().await {
                DrainOutcome::Completed(report) => report,
                outcome => {
                    debug!(?outcome, "drain session finished");
                    break;
                }
            };
            if report.remaining == 0 || !self.is_online() {
                break;
            }

            debug!(
                remaining = report.remaining,
                cooldown_ms = self.inner.config.cooldown_ms,
                "scheduling next drain cycle"
            );
            tokio::select! {
                _ = self.inner.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.inner.config.cooldown()) => {}
            }
        }
        drop(flag);

        // Triggers that arrived while the flag was held were ignored.
        if !self.inner.cancel.is_cancelled() && self.is_online() && self.queue_size().await > 0 {
            self.request_drain();
        }
    }

    async fn run_cycle(&self) -> DrainOutcome {
        let link = read(&self.inner.link).clone();
        if !link.is_online {
            return DrainOutcome::Offline;
        }

        let batch = {
            let queue = self.inner.queue.lock().await;
            if queue.is_empty() {
                return DrainOutcome::Empty;
            }
            queue.front(link.quality.batch_size())
        };

        self.inner.cycles.fetch_add(1, Ordering::Relaxed);
        info!(
            batch = batch.len(),
            quality = %link.quality,
            "processing offline queue batch"
        );

        let pacing = self.inner.config.pacing(link.quality);
        let mut report = BatchReport::default();

        for operation in batch {
            if !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }
            if !self.inner.queue.lock().await.contains(&operation.id) {
                continue;
            }

            report.attempted += 1;
            let id = operation.id.clone();
            let operation_type = operation.operation_type;

            match self.execute(operation).await {
                Ok(()) => {
                    self.inner.queue.lock().await.remove(&id);
                    self.inner.succeeded.fetch_add(1, Ordering::Relaxed);
                    report.succeeded += 1;
                    debug!(id = %id, operation_type = %operation_type, "operation delivered");
                }
                Err(e) => {
                    warn!(id = %id, operation_type = %operation_type, error = %e, "operation failed");
                    self.inner.failed.fetch_add(1, Ordering::Relaxed);
                    report.failed += 1;

                    let mut queue = self.inner.queue.lock().await;
                    if queue.contains(&id) && queue.increment_retry(&id).is_none() {
                        self.inner.dropped.fetch_add(1, Ordering::Relaxed);
                        report.dropped += 1;
                    }
                }
            }
        }

        let queue = self.inner.queue.lock().await;
        queue.persist_or_log().await;
        report.remaining = queue.len();

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            dropped = report.dropped,
            remaining = report.remaining,
            "offline queue batch complete"
        );
        DrainOutcome::Completed(report)
    }

    async fn execute(&self, operation: QueuedOperation) -> Result<()> {
        let operation_type = operation.operation_type;
        let handler = read(&self.inner.handlers).get(&operation_type).cloned();
        let Some(handler) = handler else {
            return Err(Error::NoHandler(operation_type));
        };

        self.inner
            .retry
            .run(
                operation_type.as_str(),
                self.inner.config.max_attempts,
                self.inner.config.attempt_timeout(),
                || handler.handle(operation.clone()),
            )
            .await
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
