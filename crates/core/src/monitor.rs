// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity monitoring.
//!
//! The monitor subscribes to a [`ConnectivitySource`], keeps the latest
//! [`ConnectivitySnapshot`] and fans each platform event out to registered
//! callbacks. Callbacks run synchronously on the listener task; one that
//! returns an error or panics is unsubscribed without affecting the others.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::connectivity::{ConnectivitySnapshot, ConnectivitySource, NetState};
use crate::error::Result;
use crate::guard::{lock, read, write};

/// Result returned by change callbacks.
pub type CallbackResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

type Callback = Arc<dyn Fn(&ConnectivitySnapshot) -> CallbackResult + Send + Sync>;

struct MonitorInner {
    source: Arc<dyn ConnectivitySource>,
    current: RwLock<ConnectivitySnapshot>,
    subscribers: Mutex<Vec<(u64, Callback)>>,
    next_id: AtomicU64,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl MonitorInner {
    fn apply(&self, state: &NetState) {
        let snapshot = ConnectivitySnapshot::from_state(state);
        *write(&self.current) = snapshot.clone();
        debug!(
            online = snapshot.is_online,
            connection_type = %snapshot.connection_type,
            quality = %snapshot.quality,
            "connectivity changed"
        );
        self.notify(&snapshot);
    }

    fn notify(&self, snapshot: &ConnectivitySnapshot) {
        // Callbacks may subscribe or unsubscribe, so run them unlocked.
        let subscribers = lock(&self.subscribers).clone();
        let mut failed = Vec::new();

        for (id, callback) in subscribers {
            match catch_unwind(AssertUnwindSafe(|| callback(snapshot))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(subscriber = id, error = %e, "connectivity callback failed, unsubscribing");
                    failed.push(id);
                }
                Err(_) => {
                    warn!(subscriber = id, "connectivity callback panicked, unsubscribing");
                    failed.push(id);
                }
            }
        }

        if !failed.is_empty() {
            lock(&self.subscribers).retain(|(id, _)| !failed.contains(id));
        }
    }

    fn unsubscribe(&self, id: u64) -> bool {
        let mut subscribers = lock(&self.subscribers);
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        before != subscribers.len()
    }
}

/// Tracks connectivity and notifies subscribers of every change.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    inner: Arc<MonitorInner>,
}

impl ConnectivityMonitor {
    /// Create a stopped monitor. The snapshot reads offline until
    /// [`start`](Self::start) is called.
    pub fn new(source: Arc<dyn ConnectivitySource>) -> Self {
        ConnectivityMonitor {
            inner: Arc::new(MonitorInner {
                source,
                current: RwLock::new(ConnectivitySnapshot::offline()),
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                listener: Mutex::new(None),
            }),
        }
    }

    /// Subscribe to the source and seed the snapshot with a fetch.
    ///
    /// Calling `start` on a running monitor does nothing. A failed seed
    /// fetch is logged and the snapshot stays offline until the first event.
    pub async fn start(&self) {
        {
            let mut listener = lock(&self.inner.listener);
            if listener.is_some() {
                return;
            }

            let mut events = self.inner.source.subscribe();
            let weak = Arc::downgrade(&self.inner);
            *listener = Some(tokio::spawn(async move {
                while let Some(state) = events.recv().await {
                    let Some(inner) = weak.upgrade() else {
                        break;
                    };
                    inner.apply(&state);
                }
                debug!("connectivity event stream ended");
            }));
        }

        match self.inner.source.fetch().await {
            Ok(state) => self.inner.apply(&state),
            Err(e) => warn!(error = %e, "initial connectivity fetch failed"),
        }
        info!(online = self.current_snapshot().is_online, "connectivity monitor started");
    }

    /// Stop listening for platform events. Subscribers are kept.
    pub fn stop(&self) {
        if let Some(handle) = lock(&self.inner.listener).take() {
            handle.abort();
            debug!("connectivity monitor stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.inner.listener).is_some()
    }

    /// Register a callback invoked with each new snapshot.
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ConnectivitySnapshot) -> CallbackResult + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.subscribers).push((id, Arc::new(callback)));
        Subscription {
            monitor: Arc::downgrade(&self.inner),
            id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.subscribers).len()
    }

    /// Last known snapshot.
    pub fn current_snapshot(&self) -> ConnectivitySnapshot {
        read(&self.inner.current).clone()
    }

    /// Read connectivity from the platform now.
    ///
    /// The cached snapshot is updated; subscribers hear about it only when
    /// the value differs from what they last saw.
    pub async fn fetch_snapshot(&self) -> Result<ConnectivitySnapshot> {
        let state = self.inner.source.fetch().await?;
        let snapshot = ConnectivitySnapshot::from_state(&state);
        let changed = *read(&self.inner.current) != snapshot;
        if changed {
            self.inner.apply(&state);
        }
        Ok(snapshot)
    }
}

/// Handle returned by [`ConnectivityMonitor::on_change`].
///
/// Dropping the handle does not unsubscribe: the callback stays registered
/// until [`unsubscribe`](Self::unsubscribe) is called or it fails.
#[derive(Debug)]
#[must_use = "dropping a Subscription keeps the callback registered; call `unsubscribe` to remove it"]
pub struct Subscription {
    monitor: Weak<MonitorInner>,
    id: u64,
}

impl Subscription {
    /// Remove the callback. Returns false when it was already removed.
    pub fn unsubscribe(self) -> bool {
        match self.monitor.upgrade() {
            Some(inner) => inner.unsubscribe(self.id),
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
