// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fakes for unit tests.

#![allow(clippy::unwrap_used)]

use std::future::ready;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::connectivity::{
    ConnectionQuality, ConnectionType, ConnectivitySnapshot, ConnectivitySource, FetchFuture,
    NetState,
};
use crate::dispatcher::{HandlerFuture, HandlerResult, OperationHandler};
use crate::operation::{OperationId, QueuedOperation};
use crate::store::{KeyValueStore, StoreError, StoreFuture};

/// Connectivity source driven by the test.
pub struct FakeSource {
    state: Mutex<NetState>,
    senders: Mutex<Vec<mpsc::UnboundedSender<NetState>>>,
    subscriptions: AtomicUsize,
    fetches: AtomicUsize,
}

impl FakeSource {
    pub fn new(state: NetState) -> Arc<Self> {
        Arc::new(FakeSource {
            state: Mutex::new(state),
            senders: Mutex::new(Vec::new()),
            subscriptions: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn offline() -> Arc<Self> {
        Self::new(NetState::offline())
    }

    /// Change the platform state and push it to every subscriber.
    pub fn emit(&self, state: NetState) {
        *self.state.lock().unwrap() = state.clone();
        for tx in self.senders.lock().unwrap().iter() {
            let _ = tx.send(state.clone());
        }
    }

    /// Change the state seen by `fetch` without emitting an event.
    pub fn set_silently(&self, state: NetState) {
        *self.state.lock().unwrap() = state;
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ConnectivitySource for FakeSource {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<NetState> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().unwrap().push(tx);
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        rx
    }

    fn fetch(&self) -> FetchFuture<'_> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap().clone();
        Box::pin(async move { Ok(state) })
    }
}

/// Store whose every request fails.
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get<'a>(&'a self, _key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async { Err(StoreError::Unavailable("store offline".into())) })
    }

    fn set<'a>(&'a self, _key: &'a str, _value: String) -> StoreFuture<'a, ()> {
        Box::pin(async { Err(StoreError::Unavailable("store offline".into())) })
    }
}

/// Handler that records every call and fails the first `failures` of them.
pub struct ScriptedHandler {
    calls: Mutex<Vec<OperationId>>,
    failures: AtomicUsize,
    error: String,
}

impl ScriptedHandler {
    pub fn succeeding() -> Arc<Self> {
        Self::failing_times(0, "")
    }

    pub fn failing(error: &str) -> Arc<Self> {
        Self::failing_times(usize::MAX, error)
    }

    pub fn failing_times(failures: usize, error: &str) -> Arc<Self> {
        Arc::new(ScriptedHandler {
            calls: Mutex::new(Vec::new()),
            failures: AtomicUsize::new(failures),
            error: error.to_string(),
        })
    }

    pub fn calls(&self) -> Vec<OperationId> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl OperationHandler for ScriptedHandler {
    fn handle(&self, operation: QueuedOperation) -> HandlerFuture {
        self.calls.lock().unwrap().push(operation.id);
        let remaining = self.failures.load(Ordering::SeqCst);
        let result: HandlerResult = if remaining > 0 {
            if remaining != usize::MAX {
                self.failures.store(remaining - 1, Ordering::SeqCst);
            }
            Err(self.error.clone().into())
        } else {
            Ok(())
        };
        Box::pin(ready(result))
    }
}

pub fn snapshot(is_online: bool, quality: ConnectionQuality) -> ConnectivitySnapshot {
    ConnectivitySnapshot {
        is_online,
        connection_type: if is_online {
            ConnectionType::Wifi
        } else {
            ConnectionType::None
        },
        is_internet_reachable: Some(is_online),
        quality,
    }
}

/// Let spawned tasks run until they block. Under a paused clock this also
/// advances virtual time by one millisecond.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
