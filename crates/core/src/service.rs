// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The network service facade.
//!
//! [`NetworkService`] owns the connectivity monitor and the dispatcher and
//! wires one to the other. Hosts construct it with their platform adapters,
//! register one handler per operation type, then call
//! [`initialize`](NetworkService::initialize) once at startup and
//! [`shutdown`](NetworkService::shutdown) once at exit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::connectivity::{ConnectivitySnapshot, ConnectivitySource};
use crate::dispatcher::{DispatchStats, Dispatcher, OperationHandler};
use crate::error::{Error, Result};
use crate::guard::lock;
use crate::monitor::{CallbackResult, ConnectivityMonitor, Subscription};
use crate::operation::{OperationId, OperationType, QueuedOperation};
use crate::probe::ReachabilityProbe;
use crate::queue::OperationQueue;
use crate::store::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Running,
    Stopped,
}

/// Offline queue plus connectivity-aware delivery.
pub struct NetworkService {
    monitor: ConnectivityMonitor,
    dispatcher: Dispatcher,
    probe: ReachabilityProbe,
    lifecycle: tokio::sync::Mutex<Lifecycle>,
    running: AtomicBool,
    link_subscription: Mutex<Option<Subscription>>,
}

impl NetworkService {
    /// Build a service. Nothing is loaded or subscribed until
    /// [`initialize`](Self::initialize).
    pub fn new(
        config: &Config,
        source: Arc<dyn ConnectivitySource>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let queue = OperationQueue::new(store, config.queue.storage_key.clone())
            .with_max_size(config.queue.max_size);
        let dispatcher = Dispatcher::new(queue, config.dispatch.clone(), config.retry.clone());

        Ok(NetworkService {
            monitor: ConnectivityMonitor::new(source),
            dispatcher,
            probe: ReachabilityProbe::from_config(&config.probe)?,
            lifecycle: tokio::sync::Mutex::new(Lifecycle::Created),
            running: AtomicBool::new(false),
            link_subscription: Mutex::new(None),
        })
    }

    /// Register the handler that performs operations of `operation_type`.
    pub fn register_handler(&self, operation_type: OperationType, handler: Arc<dyn OperationHandler>) {
        self.dispatcher.register_handler(operation_type, handler);
    }

    /// Load the persisted queue and start following connectivity.
    ///
    /// Safe to call more than once. Fails with [`Error::ShutDown`] after
    /// [`shutdown`](Self::shutdown).
    pub async fn initialize(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock().await;
        match *lifecycle {
            Lifecycle::Running => {
                debug!("network service already initialized");
                return Ok(());
            }
            Lifecycle::Stopped => return Err(Error::ShutDown),
            Lifecycle::Created => {}
        }

        let loaded = self.dispatcher.load().await;

        let dispatcher = self.dispatcher.clone();
        let subscription = self.monitor.on_change(move |snapshot| {
            dispatcher.update_link(snapshot);
            Ok(())
        });
        *lock(&self.link_subscription) = Some(subscription);

        self.running.store(true, Ordering::Release);
        self.monitor.start().await;
        *lifecycle = Lifecycle::Running;

        info!(
            queued = loaded,
            online = self.monitor.current_snapshot().is_online,
            "network service initialized"
        );
        Ok(())
    }

    /// Stop following connectivity, let an in-flight batch finish and
    /// persist the queue.
    pub async fn shutdown(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        if *lifecycle != Lifecycle::Running {
            *lifecycle = Lifecycle::Stopped;
            return;
        }
        self.running.store(false, Ordering::Release);

        let subscription = lock(&self.link_subscription).take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
        self.monitor.stop();
        self.dispatcher.shutdown().await;

        if let Err(e) = self.dispatcher.persist().await {
            warn!(error = %e, "failed to persist offline queue on shutdown");
        }
        *lifecycle = Lifecycle::Stopped;
        info!(queued = self.dispatcher.queue_size().await, "network service shut down");
    }

    pub fn is_initialized(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn ensure_running(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    /// Queue an operation for delivery. Delivery starts right away when
    /// online.
    pub async fn enqueue(
        &self,
        operation_type: OperationType,
        payload: Value,
        max_retries: u32,
    ) -> Result<OperationId> {
        self.ensure_running()?;
        self.dispatcher.enqueue(operation_type, payload, max_retries).await
    }

    /// Register a callback for connectivity changes.
    pub fn on_network_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ConnectivitySnapshot) -> CallbackResult + Send + Sync + 'static,
    {
        self.monitor.on_change(callback)
    }

    /// Last known connectivity.
    pub fn network_status(&self) -> ConnectivitySnapshot {
        self.monitor.current_snapshot()
    }

    /// Re-read connectivity from the platform.
    pub async fn check_connectivity(&self) -> Result<ConnectivitySnapshot> {
        self.monitor.fetch_snapshot().await
    }

    /// Drop every queued operation. Returns how many were dropped.
    pub async fn clear_queue(&self) -> Result<usize> {
        self.ensure_running()?;
        let cleared = self.dispatcher.clear().await;
        info!(cleared, "offline queue cleared");
        Ok(cleared)
    }

    pub async fn queue_size(&self) -> usize {
        self.dispatcher.queue_size().await
    }

    pub async fn queued_operations(&self) -> Vec<QueuedOperation> {
        self.dispatcher.queued_operations().await
    }

    /// Whether any probe endpoint answers a HEAD request in time.
    pub async fn test_internet_connectivity(&self) -> bool {
        self.probe.is_reachable().await
    }

    pub fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
