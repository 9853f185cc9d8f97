// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ns-core: Offline operation queue with connectivity-aware dispatch.
//!
//! Mutating operations (note saves, note syncs, document scans) are buffered
//! in a bounded, persisted queue while the device is offline and replayed
//! with backoff once connectivity returns.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  snapshot   ┌──────────────┐  batch   ┌──────────────┐
//! │ Connectivity │────────────►│  Dispatcher  │─────────►│   Handlers   │
//! │   Monitor    │  (online)   │ (drain loop) │◄─────────│ (per type)   │
//! └──────┬───────┘             └──────┬───────┘  result  └──────────────┘
//!        │                            │
//!        ▼                            ▼
//! ┌──────────────┐             ┌──────────────┐
//! │ Connectivity │             │  Operation   │──► KeyValueStore
//! │   Source     │             │    Queue     │
//! └──────────────┘             └──────────────┘
//! ```
//!
//! [`NetworkService`] ties the pieces together behind an explicit
//! `initialize`/`shutdown` lifecycle. Platform access is injected through
//! the [`ConnectivitySource`] and [`KeyValueStore`] traits.

pub mod config;
pub mod connectivity;
pub mod dispatcher;
pub mod error;
mod guard;
pub mod monitor;
pub mod operation;
pub mod probe;
pub mod queue;
pub mod retry;
pub mod service;
pub mod store;

#[cfg(test)]
mod test_helpers;

pub use config::Config;
pub use connectivity::{
    CellularGeneration, ConnectionQuality, ConnectionType, ConnectivitySnapshot,
    ConnectivitySource, LinkDetails, NetState, SourceError,
};
pub use dispatcher::{
    BatchReport, DispatchConfig, DispatchStats, Dispatcher, DrainOutcome, HandlerResult,
    OperationHandler,
};
pub use error::{Error, Result};
pub use monitor::{ConnectivityMonitor, Subscription};
pub use operation::{OperationId, OperationType, QueuedOperation, MAX_RETRIES_LIMIT};
pub use probe::{ProbeSource, ReachabilityProbe};
pub use queue::{OperationQueue, MAX_QUEUE_SIZE};
pub use retry::{with_retry, RetryPolicy};
pub use service::NetworkService;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
