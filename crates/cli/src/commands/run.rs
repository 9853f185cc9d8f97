// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::sync::Arc;

use ns_core::{
    Config, ConnectivitySource, FileStore, KeyValueStore, NetworkService, OperationHandler,
    OperationType, ProbeSource, ReachabilityProbe,
};
use tracing::info;

use crate::backend::HttpHandler;
use crate::error::{Error, Result};
use crate::paths::{acquire_lock, config_path, log_path};

/// Deliver queued operations until interrupted with Ctrl-C.
///
/// Holds the queue lock for the whole run so one-shot commands cannot
/// change the queue underneath the dispatcher.
pub async fn run(state_dir: &Path, config: Config) -> Result<()> {
    let endpoint = config
        .backend
        .endpoint
        .clone()
        .ok_or_else(|| Error::NoBackend(config_path(state_dir).display().to_string()))?;
    let _lock = acquire_lock(state_dir)?;

    let handler: Arc<dyn OperationHandler> = Arc::new(HttpHandler::new(
        &endpoint,
        config.dispatch.attempt_timeout(),
    )?);
    let probe = Arc::new(ReachabilityProbe::from_config(&config.probe)?);
    let source: Arc<dyn ConnectivitySource> =
        Arc::new(ProbeSource::new(probe, config.probe.poll_interval()));
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(state_dir));

    let service = NetworkService::new(&config, source, store)?;
    for operation_type in OperationType::ALL {
        service.register_handler(operation_type, Arc::clone(&handler));
    }
    service.initialize().await?;

    println!(
        "delivering to {} ({} queued), logging to {}",
        endpoint,
        service.queue_size().await,
        log_path(state_dir).display()
    );
    println!("press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    service.shutdown().await;

    let stats = service.stats();
    let remaining = service.queue_size().await;
    info!(
        cycles = stats.cycles,
        succeeded = stats.succeeded,
        failed = stats.failed,
        dropped = stats.dropped,
        remaining,
        "stopped"
    );
    println!(
        "delivered {}, failed {}, dropped {}, {} still queued",
        stats.succeeded, stats.failed, stats.dropped, remaining
    );
    Ok(())
}
