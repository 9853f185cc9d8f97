// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod clear;
pub mod enqueue;
pub mod probe;
pub mod run;
pub mod status;

use std::path::Path;
use std::sync::Arc;

use ns_core::{Config, FileStore, OperationQueue};

/// Open the queue persisted in `state_dir` and load its contents.
pub async fn load_queue(state_dir: &Path, config: &Config) -> OperationQueue {
    let store = Arc::new(FileStore::new(state_dir));
    let mut queue = OperationQueue::new(store, config.queue.storage_key.clone())
        .with_max_size(config.queue.max_size);
    queue.load_from_storage().await;
    queue
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
