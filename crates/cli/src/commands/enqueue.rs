// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use ns_core::{Config, OperationType};
use serde_json::Value;

use super::load_queue;
use crate::error::{Error, Result};
use crate::paths::acquire_lock;

/// Queue an operation and print its id.
pub async fn run(
    state_dir: &Path,
    config: &Config,
    operation_type: &str,
    data: &str,
    max_retries: u32,
) -> Result<()> {
    let operation_type: OperationType = operation_type.parse()?;
    let payload: Value =
        serde_json::from_str(data).map_err(|e| Error::InvalidPayload(e.to_string()))?;

    let _lock = acquire_lock(state_dir)?;
    let mut queue = load_queue(state_dir, config).await;
    let id = queue.push(operation_type, payload, max_retries)?;
    queue.persist().await?;

    println!("{}", id);
    Ok(())
}
