// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use ns_core::Config;

use super::load_queue;
use crate::error::Result;
use crate::paths::acquire_lock;

/// Empty the persisted queue. A failed write is reported, not logged.
pub async fn run(state_dir: &Path, config: &Config) -> Result<()> {
    let _lock = acquire_lock(state_dir)?;
    let mut queue = load_queue(state_dir, config).await;
    let count = queue.discard_all();
    queue.persist().await?;
    println!("cleared {} operation(s)", count);
    Ok(())
}
