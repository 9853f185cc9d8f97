// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use ns_core::{Config, QueuedOperation};
use serde::Serialize;

use super::load_queue;
use crate::cli::OutputFormat;
use crate::error::Result;

#[derive(Serialize)]
struct StatusJson<'a> {
    queued: usize,
    operations: &'a [QueuedOperation],
}

/// Show the persisted queue.
///
/// Reads without taking the lock: the store replaces the queue file
/// atomically, so a concurrent writer is never observed half-way.
pub async fn run(state_dir: &Path, config: &Config, format: OutputFormat) -> Result<()> {
    let operations = load_queue(state_dir, config).await.snapshot();

    match format {
        OutputFormat::Text => print!("{}", render_text(&operations)),
        OutputFormat::Json => println!("{}", render_json(&operations)?),
    }
    Ok(())
}

pub(crate) fn render_text(operations: &[QueuedOperation]) -> String {
    let mut out = format!("queued: {}\n", operations.len());
    for op in operations {
        out.push_str(&format_operation(op));
        out.push('\n');
    }
    out
}

pub(crate) fn format_operation(op: &QueuedOperation) -> String {
    format!(
        "  {}  {}  retries {}/{}  {}",
        op.id,
        op.operation_type,
        op.retry_count,
        op.max_retries,
        op.enqueued_at.format("%Y-%m-%d %H:%M:%S")
    )
}

pub(crate) fn render_json(operations: &[QueuedOperation]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&StatusJson {
        queued: operations.len(),
        operations,
    })?)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
