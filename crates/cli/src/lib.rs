// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! nsrs - command-line front end for the ns-core offline queue.
//!
//! Every command works against a state directory holding the persisted
//! queue, an optional `notesync.toml` and the lock file that serializes
//! writers. `notesync run` wires the queue to a polling reachability probe
//! and an HTTP backend and delivers operations until interrupted.

mod backend;
mod cli;
mod commands;
pub mod error;
mod logging;
mod paths;

pub use backend::HttpHandler;
pub use cli::{Cli, Command, OutputFormat};
pub use error::{Error, Result};

use ns_core::Config;

/// Execute a parsed command line. This is the main entry point for library
/// users and provides a testable way to run commands without process
/// execution.
pub fn run(cli: Cli) -> Result<()> {
    let Cli {
        state_dir,
        verbose,
        command,
    } = cli;
    let state_dir = paths::resolve_state_dir(state_dir)?;
    let config = Config::load(&paths::config_path(&state_dir))?;

    match command {
        Command::Run => {
            std::fs::create_dir_all(&state_dir)?;
            logging::setup_logging(Some(&paths::log_path(&state_dir)), verbose);
        }
        _ => logging::setup_logging(None, verbose),
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match command {
            Command::Enqueue {
                operation_type,
                data,
                max_retries,
            } => {
                commands::enqueue::run(&state_dir, &config, &operation_type, &data, max_retries)
                    .await
            }
            Command::Status { format } => commands::status::run(&state_dir, &config, format).await,
            Command::Clear => commands::clear::run(&state_dir, &config).await,
            Command::Probe => commands::probe::run(&config).await,
            Command::Run => commands::run::run(&state_dir, config).await,
        }
    })
}
