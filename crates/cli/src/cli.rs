// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const QUICKSTART_HELP: &str = "\
Get started:
  notesync enqueue note_save '{\"id\":\"n1\"}'   Queue a note save
  notesync status                              Show queued operations
  notesync probe                               Check internet reachability
  notesync run                                 Deliver queued operations";

#[derive(Parser)]
#[command(name = "notesync", version)]
#[command(about = "Offline operation queue with connectivity-aware delivery")]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Directory holding the queue, config, lock and log files
    #[arg(long, global = true, env = "NOTESYNC_STATE_DIR", value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Queue an operation for delivery
    #[command(after_help = "Examples:\n  \
        notesync enqueue note_save '{\"id\":\"n1\",\"body\":\"hi\"}'\n  \
        notesync enqueue document_scan '{\"pages\":3}' --max-retries 5")]
    Enqueue {
        /// Operation type: document_scan, note_save or note_sync
        operation_type: String,

        /// Operation data as JSON
        data: String,

        /// Failed delivery passes before the operation is dropped (0-10)
        #[arg(long, default_value_t = 3)]
        max_retries: u32,
    },

    /// Show queued operations
    Status {
        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Drop every queued operation
    Clear,

    /// Check whether the internet is reachable
    Probe,

    /// Deliver queued operations until interrupted
    Run,
}
