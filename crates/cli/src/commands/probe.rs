// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ns_core::{Config, ReachabilityProbe};

use crate::error::Result;

/// Print `online` or `offline`. An unreachable internet is not an error.
pub async fn run(config: &Config) -> Result<()> {
    let probe = ReachabilityProbe::from_config(&config.probe)?;
    let state = if probe.is_reachable().await {
        "online"
    } else {
        "offline"
    };
    println!("{}", state);
    Ok(())
}
