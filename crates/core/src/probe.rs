// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Internet reachability probing.
//!
//! Link state says nothing about whether the internet is actually usable
//! (captive portals, dead upstreams). The probe sends a HEAD request to a
//! list of well-known endpoints and treats any HTTP response as proof of
//! reachability.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::config::ProbeConfig;
use crate::connectivity::{ConnectionType, ConnectivitySource, FetchFuture, LinkDetails, NetState};
use crate::error::Result;
use crate::retry::RetryPolicy;

/// Shortest polling period accepted by [`ProbeSource`].
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// HEAD-request reachability check.
#[derive(Debug, Clone)]
pub struct ReachabilityProbe {
    client: reqwest::Client,
    endpoints: Vec<String>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl ReachabilityProbe {
    pub fn new(endpoints: Vec<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("notesync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ReachabilityProbe {
            client,
            endpoints,
            timeout,
            retry: RetryPolicy::default(),
        })
    }

    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        Self::new(config.endpoints.clone(), config.timeout())
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// True as soon as any endpoint answers within the timeout.
    pub async fn is_reachable(&self) -> bool {
        for endpoint in &self.endpoints {
            let request = || self.client.head(endpoint.as_str()).send();
            match self.retry.run(endpoint, 1, self.timeout, request).await {
                Ok(response) => {
                    debug!(endpoint = %endpoint, status = %response.status(), "reachability probe answered");
                    return true;
                }
                Err(e) => debug!(endpoint = %endpoint, error = %e, "reachability probe failed"),
            }
        }
        false
    }
}

fn probed_state(reachable: bool) -> NetState {
    if !reachable {
        return NetState::offline();
    }
    NetState {
        is_connected: Some(true),
        connection_type: ConnectionType::Other,
        is_internet_reachable: Some(true),
        details: LinkDetails::default(),
    }
}

/// Connectivity source for hosts without a platform reachability API.
///
/// Polls the probe on an interval and reports a change whenever the result
/// flips. A reachable host is reported as a connected link of type `other`.
pub struct ProbeSource {
    probe: Arc<ReachabilityProbe>,
    interval: Duration,
}

impl ProbeSource {
    pub fn new(probe: Arc<ReachabilityProbe>, interval: Duration) -> Self {
        ProbeSource {
            probe,
            interval: interval.max(MIN_POLL_INTERVAL),
        }
    }
}

impl ConnectivitySource for ProbeSource {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<NetState> {
        let (tx, rx) = mpsc::unbounded_channel();
        let probe = Arc::clone(&self.probe);
        let period = self.interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last = None;

            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    _ = ticker.tick() => {}
                }
                let reachable = probe.is_reachable().await;
                if last == Some(reachable) {
                    continue;
                }
                last = Some(reachable);
                if tx.send(probed_state(reachable)).is_err() {
                    break;
                }
            }
            debug!("probe polling stopped");
        });

        rx
    }

    fn fetch(&self) -> FetchFuture<'_> {
        Box::pin(async move { Ok(probed_state(self.probe.is_reachable().await)) })
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
