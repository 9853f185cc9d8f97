// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retrying executor with exponential backoff.
//!
//! Every attempt is raced against a hard timeout. Failures whose message
//! matches [`NON_RETRYABLE_PATTERNS`] end the attempt sequence at once;
//! anything else is retried after `min(base * factor^(n-1), max)` plus a
//! small random jitter.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Error message fragments (lower case) that mark a failure as permanent.
pub const NON_RETRYABLE_PATTERNS: &[&str] = &[
    "invalid api key",
    "api key not valid",
    "unauthorized",
    "forbidden",
    "permission denied",
    "not found",
    "malformed data",
    "invalid argument",
];

/// Whether retrying a failure with this message is pointless.
pub fn is_non_retryable(message: &str) -> bool {
    let message = message.to_lowercase();
    NON_RETRYABLE_PATTERNS
        .iter()
        .any(|pattern| message.contains(pattern))
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_jitter_ratio() -> f64 {
    0.1
}

/// Backoff schedule between attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Delay before the first retry (milliseconds).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Multiplier applied per further retry.
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    /// Cap on the un-jittered delay (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Upper bound of the random extra delay, as a share of the delay.
    #[serde(default = "default_jitter_ratio")]
    pub jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            base_delay_ms: default_base_delay_ms(),
            backoff_factor: default_backoff_factor(),
            max_delay_ms: default_max_delay_ms(),
            jitter_ratio: default_jitter_ratio(),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based), without jitter.
    pub fn base_delay(&self, retry: u32) -> Duration {
        if self.base_delay_ms == 0 || retry == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let scaled = self.base_delay_ms as f64 * self.backoff_factor.powi(exponent);
        let capped = scaled.min(self.max_delay_ms as f64).max(0.0);
        Duration::from_millis(capped as u64)
    }

    /// Delay before retry number `retry` with 0..`jitter_ratio` added.
    pub fn delay_with_jitter(&self, retry: u32) -> Duration {
        let delay = self.base_delay(retry);
        if self.jitter_ratio <= 0.0 || delay.is_zero() {
            return delay;
        }
        let ratio = self.jitter_ratio.min(1.0);
        let jitter = rand::thread_rng().gen_range(0.0..ratio);
        delay + delay.mul_f64(jitter)
    }

    /// Run `operation` up to `max_attempts` times.
    ///
    /// A timed-out attempt counts as a failure. The returned error carries
    /// `name`, the number of attempts made and the last failure message.
    pub async fn run<F, Fut, T, E>(
        &self,
        name: &str,
        max_attempts: u32,
        timeout: Duration,
        mut operation: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: fmt::Display,
    {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let message = match tokio::time::timeout(timeout, operation()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!("timed out after {}ms", timeout.as_millis()),
            };

            if is_non_retryable(&message) {
                debug!(operation = name, attempt, error = %message, "non-retryable failure");
                return Err(Error::NonRetryableExecution {
                    operation: name.to_string(),
                    attempts: attempt,
                    message,
                });
            }

            if attempt >= max_attempts {
                return Err(Error::TransientExecution {
                    operation: name.to_string(),
                    attempts: attempt,
                    message,
                });
            }

            let delay = self.delay_with_jitter(attempt);
            debug!(
                operation = name,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %message,
                "attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Run `operation` with the default backoff schedule.
pub async fn with_retry<F, Fut, T, E>(
    operation: F,
    name: &str,
    max_attempts: u32,
    timeout: Duration,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: fmt::Display,
{
    RetryPolicy::default()
        .run(name, max_attempts, timeout, operation)
        .await
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
