// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP delivery of queued operations.
//!
//! Each operation is POSTed as `{id, type, data}` JSON to
//! `<endpoint>/<type>`. Client errors are reported with messages the retry
//! executor treats as permanent, so a rejected request is not repeated
//! within a cycle.

use std::time::Duration;

use ns_core::dispatcher::{HandlerFuture, HandlerResult, OperationHandler};
use ns_core::QueuedOperation;
use reqwest::StatusCode;
use serde_json::json;

use crate::error::Result;

/// Delivers operations to a REST backend.
#[derive(Debug, Clone)]
pub struct HttpHandler {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpHandler {
    /// Create a handler posting under `endpoint`. Requests carry their own
    /// timeout in addition to the dispatcher's per-attempt limit.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("notesync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpHandler {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// URL an operation is delivered to.
    pub fn url_for(&self, operation: &QueuedOperation) -> String {
        format!("{}/{}", self.endpoint, operation.operation_type)
    }
}

/// Describe a non-success response.
pub fn status_message(status: StatusCode) -> String {
    match status {
        StatusCode::BAD_REQUEST => format!("malformed data ({})", status),
        StatusCode::UNAUTHORIZED => format!("unauthorized ({})", status),
        StatusCode::FORBIDDEN => format!("forbidden ({})", status),
        StatusCode::NOT_FOUND => format!("not found ({})", status),
        _ => format!("backend responded with {}", status),
    }
}

impl OperationHandler for HttpHandler {
    fn handle(&self, operation: QueuedOperation) -> HandlerFuture {
        let request = self.client.post(self.url_for(&operation)).json(&json!({
            "id": operation.id,
            "type": operation.operation_type,
            "data": operation.payload,
        }));

        Box::pin(async move {
            let status = request.send().await?.status();
            let result: HandlerResult = if status.is_success() {
                Ok(())
            } else {
                Err(status_message(status).into())
            };
            result
        })
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
