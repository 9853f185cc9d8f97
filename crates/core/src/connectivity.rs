// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity state and quality classification.
//!
//! The platform reports raw link state ([`NetState`]); everything else in
//! this module is derived from it by pure functions so that classification
//! can be tested without a device.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Link-layer connection category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConnectionType {
    Wifi,
    Cellular,
    #[default]
    None,
    /// Any other connected transport (ethernet, vpn, bluetooth, ...).
    Other,
}

impl ConnectionType {
    /// Map a platform connection type name.
    ///
    /// `"unknown"` is treated as no connection.
    pub fn from_platform(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "wifi" => ConnectionType::Wifi,
            "cellular" => ConnectionType::Cellular,
            "none" | "unknown" | "" => ConnectionType::None,
            _ => ConnectionType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Wifi => "wifi",
            ConnectionType::Cellular => "cellular",
            ConnectionType::None => "none",
            ConnectionType::Other => "other",
        }
    }
}

impl From<String> for ConnectionType {
    fn from(name: String) -> Self {
        ConnectionType::from_platform(&name)
    }
}

impl From<ConnectionType> for String {
    fn from(ty: ConnectionType) -> Self {
        ty.as_str().to_string()
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cellular radio generation as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CellularGeneration {
    G2,
    G3,
    G4,
    G5,
    /// A generation name the platform reported but we do not recognize.
    Other,
}

impl CellularGeneration {
    pub fn from_platform(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "2g" => CellularGeneration::G2,
            "3g" => CellularGeneration::G3,
            "4g" => CellularGeneration::G4,
            "5g" => CellularGeneration::G5,
            _ => CellularGeneration::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CellularGeneration::G2 => "2g",
            CellularGeneration::G3 => "3g",
            CellularGeneration::G4 => "4g",
            CellularGeneration::G5 => "5g",
            CellularGeneration::Other => "other",
        }
    }
}

impl From<String> for CellularGeneration {
    fn from(name: String) -> Self {
        CellularGeneration::from_platform(&name)
    }
}

impl From<CellularGeneration> for String {
    fn from(generation: CellularGeneration) -> Self {
        generation.as_str().to_string()
    }
}

/// Transport-specific details attached to a platform event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDetails {
    /// Wifi signal strength, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cellular_generation: Option<CellularGeneration>,
}

/// Raw connectivity state as reported by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetState {
    pub is_connected: Option<bool>,
    #[serde(rename = "type", default)]
    pub connection_type: ConnectionType,
    pub is_internet_reachable: Option<bool>,
    #[serde(default)]
    pub details: LinkDetails,
}

impl NetState {
    /// A disconnected state.
    pub fn offline() -> Self {
        NetState {
            is_connected: Some(false),
            connection_type: ConnectionType::None,
            is_internet_reachable: Some(false),
            details: LinkDetails::default(),
        }
    }

    /// A connected wifi state with an optional signal strength.
    pub fn wifi(strength: Option<u8>) -> Self {
        NetState {
            is_connected: Some(true),
            connection_type: ConnectionType::Wifi,
            is_internet_reachable: Some(true),
            details: LinkDetails {
                strength,
                cellular_generation: None,
            },
        }
    }

    /// A connected cellular state with an optional radio generation.
    pub fn cellular(generation: Option<CellularGeneration>) -> Self {
        NetState {
            is_connected: Some(true),
            connection_type: ConnectionType::Cellular,
            is_internet_reachable: Some(true),
            details: LinkDetails {
                strength: None,
                cellular_generation: generation,
            },
        }
    }
}

/// Coarse estimate of link capacity, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ConnectionQuality {
    /// Number of queued operations drained per cycle at this quality.
    pub fn batch_size(self) -> usize {
        match self {
            ConnectionQuality::Excellent => 10,
            ConnectionQuality::Good => 5,
            ConnectionQuality::Fair => 3,
            ConnectionQuality::Poor => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionQuality::Poor => "poor",
            ConnectionQuality::Fair => "fair",
            ConnectionQuality::Good => "good",
            ConnectionQuality::Excellent => "excellent",
        }
    }
}

impl fmt::Display for ConnectionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify link quality from raw state.
pub fn classify_quality(state: &NetState) -> ConnectionQuality {
    if state.is_connected != Some(true) || state.connection_type == ConnectionType::None {
        return ConnectionQuality::Poor;
    }

    match state.connection_type {
        ConnectionType::Wifi => match state.details.strength {
            Some(s) if s > 80 => ConnectionQuality::Excellent,
            Some(s) if s > 60 => ConnectionQuality::Good,
            Some(s) if s > 40 => ConnectionQuality::Fair,
            Some(_) => ConnectionQuality::Poor,
            None => ConnectionQuality::Good,
        },
        ConnectionType::Cellular => match state.details.cellular_generation {
            Some(CellularGeneration::G5) => ConnectionQuality::Excellent,
            Some(CellularGeneration::G4) => ConnectionQuality::Good,
            Some(CellularGeneration::G3) => ConnectionQuality::Fair,
            Some(_) => ConnectionQuality::Poor,
            None => ConnectionQuality::Fair,
        },
        ConnectionType::Other | ConnectionType::None => ConnectionQuality::Fair,
    }
}

/// Derived view of connectivity at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivitySnapshot {
    /// Link-layer state; says nothing about actual internet reachability.
    pub is_online: bool,
    pub connection_type: ConnectionType,
    /// `None` when the platform has not determined reachability yet.
    pub is_internet_reachable: Option<bool>,
    pub quality: ConnectionQuality,
}

impl ConnectivitySnapshot {
    pub fn from_state(state: &NetState) -> Self {
        ConnectivitySnapshot {
            is_online: state.is_connected == Some(true),
            connection_type: state.connection_type,
            is_internet_reachable: state.is_internet_reachable,
            quality: classify_quality(state),
        }
    }

    /// The assumed state before the platform has reported anything.
    pub fn offline() -> Self {
        ConnectivitySnapshot {
            is_online: false,
            connection_type: ConnectionType::None,
            is_internet_reachable: None,
            quality: ConnectionQuality::Poor,
        }
    }
}

impl Default for ConnectivitySnapshot {
    fn default() -> Self {
        Self::offline()
    }
}

/// Error type for connectivity sources.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The platform could not report connectivity.
    #[error("connectivity unavailable: {0}")]
    Unavailable(String),
}

/// Future returned by [`ConnectivitySource::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<NetState, SourceError>> + Send + 'a>>;

/// Platform reachability capability.
///
/// Abstracts the device's network observable so the monitor can be driven
/// by fakes in tests.
pub trait ConnectivitySource: Send + Sync {
    /// Subscribe to connectivity change events.
    ///
    /// The stream ends when the source shuts down. Called from within a
    /// tokio runtime.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<NetState>;

    /// Read the current state once.
    fn fetch(&self) -> FetchFuture<'_>;
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
