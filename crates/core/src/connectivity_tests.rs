// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    disconnected = { NetState::offline(), ConnectionQuality::Poor },
    unknown_connected = { NetState { is_connected: None, ..NetState::wifi(Some(90)) }, ConnectionQuality::Poor },
    wifi_strong = { NetState::wifi(Some(81)), ConnectionQuality::Excellent },
    wifi_80 = { NetState::wifi(Some(80)), ConnectionQuality::Good },
    wifi_61 = { NetState::wifi(Some(61)), ConnectionQuality::Good },
    wifi_60 = { NetState::wifi(Some(60)), ConnectionQuality::Fair },
    wifi_41 = { NetState::wifi(Some(41)), ConnectionQuality::Fair },
    wifi_40 = { NetState::wifi(Some(40)), ConnectionQuality::Poor },
    wifi_unknown = { NetState::wifi(None), ConnectionQuality::Good },
    cell_5g = { NetState::cellular(Some(CellularGeneration::G5)), ConnectionQuality::Excellent },
    cell_4g = { NetState::cellular(Some(CellularGeneration::G4)), ConnectionQuality::Good },
    cell_3g = { NetState::cellular(Some(CellularGeneration::G3)), ConnectionQuality::Fair },
    cell_2g = { NetState::cellular(Some(CellularGeneration::G2)), ConnectionQuality::Poor },
    cell_unknown = { NetState::cellular(None), ConnectionQuality::Fair },
    other_type = { NetState { connection_type: ConnectionType::Other, ..NetState::wifi(None) }, ConnectionQuality::Fair },
)]
fn quality_classification(state: NetState, expected: ConnectionQuality) {
    assert_eq!(classify_quality(&state), expected);
}

#[parameterized(
    excellent = { ConnectionQuality::Excellent, 10 },
    good = { ConnectionQuality::Good, 5 },
    fair = { ConnectionQuality::Fair, 3 },
    poor = { ConnectionQuality::Poor, 1 },
)]
fn batch_size_by_quality(quality: ConnectionQuality, expected: usize) {
    assert_eq!(quality.batch_size(), expected);
}

#[test]
fn quality_is_ordered() {
    assert!(ConnectionQuality::Poor < ConnectionQuality::Fair);
    assert!(ConnectionQuality::Good < ConnectionQuality::Excellent);
}

#[test]
fn snapshot_online_ignores_reachability() {
    let state = NetState {
        is_internet_reachable: None,
        ..NetState::wifi(Some(70))
    };
    let snapshot = ConnectivitySnapshot::from_state(&state);
    assert!(snapshot.is_online);
    assert_eq!(snapshot.is_internet_reachable, None);
    assert_eq!(snapshot.quality, ConnectionQuality::Good);
}

#[test]
fn default_snapshot_is_offline_and_poor() {
    let snapshot = ConnectivitySnapshot::default();
    assert!(!snapshot.is_online);
    assert_eq!(snapshot.quality, ConnectionQuality::Poor);
}

#[test]
fn net_state_parses_platform_payload() {
    let json = r#"{
        "isConnected": true,
        "type": "cellular",
        "isInternetReachable": null,
        "details": { "cellularGeneration": "4g" }
    }"#;
    let state: NetState = serde_json::from_str(json).unwrap();
    assert_eq!(state.is_connected, Some(true));
    assert_eq!(state.connection_type, ConnectionType::Cellular);
    assert_eq!(state.is_internet_reachable, None);
    assert_eq!(
        state.details.cellular_generation,
        Some(CellularGeneration::G4)
    );
    assert_eq!(classify_quality(&state), ConnectionQuality::Good);
}

#[test]
fn unrecognized_platform_names_map_conservatively() {
    assert_eq!(ConnectionType::from_platform("ethernet"), ConnectionType::Other);
    assert_eq!(ConnectionType::from_platform("unknown"), ConnectionType::None);
    assert_eq!(
        CellularGeneration::from_platform("6g"),
        CellularGeneration::Other
    );
}
