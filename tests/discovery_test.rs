//! Integration tests for discovery feeds and transport observer events.

use std::sync::Arc;
use std::time::Duration;

use biodaq::config::Settings;
use biodaq::core::{DeviceId, DiscoveredDevice, HrBroadcast};
use biodaq::session::{SessionActor, SessionHandle, SessionSnapshot};
use biodaq::transport::mock::{MockTransport, TransportCall};
use biodaq::transport::TransportEvent;

fn spawn_session() -> (SessionHandle, MockTransport) {
    let settings: Settings =
        toml::from_str(r#"device_id = "TEST-DEVICE""#).expect("Failed to parse test config");
    let mock = MockTransport::new();
    let (handle, _task) = SessionActor::spawn(Arc::new(mock.clone()), &settings);
    (handle, mock)
}

async fn wait_until(handle: &SessionHandle, predicate: impl FnMut(&SessionSnapshot) -> bool) {
    let mut watch = handle.watch();
    tokio::time::timeout(Duration::from_secs(2), watch.wait_for(predicate))
        .await
        .expect("Timed out waiting for snapshot update")
        .expect("Session actor stopped");
}

#[tokio::test]
async fn search_toggle_opens_and_cancels_the_scan() {
    let (handle, mock) = spawn_session();

    assert!(handle.toggle_search().await.expect("toggle failed"));
    assert!(handle.snapshot().search_enabled);

    mock.push_discovered(DiscoveredDevice {
        device_id: DeviceId::new("F00D42"),
        name: "Sense F00D42".to_string(),
        address: "C4:33:01".to_string(),
        connectable: true,
    })
    .await;

    assert!(!handle.toggle_search().await.expect("toggle failed"));
    assert!(!handle.snapshot().search_enabled);
    assert_eq!(mock.call_count(|c| matches!(c, TransportCall::Search)), 1);
}

#[tokio::test]
async fn search_completion_clears_the_flag() {
    let (handle, mock) = spawn_session();
    assert!(handle.toggle_search().await.expect("toggle failed"));

    mock.complete_search().await;
    wait_until(&handle, |s| !s.search_enabled).await;
}

#[tokio::test]
async fn broadcast_listener_survives_items_and_clears_on_failure() {
    let (handle, mock) = spawn_session();
    assert!(handle.toggle_broadcast().await.expect("toggle failed"));

    mock.push_broadcast(HrBroadcast {
        device_name: "H10 9C4D02".to_string(),
        hr: 72,
        battery_ok: true,
    })
    .await;
    // Items keep the listener running.
    assert!(handle.snapshot().broadcast_enabled);

    mock.fail_broadcast("radio interference").await;
    wait_until(&handle, |s| !s.broadcast_enabled).await;
}

#[tokio::test]
async fn auto_connect_replaces_a_running_scan() {
    let (handle, mock) = spawn_session();

    handle.auto_connect().await.expect("auto connect failed");
    handle.auto_connect().await.expect("auto connect failed");

    assert_eq!(
        mock.call_count(|c| matches!(c, TransportCall::AutoConnect(_))),
        2
    );
}

#[tokio::test]
async fn auto_connect_uses_configured_threshold() {
    let settings: Settings = toml::from_str(
        r#"
        device_id = "TEST-DEVICE"
        auto_connect_rssi = -60
        "#,
    )
    .expect("Failed to parse test config");
    let mock = MockTransport::new();
    let (handle, _task) = SessionActor::spawn(Arc::new(mock.clone()), &settings);

    handle.auto_connect().await.expect("auto connect failed");

    assert_eq!(mock.calls(), vec![TransportCall::AutoConnect(-60)]);
}

#[tokio::test]
async fn battery_and_power_events_update_the_snapshot() {
    let (handle, mock) = spawn_session();
    assert!(handle.snapshot().transport_powered);
    assert_eq!(handle.snapshot().battery_level, None);

    mock.emit(TransportEvent::BatteryLevel {
        device: DeviceId::new("TEST-DEVICE"),
        level: 81,
    })
    .await;
    wait_until(&handle, |s| s.battery_level == Some(81)).await;

    mock.emit(TransportEvent::PowerOff).await;
    wait_until(&handle, |s| !s.transport_powered).await;

    mock.emit(TransportEvent::PowerOn).await;
    wait_until(&handle, |s| s.transport_powered).await;
}

#[tokio::test]
async fn rejected_connect_leaves_state_unchanged() {
    let (handle, mock) = spawn_session();
    mock.reject_connect(true);

    handle.connect().await.expect("Connect command failed");

    let snapshot = handle.snapshot();
    assert!(!snapshot.connection.is_connected());
    assert_eq!(
        mock.call_count(|c| matches!(c, TransportCall::Connect(_))),
        1,
        "The connect request itself must have been attempted"
    );
}

#[tokio::test]
async fn disconnect_request_is_guarded_while_not_connected() {
    let (handle, mock) = spawn_session();

    handle.disconnect().await.expect("Disconnect command failed");

    assert_eq!(
        mock.call_count(|c| matches!(c, TransportCall::Disconnect(_))),
        0,
        "Disconnect must not be attempted against the transport"
    );
}
