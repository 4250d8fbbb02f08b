//! Integration tests for the device command façade.
//!
//! Every command requires a live connection and is otherwise a silent
//! no-op: no transport call, no surfaced error.

use std::sync::Arc;
use std::time::Duration;

use biodaq::config::Settings;
use biodaq::core::{DeviceId, RecordingStatus};
use biodaq::session::{SessionActor, SessionHandle, SessionSnapshot};
use biodaq::transport::mock::{MockTransport, TransportCall};
use biodaq::transport::TransportEvent;

const TEST_DEVICE: &str = "TEST-DEVICE";

fn spawn_session() -> (SessionHandle, MockTransport) {
    let settings: Settings = toml::from_str(&format!(r#"device_id = "{}""#, TEST_DEVICE))
        .expect("Failed to parse test config");
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

async fn connect(handle: &SessionHandle, mock: &MockTransport) {
    handle.connect().await.expect("Connect command failed");
    mock.emit(TransportEvent::Connected(DeviceId::new(TEST_DEVICE)))
        .await;
    wait_until(handle, |s| s.connection.is_connected()).await;
}

#[tokio::test]
async fn commands_are_silent_no_ops_while_disconnected() {
    let (handle, mock) = spawn_session();

    handle.set_sdk_mode(true).await.expect("command failed");
    handle.start_device_recording().await.expect("command failed");
    handle.stop_device_recording().await.expect("command failed");
    let status = handle.recording_status().await.expect("command failed");
    handle.synchronize_clock().await.expect("command failed");

    assert_eq!(status, None);
    assert!(
        mock.calls().is_empty(),
        "Disconnected commands must not reach the transport"
    );
    assert!(!handle.snapshot().sdk_mode_enabled);
}

#[tokio::test]
async fn sdk_mode_flag_tracks_successful_commands() {
    let (handle, mock) = spawn_session();
    connect(&handle, &mock).await;

    handle.set_sdk_mode(true).await.expect("command failed");
    assert!(handle.snapshot().sdk_mode_enabled);

    handle.set_sdk_mode(false).await.expect("command failed");
    assert!(!handle.snapshot().sdk_mode_enabled);

    assert_eq!(
        mock.call_count(|c| matches!(c, TransportCall::SetSdkMode(..))),
        2
    );
}

#[tokio::test]
async fn rejected_sdk_mode_command_leaves_flag_unchanged() {
    let (handle, mock) = spawn_session();
    connect(&handle, &mock).await;
    mock.reject_commands(true);

    handle.set_sdk_mode(true).await.expect("command failed");

    assert!(!handle.snapshot().sdk_mode_enabled);
    assert_eq!(
        mock.call_count(|c| matches!(c, TransportCall::SetSdkMode(..))),
        1,
        "The rejected call itself must still have been attempted"
    );
}

#[tokio::test]
async fn command_failure_does_not_affect_the_connection() {
    let (handle, mock) = spawn_session();
    connect(&handle, &mock).await;
    mock.reject_commands(true);

    handle.start_device_recording().await.expect("command failed");
    handle.synchronize_clock().await.expect("command failed");

    assert!(handle.snapshot().connection.is_connected());
}

#[tokio::test]
async fn recording_start_uses_fixed_exercise_id() {
    let (handle, mock) = spawn_session();
    connect(&handle, &mock).await;

    handle.start_device_recording().await.expect("command failed");
    handle.stop_device_recording().await.expect("command failed");

    let exercise_id = mock
        .calls()
        .into_iter()
        .find_map(|call| match call {
            TransportCall::StartRecording(_, id) => Some(id),
            _ => None,
        })
        .expect("Recording was not started");
    assert_eq!(exercise_id, "BIODAQ_SESSION");
    assert_eq!(
        mock.call_count(|c| matches!(c, TransportCall::StopRecording(_))),
        1
    );
}

#[tokio::test]
async fn recording_status_query_reports_device_state() {
    let (handle, mock) = spawn_session();
    connect(&handle, &mock).await;
    mock.set_recording_status(RecordingStatus {
        ongoing: true,
        entry_id: "ENTRY-7".to_string(),
    });

    let status = handle
        .recording_status()
        .await
        .expect("command failed")
        .expect("Status query returned nothing");

    assert!(status.ongoing);
    assert_eq!(status.entry_id, "ENTRY-7");
}

#[tokio::test]
async fn clock_sync_issues_a_set_time_call() {
    let (handle, mock) = spawn_session();
    connect(&handle, &mock).await;

    handle.synchronize_clock().await.expect("command failed");

    assert_eq!(
        mock.call_count(|c| matches!(c, TransportCall::SetLocalTime(_))),
        1
    );
}
