//! The consumed device-transport boundary.
//!
//! The session does not speak the wireless protocol itself; it drives a
//! vendor transport stack through the [`Transport`] trait and reacts to the
//! notifications that stack pushes back. The vendor SDK's family of
//! observer interfaces (power state, connection lifecycle, device info,
//! feature readiness, logging) is collapsed into the single
//! [`TransportEvent`] tagged variant delivered over one mpsc channel, so
//! the session can dispatch with a plain `match` instead of juggling
//! callback objects.
//!
//! Long-lived data paths (sample streams, device search, heart-rate
//! broadcast listening) are represented as [`Feed`]s: the transport hands
//! back a receiver plus a token, and dropping the receiver releases the
//! underlying subscription.
//!
//! [`Feed`]: crate::core::Feed

pub mod mock;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::core::{
    DeviceId, DiscoveredDevice, Feed, HrBroadcast, Modality, RecordingInterval, RecordingSampleType,
    RecordingStatus, SampleBatch, SettingsOptions, StreamSettings,
};

/// Errors surfaced by transport calls.
///
/// A transport error never alters session state: the failed call is logged
/// and the session remains as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The radio is powered off.
    #[error("Transport is powered off")]
    PoweredOff,

    /// The device rejected or could not service the request.
    #[error("Device rejected the request: {0}")]
    Rejected(String),

    /// The device does not support the requested feature.
    #[error("Feature not available on this device: {0}")]
    FeatureUnavailable(String),
}

/// Notifications pushed by the transport's observer side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// The radio became available.
    PowerOn,
    /// The radio became unavailable.
    PowerOff,
    /// A connection to the device is being established.
    Connecting(DeviceId),
    /// The device session is live.
    Connected(DeviceId),
    /// The device session ended.
    Disconnected(DeviceId),
    /// Battery level report, percent.
    BatteryLevel {
        /// Reporting device.
        device: DeviceId,
        /// Charge percentage, 0-100.
        level: u8,
    },
    /// A device-information string (firmware revision and similar).
    DeviceInfo {
        /// Reporting device.
        device: DeviceId,
        /// Raw information value.
        value: String,
    },
    /// A device feature became ready for use.
    FeatureReady {
        /// Reporting device.
        device: DeviceId,
        /// Feature name as reported by the transport.
        feature: String,
    },
    /// Diagnostic log line from inside the transport stack.
    Log(String),
}

/// The vendor transport surface consumed by the session.
///
/// All request methods are one-shot: they resolve when the transport has
/// accepted (or rejected) the request. Progress and data arrive
/// asynchronously, either as [`TransportEvent`]s on the observer channel or
/// as [`FeedEvent`]s on a feed returned by the call.
///
/// [`FeedEvent`]: crate::core::FeedEvent
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Whether the underlying radio is currently powered on.
    fn is_powered(&self) -> bool;

    /// Registers the observer channel for transport notifications.
    /// A later registration replaces any earlier one.
    fn register_observer(&self, events: mpsc::Sender<TransportEvent>);

    /// Requests a connection to `device`. Fire-and-forget: connection
    /// progress arrives as `Connecting`/`Connected` observer events.
    async fn connect(&self, device: &DeviceId) -> Result<(), TransportError>;

    /// Requests disconnection from `device`.
    async fn disconnect(&self, device: &DeviceId) -> Result<(), TransportError>;

    /// Starts a one-shot scan that connects to the nearest device whose
    /// signal exceeds `rssi_threshold` dBm. The returned feed carries no
    /// items; it terminates with `Completed` or `Failed`.
    async fn start_auto_connect(&self, rssi_threshold: i32) -> Result<Feed<()>, TransportError>;

    /// Starts a device search scan.
    async fn search(&self) -> Result<Feed<DiscoveredDevice>, TransportError>;

    /// Starts listening for over-the-air heart-rate broadcasts.
    async fn start_broadcast_listen(&self) -> Result<Feed<HrBroadcast>, TransportError>;

    /// Queries the settings the device offers for `modality` streaming.
    async fn request_stream_settings(
        &self,
        device: &DeviceId,
        modality: Modality,
    ) -> Result<SettingsOptions, TransportError>;

    /// Opens a streaming subscription for `modality` with the given
    /// settings. Fixed-format modalities accept empty settings.
    async fn start_streaming(
        &self,
        device: &DeviceId,
        modality: Modality,
        settings: StreamSettings,
    ) -> Result<Feed<SampleBatch>, TransportError>;

    /// Switches the device's SDK streaming mode on or off.
    async fn set_sdk_mode(&self, device: &DeviceId, enabled: bool) -> Result<(), TransportError>;

    /// Starts on-device recording under `exercise_id`.
    async fn start_recording(
        &self,
        device: &DeviceId,
        exercise_id: &str,
        interval: RecordingInterval,
        sample_type: RecordingSampleType,
    ) -> Result<(), TransportError>;

    /// Stops any on-device recording in progress.
    async fn stop_recording(&self, device: &DeviceId) -> Result<(), TransportError>;

    /// Queries on-device recording status.
    async fn recording_status(&self, device: &DeviceId)
        -> Result<RecordingStatus, TransportError>;

    /// Sets the device clock to the given wall-clock time with zone offset.
    async fn set_local_time(
        &self,
        device: &DeviceId,
        time: DateTime<FixedOffset>,
    ) -> Result<(), TransportError>;
}
