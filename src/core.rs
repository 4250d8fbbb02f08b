//! Fundamental domain types for the biosensor session.
//!
//! This module defines the essential abstractions shared by the transport
//! boundary and the session actor: device identity, connection lifecycle,
//! the five sensor modalities, stream settings negotiation, decoded sample
//! batches, and the feed event envelope used by every open subscription.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identifier of a specific physical sensor device.
///
/// Opaque to this crate; assigned at startup from configuration and
/// immutable for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wraps a device identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connection lifecycle of the session's device.
///
/// Exactly one value at any time. Transitions are driven exclusively by
/// transport-emitted events; the session never moves itself to
/// `Connecting` other than by issuing a connect request to the transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No device session.
    #[default]
    Disconnected,
    /// The transport is establishing a session with the device.
    Connecting(DeviceId),
    /// The device session is live; streams may be activated.
    Connected(DeviceId),
}

impl ConnectionState {
    /// Whether a device session is currently live.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected(_))
    }

    /// The connected device, if any.
    pub fn connected_device(&self) -> Option<&DeviceId> {
        match self {
            ConnectionState::Connected(device) => Some(device),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting(device) => write!(f, "connecting to {}", device),
            ConnectionState::Connected(device) => write!(f, "connected to {}", device),
        }
    }
}

/// One sensor data type the device can stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Modality {
    /// Electrocardiogram, microvolts.
    Ecg,
    /// Three-axis accelerometer, milli-g.
    Acc,
    /// Photoplethysmogram, three channels plus ambient.
    Ppg,
    /// Pulse-to-pulse interval.
    Ppi,
    /// Heart rate with R-R interval lists.
    Hr,
}

impl Modality {
    /// Every modality, in a fixed order.
    pub const ALL: [Modality; 5] = [
        Modality::Ecg,
        Modality::Acc,
        Modality::Ppg,
        Modality::Ppi,
        Modality::Hr,
    ];

    /// ECG, ACC and PPG streams negotiate settings before starting;
    /// PPI and HR are fixed-format and start directly.
    pub fn negotiates_settings(self) -> bool {
        matches!(self, Modality::Ecg | Modality::Acc | Modality::Ppg)
    }

    /// Short lowercase name, stable across releases.
    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Ecg => "ecg",
            Modality::Acc => "acc",
            Modality::Ppg => "ppg",
            Modality::Ppi => "ppi",
            Modality::Hr => "hr",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Stream settings negotiation
// =============================================================================

/// A negotiable stream parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKind {
    /// Samples per second.
    SampleRate,
    /// Sample resolution in bits.
    Resolution,
    /// Measurement range.
    Range,
    /// Number of channels.
    ChannelCount,
}

/// The value sets a device offers for each negotiable stream parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsOptions {
    /// Available values per parameter, as reported by the device.
    pub available: HashMap<SettingKind, BTreeSet<u32>>,
}

impl SettingsOptions {
    /// Adds an offered value for a parameter. Used by transports when
    /// decoding the device's capability response.
    pub fn offer(&mut self, kind: SettingKind, value: u32) {
        self.available.entry(kind).or_default().insert(value);
    }

    /// Selects the highest available value for every offered parameter.
    pub fn maximal(&self) -> StreamSettings {
        let selected = self
            .available
            .iter()
            .filter_map(|(kind, values)| values.iter().next_back().map(|v| (*kind, *v)))
            .collect();
        StreamSettings { selected }
    }
}

/// A concrete parameter selection used to open a stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamSettings {
    /// Selected value per parameter.
    pub selected: HashMap<SettingKind, u32>,
}

// =============================================================================
// Decoded samples
// =============================================================================

/// One accelerometer sample, milli-g per axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccSample {
    /// X axis.
    pub x: i32,
    /// Y axis.
    pub y: i32,
    /// Z axis.
    pub z: i32,
}

/// One photoplethysmogram sample: three PPG channels plus ambient light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpgSample {
    /// PPG channel values.
    pub channels: [i32; 3],
    /// Ambient light reference.
    pub ambient: i32,
}

/// One pulse-to-pulse interval sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpiSample {
    /// Pulse-to-pulse interval in milliseconds.
    pub interval_ms: u16,
    /// Device-estimated measurement error in milliseconds.
    pub error_estimate_ms: u16,
    /// Movement detected during the interval.
    pub blocker: bool,
    /// Sensor had skin contact during the interval.
    pub skin_contact: bool,
}

/// One heart-rate sample with its R-R interval lists.
///
/// R-R intervals are delivered in two encodings: `rr_samples` in 1/1024 s
/// units and `rr_ms` in milliseconds. Either list may be empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrSample {
    /// Heart rate in beats per minute.
    pub hr: u8,
    /// Sensor contact flag.
    pub contact: bool,
    /// Whether the device reports contact at all.
    pub contact_supported: bool,
    /// R-R intervals in 1/1024 s units.
    pub rr_samples: Vec<u16>,
    /// R-R intervals in milliseconds.
    pub rr_ms: Vec<u16>,
}

/// A decoded batch of samples from one modality's stream, in arrival order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleBatch {
    /// ECG samples, microvolts.
    Ecg(Vec<i32>),
    /// Accelerometer samples.
    Acc(Vec<AccSample>),
    /// PPG samples.
    Ppg(Vec<PpgSample>),
    /// Pulse-interval samples.
    Ppi(Vec<PpiSample>),
    /// Heart-rate samples.
    Hr(Vec<HrSample>),
}

impl SampleBatch {
    /// The modality this batch belongs to.
    pub fn modality(&self) -> Modality {
        match self {
            SampleBatch::Ecg(_) => Modality::Ecg,
            SampleBatch::Acc(_) => Modality::Acc,
            SampleBatch::Ppg(_) => Modality::Ppg,
            SampleBatch::Ppi(_) => Modality::Ppi,
            SampleBatch::Hr(_) => Modality::Hr,
        }
    }

    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        match self {
            SampleBatch::Ecg(samples) => samples.len(),
            SampleBatch::Acc(samples) => samples.len(),
            SampleBatch::Ppg(samples) => samples.len(),
            SampleBatch::Ppi(samples) => samples.len(),
            SampleBatch::Hr(samples) => samples.len(),
        }
    }

    /// Whether the batch carries no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Feeds
// =============================================================================

/// One notification from an open feed.
///
/// `Failed` and `Completed` are terminal: the transport delivers no further
/// events for the feed after either.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedEvent<T> {
    /// Next item delivered by the transport.
    Item(T),
    /// The feed failed; the reason is diagnostic text from the transport.
    Failed(String),
    /// The device or transport ended the feed gracefully.
    Completed,
}

/// An open, cancellable subscription to a transport feed.
///
/// The token identifies this particular subscription; the session uses it
/// to discard events from a subscription that has already been cancelled.
#[derive(Debug)]
pub struct Feed<T> {
    /// Identity of this subscription.
    pub token: Uuid,
    /// Event delivery channel. Dropping the receiver releases the feed.
    pub events: mpsc::Receiver<FeedEvent<T>>,
}

/// A device discovered during a search scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    /// Identifier usable for a connect request.
    pub device_id: DeviceId,
    /// Advertised device name.
    pub name: String,
    /// Hardware address.
    pub address: String,
    /// Whether the device accepts connections.
    pub connectable: bool,
}

/// An over-the-air heart-rate broadcast from a nearby device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrBroadcast {
    /// Advertised name of the broadcasting device.
    pub device_name: String,
    /// Broadcast heart rate in beats per minute.
    pub hr: u8,
    /// Battery status bit from the advertisement.
    pub battery_ok: bool,
}

// =============================================================================
// On-device recording
// =============================================================================

/// Sampling interval for on-device recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordingInterval {
    /// One sample per second.
    OneSecond,
    /// One sample every five seconds.
    FiveSeconds,
}

/// Which quantity the on-device recorder stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordingSampleType {
    /// Heart rate.
    Hr,
    /// R-R intervals.
    RrInterval,
}

/// Result of an on-device recording status query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingStatus {
    /// Whether a recording is in progress on the device.
    pub ongoing: bool,
    /// Identifier of the recording entry, empty when none.
    pub entry_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maximal_selects_highest_offered_values() {
        let mut options = SettingsOptions::default();
        options.offer(SettingKind::SampleRate, 130);
        options.offer(SettingKind::SampleRate, 65);
        options.offer(SettingKind::Resolution, 14);
        let settings = options.maximal();
        assert_eq!(settings.selected.get(&SettingKind::SampleRate), Some(&130));
        assert_eq!(settings.selected.get(&SettingKind::Resolution), Some(&14));
        assert_eq!(settings.selected.get(&SettingKind::Range), None);
    }

    #[test]
    fn maximal_of_empty_options_is_empty() {
        let settings = SettingsOptions::default().maximal();
        assert!(settings.selected.is_empty());
    }

    #[test]
    fn fixed_format_modalities_skip_negotiation() {
        assert!(Modality::Ecg.negotiates_settings());
        assert!(Modality::Acc.negotiates_settings());
        assert!(Modality::Ppg.negotiates_settings());
        assert!(!Modality::Ppi.negotiates_settings());
        assert!(!Modality::Hr.negotiates_settings());
    }

    #[test]
    fn batch_reports_its_modality_and_length() {
        let batch = SampleBatch::Ecg(vec![10, 12, 9]);
        assert_eq!(batch.modality(), Modality::Ecg);
        assert_eq!(batch.len(), 3);
        assert!(!batch.is_empty());
    }

    #[test]
    fn connection_state_accessors() {
        let device = DeviceId::new("A1B2C3");
        let state = ConnectionState::Connected(device.clone());
        assert!(state.is_connected());
        assert_eq!(state.connected_device(), Some(&device));
        assert!(!ConnectionState::Disconnected.is_connected());
        assert_eq!(ConnectionState::Connecting(device).connected_device(), None);
    }
}
