//! Mock transport implementation.
//!
//! Provides a simulated device transport for exercising the session without
//! physical hardware. Tests drive it manually: they inject observer events,
//! push sample batches into open streams, and script call failures, while
//! every issued call is recorded so tests can assert that a guarded
//! operation made no transport call at all.
//!
//! With [`MockTransport::simulated`] the mock also acts on its own:
//! connect requests produce connection events and opened streams emit
//! generated sample batches. That is what the demo CLI runs against.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::core::{
    AccSample, DeviceId, DiscoveredDevice, Feed, FeedEvent, HrBroadcast, HrSample, Modality,
    PpgSample, PpiSample, RecordingInterval, RecordingSampleType, RecordingStatus, SampleBatch,
    SettingKind, SettingsOptions, StreamSettings,
};
use crate::transport::{Transport, TransportError, TransportEvent};

/// Capacity of every mock feed channel.
const FEED_CAPACITY: usize = 32;

/// One recorded transport call, for test assertions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportCall {
    /// `connect` was issued.
    Connect(DeviceId),
    /// `disconnect` was issued.
    Disconnect(DeviceId),
    /// `start_auto_connect` was issued with this threshold.
    AutoConnect(i32),
    /// `search` was issued.
    Search,
    /// `start_broadcast_listen` was issued.
    BroadcastListen,
    /// `request_stream_settings` was issued.
    RequestSettings(DeviceId, Modality),
    /// `start_streaming` was issued with these settings.
    StartStreaming(DeviceId, Modality, StreamSettings),
    /// `set_sdk_mode` was issued.
    SetSdkMode(DeviceId, bool),
    /// `start_recording` was issued with this exercise id.
    StartRecording(DeviceId, String),
    /// `stop_recording` was issued.
    StopRecording(DeviceId),
    /// `recording_status` was issued.
    RecordingStatus(DeviceId),
    /// `set_local_time` was issued.
    SetLocalTime(DeviceId),
}

struct Inner {
    powered: bool,
    simulate: bool,
    reject_connect: bool,
    reject_commands: bool,
    observer: Option<mpsc::Sender<TransportEvent>>,
    settings: HashMap<Modality, SettingsOptions>,
    recording_status: RecordingStatus,
    calls: Vec<TransportCall>,
    streams: HashMap<Modality, mpsc::Sender<FeedEvent<SampleBatch>>>,
    search_feed: Option<mpsc::Sender<FeedEvent<DiscoveredDevice>>>,
    broadcast_feed: Option<mpsc::Sender<FeedEvent<HrBroadcast>>>,
    auto_connect_feed: Option<mpsc::Sender<FeedEvent<()>>>,
}

/// Scriptable in-memory transport.
///
/// Cheap to clone; all clones share the same state, so a test can hand one
/// clone to the session and keep another for driving.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    /// Creates a manual mock: it only does what the test tells it to.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                powered: true,
                simulate: false,
                reject_connect: false,
                reject_commands: false,
                observer: None,
                settings: default_settings(),
                recording_status: RecordingStatus::default(),
                calls: Vec::new(),
                streams: HashMap::new(),
                search_feed: None,
                broadcast_feed: None,
                auto_connect_feed: None,
            })),
        }
    }

    /// Creates a self-acting mock for demo runs: connect requests produce
    /// connection events and opened streams emit generated batches.
    pub fn simulated() -> Self {
        let mock = Self::new();
        mock.lock().simulate = true;
        mock
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Scripting surface
    // =========================================================================

    /// Switches the simulated radio power flag.
    pub fn set_powered(&self, powered: bool) {
        self.lock().powered = powered;
    }

    /// Makes subsequent connect requests fail.
    pub fn reject_connect(&self, reject: bool) {
        self.lock().reject_connect = reject;
    }

    /// Makes subsequent device commands fail.
    pub fn reject_commands(&self, reject: bool) {
        self.lock().reject_commands = reject;
    }

    /// Replaces the settings offered for one modality.
    pub fn offer_settings(&self, modality: Modality, options: SettingsOptions) {
        self.lock().settings.insert(modality, options);
    }

    /// Scripts the reply to recording status queries.
    pub fn set_recording_status(&self, status: RecordingStatus) {
        self.lock().recording_status = status;
    }

    /// Pushes an observer event, as the vendor stack would.
    pub async fn emit(&self, event: TransportEvent) {
        let observer = self.lock().observer.clone();
        if let Some(observer) = observer {
            let _ = observer.send(event).await;
        }
    }

    /// Pushes a sample batch into the matching open stream. Returns false
    /// when that stream is not open (or its consumer is gone).
    pub async fn push_batch(&self, batch: SampleBatch) -> bool {
        let sender = self.lock().streams.get(&batch.modality()).cloned();
        match sender {
            Some(sender) => sender.send(FeedEvent::Item(batch)).await.is_ok(),
            None => false,
        }
    }

    /// Fails one modality's stream. Terminal for that subscription.
    pub async fn fail_stream(&self, modality: Modality, reason: &str) {
        let sender = self.lock().streams.remove(&modality);
        if let Some(sender) = sender {
            let _ = sender.send(FeedEvent::Failed(reason.to_string())).await;
        }
    }

    /// Gracefully completes one modality's stream.
    pub async fn complete_stream(&self, modality: Modality) {
        let sender = self.lock().streams.remove(&modality);
        if let Some(sender) = sender {
            let _ = sender.send(FeedEvent::Completed).await;
        }
    }

    /// Delivers a search result.
    pub async fn push_discovered(&self, device: DiscoveredDevice) {
        let sender = self.lock().search_feed.clone();
        if let Some(sender) = sender {
            let _ = sender.send(FeedEvent::Item(device)).await;
        }
    }

    /// Completes the search scan.
    pub async fn complete_search(&self) {
        let sender = self.lock().search_feed.take();
        if let Some(sender) = sender {
            let _ = sender.send(FeedEvent::Completed).await;
        }
    }

    /// Delivers a heart-rate broadcast.
    pub async fn push_broadcast(&self, broadcast: HrBroadcast) {
        let sender = self.lock().broadcast_feed.clone();
        if let Some(sender) = sender {
            let _ = sender.send(FeedEvent::Item(broadcast)).await;
        }
    }

    /// Fails the broadcast listener.
    pub async fn fail_broadcast(&self, reason: &str) {
        let sender = self.lock().broadcast_feed.take();
        if let Some(sender) = sender {
            let _ = sender.send(FeedEvent::Failed(reason.to_string())).await;
        }
    }

    /// Completes the auto-connect scan.
    pub async fn complete_auto_connect(&self) {
        let sender = self.lock().auto_connect_feed.take();
        if let Some(sender) = sender {
            let _ = sender.send(FeedEvent::Completed).await;
        }
    }

    /// Every call issued so far, in order.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn call_count(&self, predicate: impl Fn(&TransportCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| predicate(c)).count()
    }

    /// Forgets all recorded calls.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn record(&self, call: TransportCall) {
        self.lock().calls.push(call);
    }

    fn command_result(&self) -> Result<(), TransportError> {
        if self.lock().reject_commands {
            Err(TransportError::Rejected("scripted rejection".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn is_powered(&self) -> bool {
        self.lock().powered
    }

    fn register_observer(&self, events: mpsc::Sender<TransportEvent>) {
        self.lock().observer = Some(events);
    }

    async fn connect(&self, device: &DeviceId) -> Result<(), TransportError> {
        self.record(TransportCall::Connect(device.clone()));
        let (reject, simulate) = {
            let inner = self.lock();
            (inner.reject_connect, inner.simulate)
        };
        if reject {
            return Err(TransportError::Rejected("scripted rejection".into()));
        }
        if simulate {
            self.emit(TransportEvent::Connecting(device.clone())).await;
            self.emit(TransportEvent::Connected(device.clone())).await;
            self.emit(TransportEvent::BatteryLevel {
                device: device.clone(),
                level: 87,
            })
            .await;
        }
        Ok(())
    }

    async fn disconnect(&self, device: &DeviceId) -> Result<(), TransportError> {
        self.record(TransportCall::Disconnect(device.clone()));
        let simulate = self.lock().simulate;
        if simulate {
            self.emit(TransportEvent::Disconnected(device.clone())).await;
        }
        Ok(())
    }

    async fn start_auto_connect(&self, rssi_threshold: i32) -> Result<Feed<()>, TransportError> {
        self.record(TransportCall::AutoConnect(rssi_threshold));
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        let simulate = {
            let mut inner = self.lock();
            inner.auto_connect_feed = Some(tx.clone());
            inner.simulate
        };
        if simulate {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                let _ = tx.send(FeedEvent::Completed).await;
            });
        }
        Ok(Feed {
            token: Uuid::new_v4(),
            events: rx,
        })
    }

    async fn search(&self) -> Result<Feed<DiscoveredDevice>, TransportError> {
        self.record(TransportCall::Search);
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        let simulate = {
            let mut inner = self.lock();
            inner.search_feed = Some(tx.clone());
            inner.simulate
        };
        if simulate {
            tokio::spawn(async move {
                for (name, address) in [("Sense 7A2F11", "A0:11"), ("H10 9C4D02", "A0:12")] {
                    tokio::time::sleep(Duration::from_millis(150)).await;
                    let item = DiscoveredDevice {
                        device_id: DeviceId::new(name),
                        name: name.to_string(),
                        address: address.to_string(),
                        connectable: true,
                    };
                    if tx.send(FeedEvent::Item(item)).await.is_err() {
                        return;
                    }
                }
                let _ = tx.send(FeedEvent::Completed).await;
            });
        }
        Ok(Feed {
            token: Uuid::new_v4(),
            events: rx,
        })
    }

    async fn start_broadcast_listen(&self) -> Result<Feed<HrBroadcast>, TransportError> {
        self.record(TransportCall::BroadcastListen);
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        let simulate = {
            let mut inner = self.lock();
            inner.broadcast_feed = Some(tx.clone());
            inner.simulate
        };
        if simulate {
            tokio::spawn(async move {
                let mut rng = StdRng::from_entropy();
                loop {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    let broadcast = HrBroadcast {
                        device_name: "H10 9C4D02".to_string(),
                        hr: rng.gen_range(55..=95),
                        battery_ok: true,
                    };
                    if tx.send(FeedEvent::Item(broadcast)).await.is_err() {
                        break;
                    }
                }
            });
        }
        Ok(Feed {
            token: Uuid::new_v4(),
            events: rx,
        })
    }

    async fn request_stream_settings(
        &self,
        device: &DeviceId,
        modality: Modality,
    ) -> Result<SettingsOptions, TransportError> {
        self.record(TransportCall::RequestSettings(device.clone(), modality));
        self.lock()
            .settings
            .get(&modality)
            .cloned()
            .ok_or_else(|| TransportError::FeatureUnavailable(modality.to_string()))
    }

    async fn start_streaming(
        &self,
        device: &DeviceId,
        modality: Modality,
        settings: StreamSettings,
    ) -> Result<Feed<SampleBatch>, TransportError> {
        self.record(TransportCall::StartStreaming(
            device.clone(),
            modality,
            settings,
        ));
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        let simulate = {
            let mut inner = self.lock();
            inner.streams.insert(modality, tx.clone());
            inner.simulate
        };
        if simulate {
            spawn_sample_generator(modality, tx);
        }
        Ok(Feed {
            token: Uuid::new_v4(),
            events: rx,
        })
    }

    async fn set_sdk_mode(&self, device: &DeviceId, enabled: bool) -> Result<(), TransportError> {
        self.record(TransportCall::SetSdkMode(device.clone(), enabled));
        self.command_result()
    }

    async fn start_recording(
        &self,
        device: &DeviceId,
        exercise_id: &str,
        _interval: RecordingInterval,
        _sample_type: RecordingSampleType,
    ) -> Result<(), TransportError> {
        self.record(TransportCall::StartRecording(
            device.clone(),
            exercise_id.to_string(),
        ));
        self.command_result()
    }

    async fn stop_recording(&self, device: &DeviceId) -> Result<(), TransportError> {
        self.record(TransportCall::StopRecording(device.clone()));
        self.command_result()
    }

    async fn recording_status(
        &self,
        device: &DeviceId,
    ) -> Result<RecordingStatus, TransportError> {
        self.record(TransportCall::RecordingStatus(device.clone()));
        self.command_result()?;
        Ok(self.lock().recording_status.clone())
    }

    async fn set_local_time(
        &self,
        device: &DeviceId,
        _time: DateTime<FixedOffset>,
    ) -> Result<(), TransportError> {
        self.record(TransportCall::SetLocalTime(device.clone()));
        self.command_result()
    }
}

fn default_settings() -> HashMap<Modality, SettingsOptions> {
    let mut ecg = SettingsOptions::default();
    ecg.offer(SettingKind::SampleRate, 130);
    ecg.offer(SettingKind::Resolution, 14);

    let mut acc = SettingsOptions::default();
    for rate in [25, 50, 100, 200] {
        acc.offer(SettingKind::SampleRate, rate);
    }
    for range in [2, 4, 8] {
        acc.offer(SettingKind::Range, range);
    }
    acc.offer(SettingKind::Resolution, 16);

    let mut ppg = SettingsOptions::default();
    for rate in [55, 135] {
        ppg.offer(SettingKind::SampleRate, rate);
    }
    ppg.offer(SettingKind::Resolution, 22);
    ppg.offer(SettingKind::ChannelCount, 4);

    HashMap::from([(Modality::Ecg, ecg), (Modality::Acc, acc), (Modality::Ppg, ppg)])
}

/// Emits generated batches at a steady cadence until the consumer is gone.
fn spawn_sample_generator(modality: Modality, tx: mpsc::Sender<FeedEvent<SampleBatch>>) {
    tokio::spawn(async move {
        let mut rng = StdRng::from_entropy();
        loop {
            tokio::time::sleep(Duration::from_millis(40)).await;
            let batch = generate_batch(modality, &mut rng);
            if tx.send(FeedEvent::Item(batch)).await.is_err() {
                break;
            }
        }
    });
}

fn generate_batch(modality: Modality, rng: &mut StdRng) -> SampleBatch {
    match modality {
        Modality::Ecg => SampleBatch::Ecg((0..5).map(|_| rng.gen_range(-350..=350)).collect()),
        Modality::Acc => SampleBatch::Acc(
            (0..3)
                .map(|_| AccSample {
                    x: rng.gen_range(-2000..=2000),
                    y: rng.gen_range(-2000..=2000),
                    z: rng.gen_range(-2000..=2000),
                })
                .collect(),
        ),
        Modality::Ppg => SampleBatch::Ppg(
            (0..3)
                .map(|_| PpgSample {
                    channels: [
                        rng.gen_range(10_000..=60_000),
                        rng.gen_range(10_000..=60_000),
                        rng.gen_range(10_000..=60_000),
                    ],
                    ambient: rng.gen_range(0..=5_000),
                })
                .collect(),
        ),
        Modality::Ppi => SampleBatch::Ppi(vec![PpiSample {
            interval_ms: rng.gen_range(600..=1100),
            error_estimate_ms: rng.gen_range(5..=40),
            blocker: false,
            skin_contact: true,
        }]),
        Modality::Hr => {
            let rr_count = rng.gen_range(1..=2);
            SampleBatch::Hr(vec![HrSample {
                hr: rng.gen_range(55..=100),
                contact: true,
                contact_supported: true,
                rr_samples: (0..rr_count).map(|_| rng.gen_range(614..=1126)).collect(),
                rr_ms: (0..rr_count).map(|_| rng.gen_range(600..=1100)).collect(),
            }])
        }
    }
}
