//! Actor-based session state management.
//!
//! This module implements the actor pattern for the device session: the
//! [`SessionActor`] is the single owner of all mutable session state and
//! runs in a dedicated Tokio task. Commands arrive on an mpsc channel,
//! transport notifications and feed events on two more, and one
//! `tokio::select!` loop drains all three, so every state mutation happens
//! sequentially on one logical execution context, with no locks.
//!
//! ## Actor Responsibilities
//!
//! - **Connection state**: applies transport-driven lifecycle events and
//!   gates stream activation on `Connected`.
//! - **Stream lifecycle**: one idempotent on/off toggle per modality; at
//!   most one live subscription per modality; failures contained to the
//!   failing stream.
//! - **Capture routing**: forwards every arriving batch to the
//!   [`CaptureState`] router, gated by the recording/live mode flags.
//! - **Device commands**: fire-only-when-ready command façade (SDK mode,
//!   on-device recording, clock sync).
//! - **Publishing**: after every mutation, a [`SessionSnapshot`] is pushed
//!   through a `watch` channel; consumers read, never write.
//!
//! ## Data Flow
//!
//! ```text
//! Transport feed ──> pump task ──> event channel ──┐
//! Transport observer ──────────────────────────────┼──> SessionActor ──> watch snapshot
//! SessionHandle ──> command channel ───────────────┘
//! ```
//!
//! Cancelling a subscription aborts its pump task. A batch already in the
//! event queue at that moment carries the old subscription token and is
//! discarded on arrival, so late samples cannot corrupt state.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::capture::{BufferCounts, CaptureBuffers, CaptureState, LiveSlots};
use crate::config::Settings;
use crate::core::{
    ConnectionState, DeviceId, DiscoveredDevice, Feed, FeedEvent, HrBroadcast, Modality,
    RecordingInterval, RecordingSampleType, RecordingStatus, SampleBatch, StreamSettings,
};
use crate::error::{AppResult, SessionError};
use crate::messages::SessionCommand;
use crate::transport::{Transport, TransportEvent};

/// Exercise identifier used for on-device recordings started by this app.
const EXERCISE_ID: &str = "BIODAQ_SESSION";

/// Capacity of the command channel.
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Capacity of the feed event and observer channels.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Read-only view of the session, published through a `watch` channel.
///
/// Written only by the actor; consumers must treat it as immutable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSnapshot {
    /// Connection lifecycle state.
    pub connection: ConnectionState,
    /// Whether the transport radio is powered.
    pub transport_powered: bool,
    /// Last reported battery level, percent.
    pub battery_level: Option<u8>,
    /// Whether the device's SDK streaming mode is on.
    pub sdk_mode_enabled: bool,
    /// Recording capture mode flag.
    pub recording: bool,
    /// Live capture mode flag.
    pub live: bool,
    /// Whether a device search scan is running.
    pub search_enabled: bool,
    /// Whether the heart-rate broadcast listener is running.
    pub broadcast_enabled: bool,
    /// Per-modality stream enabled flags.
    pub streams: HashMap<Modality, bool>,
    /// Latest live values.
    pub live_slots: LiveSlots,
    /// Recorded sample counts per buffer.
    pub buffer_counts: BufferCounts,
    /// Batches received per modality since the session started.
    pub batches_received: HashMap<Modality, u64>,
}

impl SessionSnapshot {
    /// Whether `modality`'s stream is currently enabled.
    pub fn stream_enabled(&self, modality: Modality) -> bool {
        self.streams.get(&modality).copied().unwrap_or(false)
    }
}

/// Inbound notifications delivered to the actor's event channel.
#[derive(Debug)]
enum SessionEvent {
    /// Feed event from one modality's sample stream.
    Stream {
        modality: Modality,
        token: Uuid,
        event: FeedEvent<SampleBatch>,
    },
    /// Feed event from the device search scan.
    Discovery {
        token: Uuid,
        event: FeedEvent<DiscoveredDevice>,
    },
    /// Feed event from the broadcast listener.
    Broadcast {
        token: Uuid,
        event: FeedEvent<HrBroadcast>,
    },
    /// Feed event from an auto-connect scan.
    AutoConnect {
        token: Uuid,
        event: FeedEvent<()>,
    },
}

/// A running pump task feeding one subscription into the event channel.
#[derive(Debug)]
struct SubscriptionHandle {
    token: Uuid,
    pump: JoinHandle<()>,
}

impl SubscriptionHandle {
    /// Stops delivery. Idempotent; events still queued under this token
    /// are dropped by the actor on arrival.
    fn cancel(&self) {
        self.pump.abort();
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Per-modality stream state: the enabled flag and the live subscription.
///
/// Invariant: `enabled` is true iff `subscription` is `Some`.
#[derive(Debug, Default)]
struct StreamHandle {
    enabled: bool,
    subscription: Option<SubscriptionHandle>,
}

/// Central actor that owns and manages all session state.
///
/// Spawn with [`SessionActor::spawn`]; interact through the returned
/// [`SessionHandle`]. All state mutations occur sequentially within the
/// actor's event loop.
pub struct SessionActor {
    transport: Arc<dyn Transport>,
    device_id: DeviceId,
    auto_connect_rssi: i32,
    connection: ConnectionState,
    streams: HashMap<Modality, StreamHandle>,
    capture: CaptureState,
    sdk_mode_enabled: bool,
    transport_powered: bool,
    battery_level: Option<u8>,
    search: Option<SubscriptionHandle>,
    broadcast: Option<SubscriptionHandle>,
    auto_connect: Option<SubscriptionHandle>,
    batches_received: HashMap<Modality, u64>,
    events_tx: mpsc::Sender<SessionEvent>,
    published: watch::Sender<SessionSnapshot>,
}

impl SessionActor {
    /// Spawns the session actor for the configured device.
    ///
    /// Registers the observer channel with the transport, starts the actor
    /// task, and returns the command surface plus the task handle.
    pub fn spawn(transport: Arc<dyn Transport>, settings: &Settings) -> (SessionHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (observer_tx, observer_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        transport.register_observer(observer_tx);

        let transport_powered = transport.is_powered();
        let streams = Modality::ALL
            .iter()
            .map(|m| (*m, StreamHandle::default()))
            .collect();

        let initial = SessionSnapshot {
            transport_powered,
            streams: Modality::ALL.iter().map(|m| (*m, false)).collect(),
            ..SessionSnapshot::default()
        };
        let (published, snapshot_rx) = watch::channel(initial);

        let actor = SessionActor {
            transport,
            device_id: settings.device_id(),
            auto_connect_rssi: settings.auto_connect_rssi,
            connection: ConnectionState::Disconnected,
            streams,
            capture: CaptureState::default(),
            sdk_mode_enabled: false,
            transport_powered,
            battery_level: None,
            search: None,
            broadcast: None,
            auto_connect: None,
            batches_received: HashMap::new(),
            events_tx,
            published,
        };

        let task = tokio::spawn(actor.run(command_rx, events_rx, observer_rx));
        let handle = SessionHandle {
            commands: command_tx,
            snapshot: snapshot_rx,
        };
        (handle, task)
    }

    /// Runs the actor event loop until shutdown or until every command
    /// sender is dropped.
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        mut events: mpsc::Receiver<SessionEvent>,
        mut observer: mpsc::Receiver<TransportEvent>,
    ) {
        info!("Session actor started for device {}", self.device_id);
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => {
                        if self.handle_command(command).await {
                            break;
                        }
                    }
                    None => break,
                },
                Some(event) = events.recv() => self.handle_event(event),
                Some(event) = observer.recv() => self.handle_transport_event(event),
            }
        }
        self.release_subscriptions();
        info!("Session actor stopped");
    }

    /// Processes one command. Returns true when the actor should exit.
    async fn handle_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Connect { response } => {
                self.connect().await;
                let _ = response.send(());
            }
            SessionCommand::Disconnect { response } => {
                self.disconnect().await;
                let _ = response.send(());
            }
            SessionCommand::AutoConnect { response } => {
                self.auto_connect().await;
                let _ = response.send(());
            }
            SessionCommand::SetStream {
                modality,
                enabled,
                response,
            } => {
                let result = self.set_stream_enabled(modality, enabled).await;
                let _ = response.send(result);
            }
            SessionCommand::ToggleStream { modality, response } => {
                let target = !self.stream_enabled(modality);
                let result = self.set_stream_enabled(modality, target).await;
                let _ = response.send(result);
            }
            SessionCommand::ToggleSearch { response } => {
                let result = self.toggle_search().await;
                let _ = response.send(result);
            }
            SessionCommand::ToggleBroadcast { response } => {
                let result = self.toggle_broadcast().await;
                let _ = response.send(result);
            }
            SessionCommand::SetRecordingMode { on, response } => {
                self.capture.set_recording(on);
                info!("Recording mode {}", if on { "on" } else { "off" });
                let _ = response.send(());
            }
            SessionCommand::SetLiveMode { on, response } => {
                self.capture.set_live(on);
                info!("Live mode {}", if on { "on" } else { "off" });
                let _ = response.send(());
            }
            SessionCommand::SetSdkMode { enable, response } => {
                self.set_sdk_mode(enable).await;
                let _ = response.send(());
            }
            SessionCommand::StartDeviceRecording { response } => {
                self.start_device_recording().await;
                let _ = response.send(());
            }
            SessionCommand::StopDeviceRecording { response } => {
                self.stop_device_recording().await;
                let _ = response.send(());
            }
            SessionCommand::QueryRecordingStatus { response } => {
                let status = self.query_recording_status().await;
                let _ = response.send(status);
            }
            SessionCommand::SynchronizeClock { response } => {
                self.synchronize_clock().await;
                let _ = response.send(());
            }
            SessionCommand::ExportBuffers { response } => {
                let _ = response.send(self.capture.buffers.clone());
            }
            SessionCommand::Shutdown { response } => {
                let _ = response.send(());
                return true;
            }
        }
        self.publish();
        false
    }

    // =========================================================================
    // Connection lifecycle
    // =========================================================================

    async fn connect(&mut self) {
        if let Err(err) = self.transport.connect(&self.device_id).await {
            error!("Failed to connect to {}: {}", self.device_id, err);
        }
    }

    async fn disconnect(&mut self) {
        // Only meaningful while connected; otherwise guarded, not attempted.
        let Some(device) = self.connection.connected_device().cloned() else {
            debug!("Disconnect ignored: no device connected");
            return;
        };
        if let Err(err) = self.transport.disconnect(&device).await {
            error!("Failed to disconnect from {}: {}", device, err);
        }
    }

    async fn auto_connect(&mut self) {
        if let Some(previous) = self.auto_connect.take() {
            previous.cancel();
        }
        let result = self.transport.start_auto_connect(self.auto_connect_rssi).await;
        match result {
            Ok(feed) => {
                info!(
                    "Auto-connect scan started (threshold {} dBm)",
                    self.auto_connect_rssi
                );
                self.auto_connect =
                    Some(self.spawn_pump(feed, |token, event| SessionEvent::AutoConnect {
                        token,
                        event,
                    }));
            }
            Err(err) => error!("Auto-connect request failed: {}", err),
        }
    }

    fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::PowerOn => {
                info!("Transport powered on");
                self.transport_powered = true;
            }
            TransportEvent::PowerOff => {
                info!("Transport powered off");
                self.transport_powered = false;
            }
            TransportEvent::Connecting(device) => {
                info!("Device {} connecting", device);
                self.connection = ConnectionState::Connecting(device);
            }
            TransportEvent::Connected(device) => {
                info!("Device {} connected", device);
                self.connection = ConnectionState::Connected(device);
            }
            TransportEvent::Disconnected(device) => self.on_disconnected(&device),
            TransportEvent::BatteryLevel { device, level } => {
                info!("Battery level for {}: {}%", device, level);
                self.battery_level = Some(level);
            }
            TransportEvent::DeviceInfo { device, value } => {
                info!("Device info from {}: {}", device, value);
            }
            TransportEvent::FeatureReady { device, feature } => {
                info!("Feature {} ready on {}", feature, device);
            }
            TransportEvent::Log(message) => debug!("Transport: {}", message),
        }
        self.publish();
    }

    fn on_disconnected(&mut self, device: &DeviceId) {
        info!("Device {} disconnected", device);
        self.connection = ConnectionState::Disconnected;
        self.sdk_mode_enabled = false;
        // Stream subscriptions do not survive the connection.
        for modality in Modality::ALL {
            self.disable_stream(modality);
        }
    }

    // =========================================================================
    // Stream lifecycle
    // =========================================================================

    fn stream_enabled(&self, modality: Modality) -> bool {
        self.streams
            .get(&modality)
            .map(|handle| handle.enabled)
            .unwrap_or(false)
    }

    /// Brings one modality's stream to the requested state. Returns the
    /// resulting enabled flag.
    async fn set_stream_enabled(&mut self, modality: Modality, enabled: bool) -> bool {
        match (self.stream_enabled(modality), enabled) {
            (true, true) | (false, false) => self.stream_enabled(modality),
            (true, false) => {
                self.disable_stream(modality);
                info!("{} stream disabled", modality);
                false
            }
            (false, true) => self.start_stream(modality).await,
        }
    }

    async fn start_stream(&mut self, modality: Modality) -> bool {
        let Some(device) = self.connection.connected_device().cloned() else {
            debug!("{} stream request ignored: no device connected", modality);
            return false;
        };

        let settings = if modality.negotiates_settings() {
            let options = self
                .transport
                .request_stream_settings(&device, modality)
                .await;
            match options {
                Ok(options) => options.maximal(),
                Err(err) => {
                    error!("{} settings request failed: {}", modality, err);
                    return false;
                }
            }
        } else {
            StreamSettings::default()
        };

        let result = self
            .transport
            .start_streaming(&device, modality, settings)
            .await;
        match result {
            Ok(feed) => {
                let subscription = self.spawn_pump(feed, move |token, event| {
                    SessionEvent::Stream {
                        modality,
                        token,
                        event,
                    }
                });
                if let Some(handle) = self.streams.get_mut(&modality) {
                    handle.enabled = true;
                    handle.subscription = Some(subscription);
                }
                info!("{} stream enabled", modality);
                true
            }
            Err(err) => {
                error!("Failed to start {} stream: {}", modality, err);
                false
            }
        }
    }

    fn disable_stream(&mut self, modality: Modality) {
        if let Some(handle) = self.streams.get_mut(&modality) {
            if let Some(subscription) = handle.subscription.take() {
                subscription.cancel();
            }
            handle.enabled = false;
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Stream {
                modality,
                token,
                event,
            } => self.handle_stream_event(modality, token, event),
            SessionEvent::Discovery { token, event } => self.handle_discovery_event(token, event),
            SessionEvent::Broadcast { token, event } => self.handle_broadcast_event(token, event),
            SessionEvent::AutoConnect { token, event } => {
                // A replaced scan may still have a terminal event queued.
                if self.auto_connect.as_ref().map(|h| h.token) != Some(token) {
                    return;
                }
                match event {
                    FeedEvent::Item(()) => {}
                    FeedEvent::Failed(reason) => {
                        error!("Auto-connect failed: {}", reason);
                        self.auto_connect = None;
                    }
                    FeedEvent::Completed => {
                        info!("Auto-connect scan complete");
                        self.auto_connect = None;
                    }
                }
            }
        }
        self.publish();
    }

    fn handle_stream_event(&mut self, modality: Modality, token: Uuid, event: FeedEvent<SampleBatch>) {
        // Events from a cancelled or replaced subscription are stale.
        let current = self
            .streams
            .get(&modality)
            .and_then(|handle| handle.subscription.as_ref())
            .map(|subscription| subscription.token);
        if current != Some(token) {
            debug!("Dropping stale {} stream event", modality);
            return;
        }

        match event {
            FeedEvent::Item(batch) => {
                *self.batches_received.entry(modality).or_insert(0) += 1;
                self.capture.route(&batch);
            }
            FeedEvent::Failed(reason) => {
                error!("{} stream failed: {}", modality, reason);
                self.disable_stream(modality);
            }
            FeedEvent::Completed => {
                info!("{} stream completed", modality);
                self.disable_stream(modality);
            }
        }
    }

    // =========================================================================
    // Discovery and broadcast listening
    // =========================================================================

    async fn toggle_search(&mut self) -> bool {
        if let Some(handle) = self.search.take() {
            handle.cancel();
            info!("Device search stopped");
            return false;
        }
        let result = self.transport.search().await;
        match result {
            Ok(feed) => {
                info!("Device search started");
                self.search = Some(self.spawn_pump(feed, |token, event| SessionEvent::Discovery {
                    token,
                    event,
                }));
                true
            }
            Err(err) => {
                error!("Device search failed to start: {}", err);
                false
            }
        }
    }

    fn handle_discovery_event(&mut self, token: Uuid, event: FeedEvent<DiscoveredDevice>) {
        if self.search.as_ref().map(|h| h.token) != Some(token) {
            return;
        }
        match event {
            FeedEvent::Item(device) => info!(
                "Found device {} at {} (connectable: {})",
                device.name, device.address, device.connectable
            ),
            FeedEvent::Failed(reason) => {
                error!("Device search failed: {}", reason);
                self.search = None;
            }
            FeedEvent::Completed => {
                info!("Device search complete");
                self.search = None;
            }
        }
    }

    async fn toggle_broadcast(&mut self) -> bool {
        if let Some(handle) = self.broadcast.take() {
            handle.cancel();
            info!("Broadcast listener stopped");
            return false;
        }
        let result = self.transport.start_broadcast_listen().await;
        match result {
            Ok(feed) => {
                info!("Broadcast listener started");
                self.broadcast =
                    Some(self.spawn_pump(feed, |token, event| SessionEvent::Broadcast {
                        token,
                        event,
                    }));
                true
            }
            Err(err) => {
                error!("Broadcast listener failed to start: {}", err);
                false
            }
        }
    }

    fn handle_broadcast_event(&mut self, token: Uuid, event: FeedEvent<HrBroadcast>) {
        if self.broadcast.as_ref().map(|h| h.token) != Some(token) {
            return;
        }
        match event {
            FeedEvent::Item(broadcast) => info!(
                "HR broadcast from {}: {} bpm (battery ok: {})",
                broadcast.device_name, broadcast.hr, broadcast.battery_ok
            ),
            FeedEvent::Failed(reason) => {
                error!("Broadcast listener failed: {}", reason);
                self.broadcast = None;
            }
            FeedEvent::Completed => {
                info!("Broadcast listener completed");
                self.broadcast = None;
            }
        }
    }

    // =========================================================================
    // Device command façade
    // =========================================================================

    /// Device commands fire only when ready: without a connection they are
    /// skipped without a transport call or a surfaced error.
    fn command_target(&self, what: &str) -> Option<DeviceId> {
        let device = self.connection.connected_device().cloned();
        if device.is_none() {
            debug!("{} skipped: no device connected", what);
        }
        device
    }

    async fn set_sdk_mode(&mut self, enable: bool) {
        let Some(device) = self.command_target("SDK mode change") else {
            return;
        };
        let result = self.transport.set_sdk_mode(&device, enable).await;
        match result {
            Ok(()) => {
                info!("SDK mode {}", if enable { "enabled" } else { "disabled" });
                self.sdk_mode_enabled = enable;
            }
            Err(err) => error!("SDK mode change failed: {}", err),
        }
    }

    async fn start_device_recording(&mut self) {
        let Some(device) = self.command_target("Recording start") else {
            return;
        };
        match self
            .transport
            .start_recording(
                &device,
                EXERCISE_ID,
                RecordingInterval::OneSecond,
                RecordingSampleType::RrInterval,
            )
            .await
        {
            Ok(()) => info!("On-device recording started"),
            Err(err) => error!("Recording start failed: {}", err),
        }
    }

    async fn stop_device_recording(&mut self) {
        let Some(device) = self.command_target("Recording stop") else {
            return;
        };
        match self.transport.stop_recording(&device).await {
            Ok(()) => info!("On-device recording stopped"),
            Err(err) => error!("Recording stop failed: {}", err),
        }
    }

    async fn query_recording_status(&mut self) -> Option<RecordingStatus> {
        let device = self.command_target("Recording status query")?;
        match self.transport.recording_status(&device).await {
            Ok(status) => {
                info!(
                    "Recording ongoing: {} entry: {}",
                    status.ongoing, status.entry_id
                );
                Some(status)
            }
            Err(err) => {
                error!("Recording status request failed: {}", err);
                None
            }
        }
    }

    async fn synchronize_clock(&mut self) {
        let Some(device) = self.command_target("Clock synchronization") else {
            return;
        };
        let now = chrono::Local::now().fixed_offset();
        match self.transport.set_local_time(&device, now).await {
            Ok(()) => info!("Device clock synchronized"),
            Err(err) => error!("Clock synchronization failed: {}", err),
        }
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Spawns a pump task forwarding feed events into the event channel,
    /// tagged by the feed's token. The pump ends itself after a terminal
    /// event; cancellation aborts it.
    fn spawn_pump<T, F>(&self, feed: Feed<T>, wrap: F) -> SubscriptionHandle
    where
        T: Send + 'static,
        F: Fn(Uuid, FeedEvent<T>) -> SessionEvent + Send + 'static,
    {
        let token = feed.token;
        let mut events = feed.events;
        let events_tx = self.events_tx.clone();
        let pump = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let terminal = !matches!(event, FeedEvent::Item(_));
                if events_tx.send(wrap(token, event)).await.is_err() {
                    break;
                }
                if terminal {
                    break;
                }
            }
        });
        SubscriptionHandle { token, pump }
    }

    fn release_subscriptions(&mut self) {
        for modality in Modality::ALL {
            self.disable_stream(modality);
        }
        for handle in [
            self.search.take(),
            self.broadcast.take(),
            self.auto_connect.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.cancel();
        }
    }

    fn publish(&self) {
        let snapshot = SessionSnapshot {
            connection: self.connection.clone(),
            transport_powered: self.transport_powered,
            battery_level: self.battery_level,
            sdk_mode_enabled: self.sdk_mode_enabled,
            recording: self.capture.recording,
            live: self.capture.live,
            search_enabled: self.search.is_some(),
            broadcast_enabled: self.broadcast.is_some(),
            streams: Modality::ALL
                .iter()
                .map(|m| (*m, self.stream_enabled(*m)))
                .collect(),
            live_slots: self.capture.slots,
            buffer_counts: self.capture.buffers.counts(),
            batches_received: self.batches_received.clone(),
        };
        self.published.send_replace(snapshot);
    }
}

/// The command surface of a running session.
///
/// Methods enqueue work for the actor and await its acknowledgement; none
/// of them surfaces a session-internal failure (those appear in the log and
/// the snapshot). Cloneable; all clones talk to the same actor.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Current published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// A watch receiver for reacting to snapshot changes.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    /// Requests a connection to the configured device.
    pub async fn connect(&self) -> AppResult<()> {
        self.send(SessionCommand::connect()).await
    }

    /// Requests disconnection; a no-op unless connected.
    pub async fn disconnect(&self) -> AppResult<()> {
        self.send(SessionCommand::disconnect()).await
    }

    /// Starts an auto-connect scan, replacing any scan in progress.
    pub async fn auto_connect(&self) -> AppResult<()> {
        self.send(SessionCommand::auto_connect()).await
    }

    /// Enables one modality's stream. Idempotent. Returns the resulting
    /// enabled state.
    pub async fn start_stream(&self, modality: Modality) -> AppResult<bool> {
        self.send(SessionCommand::set_stream(modality, true)).await
    }

    /// Disables one modality's stream. Idempotent. Returns the resulting
    /// enabled state.
    pub async fn stop_stream(&self, modality: Modality) -> AppResult<bool> {
        self.send(SessionCommand::set_stream(modality, false)).await
    }

    /// Flips one modality's stream and returns the resulting state.
    pub async fn toggle_stream(&self, modality: Modality) -> AppResult<bool> {
        self.send(SessionCommand::toggle_stream(modality)).await
    }

    /// Flips the device search scan and returns the resulting state.
    pub async fn toggle_search(&self) -> AppResult<bool> {
        self.send(SessionCommand::toggle_search()).await
    }

    /// Flips the broadcast listener and returns the resulting state.
    pub async fn toggle_broadcast(&self) -> AppResult<bool> {
        self.send(SessionCommand::toggle_broadcast()).await
    }

    /// Switches recording capture mode.
    pub async fn set_recording_mode(&self, on: bool) -> AppResult<()> {
        self.send(SessionCommand::set_recording_mode(on)).await
    }

    /// Switches live capture mode.
    pub async fn set_live_mode(&self, on: bool) -> AppResult<()> {
        self.send(SessionCommand::set_live_mode(on)).await
    }

    /// Switches the device's SDK streaming mode.
    pub async fn set_sdk_mode(&self, enable: bool) -> AppResult<()> {
        self.send(SessionCommand::set_sdk_mode(enable)).await
    }

    /// Starts on-device recording.
    pub async fn start_device_recording(&self) -> AppResult<()> {
        self.send(SessionCommand::start_device_recording()).await
    }

    /// Stops on-device recording.
    pub async fn stop_device_recording(&self) -> AppResult<()> {
        self.send(SessionCommand::stop_device_recording()).await
    }

    /// Queries on-device recording status.
    pub async fn recording_status(&self) -> AppResult<Option<RecordingStatus>> {
        self.send(SessionCommand::query_recording_status()).await
    }

    /// Sets the device clock to the host's current local time.
    pub async fn synchronize_clock(&self) -> AppResult<()> {
        self.send(SessionCommand::synchronize_clock()).await
    }

    /// Returns a copy of the capture buffers for export.
    pub async fn export_buffers(&self) -> AppResult<CaptureBuffers> {
        self.send(SessionCommand::export_buffers()).await
    }

    /// Stops the actor after releasing every subscription.
    pub async fn shutdown(&self) -> AppResult<()> {
        self.send(SessionCommand::shutdown()).await
    }

    async fn send<R>(&self, command: (SessionCommand, oneshot::Receiver<R>)) -> AppResult<R> {
        let (command, response) = command;
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::ActorStopped)?;
        response.await.map_err(|_| SessionError::ActorStopped)
    }
}
