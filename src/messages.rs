//! Message types for the session actor's command channel.
//!
//! Commands are sent to the [`SessionActor`](crate::session::SessionActor)
//! via an mpsc channel; each variant embeds a `oneshot::Sender` over which
//! the actor acknowledges processing. Failures inside the session never
//! travel back through these acknowledgements; they surface in the log and
//! in the published snapshot. Responses therefore carry resulting state (for
//! toggles) or plain `()`.
//!
//! # Message Flow
//!
//! ```text
//! Caller                             Actor Task
//! ------                             ----------
//! 1. Create command with oneshot
//! 2. Send via mpsc channel    ------>
//!                                    3. Receive command
//!                                    4. Process (mutate state)
//!                                    5. Send acknowledgement
//! 6. Await oneshot receiver   <------
//! ```
//!
//! Each variant has a helper constructor returning the command together
//! with the matching receiver, so a caller always holds a receiver to
//! await:
//!
//! ```rust
//! use biodaq::core::Modality;
//! use biodaq::messages::SessionCommand;
//!
//! let (cmd, rx) = SessionCommand::set_stream(Modality::Ecg, true);
//! // cmd_tx.send(cmd).await?;
//! // let enabled = rx.await?;
//! ```

use tokio::sync::oneshot;

use crate::capture::CaptureBuffers;
use crate::core::{Modality, RecordingStatus};

/// Commands accepted by the session actor.
#[derive(Debug)]
pub enum SessionCommand {
    /// Issues a connect request for the configured device. Connection
    /// progress arrives later as transport events.
    Connect {
        /// Acknowledged once the request has been issued (or rejected).
        response: oneshot::Sender<()>,
    },

    /// Issues a disconnect request. Guarded: a no-op unless connected.
    Disconnect {
        /// Acknowledged once the request has been issued or skipped.
        response: oneshot::Sender<()>,
    },

    /// Starts an auto-connect scan at the configured RSSI threshold,
    /// replacing any scan already in progress.
    AutoConnect {
        /// Acknowledged once the scan request has been issued.
        response: oneshot::Sender<()>,
    },

    /// Sets one modality's stream on or off. Idempotent: enabling an
    /// enabled stream or disabling a disabled one changes nothing.
    SetStream {
        /// Target modality.
        modality: Modality,
        /// Desired state.
        enabled: bool,
        /// Resulting enabled state of the stream.
        response: oneshot::Sender<bool>,
    },

    /// Flips one modality's stream.
    ToggleStream {
        /// Target modality.
        modality: Modality,
        /// Resulting enabled state of the stream.
        response: oneshot::Sender<bool>,
    },

    /// Flips the device search scan.
    ToggleSearch {
        /// Resulting scan state.
        response: oneshot::Sender<bool>,
    },

    /// Flips the heart-rate broadcast listener.
    ToggleBroadcast {
        /// Resulting listener state.
        response: oneshot::Sender<bool>,
    },

    /// Switches recording capture mode.
    SetRecordingMode {
        /// Desired state.
        on: bool,
        /// Acknowledged once applied.
        response: oneshot::Sender<()>,
    },

    /// Switches live capture mode.
    SetLiveMode {
        /// Desired state.
        on: bool,
        /// Acknowledged once applied.
        response: oneshot::Sender<()>,
    },

    /// Switches the device's SDK streaming mode. Fire-only-when-ready: a
    /// silent no-op unless connected.
    SetSdkMode {
        /// Desired state.
        enable: bool,
        /// Acknowledged once the command completed or was skipped.
        response: oneshot::Sender<()>,
    },

    /// Starts on-device recording. Silent no-op unless connected.
    StartDeviceRecording {
        /// Acknowledged once the command completed or was skipped.
        response: oneshot::Sender<()>,
    },

    /// Stops on-device recording. Silent no-op unless connected.
    StopDeviceRecording {
        /// Acknowledged once the command completed or was skipped.
        response: oneshot::Sender<()>,
    },

    /// Queries on-device recording status. Mutates no local state.
    QueryRecordingStatus {
        /// The reported status, or `None` when skipped or failed.
        response: oneshot::Sender<Option<RecordingStatus>>,
    },

    /// Sets the device clock to the host's current local time and zone.
    /// Silent no-op unless connected.
    SynchronizeClock {
        /// Acknowledged once the command completed or was skipped.
        response: oneshot::Sender<()>,
    },

    /// Returns a copy of the capture buffers for export.
    ExportBuffers {
        /// Buffer contents at the time of processing.
        response: oneshot::Sender<CaptureBuffers>,
    },

    /// Stops the actor after cancelling every open subscription.
    Shutdown {
        /// Acknowledged just before the actor exits.
        response: oneshot::Sender<()>,
    },
}

impl SessionCommand {
    /// Helper to create a Connect command.
    pub fn connect() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self::Connect { response: tx }, rx)
    }

    /// Helper to create a Disconnect command.
    pub fn disconnect() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self::Disconnect { response: tx }, rx)
    }

    /// Helper to create an AutoConnect command.
    pub fn auto_connect() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self::AutoConnect { response: tx }, rx)
    }

    /// Helper to create a SetStream command.
    pub fn set_stream(modality: Modality, enabled: bool) -> (Self, oneshot::Receiver<bool>) {
        let (tx, rx) = oneshot::channel();
        (
            Self::SetStream {
                modality,
                enabled,
                response: tx,
            },
            rx,
        )
    }

    /// Helper to create a ToggleStream command.
    pub fn toggle_stream(modality: Modality) -> (Self, oneshot::Receiver<bool>) {
        let (tx, rx) = oneshot::channel();
        (
            Self::ToggleStream {
                modality,
                response: tx,
            },
            rx,
        )
    }

    /// Helper to create a ToggleSearch command.
    pub fn toggle_search() -> (Self, oneshot::Receiver<bool>) {
        let (tx, rx) = oneshot::channel();
        (Self::ToggleSearch { response: tx }, rx)
    }

    /// Helper to create a ToggleBroadcast command.
    pub fn toggle_broadcast() -> (Self, oneshot::Receiver<bool>) {
        let (tx, rx) = oneshot::channel();
        (Self::ToggleBroadcast { response: tx }, rx)
    }

    /// Helper to create a SetRecordingMode command.
    pub fn set_recording_mode(on: bool) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self::SetRecordingMode { on, response: tx }, rx)
    }

    /// Helper to create a SetLiveMode command.
    pub fn set_live_mode(on: bool) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self::SetLiveMode { on, response: tx }, rx)
    }

    /// Helper to create a SetSdkMode command.
    pub fn set_sdk_mode(enable: bool) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self::SetSdkMode { enable, response: tx }, rx)
    }

    /// Helper to create a StartDeviceRecording command.
    pub fn start_device_recording() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self::StartDeviceRecording { response: tx }, rx)
    }

    /// Helper to create a StopDeviceRecording command.
    pub fn stop_device_recording() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self::StopDeviceRecording { response: tx }, rx)
    }

    /// Helper to create a QueryRecordingStatus command.
    pub fn query_recording_status() -> (Self, oneshot::Receiver<Option<RecordingStatus>>) {
        let (tx, rx) = oneshot::channel();
        (Self::QueryRecordingStatus { response: tx }, rx)
    }

    /// Helper to create a SynchronizeClock command.
    pub fn synchronize_clock() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self::SynchronizeClock { response: tx }, rx)
    }

    /// Helper to create an ExportBuffers command.
    pub fn export_buffers() -> (Self, oneshot::Receiver<CaptureBuffers>) {
        let (tx, rx) = oneshot::channel();
        (Self::ExportBuffers { response: tx }, rx)
    }

    /// Helper to create a Shutdown command.
    pub fn shutdown() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self::Shutdown { response: tx }, rx)
    }
}
