//! # biodaq
//!
//! This crate manages a single wireless biosensing device session: it
//! establishes and tears down the connection, independently starts, stops
//! and consumes multiple concurrent sensor streams (ECG, accelerometer,
//! PPG, pulse-interval, heart-rate), routes arriving samples into durable
//! capture buffers or live most-recent-value slots, and drives the
//! device-mode command set (on-device recording, clock sync, SDK streaming
//! mode).
//!
//! ## Crate Structure
//!
//! - **`core`**: Fundamental domain types: device identity, connection
//!   state, modalities, stream settings negotiation, sample batches and
//!   feed events.
//! - **`transport`**: The consumed vendor-transport boundary: the
//!   `Transport` trait, observer events, and the scriptable mock used by
//!   tests and the demo CLI.
//! - **`capture`**: The sample router: capture buffers, live slots and the
//!   two independent capture-mode flags that gate them.
//! - **`messages`**: The `SessionCommand` protocol for talking to the
//!   session actor.
//! - **`session`**: The session actor itself, single owner of all mutable
//!   state, plus the `SessionHandle` command surface and the published
//!   `SessionSnapshot`.
//! - **`config`**: Settings loading and validation.
//! - **`error`**: The `SessionError` type for command-surface failures.
//!
//! ## Concurrency Model
//!
//! All state mutation is serialized through one actor task; streams,
//! transport notifications and commands are channels into it, and published
//! state is a `watch` channel out of it. See [`session`] for details.

pub mod capture;
pub mod config;
pub mod core;
pub mod error;
pub mod messages;
pub mod session;
pub mod transport;
