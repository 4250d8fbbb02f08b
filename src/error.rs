//! Custom error types for the application.
//!
//! This module defines the primary error type, `SessionError`, for the
//! crate. Using the `thiserror` crate, it provides a centralized and
//! consistent way to handle the different kinds of errors that can occur,
//! from configuration issues to a lost session actor.
//!
//! Note that per-stream and per-command failures inside the session are
//! deliberately *not* represented here: those never propagate to a caller.
//! They surface through the log and through cleared flags in the published
//! snapshot (see [`crate::session`]). `SessionError` covers only the
//! command-surface plumbing: a command that cannot be delivered because the
//! actor is gone, or configuration that cannot be loaded.

use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, SessionError>;

/// Errors surfaced by the crate's public API.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration parsed but contained an invalid value.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// File or network I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session actor has stopped and can no longer accept commands.
    #[error("Session actor is not running")]
    ActorStopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_message_includes_detail() {
        let err = SessionError::Configuration("rssi threshold out of range".into());
        let message = format!("{}", err);
        assert!(message.contains("Configuration validation error"));
        assert!(message.contains("rssi threshold out of range"));
    }

    #[test]
    fn actor_stopped_message() {
        let err = SessionError::ActorStopped;
        assert_eq!(format!("{}", err), "Session actor is not running");
    }
}
