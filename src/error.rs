//! ## Errors
//!
//! The errors used throughout the crate.
//!
//! Hardware-boundary failures carry the provider status code and its
//! human-readable description; decoder failures carry neither.
//!

use crate::provider::Status;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open session to {resource}: status {status} ({description})")]
    ConnectFailure {
        resource: String,
        status: Status,
        description: String,
    },
    #[error("failed to close session: status {status} ({description})")]
    DisconnectFailure { status: Status, description: String },
    #[error("failed to write command {command:?}: status {status} ({description})")]
    WriteFailure {
        command: String,
        status: Status,
        description: String,
    },
    #[error("failed to read response: status {status} ({description})")]
    ReadFailure {
        status: Status,
        description: String,
        /// Whatever the provider handed back before failing. Diagnostic
        /// only, not to be trusted as instrument output.
        partial: String,
    },
    #[error("device clear failed: status {status} ({description})")]
    ClearFailure { status: Status, description: String },
    #[error("session is not connected")]
    NotConnected,
    #[error("no scientific notation found in reply {reply:?}")]
    MalformedReply { reply: String },
    #[error("failed to parse number in reply {reply:?}")]
    NumericParseError { reply: String },
    #[error("no command template at {path:?}")]
    TemplateNotFound { path: String },
}
