//! Error types for the chat relay
//!
//! Defines connection-level errors, registration rejections, and message
//! send errors. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Connection-level errors
///
/// Fatal for the session they occur on; never propagated to other sessions.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error on the transport (read or write half faulted)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Registration rejection
///
/// Recoverable: the handshake re-prompts and the client may retry with a
/// different candidate name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    /// Another live session already holds the candidate name
    #[error("name '{0}' is already taken")]
    NameTaken(String),
}

/// Message send errors
///
/// Occurs when attempting to deliver to a session whose outbound queue has
/// closed (the peer is gone). Handled per recipient, never fatal.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
