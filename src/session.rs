//! Session struct definition
//!
//! Represents one connected client: its identity, chosen name, and the
//! outbound handle used to queue lines for its writer task.

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::protocol::ServerMessage;
use crate::types::SessionId;

/// Write sink bound to one connection
///
/// A clonable handle over the session's unbounded outbound queue. Sending
/// never blocks; the per-connection writer task drains the queue onto the
/// socket. Registry iteration may send through these handles without
/// awaiting, so delivery never stalls another worker.
#[derive(Debug, Clone)]
pub struct Outbound {
    sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Outbound {
    /// Wrap the sending end of a session's outbound queue
    pub fn new(sender: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self { sender }
    }

    /// Queue a message for this session
    ///
    /// Returns an error if the writer task is gone (client disconnected).
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.send(msg).map_err(|_| SendError::ChannelClosed)
    }
}

/// Connected session information
///
/// Holds the per-connection state the lifecycle driver and the registry
/// care about: the stable ID, the display name once the handshake assigns
/// one, and the outbound handle.
#[derive(Debug)]
pub struct Session {
    /// Unique identifier for this session
    pub id: SessionId,
    /// Display name (None until the handshake completes)
    pub name: Option<String>,
    /// Server → client line queue
    outbound: Outbound,
}

impl Session {
    /// Create a new unnamed session with the given ID and outbound handle
    pub fn new(id: SessionId, outbound: Outbound) -> Self {
        Self {
            id,
            name: None,
            outbound,
        }
    }

    /// Queue a message for this session
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.outbound.send(msg)
    }

    /// Borrow the outbound handle (cloned by the registry on registration)
    pub fn outbound(&self) -> &Outbound {
        &self.outbound
    }

    /// Get the display name, or a placeholder before the handshake
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Check if this session has completed the handshake
    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    /// Record the accepted display name
    pub fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }
}
