//! Line-Oriented TCP Chat Relay Library
//!
//! A chat relay server: clients connect over TCP, register a unique display
//! name through a `SUBMITNAME`/`NAMEACCEPTED` handshake, then exchange
//! messages relayed to every registered session or to a named subset.
//!
//! # Features
//! - Name handshake with unlimited retries on taken names
//! - Broadcast delivery to all registered sessions
//! - Targeted delivery to an explicit recipient list
//! - Active-member-list push on every membership change
//! - Per-recipient delivery-failure isolation
//! - Disconnection handling with guaranteed registry cleanup
//!
//! # Architecture
//! One tokio task per connection plus a per-connection writer task:
//! - `SessionRegistry` is the single shared table of named sessions,
//!   guarded by one mutex; registration and uniqueness checks are atomic
//! - Delivery enqueues onto each session's unbounded outbound queue and
//!   never blocks; the writer task drains the queue onto the socket
//! - The lifecycle driver runs handshake, then router, then teardown
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use chat_relay::{handle_connection, SessionRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:9001").await.unwrap();
//!     let registry = Arc::new(SessionRegistry::new());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let registry = Arc::clone(&registry);
//!         tokio::spawn(handle_connection(stream, registry));
//!     }
//! }
//! ```

pub mod error;
pub mod handler;
pub mod handshake;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use error::{AppError, RegisterError, SendError};
pub use handler::handle_connection;
pub use protocol::{ClientCommand, ServerMessage};
pub use registry::SessionRegistry;
pub use session::{Outbound, Session};
pub use types::SessionId;
