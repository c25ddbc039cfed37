//! Connection lifecycle driver
//!
//! Owns one accepted TCP connection end to end: splits the stream, spawns
//! the writer task, drives the handshake and then the message router, and
//! always releases the session's registry state on the way out — whatever
//! the exit path (clean EOF, read error, handshake abort).

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Lines};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::AppError;
use crate::handshake;
use crate::protocol::ServerMessage;
use crate::registry::SessionRegistry;
use crate::router;
use crate::session::{Outbound, Session};
use crate::types::SessionId;

/// Handle a new TCP connection
///
/// Runs the session from accept to teardown. The remaining members receive
/// a fresh active list once the session's registry state is released.
pub async fn handle_connection(
    stream: TcpStream,
    registry: Arc<SessionRegistry>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let (read_half, write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let session_id = SessionId::new();
    info!("Session {} connected from {}", session_id, peer_addr);

    // Server → client queue; the writer task is the only owner of the
    // socket's write half.
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let mut session = Session::new(session_id, Outbound::new(msg_tx));

    let write_task = tokio::spawn(async move {
        let mut writer = BufWriter::new(write_half);
        while let Some(msg) = msg_rx.recv().await {
            let line = format!("{msg}\n");
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
        let _ = writer.shutdown().await;
        debug!("Writer task ended for session {}", session_id);
    });

    let outcome = drive(&mut lines, &mut session, &registry).await;

    // Teardown, exactly once per session: release the name, close the
    // outbound queue, then tell everyone who is left.
    registry.unregister(session_id);
    drop(session);
    router::broadcast_active_list(&registry);
    let _ = write_task.await;

    info!("Session {} disconnected", session_id);
    outcome
}

/// Handshake then router loop; separated so teardown wraps every exit.
async fn drive<R>(
    lines: &mut Lines<R>,
    session: &mut Session,
    registry: &SessionRegistry,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
{
    if !handshake::negotiate(lines, session, registry).await? {
        return Ok(());
    }
    router::run(lines, registry).await
}
