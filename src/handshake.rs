//! Name-negotiation handshake
//!
//! Every new connection runs this exchange before it may relay messages:
//! the server prompts with `SUBMITNAME`, reads one candidate line, and
//! keeps re-prompting while the candidate is already registered. On
//! success it acknowledges with `NAMEACCEPTED` and pushes the updated
//! active list to every registered session, the newcomer included.
//!
//! Candidates are taken verbatim from the line, with no trimming or
//! validation; the empty string is a name like any other.

use tokio::io::{AsyncBufRead, Lines};

use tracing::{debug, info};

use crate::error::{AppError, RegisterError};
use crate::protocol::ServerMessage;
use crate::registry::SessionRegistry;
use crate::router;
use crate::session::Session;

/// Negotiate a unique name for `session`.
///
/// Returns `Ok(true)` once the session is registered and announced, or
/// `Ok(false)` if the stream ended (or the session's writer vanished)
/// before a name was accepted; nothing is registered in that case. There
/// is no bound on retries.
pub async fn negotiate<R>(
    lines: &mut Lines<R>,
    session: &mut Session,
    registry: &SessionRegistry,
) -> Result<bool, AppError>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        if session.send(ServerMessage::SubmitName).is_err() {
            // Writer is gone; the peer can never see the prompt.
            return Ok(false);
        }

        let Some(candidate) = lines.next_line().await? else {
            return Ok(false);
        };

        match registry.try_register(&candidate, session) {
            Ok(()) => {
                session.set_name(candidate);
                info!(
                    "Session {} registered as '{}'",
                    session.id,
                    session.display_name()
                );

                // Even if the newcomer's queue just closed, the remaining
                // members still get the updated list; teardown handles the
                // registry entry.
                let _ = session.send(ServerMessage::NameAccepted);
                router::broadcast_active_list(registry);
                return Ok(true);
            }
            Err(RegisterError::NameTaken(name)) => {
                debug!("Name '{}' taken, re-prompting session {}", name, session.id);
            }
        }
    }
}
