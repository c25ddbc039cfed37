//! Message router
//!
//! Parses post-handshake input lines into commands and fans them out:
//! broadcast delivery to every registered session, targeted delivery to a
//! named subset, and the active-list notification pushed on membership
//! change. Each recipient is handled independently; one dead peer never
//! aborts delivery to the rest.

use tokio::io::{AsyncBufRead, Lines};
use tracing::{debug, trace};

use crate::error::AppError;
use crate::protocol::{ClientCommand, ServerMessage};
use crate::registry::SessionRegistry;
use crate::session::Outbound;

/// Run the post-handshake read loop for one session.
///
/// Reads one line at a time and dispatches it until end-of-stream or a
/// read error; either way control returns to the lifecycle driver for
/// teardown.
pub async fn run<R>(lines: &mut Lines<R>, registry: &SessionRegistry) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
{
    while let Some(line) = lines.next_line().await? {
        dispatch(registry, &line);
    }
    Ok(())
}

/// Parse one input line and route it.
///
/// Unrecognized lines are dropped without a response.
pub fn dispatch(registry: &SessionRegistry, line: &str) {
    match ClientCommand::parse(line) {
        ClientCommand::Broadcast { sender, body } => {
            broadcast_message(registry, &sender, &body);
        }
        ClientCommand::Targeted {
            recipients,
            sender,
            body,
        } => {
            send_targeted(registry, &recipients, &sender, &body);
        }
        ClientCommand::Unrecognized => {
            trace!("Ignoring unrecognized line: {:?}", line);
        }
    }
}

/// Deliver a chat message to every registered session, sender included.
pub fn broadcast_message(registry: &SessionRegistry, sender: &str, body: &str) {
    registry.for_each_session(|name, outbound| {
        deliver(name, outbound, ServerMessage::chat(sender, body));
    });
}

/// Deliver a chat message to the named recipients only.
///
/// Names with no registered session are silently skipped.
pub fn send_targeted(registry: &SessionRegistry, recipients: &[String], sender: &str, body: &str) {
    registry.for_each_session(|name, outbound| {
        if recipients.iter().any(|recipient| recipient == name) {
            deliver(name, outbound, ServerMessage::chat(sender, body));
        }
    });
}

/// Push the current active-name list to every registered session.
///
/// The list is rebuilt from a fresh registry snapshot on every call.
pub fn broadcast_active_list(registry: &SessionRegistry) {
    let names = registry.snapshot_names();
    registry.for_each_session(|name, outbound| {
        deliver(name, outbound, ServerMessage::ActiveList(names.clone()));
    });
}

fn deliver(name: &str, outbound: &Outbound, msg: ServerMessage) {
    if outbound.send(msg).is_err() {
        debug!("Dropping message for '{}': session queue closed", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Outbound, Session};
    use crate::types::SessionId;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::sync::mpsc;

    fn register(registry: &SessionRegistry, name: &str) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session::new(SessionId::new(), Outbound::new(tx));
        registry.try_register(name, &session).unwrap();
        rx
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut msgs = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            msgs.push(msg);
        }
        msgs
    }

    #[tokio::test]
    async fn test_broadcast_reaches_everyone_including_sender() {
        let registry = SessionRegistry::new();
        let mut rx_a = register(&registry, "alice");
        let mut rx_b = register(&registry, "bob");

        dispatch(&registry, "BroadCastMessage alice MESSAGE hi");

        assert_eq!(drain(&mut rx_a), vec![ServerMessage::chat("alice", "hi")]);
        assert_eq!(drain(&mut rx_b), vec![ServerMessage::chat("alice", "hi")]);
    }

    #[tokio::test]
    async fn test_targeted_reaches_only_listed_sessions() {
        let registry = SessionRegistry::new();
        let mut rx_a = register(&registry, "alice");
        let mut rx_b = register(&registry, "bob");
        let mut rx_c = register(&registry, "carol");

        dispatch(&registry, "ACTIVELISTSbob SENDERNAME alice MESSAGE hey");

        assert!(drain(&mut rx_a).is_empty());
        assert_eq!(drain(&mut rx_b), vec![ServerMessage::chat("alice", "hey")]);
        assert!(drain(&mut rx_c).is_empty());
    }

    #[tokio::test]
    async fn test_targeted_skips_unregistered_names() {
        let registry = SessionRegistry::new();
        let mut rx_b = register(&registry, "bob");

        dispatch(&registry, "ACTIVELISTSbob, ghost SENDERNAME alice MESSAGE hey");

        assert_eq!(drain(&mut rx_b), vec![ServerMessage::chat("alice", "hey")]);
    }

    #[tokio::test]
    async fn test_unrecognized_line_is_a_no_op() {
        let registry = SessionRegistry::new();
        let mut rx_a = register(&registry, "alice");

        dispatch(&registry, "definitely not a command");

        assert!(drain(&mut rx_a).is_empty());
    }

    #[tokio::test]
    async fn test_dead_recipient_does_not_abort_delivery() {
        let registry = SessionRegistry::new();
        let rx_a = register(&registry, "alice");
        let mut rx_b = register(&registry, "bob");
        drop(rx_a);

        broadcast_message(&registry, "bob", "still here?");

        assert_eq!(drain(&mut rx_b), vec![ServerMessage::chat("bob", "still here?")]);
    }

    #[tokio::test]
    async fn test_active_list_rebuilt_from_snapshot() {
        let registry = SessionRegistry::new();
        let mut rx_a = register(&registry, "alice");
        let mut rx_b = register(&registry, "bob");

        broadcast_active_list(&registry);

        let expected = ServerMessage::ActiveList(vec!["alice".to_string(), "bob".to_string()]);
        assert_eq!(drain(&mut rx_a), vec![expected.clone()]);
        assert_eq!(drain(&mut rx_b), vec![expected]);
    }

    #[tokio::test]
    async fn test_run_dispatches_until_eof() {
        let registry = SessionRegistry::new();
        let mut rx_a = register(&registry, "alice");

        let input = b"BroadCastMessage alice MESSAGE one\nnoise\nBroadCastMessage alice MESSAGE two\n";
        let mut lines = BufReader::new(&input[..]).lines();

        run(&mut lines, &registry).await.unwrap();

        assert_eq!(
            drain(&mut rx_a),
            vec![
                ServerMessage::chat("alice", "one"),
                ServerMessage::chat("alice", "two"),
            ]
        );
    }
}
