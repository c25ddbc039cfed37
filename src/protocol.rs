//! Wire protocol definitions
//!
//! Line-oriented text protocol: one command or notification per line.
//! Client lines use the legacy fixed prefixes (`BroadCastMessage`,
//! `ACTIVELISTS`) with literal `SENDERNAME` / `MESSAGE` delimiters; the
//! parser turns them into a tagged enum so the rest of the server never
//! touches raw offsets.

/// Prefix of a targeted-delivery request line
pub const TARGETED_PREFIX: &str = "ACTIVELISTS";

/// Prefix of a broadcast request line
pub const BROADCAST_PREFIX: &str = "BroadCastMessage";

/// Literal delimiter preceding the sender field in targeted requests
pub const SENDER_MARKER: &str = "SENDERNAME";

/// Literal delimiter preceding the message body
pub const MESSAGE_MARKER: &str = "MESSAGE";

/// Client → Server command
///
/// One parsed input line. Anything that does not match a recognized prefix
/// with its expected delimiters is `Unrecognized` and dropped by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Relay a message to every registered session
    Broadcast { sender: String, body: String },
    /// Relay a message to an explicitly named subset of sessions
    Targeted {
        recipients: Vec<String>,
        sender: String,
        body: String,
    },
    /// No recognized command; ignored without a response
    Unrecognized,
}

impl ClientCommand {
    /// Parse one input line into a command.
    ///
    /// Field boundaries follow the legacy layout: the recipient list sits
    /// between the `ACTIVELISTS` prefix and the `SENDERNAME` marker, the
    /// sender between `SENDERNAME` and `MESSAGE`, and the body after
    /// `MESSAGE`. Recipient and sender fields are trimmed; the body keeps
    /// its content verbatim apart from the single delimiting space after
    /// the marker. Missing delimiters make the line `Unrecognized`.
    pub fn parse(line: &str) -> Self {
        if let Some(rest) = line.strip_prefix(TARGETED_PREFIX) {
            return Self::parse_targeted(rest);
        }
        if let Some(rest) = line.strip_prefix(BROADCAST_PREFIX) {
            return Self::parse_broadcast(rest);
        }
        ClientCommand::Unrecognized
    }

    fn parse_targeted(rest: &str) -> Self {
        let Some(sender_at) = rest.find(SENDER_MARKER) else {
            return ClientCommand::Unrecognized;
        };
        let list_part = &rest[..sender_at];
        let after_sender = &rest[sender_at + SENDER_MARKER.len()..];

        let Some(msg_at) = after_sender.find(MESSAGE_MARKER) else {
            return ClientCommand::Unrecognized;
        };
        let sender = after_sender[..msg_at].trim().to_string();
        let body = strip_body(&after_sender[msg_at + MESSAGE_MARKER.len()..]);

        let recipients = list_part
            .split(',')
            .map(|name| name.trim().to_string())
            .collect();

        ClientCommand::Targeted {
            recipients,
            sender,
            body,
        }
    }

    fn parse_broadcast(rest: &str) -> Self {
        let Some(msg_at) = rest.find(MESSAGE_MARKER) else {
            return ClientCommand::Unrecognized;
        };
        let sender = rest[..msg_at].trim().to_string();
        let body = strip_body(&rest[msg_at + MESSAGE_MARKER.len()..]);

        ClientCommand::Broadcast { sender, body }
    }
}

/// Drop the single space that delimits the `MESSAGE` marker from the body.
fn strip_body(raw: &str) -> String {
    raw.strip_prefix(' ').unwrap_or(raw).to_string()
}

/// Server → Client notification
///
/// Rendered via `Display` into exactly one wire line (without the trailing
/// newline; the writer task appends it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Request a candidate name from the client
    SubmitName,
    /// Handshake succeeded; the submitted name is registered
    NameAccepted,
    /// Current set of registered names, in registration order
    ActiveList(Vec<String>),
    /// A relayed chat message
    Chat { sender: String, body: String },
}

impl ServerMessage {
    /// Convenience constructor for a relayed chat line
    pub fn chat(sender: &str, body: &str) -> Self {
        Self::Chat {
            sender: sender.to_string(),
            body: body.to_string(),
        }
    }
}

impl std::fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerMessage::SubmitName => write!(f, "SUBMITNAME"),
            ServerMessage::NameAccepted => write!(f, "NAMEACCEPTED"),
            ServerMessage::ActiveList(names) => {
                write!(f, "ACTIVELIST[{}]", names.join(", "))
            }
            ServerMessage::Chat { sender, body } => {
                write!(f, "MESSAGE {}: {}", sender, body)
            }
        }
    }
}
