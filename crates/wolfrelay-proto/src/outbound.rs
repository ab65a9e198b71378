//! Outbound server messages.

use crate::error::Result;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Whether a stored message was written by a player or by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Player chat.
    Chat,
    /// Scripted game-master announcement.
    System,
}

/// A message as stored in a channel log and fanned out to its members.
///
/// Sender name and role are taken from the server-side session, never from
/// the inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Serialized as `type`.
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Channel the message was appended to.
    pub channel: String,
    /// Sender display name; absent for system messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    /// Sender role; absent for system messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Message body.
    pub content: String,
    /// Game phase tag carried by system announcements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Server-assigned RFC 3339 timestamp.
    pub timestamp: String,
}

/// Public projection of a player session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Stable identity.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role at registration time.
    pub role: Role,
    /// Liveness flag.
    pub is_alive: bool,
}

/// A channel and its retained log, as sent in the observer `init` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    /// Channel name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Retained messages, oldest first.
    pub messages: Vec<ChannelMessage>,
}

/// Replies and mirrored events, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Informational reply (e.g. registration welcome).
    System {
        /// Text shown to the client.
        message: String,
    },
    /// Recoverable error reported to the requesting client.
    Error {
        /// Human-readable reason.
        message: String,
    },
    /// History query result.
    History {
        /// Channel that was read.
        channel: String,
        /// Messages, oldest first.
        messages: Vec<ChannelMessage>,
    },
    /// Initial observer payload.
    Init {
        /// Every registered player, in registration order.
        players: Vec<PlayerInfo>,
        /// Every channel keyed by name.
        channels: BTreeMap<String, ChannelSnapshot>,
    },
    /// A player registered or reconnected.
    PlayerJoined {
        /// The player's public projection.
        player: PlayerInfo,
    },
    /// A player was explicitly unregistered.
    PlayerLeft {
        /// The player's last public projection.
        player: PlayerInfo,
    },
    /// Mirror of a message routed to a channel.
    ChannelMessage {
        /// Target channel.
        channel: String,
        /// The stored message.
        message: ChannelMessage,
    },
    /// A game action forwarded verbatim.
    Action {
        /// Identity of the acting player.
        player_id: String,
        /// The complete inbound action object.
        action: Value,
    },
}

impl ServerEvent {
    /// Build an `error` reply.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Build a `system` reply.
    pub fn system(message: impl Into<String>) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

/// Anything the server writes to a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outbound {
    /// A channel message delivered to a channel member.
    Message(ChannelMessage),
    /// A reply or mirrored event.
    Event(ServerEvent),
}

impl Outbound {
    /// Encode as a JSON text frame.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<ChannelMessage> for Outbound {
    fn from(msg: ChannelMessage) -> Self {
        Self::Message(msg)
    }
}

impl From<ServerEvent> for Outbound {
    fn from(event: ServerEvent) -> Self {
        Self::Event(event)
    }
}
