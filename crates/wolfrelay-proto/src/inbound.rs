//! Inbound client messages.
//!
//! Frames are JSON objects discriminated by a `type` string. Observer
//! control frames are the exception: they carry only a `command` field.

use crate::error::{ProtoError, Result};
use crate::role::Role;
use crate::PUBLIC_CHANNEL;
use serde::Deserialize;
use serde_json::Value;

/// Default number of messages returned by a history query.
pub const DEFAULT_HISTORY_COUNT: i64 = 10;

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// `{type:"register", player_id?, name, role?}`
    Register(RegisterRequest),
    /// `{type:"chat", channel?, content, name?}`
    Chat(ChatRequest),
    /// `{type:"action", action, ...}`
    Action(ActionRequest),
    /// `{type:"get_history", channel?, count?}`
    GetHistory(HistoryRequest),
    /// `{type:"godview", password}`
    Godview(GodviewRequest),
    /// `{command}` sent by a subscribed observer.
    Control(ControlRequest),
    /// `{type:"leave"}`: explicit unregistration by a registered player.
    Leave,
    /// A well-formed frame whose `type` is not known.
    Unrecognized(String),
}

/// Registration request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    /// Stable caller-supplied identity; generated by the server when absent.
    #[serde(default)]
    pub player_id: Option<String>,
    /// Display name, unique among registered players.
    pub name: String,
    /// Role, `villager` when absent.
    #[serde(default)]
    pub role: Role,
}

/// Chat request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatRequest {
    /// Target channel.
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Message body.
    pub content: String,
    /// Sender display name, used when the connection carries no identity.
    #[serde(default)]
    pub name: Option<String>,
}

/// Game action. Only `action` is interpreted; the whole object is kept so it
/// can be forwarded verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    /// Action name (vote, attack, ...).
    pub action: String,
    /// The complete inbound object.
    pub raw: Value,
}

/// History query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryRequest {
    /// Channel to read.
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Number of most recent messages; zero or negative means all of them.
    #[serde(default = "default_history_count")]
    pub count: i64,
}

/// Observer subscription request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GodviewRequest {
    /// Shared observer secret. A missing password never matches.
    #[serde(default)]
    pub password: String,
}

/// Observer control frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ControlRequest {
    /// Raw command name.
    pub command: String,
}

impl ControlRequest {
    /// The recognized command, if any.
    pub fn parsed(&self) -> Option<ControlCommand> {
        ControlCommand::parse(&self.command)
    }
}

/// Control commands an observer may issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Publish the introduction script to `public`.
    StartGame,
}

impl ControlCommand {
    /// Parse a command name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "start_game" => Some(Self::StartGame),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ActionFields {
    action: String,
}

fn default_channel() -> String {
    PUBLIC_CHANNEL.to_string()
}

fn default_history_count() -> i64 {
    DEFAULT_HISTORY_COUNT
}

impl Inbound {
    /// Decode a text frame.
    pub fn decode(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Decode an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        let (kind, has_command) = match &value {
            Value::Object(map) => (map.get("type").cloned(), map.contains_key("command")),
            _ => return Err(ProtoError::NotAnObject),
        };

        let kind = match kind {
            Some(Value::String(kind)) => kind,
            Some(_) => return Err(ProtoError::InvalidType),
            None if has_command => return Ok(Self::Control(serde_json::from_value(value)?)),
            None => return Err(ProtoError::MissingType),
        };

        let inbound = match kind.as_str() {
            "register" => Self::Register(serde_json::from_value(value)?),
            "chat" => Self::Chat(serde_json::from_value(value)?),
            "action" => {
                let fields: ActionFields = serde_json::from_value(value.clone())?;
                Self::Action(ActionRequest {
                    action: fields.action,
                    raw: value,
                })
            }
            "get_history" => Self::GetHistory(serde_json::from_value(value)?),
            "godview" => Self::Godview(serde_json::from_value(value)?),
            "leave" => Self::Leave,
            _ => Self::Unrecognized(kind),
        };
        Ok(inbound)
    }

    /// Short name of the message kind, for logs.
    pub fn kind(&self) -> &str {
        match self {
            Self::Register(_) => "register",
            Self::Chat(_) => "chat",
            Self::Action(_) => "action",
            Self::GetHistory(_) => "get_history",
            Self::Godview(_) => "godview",
            Self::Control(_) => "control",
            Self::Leave => "leave",
            Self::Unrecognized(kind) => kind,
        }
    }
}
