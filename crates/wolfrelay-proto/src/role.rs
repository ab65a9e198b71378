//! Player roles.
//!
//! Roles form an open set: the well-known ones get their own variant, any
//! other string is preserved verbatim in [`Role::Other`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A player's role in the game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Role {
    /// Plain villager, no special ability.
    #[default]
    Villager,
    /// Member of the werewolf team; joins the `werewolf` channel.
    Werewolf,
    /// Game master; joins the `moderator` channel.
    Moderator,
    /// Divines one player per night.
    Seer,
    /// Learns the identity of executed players.
    Medium,
    /// Protects one player per night.
    Hunter,
    /// Sides with the werewolves while posing as a villager.
    Madman,
    /// Any role string this crate does not know about.
    Other(String),
}

impl Role {
    /// The wire representation of this role.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Villager => "villager",
            Self::Werewolf => "werewolf",
            Self::Moderator => "moderator",
            Self::Seer => "seer",
            Self::Medium => "medium",
            Self::Hunter => "hunter",
            Self::Madman => "madman",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "villager" => Self::Villager,
            "werewolf" => Self::Werewolf,
            "moderator" => Self::Moderator,
            "seer" => Self::Seer,
            "medium" => Self::Medium,
            "hunter" => Self::Hunter,
            "madman" => Self::Madman,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Role::from)
    }
}
