//! Channel store: the fixed set of channels and their bounded logs.
//!
//! Channels are provisioned once at startup and never created or destroyed
//! afterwards, so the outer map needs no lock; each log has its own.

use crate::error::RelayError;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use wolfrelay_proto::{
    ChannelMessage, ChannelSnapshot, MODERATOR_CHANNEL, MessageKind, PUBLIC_CHANNEL, Role,
    WEREWOLF_CHANNEL, timestamp_now,
};

/// Default number of messages retained per channel.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Channels provisioned at startup, with their descriptions.
pub const PROVISIONED_CHANNELS: &[(&str, &str)] = &[
    (PUBLIC_CHANNEL, "Channel everyone can see"),
    (WEREWOLF_CHANNEL, "Werewolves only"),
    (MODERATOR_CHANNEL, "Game master channel"),
];

/// A message before the store stamps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub kind: MessageKind,
    pub player: Option<String>,
    pub role: Option<Role>,
    pub content: String,
    pub phase: Option<String>,
}

impl MessageDraft {
    pub fn chat(player: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Chat,
            player: Some(player.into()),
            role: Some(role),
            content: content.into(),
            phase: None,
        }
    }

    pub fn system(content: impl Into<String>, phase: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::System,
            player: None,
            role: None,
            content: content.into(),
            phase: Some(phase.into()),
        }
    }

    fn stamp(self, channel: &str, timestamp: String) -> ChannelMessage {
        ChannelMessage {
            kind: self.kind,
            channel: channel.to_string(),
            player: self.player,
            role: self.role,
            content: self.content,
            phase: self.phase,
            timestamp,
        }
    }
}

/// One channel's append-only, FIFO-evicting log.
#[derive(Debug)]
pub struct Channel {
    pub name: String,
    pub description: String,
    log: VecDeque<ChannelMessage>,
    capacity: usize,
}

impl Channel {
    fn new(name: &str, description: &str, capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            log: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, msg: ChannelMessage) {
        while self.log.len() >= self.capacity {
            self.log.pop_front();
        }
        self.log.push_back(msg);
    }

    /// The last `count` messages in insertion order; `count <= 0` means all.
    fn recent(&self, count: i64) -> Vec<ChannelMessage> {
        let len = self.log.len();
        let take = match usize::try_from(count) {
            Ok(n) if n > 0 => n.min(len),
            _ => len,
        };
        self.log.iter().skip(len - take).cloned().collect()
    }

    fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            name: self.name.clone(),
            description: self.description.clone(),
            messages: self.log.iter().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}

/// Owns every channel log.
#[derive(Debug)]
pub struct ChannelStore {
    channels: HashMap<String, Mutex<Channel>>,
}

impl ChannelStore {
    /// Provision [`PROVISIONED_CHANNELS`], each retaining `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let channels = PROVISIONED_CHANNELS
            .iter()
            .map(|(name, description)| {
                (
                    (*name).to_string(),
                    Mutex::new(Channel::new(name, description, capacity)),
                )
            })
            .collect();
        Self { channels }
    }

    #[inline]
    pub fn contains(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }

    /// Stamp and append. Unknown channels are a silent no-op (`None`).
    ///
    /// The timestamp is taken under the channel lock so log order and
    /// timestamp order agree.
    pub fn append(&self, channel: &str, draft: MessageDraft) -> Option<ChannelMessage> {
        let slot = self.channels.get(channel)?;
        let mut log = slot.lock();
        let msg = draft.stamp(channel, timestamp_now());
        log.push(msg.clone());
        Some(msg)
    }

    /// The last `count` messages (all of them when `count <= 0`).
    pub fn recent(&self, channel: &str, count: i64) -> Result<Vec<ChannelMessage>, RelayError> {
        self.channels
            .get(channel)
            .map(|slot| slot.lock().recent(count))
            .ok_or_else(|| RelayError::ChannelNotFound(channel.to_string()))
    }

    /// Every channel and its full log, keyed by name.
    pub fn snapshot(&self) -> BTreeMap<String, ChannelSnapshot> {
        self.channels
            .iter()
            .map(|(name, slot)| (name.clone(), slot.lock().snapshot()))
            .collect()
    }

    pub fn len(&self, channel: &str) -> Option<usize> {
        self.channels.get(channel).map(|slot| slot.lock().len())
    }
}

impl Default for ChannelStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
