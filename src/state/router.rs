//! Message routing: chat fan-out, action forwarding and system broadcasts.

use crate::error::{DeliveryError, RelayError};
use crate::state::channel::MessageDraft;
use crate::state::delivery::{Delivery, DeliveryReport};
use crate::state::observer::FeedGuard;
use crate::state::relay::Relay;
use crate::state::session::{ConnId, Session};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use wolfrelay_proto::{ChannelMessage, ControlCommand, Outbound, PUBLIC_CHANNEL, ServerEvent};

/// Phase tag carried by the game-start announcement.
pub const INTRODUCTION_PHASE: &str = "introduction";

/// Announcement published to `public` when the game starts.
pub const INTRODUCTION_SCRIPT: &str = "\
Welcome to the werewolf game!

I am the game master for this game. Each of you holds a role and plays for \
either the village team or the werewolf team.

[Overview]
Village team wins when every werewolf has been executed.
Werewolf team wins when werewolves are at least as many as villagers.

[Roles]
- Villager: an ordinary citizen with no special ability
- Seer: may divine one player's true identity each night
- Medium: learns the true identity of each executed player
- Hunter: may guard one player each night
- Werewolf: chooses one player to attack each night
- Madman: on the werewolf team, but poses as a villager

[Flow]
1. Setup: every player learns their role
2. Day: open discussion, then a vote decides who is executed
3. Night: each role uses its ability
4. Judgement: check whether a team has won

Let's begin with introductions. Tell everyone your name and, if you like, \
a short greeting.";

/// Who a chat message claims to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender<'a> {
    /// A registered connection's own identity.
    Identity(&'a str),
    /// A connection that only supplied a display name.
    DisplayName(&'a str),
}

impl Sender<'_> {
    fn as_str(&self) -> &str {
        match self {
            Self::Identity(s) | Self::DisplayName(s) => s,
        }
    }
}

/// Result of storing and fanning out one channel message.
#[derive(Debug, Clone)]
pub struct RouteReport {
    pub message: ChannelMessage,
    /// Per-member delivery, keyed by identity.
    pub fanout: DeliveryReport<String>,
    /// Per-watcher delivery, keyed by connection id.
    pub mirrored: DeliveryReport<ConnId>,
}

/// Borrowed view over a [`Relay`] that performs routing.
#[derive(Clone, Copy)]
pub struct Router<'a> {
    relay: &'a Relay,
}

impl<'a> Router<'a> {
    pub fn new(relay: &'a Relay) -> Self {
        Self { relay }
    }

    /// An identity only matches an identity and a name only matches a name.
    fn resolve(&self, sender: Sender<'_>) -> Option<Session> {
        let registry = self.relay.registry();
        match sender {
            Sender::Identity(identity) => registry.get(identity),
            Sender::DisplayName(name) => registry.find_by_display_name(name),
        }
    }

    /// Store a chat message and deliver it to the channel's members.
    ///
    /// The stored message carries the resolved session's own name and role,
    /// never anything taken from the inbound frame.
    pub fn route_chat(
        &self,
        sender: Sender<'_>,
        channel: &str,
        content: &str,
    ) -> Result<RouteReport, RelayError> {
        let session = self
            .resolve(sender)
            .ok_or_else(|| RelayError::SenderUnresolved(sender.as_str().to_string()))?;

        let draft = MessageDraft::chat(&session.display_name, session.role.clone(), content);
        let feed = self.relay.observers().publishing();
        let message = self
            .relay
            .channels()
            .append(channel, draft)
            .ok_or_else(|| RelayError::ChannelNotFound(channel.to_string()))?;

        let report = self.publish(&feed, message);
        drop(feed);
        debug!(
            identity = %session.identity,
            channel,
            delivered = report.fanout.delivered_count(),
            failed = report.fanout.failed_count(),
            "chat routed"
        );
        Ok(report)
    }

    /// Forward an action to observers only, tagged with the sender identity.
    pub fn route_action(&self, identity: &str, action: Value) -> DeliveryReport<ConnId> {
        debug!(identity, "action forwarded");
        self.relay.observers().mirror(ServerEvent::Action {
            player_id: identity.to_string(),
            action,
        })
    }

    /// Append and fan out a sender-less system message to `public`.
    pub fn broadcast_system_phase(&self, text: &str, phase: &str) -> Option<RouteReport> {
        let feed = self.relay.observers().publishing();
        let message = self
            .relay
            .channels()
            .append(PUBLIC_CHANNEL, MessageDraft::system(text, phase))?;
        let report = self.publish(&feed, message);
        drop(feed);
        info!(
            phase,
            delivered = report.fanout.delivered_count(),
            failed = report.fanout.failed_count(),
            "system phase broadcast"
        );
        Some(report)
    }

    /// Run an observer control command. Unknown commands are ignored.
    pub fn handle_control(&self, command: &str) -> Option<RouteReport> {
        match ControlCommand::parse(command) {
            Some(ControlCommand::StartGame) => {
                self.broadcast_system_phase(INTRODUCTION_SCRIPT, INTRODUCTION_PHASE)
            }
            None => {
                debug!(command, "ignoring unknown control command");
                None
            }
        }
    }

    /// Fan out an already-stored message to its channel and mirror it.
    fn publish(&self, feed: &FeedGuard<'_>, message: ChannelMessage) -> RouteReport {
        let channel = message.channel.clone();
        let outbound: Arc<Outbound> = Arc::new(message.clone().into());

        let mut fanout = DeliveryReport::new();
        for (identity, handle) in self.relay.registry().members_of(&channel) {
            let outcome = match handle {
                Some(handle) => Delivery::from(handle.deliver(Arc::clone(&outbound))),
                None => Delivery::Failed(DeliveryError::Detached),
            };
            if let Delivery::Failed(e) = outcome {
                match e {
                    DeliveryError::QueueFull => {
                        warn!(%identity, channel = %channel, "recipient queue full, message dropped")
                    }
                    _ => debug!(%identity, channel = %channel, error = e.error_code(), "not delivered"),
                }
            }
            fanout.record(identity, outcome);
        }

        let mirrored = feed.mirror(ServerEvent::ChannelMessage {
            channel,
            message: message.clone(),
        });

        RouteReport {
            message,
            fanout,
            mirrored,
        }
    }
}
