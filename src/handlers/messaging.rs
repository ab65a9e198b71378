//! Chat and action handlers.

use super::history::reply_history;
use super::{Context, Flow};
use crate::error::RelayError;
use crate::state::Sender;
use tracing::{debug, warn};
use wolfrelay_proto::{ActionRequest, ChatRequest, DEFAULT_HISTORY_COUNT};

/// Chat from a registered player. The sender is always the connection's
/// own identity; any `name` in the frame is ignored.
///
/// A routed message is followed by the channel's recent history.
pub(super) fn player_chat(ctx: &mut Context<'_>, identity: &str, req: ChatRequest) -> Flow {
    match ctx
        .relay
        .router()
        .route_chat(Sender::Identity(identity), &req.channel, &req.content)
    {
        Ok(_) => reply_history(ctx, &req.channel, DEFAULT_HISTORY_COUNT),
        Err(e) => {
            warn!(identity, channel = %req.channel, error = e.error_code(), "chat not routed");
            ctx.reply(e.to_reply());
        }
    }
    Flow::Continue
}

/// Chat from an unclassified connection naming its sender.
///
/// Routed messages are answered with the channel's recent history and the
/// connection closes afterwards. An unknown or missing sender is reported
/// and the connection stays open.
pub(super) fn anonymous_chat(ctx: &mut Context<'_>, req: ChatRequest) -> Flow {
    let result = match req.name.as_deref() {
        Some(name) => ctx
            .relay
            .router()
            .route_chat(Sender::DisplayName(name), &req.channel, &req.content),
        None => Err(RelayError::MissingSenderName),
    };

    match result {
        Ok(report) => {
            debug!(
                channel = %req.channel,
                delivered = report.fanout.delivered_count(),
                "one-shot chat routed"
            );
            reply_history(ctx, &req.channel, DEFAULT_HISTORY_COUNT);
            Flow::Close
        }
        Err(e @ RelayError::ChannelNotFound(_)) => {
            warn!(channel = %req.channel, "one-shot chat to unknown channel dropped");
            ctx.reply(e.to_reply());
            Flow::Close
        }
        Err(e) => {
            debug!(error = e.error_code(), "one-shot chat rejected");
            ctx.reply(e.to_reply());
            Flow::Continue
        }
    }
}

/// Forward a game action to observers.
pub(super) fn action(ctx: &mut Context<'_>, identity: &str, req: ActionRequest) -> Flow {
    let report = ctx.relay.router().route_action(identity, req.raw);
    debug!(
        identity,
        action = %req.action,
        observers = report.delivered_count(),
        "action forwarded"
    );
    Flow::Continue
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::Harness;
    use crate::handlers::{ConnectionMode, Flow};
    use crate::state::ConnectionHandle;
    use wolfrelay_proto::{Outbound, Role, ServerEvent};

    fn registered(identity: &str, name: &str, role: &str) -> Harness {
        let mut h = Harness::new();
        h.send(&format!(
            r#"{{"type":"register","player_id":"{identity}","name":"{name}","role":"{role}"}}"#
        ));
        h.next_event();
        h
    }

    #[test]
    fn player_chat_uses_session_name() {
        let mut h = registered("p1", "Aki", "villager");
        h.send(r#"{"type":"chat","content":"hi","name":"Mallory"}"#);
        match h.next() {
            Outbound::Message(msg) => {
                assert_eq!(msg.player.as_deref(), Some("Aki"));
                assert_eq!(msg.channel, "public");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn player_chat_is_answered_with_recent_history() {
        let mut h = registered("p1", "Aki", "werewolf");
        for i in 0..12 {
            h.send(&format!(
                r#"{{"type":"chat","channel":"werewolf","content":"m{i}"}}"#
            ));
        }
        // Skip everything up to the final chat's own copy.
        while !matches!(h.next(), Outbound::Message(m) if m.content == "m11") {}

        match h.next_event() {
            ServerEvent::History { channel, messages } => {
                assert_eq!(channel, "werewolf");
                let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
                assert_eq!(
                    contents,
                    ["m2", "m3", "m4", "m5", "m6", "m7", "m8", "m9", "m10", "m11"]
                );
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(h.is_idle());
    }

    #[test]
    fn player_chat_to_unknown_channel_reports_error() {
        let mut h = registered("p1", "Aki", "villager");
        let flow = h.send(r#"{"type":"chat","channel":"lobby","content":"hi"}"#);
        assert_eq!(flow, Flow::Continue);
        assert_eq!(h.next_event(), ServerEvent::error("channel 'lobby' not found"));
        assert!(h.is_idle());
    }

    #[test]
    fn anonymous_chat_routes_then_closes() {
        let mut h = Harness::new();
        let mut aki = h.register_other("p1", "Aki", Role::Villager);

        let flow = h.send(r#"{"type":"chat","name":"Aki","content":"from a script"}"#);
        assert_eq!(flow, Flow::Close);
        assert_eq!(h.mode, ConnectionMode::Fresh);
        match &*aki.try_recv().unwrap() {
            Outbound::Message(msg) => assert_eq!(msg.content, "from a script"),
            other => panic!("unexpected {other:?}"),
        }
        match h.next_event() {
            ServerEvent::History { channel, messages } => {
                assert_eq!(channel, "public");
                assert_eq!(messages.len(), 1);
                assert_eq!(messages[0].player.as_deref(), Some("Aki"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(h.is_idle());
    }

    #[test]
    fn anonymous_chat_unknown_name_stays_open() {
        let mut h = Harness::new();
        let flow = h.send(r#"{"type":"chat","name":"Ghost","content":"boo"}"#);
        assert_eq!(flow, Flow::Continue);
        assert_eq!(h.next_event(), ServerEvent::error("player 'Ghost' not found"));
    }

    #[test]
    fn anonymous_chat_without_name_is_rejected() {
        let mut h = Harness::new();
        let flow = h.send(r#"{"type":"chat","content":"who am i"}"#);
        assert_eq!(flow, Flow::Continue);
        assert_eq!(
            h.next_event(),
            ServerEvent::error("chat messages require a 'name' field")
        );
    }

    #[test]
    fn action_is_mirrored_but_not_echoed() {
        let mut h = registered("p1", "Aki", "werewolf");
        let (watcher, mut events) = ConnectionHandle::pair(h.relay.next_conn_id(), 8);
        h.relay.subscribe_observer(watcher, "wolf").unwrap();
        events.try_recv().unwrap();

        h.send(r#"{"type":"action","action":"attack","target":"Ben"}"#);

        assert!(h.is_idle());
        match &*events.try_recv().unwrap() {
            Outbound::Event(ServerEvent::Action { player_id, action }) => {
                assert_eq!(player_id, "p1");
                assert_eq!(action["target"], "Ben");
                assert_eq!(action["action"], "attack");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn action_from_unregistered_connection_is_ignored() {
        let mut h = Harness::new();
        let flow = h.send(r#"{"type":"action","action":"vote"}"#);
        assert_eq!(flow, Flow::Continue);
        assert!(h.is_idle());
    }
}
