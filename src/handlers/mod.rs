//! Inbound message handlers.
//!
//! Every frame is decoded once into an [`Inbound`] by the connection task
//! and handed to [`dispatch`], which picks a handler from the connection's
//! current [`ConnectionMode`]. Handlers never block: replies go through the
//! connection's own outbound queue.

mod connection;
mod history;
mod messaging;
mod observer;

use crate::state::{ConnectionHandle, Relay};
use std::sync::Arc;
use tracing::{debug, trace};
use wolfrelay_proto::{Inbound, ServerEvent};

/// What a connection is, as far as routing is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Nothing classified the connection yet.
    #[default]
    Fresh,
    /// Registered player.
    Player { identity: String },
    /// Authenticated god-view watcher.
    Observer,
}

/// Whether the connection task should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Flush queued replies, then close.
    Close,
}

/// Handler context for one inbound frame.
pub struct Context<'a> {
    /// Shared relay state.
    pub relay: &'a Relay,
    /// This connection's send capability.
    pub handle: &'a ConnectionHandle,
    /// Connection classification, updated by handlers.
    pub mode: &'a mut ConnectionMode,
}

impl<'a> Context<'a> {
    pub fn new(relay: &'a Relay, handle: &'a ConnectionHandle, mode: &'a mut ConnectionMode) -> Self {
        Self {
            relay,
            handle,
            mode,
        }
    }

    /// Queue a reply to this connection only.
    pub fn reply(&self, event: ServerEvent) {
        if let Err(e) = self.handle.deliver(Arc::new(event.into())) {
            debug!(conn_id = self.handle.id(), error = e.error_code(), "reply dropped");
        }
    }
}

/// Route one decoded frame.
pub fn dispatch(ctx: &mut Context<'_>, msg: Inbound) -> Flow {
    let kind = msg.kind().to_string();
    match (ctx.mode.clone(), msg) {
        (ConnectionMode::Fresh, Inbound::Register(req)) => connection::register(ctx, req),
        (ConnectionMode::Fresh, Inbound::Chat(req)) => messaging::anonymous_chat(ctx, req),
        (ConnectionMode::Fresh, Inbound::GetHistory(req)) => history::one_shot(ctx, req),
        (ConnectionMode::Fresh, Inbound::Godview(req)) => observer::subscribe(ctx, req),

        (ConnectionMode::Player { identity }, Inbound::Chat(req)) => {
            messaging::player_chat(ctx, &identity, req)
        }
        (ConnectionMode::Player { identity }, Inbound::Action(req)) => {
            messaging::action(ctx, &identity, req)
        }
        (ConnectionMode::Player { .. }, Inbound::GetHistory(req)) => history::query(ctx, req),
        (ConnectionMode::Player { identity }, Inbound::Leave) => connection::leave(ctx, &identity),

        (ConnectionMode::Observer, Inbound::Control(req)) => observer::control(ctx, req),

        (mode, _) => {
            trace!(?mode, kind = %kind, "ignoring message");
            Flow::Continue
        }
    }
}
