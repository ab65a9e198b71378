//! Registration and explicit leave.

use super::{ConnectionMode, Context, Flow};
use crate::state::Registration;
use tracing::{info, warn};
use uuid::Uuid;
use wolfrelay_proto::{RegisterRequest, ServerEvent};

/// `register`: claim a display name, or reclaim a session by identity.
///
/// A duplicate name is reported and the connection stays unclassified so
/// the client can retry with another name.
pub(super) fn register(ctx: &mut Context<'_>, req: RegisterRequest) -> Flow {
    let identity = req
        .player_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match ctx
        .relay
        .registry()
        .register(&identity, &req.name, req.role, ctx.handle.clone())
    {
        Ok(done) => {
            if done.kind == Registration::Reconnected {
                info!(%identity, conn_id = ctx.handle.id(), "player reconnected");
            }
            ctx.reply(ServerEvent::system(format!(
                "Welcome {}! Role: {}",
                done.player.name, done.player.role
            )));
            *ctx.mode = ConnectionMode::Player { identity };
        }
        Err(e) => {
            warn!(name = %req.name, %identity, error = e.error_code(), "registration rejected");
            ctx.reply(e.to_reply());
        }
    }
    Flow::Continue
}

/// `leave`: remove the session, then close.
pub(super) fn leave(ctx: &mut Context<'_>, identity: &str) -> Flow {
    ctx.relay.registry().unregister(identity);
    ctx.reply(ServerEvent::system("Goodbye"));
    *ctx.mode = ConnectionMode::Fresh;
    Flow::Close
}
