//! History queries.

use super::{Context, Flow};
use tracing::debug;
use wolfrelay_proto::{HistoryRequest, ServerEvent};

/// Reply with the last `count` messages of `channel`.
pub(super) fn reply_history(ctx: &Context<'_>, channel: &str, count: i64) {
    match ctx.relay.channels().recent(channel, count) {
        Ok(messages) => {
            debug!(channel, count = messages.len(), "history served");
            ctx.reply(ServerEvent::History {
                channel: channel.to_string(),
                messages,
            });
        }
        Err(e) => ctx.reply(e.to_reply()),
    }
}

/// From a registered player: reply and keep the connection.
pub(super) fn query(ctx: &mut Context<'_>, req: HistoryRequest) -> Flow {
    reply_history(ctx, &req.channel, req.count);
    Flow::Continue
}

/// From an unclassified connection: reply, then close.
pub(super) fn one_shot(ctx: &mut Context<'_>, req: HistoryRequest) -> Flow {
    reply_history(ctx, &req.channel, req.count);
    Flow::Close
}
