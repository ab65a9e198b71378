//! God-view subscription and observer control commands.

use super::{ConnectionMode, Context, Flow};
use tracing::{info, warn};
use wolfrelay_proto::{ControlRequest, GodviewRequest};

/// `godview`: authenticate and start receiving the mirrored feed.
pub(super) fn subscribe(ctx: &mut Context<'_>, req: GodviewRequest) -> Flow {
    match ctx.relay.subscribe_observer(ctx.handle.clone(), &req.password) {
        Ok(()) => *ctx.mode = ConnectionMode::Observer,
        Err(e) => {
            warn!(conn_id = ctx.handle.id(), error = e.error_code(), "observer rejected");
            ctx.reply(e.to_reply());
        }
    }
    Flow::Continue
}

/// `{command: ...}` from a subscribed observer.
pub(super) fn control(ctx: &mut Context<'_>, req: ControlRequest) -> Flow {
    if let Some(report) = ctx.relay.router().handle_control(&req.command) {
        info!(
            command = %req.command,
            delivered = report.fanout.delivered_count(),
            "control command executed"
        );
    }
    Flow::Continue
}
