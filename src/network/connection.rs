//! Per-connection task.
//!
//! One task per client: it reads frames, decodes them into [`Inbound`],
//! dispatches them, and writes whatever lands in the connection's outbound
//! queue. A reconnection elsewhere fires the close token and ends the task.

use crate::config::LimitsConfig;
use crate::handlers::{ConnectionMode, Context, Flow, dispatch};
use crate::network::RateLimiter;
use crate::state::{ConnId, ConnectionHandle, Relay};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, instrument, warn};
use wolfrelay_proto::{Inbound, Outbound};

/// A client connection.
pub struct Connection {
    conn_id: ConnId,
    addr: SocketAddr,
    relay: Arc<Relay>,
    limits: LimitsConfig,
}

impl Connection {
    pub fn new(conn_id: ConnId, addr: SocketAddr, relay: Arc<Relay>, limits: LimitsConfig) -> Self {
        Self {
            conn_id,
            addr,
            relay,
            limits,
        }
    }

    /// Drive the connection until the client leaves, errors, or is superseded.
    #[instrument(skip_all, name = "connection", fields(conn_id = self.conn_id, addr = %self.addr))]
    pub async fn run<S>(self, ws: WebSocketStream<S>) -> anyhow::Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (handle, mut outgoing) =
            ConnectionHandle::pair(self.conn_id, self.limits.outgoing_queue.max(1));
        let (mut sink, mut stream) = ws.split();
        let mut mode = ConnectionMode::Fresh;
        let mut limiter = RateLimiter::from_config(&self.limits);

        let result: anyhow::Result<()> = loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    None => break Ok(()),
                    Some(Err(e)) => break Err(e.into()),
                    Some(Ok(Message::Text(text))) => {
                        if !limiter.check() {
                            warn!("inbound rate exceeded, message dropped");
                            continue;
                        }
                        let msg = match Inbound::decode(&text) {
                            Ok(msg) => msg,
                            Err(e) => {
                                debug!(error = e.error_code(), "malformed frame dropped");
                                continue;
                            }
                        };
                        let mut ctx = Context::new(&self.relay, &handle, &mut mode);
                        if dispatch(&mut ctx, msg) == Flow::Close {
                            break Ok(());
                        }
                    }
                    Some(Ok(Message::Close(_))) => break Ok(()),
                    Some(Ok(_)) => {}
                },

                Some(msg) = outgoing.recv() => {
                    if let Err(e) = write(&mut sink, &msg).await {
                        break Err(e);
                    }
                }

                _ = handle.closed() => {
                    info!("connection superseded");
                    break Ok(());
                }
            }
        };

        // Flush replies queued by the last handler (history, errors, goodbye).
        if result.is_ok() {
            while let Ok(msg) = outgoing.try_recv() {
                if write(&mut sink, &msg).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        }

        handle.close();
        match &mode {
            ConnectionMode::Player { identity } => {
                self.relay.registry().detach(identity, self.conn_id);
            }
            ConnectionMode::Observer => {
                self.relay.observers().unsubscribe(self.conn_id);
            }
            ConnectionMode::Fresh => {}
        }
        debug!(?mode, "connection cleaned up");

        result
    }
}

async fn write<S>(
    sink: &mut futures_util::stream::SplitSink<WebSocketStream<S>, Message>,
    msg: &Outbound,
) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let json = msg.to_json()?;
    sink.send(Message::Text(json)).await?;
    Ok(())
}
