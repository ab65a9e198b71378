//! Gateway - WebSocket listener that accepts incoming connections.
//!
//! The Gateway binds the listen socket, performs the WebSocket handshake with
//! an Origin check, and spawns a [`Connection`] task for each client.

use crate::config::{LimitsConfig, ListenConfig};
use crate::network::Connection;
use crate::state::Relay;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tracing::{error, info, instrument, warn};

/// The Gateway accepts incoming WebSocket connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    allow_origins: Arc<[String]>,
    limits: LimitsConfig,
    relay: Arc<Relay>,
}

/// Origin allow-list check. An empty list allows everything.
pub fn origin_allowed(allowed: &[String], origin: Option<&str>) -> bool {
    if allowed.is_empty() {
        return true;
    }
    origin.is_some_and(|origin| allowed.iter().any(|a| a == origin || a == "*"))
}

fn forbidden() -> ErrorResponse {
    let mut response = ErrorResponse::new(Some("origin not allowed".to_string()));
    *response.status_mut() = http::StatusCode::FORBIDDEN;
    response
}

impl Gateway {
    /// Bind the gateway to the configured address.
    pub async fn bind(
        listen: &ListenConfig,
        limits: LimitsConfig,
        relay: Arc<Relay>,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(listen.address).await?;
        info!(address = %listen.address, "WebSocket listener bound");
        Ok(Self {
            listener,
            allow_origins: listen.allow_origins.clone().into(),
            limits,
            relay,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let relay = Arc::clone(&self.relay);
                    let limits = self.limits.clone();
                    let allowed = Arc::clone(&self.allow_origins);
                    let conn_id = relay.next_conn_id();

                    tokio::spawn(async move {
                        let origin_check = |req: &Request, response: Response| {
                            let origin = req
                                .headers()
                                .get("Origin")
                                .and_then(|o| o.to_str().ok());
                            if origin_allowed(&allowed, origin) {
                                Ok(response)
                            } else {
                                warn!(%addr, origin = ?origin, "WebSocket origin rejected");
                                Err(forbidden())
                            }
                        };

                        match accept_hdr_async(stream, origin_check).await {
                            Ok(ws_stream) => {
                                info!(conn_id, %addr, "WebSocket handshake successful");
                                let connection = Connection::new(conn_id, addr, relay, limits);
                                if let Err(e) = connection.run(ws_stream).await {
                                    warn!(conn_id, %addr, error = %e, "connection error");
                                }
                                info!(conn_id, %addr, "connection closed");
                            }
                            Err(e) => {
                                warn!(%addr, error = %e, "WebSocket handshake failed");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }
    }
}
