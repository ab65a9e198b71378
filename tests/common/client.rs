//! Test WebSocket client.
//!
//! Sends JSON frames and asserts on the JSON frames the relay sends back.

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// A test client.
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let (ws, _response) = connect_async(url).await?;
        Ok(Self { ws })
    }

    /// Send a JSON frame.
    pub async fn send(&mut self, frame: Value) -> anyhow::Result<()> {
        self.ws.send(Message::Text(frame.to_string())).await?;
        Ok(())
    }

    /// Receive a single JSON frame.
    pub async fn recv(&mut self) -> anyhow::Result<Value> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a JSON frame with a timeout. Non-text frames are skipped.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Value> {
        loop {
            let frame = timeout(dur, self.ws.next())
                .await?
                .ok_or_else(|| anyhow::anyhow!("connection closed"))??;
            match frame {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Close(_) => anyhow::bail!("connection closed"),
                _ => continue,
            }
        }
    }

    /// Receive frames until the predicate matches; returns the matching frame.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Value>
    where
        F: FnMut(&Value) -> bool,
    {
        loop {
            let frame = self.recv().await?;
            if predicate(&frame) {
                return Ok(frame);
            }
        }
    }

    /// Receive the next frame with the given `type`.
    pub async fn recv_type(&mut self, kind: &str) -> anyhow::Result<Value> {
        self.recv_until(|f| f["type"] == kind).await
    }

    /// True if the server closes the connection within `dur`.
    #[allow(dead_code)]
    pub async fn expect_closed(&mut self, dur: Duration) -> bool {
        loop {
            match timeout(dur, self.ws.next()).await {
                Ok(None) | Ok(Some(Err(_))) | Ok(Some(Ok(Message::Close(_)))) => return true,
                Ok(Some(Ok(_))) => continue,
                Err(_) => return false,
            }
        }
    }

    /// True if no text frame arrives within `dur`.
    #[allow(dead_code)]
    pub async fn expect_silence(&mut self, dur: Duration) -> bool {
        self.recv_timeout(dur).await.is_err()
    }

    /// Register as a player and wait for the welcome reply.
    #[allow(dead_code)]
    pub async fn register(&mut self, id: &str, name: &str, role: &str) -> anyhow::Result<Value> {
        self.send(json!({"type": "register", "player_id": id, "name": name, "role": role}))
            .await?;
        self.recv().await
    }

    /// Subscribe as an observer and return the `init` payload.
    #[allow(dead_code)]
    pub async fn godview(&mut self, password: &str) -> anyhow::Result<Value> {
        self.send(json!({"type": "godview", "password": password}))
            .await?;
        self.recv().await
    }

    /// Close the connection.
    #[allow(dead_code)]
    pub async fn close(mut self) -> anyhow::Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
