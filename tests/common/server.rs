//! Test server management.
//!
//! Spawns and manages wolfrelay instances for integration testing.

use std::path::PathBuf;
use std::process::{Child, Command};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// Observer password written into every test config.
pub const OBSERVER_PASSWORD: &str = "moonlight";

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    _data_dir: TempDir,
}

impl TestServer {
    /// Spawn a new test server listening on `port`.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        let data_dir = tempfile::Builder::new()
            .prefix(&format!("wolfrelay-test-{port}-"))
            .tempdir()?;

        let config_path = data_dir.path().join("config.toml");
        let config_content = format!(
            r#"
[server]
name = "test-relay"

[listen]
address = "127.0.0.1:{port}"

[observer]
password = "{OBSERVER_PASSWORD}"

[limits]
message_rate = 1000.0
message_burst = 1000.0
"#
        );
        std::fs::write(&config_path, config_content)?;

        let binary_path = PathBuf::from(env!("CARGO_BIN_EXE_wolfrelay"));
        let child = Command::new(&binary_path).arg(&config_path).spawn()?;

        let server = Self {
            child,
            port,
            _data_dir: data_dir,
        };

        // Wait for server to start listening
        server.wait_until_ready().await?;

        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// WebSocket URL of this server.
    pub fn url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.url()).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
