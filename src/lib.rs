//! wolfrelay - real-time message relay for werewolf game sessions.
//!
//! Players register over WebSocket, chat on role-scoped channels and send
//! game actions; observers authenticate with a shared secret and receive a
//! mirror of all traffic plus membership changes.

pub mod config;
pub mod error;
pub mod handlers;
pub mod network;
pub mod state;

pub use config::Config;
pub use error::{DeliveryError, RelayError};
pub use network::Gateway;
pub use state::Relay;
