//! Network layer: WebSocket listener and per-connection tasks.

mod connection;
mod gateway;
mod limit;

pub use connection::Connection;
pub use gateway::{Gateway, origin_allowed};
pub use limit::RateLimiter;
