//! Per-connection limits configuration.

use super::defaults::{default_message_burst, default_message_rate, default_outgoing_queue};
use serde::Deserialize;

/// Per-connection limits.
///
/// The outbound queue bounds how far a slow client may fall behind before
/// fan-out starts dropping its messages.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Outbound queue depth per connection (default: 256).
    #[serde(default = "default_outgoing_queue")]
    pub outgoing_queue: usize,
    /// Inbound messages per second (default: 20.0).
    #[serde(default = "default_message_rate")]
    pub message_rate: f32,
    /// Inbound burst allowance (default: 40.0).
    #[serde(default = "default_message_burst")]
    pub message_burst: f32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            outgoing_queue: default_outgoing_queue(),
            message_rate: default_message_rate(),
            message_burst: default_message_burst(),
        }
    }
}
