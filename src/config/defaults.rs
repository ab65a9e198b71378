//! Default value functions for configuration.

use crate::state::DEFAULT_HISTORY_CAPACITY;

// =============================================================================
// Observer Defaults
// =============================================================================

/// Shared observer secret used when the config does not set one.
pub const DEFAULT_OBSERVER_PASSWORD: &str = "wolf";

pub fn default_observer_password() -> String {
    DEFAULT_OBSERVER_PASSWORD.to_string()
}

// =============================================================================
// History Defaults
// =============================================================================

pub fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

// =============================================================================
// Limits Defaults
// =============================================================================

pub fn default_outgoing_queue() -> usize {
    256
}

pub fn default_message_rate() -> f32 {
    20.0
}

pub fn default_message_burst() -> f32 {
    40.0
}
