//! Channel history retention configuration.

use super::defaults::default_history_capacity;
use serde::Deserialize;

/// Channel log retention.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Messages retained per channel; older ones are evicted first (default: 100).
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}
