//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, ObserverConfig)
//! - [`listen`]: WebSocket listener configuration (ListenConfig)
//! - [`history`]: Channel log retention (HistoryConfig)
//! - [`limits`]: Per-connection queue and flood limits (LimitsConfig)
//! - [`validation`]: Startup checks returning every problem at once

mod defaults;
mod history;
mod limits;
mod listen;
mod types;
mod validation;

pub use history::HistoryConfig;
pub use limits::LimitsConfig;
pub use listen::ListenConfig;
pub use types::{Config, ConfigError, LogFormat, ObserverConfig, ServerConfig};
pub use validation::{ValidationError, validate};
