//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("observer.password must not be empty")]
    EmptyObserverPassword,
    #[error("history.capacity must be at least 1")]
    ZeroHistoryCapacity,
    #[error("limits.outgoing_queue must be at least 1")]
    ZeroOutgoingQueue,
    #[error("limits.message_rate must be positive, got {0}")]
    InvalidMessageRate(f32),
    #[error("limits.message_burst must be positive, got {0}")]
    InvalidMessageBurst(f32),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    }
    if config.observer.password.is_empty() {
        errors.push(ValidationError::EmptyObserverPassword);
    }
    if config.history.capacity == 0 {
        errors.push(ValidationError::ZeroHistoryCapacity);
    }

    let limits = &config.limits;
    if limits.outgoing_queue == 0 {
        errors.push(ValidationError::ZeroOutgoingQueue);
    }
    if limits.message_rate.is_nan() || limits.message_rate <= 0.0 {
        errors.push(ValidationError::InvalidMessageRate(limits.message_rate));
    }
    if limits.message_burst.is_nan() || limits.message_burst <= 0.0 {
        errors.push(ValidationError::InvalidMessageBurst(limits.message_burst));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
