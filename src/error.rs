//! Unified error handling for wolfrelay.
//!
//! Every error in this module is recoverable: it is either reported back to
//! the requesting client as an `error` frame or logged and dropped. Nothing
//! here terminates the process.

use thiserror::Error;
use wolfrelay_proto::ServerEvent;

// ============================================================================
// Relay Errors (reported to the caller)
// ============================================================================

/// Errors produced by the registry, channel store, router and observer hub.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("player name '{0}' is already in use")]
    DuplicateName(String),

    #[error("channel '{0}' not found")]
    ChannelNotFound(String),

    #[error("wrong observer password")]
    Auth,

    #[error("player '{0}' not found")]
    SenderUnresolved(String),

    #[error("chat messages require a 'name' field")]
    MissingSenderName,

    #[error("observer feed could not be started: {0}")]
    ObserverInit(DeliveryError),
}

impl RelayError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateName(_) => "duplicate_name",
            Self::ChannelNotFound(_) => "channel_not_found",
            Self::Auth => "auth",
            Self::SenderUnresolved(_) => "sender_unresolved",
            Self::MissingSenderName => "missing_sender_name",
            Self::ObserverInit(_) => "observer_init",
        }
    }

    /// Convert to the `error` frame sent to the requesting client.
    pub fn to_reply(&self) -> ServerEvent {
        ServerEvent::error(self.to_string())
    }
}

// ============================================================================
// Delivery Errors (per recipient, never propagated to the sender)
// ============================================================================

/// Why a single recipient did not receive a fanned-out message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The session has no live connection (disconnected, not yet reconnected).
    #[error("session has no live connection")]
    Detached,

    /// The recipient's outbound queue is full.
    #[error("outbound queue full")]
    QueueFull,

    /// The recipient's connection task has gone away.
    #[error("connection closed")]
    Closed,
}

impl DeliveryError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Detached => "detached",
            Self::QueueFull => "queue_full",
            Self::Closed => "closed",
        }
    }
}
