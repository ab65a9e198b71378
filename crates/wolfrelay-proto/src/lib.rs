//! # wolfrelay-proto
//!
//! Wire model for the wolfrelay game relay.
//!
//! Clients speak JSON text frames. Every inbound frame is decoded exactly
//! once into the closed [`Inbound`] enum at the transport boundary; every
//! outbound frame is an [`Outbound`], which is either a stored
//! [`ChannelMessage`] or a control/mirror [`ServerEvent`].
//!
//! ```rust
//! use wolfrelay_proto::{Inbound, Role};
//!
//! let msg = Inbound::decode(r#"{"type":"register","name":"Aki","role":"werewolf"}"#).unwrap();
//! match msg {
//!     Inbound::Register(req) => assert_eq!(req.role, Role::Werewolf),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod inbound;
pub mod outbound;
pub mod role;
pub mod time;

pub use error::ProtoError;
pub use inbound::{
    ActionRequest, ChatRequest, ControlCommand, ControlRequest, DEFAULT_HISTORY_COUNT,
    GodviewRequest, HistoryRequest, Inbound, RegisterRequest,
};
pub use outbound::{
    ChannelMessage, ChannelSnapshot, MessageKind, Outbound, PlayerInfo, ServerEvent,
};
pub use role::Role;
pub use time::timestamp_now;

/// Channel every player belongs to; also the default for chat and history.
pub const PUBLIC_CHANNEL: &str = "public";

/// Channel reserved for players holding the werewolf role.
pub const WEREWOLF_CHANNEL: &str = "werewolf";

/// Channel reserved for the game master.
pub const MODERATOR_CHANNEL: &str = "moderator";
