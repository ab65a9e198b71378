//! Shared relay state.
//!
//! [`Relay`] owns the [`Registry`], the [`ChannelStore`] and the
//! [`ObserverHub`]. Connection tasks hold an `Arc<Relay>` and route through
//! [`Router`].

pub mod channel;
pub mod delivery;
pub mod observer;
pub mod registry;
pub mod relay;
pub mod router;
pub mod session;

pub use channel::{ChannelStore, DEFAULT_HISTORY_CAPACITY, MessageDraft, PROVISIONED_CHANNELS};
pub use delivery::{Delivery, DeliveryReport};
pub use observer::{FeedGuard, NullObserver, ObserverHub, RegistryObserver};
pub use registry::{Registered, Registration, Registry};
pub use relay::Relay;
pub use router::{INTRODUCTION_PHASE, INTRODUCTION_SCRIPT, RouteReport, Router, Sender};
pub use session::{ConnId, ConnectionHandle, Session, membership_for};
