//! Observer hub: authenticated god-view watchers.
//!
//! The registry reports membership changes through [`RegistryObserver`];
//! the hub implements it by mirroring `player_joined` / `player_left` to
//! every watcher. The router mirrors chat and actions the same way.
//!
//! Subscribing takes the feed lock for writing while it builds the `init`
//! snapshot and inserts the watcher. Mirroring holds it for reading, so an
//! event is either part of a watcher's snapshot or delivered to it, never
//! neither.

use crate::error::RelayError;
use crate::state::delivery::DeliveryReport;
use crate::state::session::{ConnId, ConnectionHandle};
use dashmap::DashMap;
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, info};
use wolfrelay_proto::{Outbound, PlayerInfo, ServerEvent};

/// Hook for registry membership changes.
///
/// Called after the registry lock is released, so implementations may call
/// back into the registry.
pub trait RegistryObserver: Send + Sync {
    /// A player registered or reconnected.
    fn on_player_joined(&self, player: &PlayerInfo);

    /// A player was explicitly unregistered.
    fn on_player_left(&self, player: &PlayerInfo);
}

/// Observer that ignores everything. Used when no hub is attached.
#[derive(Debug, Default)]
pub struct NullObserver;

impl RegistryObserver for NullObserver {
    fn on_player_joined(&self, _player: &PlayerInfo) {}
    fn on_player_left(&self, _player: &PlayerInfo) {}
}

/// Set of authenticated watcher connections.
pub struct ObserverHub {
    watchers: DashMap<ConnId, ConnectionHandle>,
    feed: RwLock<()>,
    secret: String,
}

/// Read hold on the observer feed.
///
/// The router takes one before storing a message and mirrors through it, so
/// a concurrent [`ObserverHub::subscribe`] sees the store either before the
/// append or after the mirror.
pub struct FeedGuard<'a> {
    hub: &'a ObserverHub,
    _feed: RwLockReadGuard<'a, ()>,
}

impl FeedGuard<'_> {
    /// Send `event` to every watcher. Watchers that fail are dropped and
    /// their connections closed.
    pub fn mirror(&self, event: ServerEvent) -> DeliveryReport<ConnId> {
        self.hub.mirror_held(event)
    }
}

impl ObserverHub {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            watchers: DashMap::new(),
            feed: RwLock::new(()),
            secret: secret.into(),
        }
    }

    /// Constant-time password check.
    pub fn authenticate(&self, password: &str) -> bool {
        bool::from(password.as_bytes().ct_eq(self.secret.as_bytes()))
    }

    /// Authenticate, send the `init` payload, then start mirroring.
    ///
    /// `init` is built only after authentication succeeds. A watcher whose
    /// queue cannot take the payload is closed and not added.
    ///
    /// `init` runs under the feed write lock and must not route or mirror.
    pub fn subscribe(
        &self,
        handle: ConnectionHandle,
        password: &str,
        init: impl FnOnce() -> ServerEvent,
    ) -> Result<(), RelayError> {
        if !self.authenticate(password) {
            return Err(RelayError::Auth);
        }
        let conn_id = handle.id();
        let _feed = self.feed.write();
        if let Err(e) = handle.deliver(Arc::new(init().into())) {
            debug!(conn_id, error = e.error_code(), "init payload not delivered");
            handle.close();
            return Err(RelayError::ObserverInit(e));
        }
        self.watchers.insert(conn_id, handle);
        info!(conn_id, watchers = self.watchers.len(), "observer subscribed");
        Ok(())
    }

    pub fn unsubscribe(&self, conn_id: ConnId) -> bool {
        let removed = self.watchers.remove(&conn_id).is_some();
        if removed {
            info!(conn_id, "observer unsubscribed");
        }
        removed
    }

    pub fn is_subscribed(&self, conn_id: ConnId) -> bool {
        self.watchers.contains_key(&conn_id)
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// Hold the feed open for reading across a store-then-mirror sequence.
    pub fn publishing(&self) -> FeedGuard<'_> {
        FeedGuard {
            hub: self,
            _feed: self.feed.read(),
        }
    }

    /// Send `event` to every watcher. Watchers that fail are dropped and
    /// their connections closed.
    pub fn mirror(&self, event: ServerEvent) -> DeliveryReport<ConnId> {
        self.publishing().mirror(event)
    }

    fn mirror_held(&self, event: ServerEvent) -> DeliveryReport<ConnId> {
        let msg: Arc<Outbound> = Arc::new(event.into());
        let mut report = DeliveryReport::new();
        let mut dead = Vec::new();

        for entry in self.watchers.iter() {
            let result = entry.value().deliver(Arc::clone(&msg));
            if result.is_err() {
                dead.push(*entry.key());
            }
            report.record(*entry.key(), result);
        }

        // Removal happens outside the iteration to avoid a shard deadlock.
        for conn_id in dead {
            if let Some((_, handle)) = self.watchers.remove(&conn_id) {
                debug!(conn_id, "dropping unresponsive observer");
                handle.close();
            }
        }
        report
    }
}

impl RegistryObserver for ObserverHub {
    fn on_player_joined(&self, player: &PlayerInfo) {
        self.mirror(ServerEvent::PlayerJoined {
            player: player.clone(),
        });
    }

    fn on_player_left(&self, player: &PlayerInfo) {
        self.mirror(ServerEvent::PlayerLeft {
            player: player.clone(),
        });
    }
}
