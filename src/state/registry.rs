//! Player registry.
//!
//! All sessions live behind one mutex, so the duplicate-name check and the
//! insert it guards are a single atomic step. Observer callbacks and closing
//! superseded connections happen after the lock is released.

use crate::error::RelayError;
use crate::state::observer::{NullObserver, RegistryObserver};
use crate::state::session::{ConnId, ConnectionHandle, Session};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use wolfrelay_proto::{PlayerInfo, Role};

/// How a successful registration was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A new session was created.
    Created,
    /// The identity already held this name; its connection was replaced.
    Reconnected,
    /// The identity existed under another name and moved to a free one.
    Renamed,
}

/// Outcome of [`Registry::register`].
#[derive(Debug, Clone)]
pub struct Registered {
    pub player: PlayerInfo,
    pub kind: Registration,
}

#[derive(Default)]
struct RegistryInner {
    sessions: HashMap<String, Session>,
    next_seq: u64,
}

impl RegistryInner {
    fn identity_holding(&self, display_name: &str) -> Option<&str> {
        self.sessions
            .values()
            .find(|s| s.display_name == display_name)
            .map(|s| s.identity.as_str())
    }
}

/// Identity → session table.
pub struct Registry {
    inner: Mutex<RegistryInner>,
    observer: Arc<dyn RegistryObserver>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Arc::new(NullObserver))
    }
}

impl Registry {
    pub fn new(observer: Arc<dyn RegistryObserver>) -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
            observer,
        }
    }

    /// Register `display_name` for `identity` on `connection`.
    ///
    /// A name held by a different identity is rejected. Re-registering the
    /// same identity under its own name is a reconnection: the new handle
    /// replaces the old one, the old connection is closed, and every other
    /// session field is kept as it was.
    pub fn register(
        &self,
        identity: &str,
        display_name: &str,
        role: Role,
        connection: ConnectionHandle,
    ) -> Result<Registered, RelayError> {
        let mut superseded = None;
        let registered = {
            let mut inner = self.inner.lock();

            if let Some(holder) = inner.identity_holding(display_name)
                && holder != identity
            {
                return Err(RelayError::DuplicateName(display_name.to_string()));
            }

            let next_seq = inner.next_seq;
            let kind = match inner.sessions.get_mut(identity) {
                Some(session) => {
                    let kind = if session.display_name == display_name {
                        Registration::Reconnected
                    } else {
                        session.reassign(display_name.to_string(), role);
                        Registration::Renamed
                    };
                    let new_id = connection.id();
                    superseded = session
                        .replace_connection(connection)
                        .filter(|old| old.id() != new_id);
                    kind
                }
                None => {
                    inner.sessions.insert(
                        identity.to_string(),
                        Session::new(
                            identity.to_string(),
                            display_name.to_string(),
                            role,
                            connection,
                            next_seq,
                        ),
                    );
                    inner.next_seq += 1;
                    Registration::Created
                }
            };

            let player = inner
                .sessions
                .get(identity)
                .map(Session::info)
                .ok_or_else(|| RelayError::SenderUnresolved(identity.to_string()))?;
            Registered { player, kind }
        };

        if let Some(old) = superseded {
            debug!(identity, conn_id = old.id(), "closing superseded connection");
            old.close();
        }

        info!(
            identity,
            name = %registered.player.name,
            role = %registered.player.role,
            kind = ?registered.kind,
            "player registered"
        );
        self.observer.on_player_joined(&registered.player);
        Ok(registered)
    }

    /// Remove a session entirely. The connection is left for the caller.
    pub fn unregister(&self, identity: &str) -> Option<PlayerInfo> {
        let removed = self.inner.lock().sessions.remove(identity)?;
        let player = removed.info();
        info!(identity, name = %player.name, "player unregistered");
        self.observer.on_player_left(&player);
        Some(player)
    }

    /// Detach `conn_id` from the session if it is still the current handle.
    pub fn detach(&self, identity: &str, conn_id: ConnId) -> bool {
        let mut inner = self.inner.lock();
        let detached = inner
            .sessions
            .get_mut(identity)
            .is_some_and(|s| s.detach(conn_id));
        if detached {
            debug!(identity, conn_id, "session detached");
        }
        detached
    }

    pub fn get(&self, identity: &str) -> Option<Session> {
        self.inner.lock().sessions.get(identity).cloned()
    }

    pub fn find_by_display_name(&self, display_name: &str) -> Option<Session> {
        self.inner
            .lock()
            .sessions
            .values()
            .find(|s| s.display_name == display_name)
            .cloned()
    }

    /// Every session's public projection, in registration order.
    pub fn snapshot(&self) -> Vec<PlayerInfo> {
        let inner = self.inner.lock();
        let mut sessions: Vec<&Session> = inner.sessions.values().collect();
        sessions.sort_by_key(|s| s.seq);
        sessions.into_iter().map(Session::info).collect()
    }

    /// Identities and current handles of every member of `channel`.
    pub fn members_of(&self, channel: &str) -> Vec<(String, Option<ConnectionHandle>)> {
        let inner = self.inner.lock();
        let mut members: Vec<&Session> = inner
            .sessions
            .values()
            .filter(|s| s.is_member(channel))
            .collect();
        members.sort_by_key(|s| s.seq);
        members
            .into_iter()
            .map(|s| (s.identity.clone(), s.connection().cloned()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().sessions.is_empty()
    }
}
