//! Player sessions and their connection handles.
//!
//! A [`Session`] outlives the transport connection it was created on: when
//! the socket drops, only the [`ConnectionHandle`] is detached. The record
//! itself stays in the registry until an explicit unregister.

use crate::error::DeliveryError;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use wolfrelay_proto::{
    MODERATOR_CHANNEL, Outbound, PUBLIC_CHANNEL, PlayerInfo, Role, WEREWOLF_CHANNEL,
};

/// Server-assigned connection identifier.
pub type ConnId = u64;

/// Send capability for one transport connection.
///
/// Sends never block: a full queue is reported as a delivery failure so a
/// stalled recipient cannot stall the broadcaster.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnId,
    tx: mpsc::Sender<Arc<Outbound>>,
    close: CancellationToken,
}

impl ConnectionHandle {
    pub fn new(id: ConnId, tx: mpsc::Sender<Arc<Outbound>>, close: CancellationToken) -> Self {
        Self { id, tx, close }
    }

    /// Create a handle together with the receiving end of its queue.
    pub fn pair(id: ConnId, capacity: usize) -> (Self, mpsc::Receiver<Arc<Outbound>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(id, tx, CancellationToken::new()), rx)
    }

    #[inline]
    pub fn id(&self) -> ConnId {
        self.id
    }

    /// Queue a message without waiting.
    pub fn deliver(&self, msg: Arc<Outbound>) -> Result<(), DeliveryError> {
        if self.close.is_cancelled() {
            return Err(DeliveryError::Closed);
        }
        self.tx.try_send(msg).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::QueueFull,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    /// Ask the owning connection task to shut down.
    pub fn close(&self) {
        self.close.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.close.is_cancelled() || self.tx.is_closed()
    }

    /// Resolves once [`close`](Self::close) has been called on any clone.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.close.cancelled()
    }
}

/// Identity and liveness state for one participant.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: String,
    pub display_name: String,
    pub role: Role,
    /// Channels this session receives; fixed at registration time.
    pub member_of: BTreeSet<String>,
    pub alive: bool,
    connection: Option<ConnectionHandle>,
    /// Registration order, used for stable snapshots.
    pub(crate) seq: u64,
}

impl Session {
    pub fn new(
        identity: String,
        display_name: String,
        role: Role,
        connection: ConnectionHandle,
        seq: u64,
    ) -> Self {
        let member_of = membership_for(&role);
        Self {
            identity,
            display_name,
            role,
            member_of,
            alive: true,
            connection: Some(connection),
            seq,
        }
    }

    /// Public projection sent to observers.
    pub fn info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.identity.clone(),
            name: self.display_name.clone(),
            role: self.role.clone(),
            is_alive: self.alive,
        }
    }

    #[inline]
    pub fn is_member(&self, channel: &str) -> bool {
        self.member_of.contains(channel)
    }

    pub fn connection(&self) -> Option<&ConnectionHandle> {
        self.connection.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.as_ref().is_some_and(|c| !c.is_closed())
    }

    /// Deliver over the current handle.
    pub fn deliver(&self, msg: Arc<Outbound>) -> Result<(), DeliveryError> {
        match &self.connection {
            Some(conn) => conn.deliver(msg),
            None => Err(DeliveryError::Detached),
        }
    }

    /// Install a new handle, returning the superseded one.
    pub(crate) fn replace_connection(
        &mut self,
        connection: ConnectionHandle,
    ) -> Option<ConnectionHandle> {
        self.connection.replace(connection)
    }

    /// Drop the handle if it is still `conn_id`. A reconnection may already
    /// have installed a newer one, which must be left alone.
    pub(crate) fn detach(&mut self, conn_id: ConnId) -> bool {
        if self.connection.as_ref().is_some_and(|c| c.id() == conn_id) {
            self.connection = None;
            true
        } else {
            false
        }
    }

    /// Re-derive the role-dependent fields after a rename-by-identity.
    pub(crate) fn reassign(&mut self, display_name: String, role: Role) {
        self.member_of = membership_for(&role);
        self.display_name = display_name;
        self.role = role;
    }
}

/// Every session joins `public`; werewolves and moderators additionally
/// join their own channel.
pub fn membership_for(role: &Role) -> BTreeSet<String> {
    let mut channels = BTreeSet::from([PUBLIC_CHANNEL.to_string()]);
    match role {
        Role::Werewolf => {
            channels.insert(WEREWOLF_CHANNEL.to_string());
        }
        Role::Moderator => {
            channels.insert(MODERATOR_CHANNEL.to_string());
        }
        _ => {}
    }
    channels
}
