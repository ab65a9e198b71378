//! The top-level relay state shared by every connection task.

use crate::config::Config;
use crate::error::RelayError;
use crate::state::channel::{ChannelStore, DEFAULT_HISTORY_CAPACITY};
use crate::state::observer::ObserverHub;
use crate::state::registry::Registry;
use crate::state::router::Router;
use crate::state::session::{ConnId, ConnectionHandle};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use wolfrelay_proto::ServerEvent;

/// Registry, channel store and observer hub, constructed once at startup
/// and handed to connection tasks behind an `Arc`.
pub struct Relay {
    server_name: String,
    registry: Registry,
    channels: ChannelStore,
    observers: Arc<ObserverHub>,
    conn_ids: AtomicU64,
}

impl Relay {
    pub fn new(config: &Config) -> Self {
        Self::with_settings(
            &config.server.name,
            &config.observer.password,
            config.history.capacity,
        )
    }

    pub fn with_settings(server_name: &str, observer_password: &str, history: usize) -> Self {
        let observers = Arc::new(ObserverHub::new(observer_password));
        Self {
            server_name: server_name.to_string(),
            registry: Registry::new(observers.clone()),
            channels: ChannelStore::new(history),
            observers,
            conn_ids: AtomicU64::new(1),
        }
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn channels(&self) -> &ChannelStore {
        &self.channels
    }

    pub fn observers(&self) -> &ObserverHub {
        &self.observers
    }

    pub fn router(&self) -> Router<'_> {
        Router::new(self)
    }

    pub fn next_conn_id(&self) -> ConnId {
        self.conn_ids.fetch_add(1, Ordering::Relaxed)
    }

    /// Full registry snapshot plus every channel log.
    pub fn init_payload(&self) -> ServerEvent {
        ServerEvent::Init {
            players: self.registry.snapshot(),
            channels: self.channels.snapshot(),
        }
    }

    /// Authenticate an observer and send it the `init` payload.
    pub fn subscribe_observer(
        &self,
        handle: ConnectionHandle,
        password: &str,
    ) -> Result<(), RelayError> {
        self.observers
            .subscribe(handle, password, || self.init_payload())
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::with_settings("wolfrelay", "wolf", DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::router::Sender;
    use std::time::Duration;
    use wolfrelay_proto::{Outbound, Role};

    #[test]
    fn connection_ids_are_unique() {
        let relay = Relay::default();
        let a = relay.next_conn_id();
        let b = relay.next_conn_id();
        assert_ne!(a, b);
    }

    #[test]
    fn init_payload_contains_players_and_logs() {
        let relay = Relay::default();
        let (handle, _rx) = ConnectionHandle::pair(relay.next_conn_id(), 8);
        relay
            .registry()
            .register("p1", "Aki", Role::Werewolf, handle)
            .unwrap();
        relay
            .router()
            .route_chat(Sender::Identity("p1"), "werewolf", "hunt")
            .unwrap();

        match relay.init_payload() {
            ServerEvent::Init { players, channels } => {
                assert_eq!(players.len(), 1);
                assert_eq!(players[0].name, "Aki");
                assert_eq!(channels.len(), 3);
                assert_eq!(channels["werewolf"].messages.len(), 1);
                assert!(channels["public"].messages.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn unregister_emits_one_player_left() {
        let relay = Relay::default();
        let (handle, _rx) = ConnectionHandle::pair(relay.next_conn_id(), 8);
        relay
            .registry()
            .register("p1", "Aki", Role::Villager, handle)
            .unwrap();

        let (watcher, mut events) = ConnectionHandle::pair(relay.next_conn_id(), 8);
        relay.subscribe_observer(watcher, "wolf").unwrap();
        relay.registry().unregister("p1");
        relay.registry().unregister("p1");

        assert!(matches!(
            &*events.recv().await.unwrap(),
            Outbound::Event(ServerEvent::Init { .. })
        ));
        assert!(matches!(
            &*events.recv().await.unwrap(),
            Outbound::Event(ServerEvent::PlayerLeft { player }) if player.id == "p1"
        ));
        assert!(events.try_recv().is_err());
        assert!(relay.registry().snapshot().is_empty());
    }

    #[test]
    fn chat_routed_while_subscribing_is_seen_exactly_once() {
        let relay = Relay::default();
        let relay = &relay;
        let (handle, _rx) = ConnectionHandle::pair(relay.next_conn_id(), 8);
        relay
            .registry()
            .register("p1", "Aki", Role::Villager, handle)
            .unwrap();
        let (watcher, mut events) = ConnectionHandle::pair(relay.next_conn_id(), 8);
        let (snapshot_taken, wait_for_snapshot) = std::sync::mpsc::channel();

        std::thread::scope(|s| {
            s.spawn(move || {
                wait_for_snapshot.recv().unwrap();
                relay
                    .router()
                    .route_chat(Sender::Identity("p1"), "public", "late")
                    .unwrap();
            });
            relay
                .observers()
                .subscribe(watcher, "wolf", || {
                    let init = relay.init_payload();
                    snapshot_taken.send(()).unwrap();
                    // Leave the chat time to reach the store before the
                    // watcher is inserted.
                    std::thread::sleep(Duration::from_millis(50));
                    init
                })
                .unwrap();
        });

        let mut seen = 0;
        while let Ok(msg) = events.try_recv() {
            match &*msg {
                Outbound::Event(ServerEvent::Init { channels, .. }) => {
                    seen += channels["public"]
                        .messages
                        .iter()
                        .filter(|m| m.content == "late")
                        .count();
                }
                Outbound::Event(ServerEvent::ChannelMessage { message, .. })
                    if message.content == "late" =>
                {
                    seen += 1;
                }
                _ => {}
            }
        }
        assert_eq!(seen, 1);
        assert_eq!(relay.channels().recent("public", 0).unwrap().len(), 1);
    }

    #[test]
    fn bad_observer_password_is_refused() {
        let relay = Relay::default();
        let (watcher, _rx) = ConnectionHandle::pair(relay.next_conn_id(), 8);
        assert_eq!(
            relay.subscribe_observer(watcher, "sheep"),
            Err(RelayError::Auth)
        );
        assert_eq!(relay.observers().watcher_count(), 0);
    }
}
