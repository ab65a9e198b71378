//! Integration tests for the observer (god view) feed.

mod common;

use common::TestServer;
use common::server::OBSERVER_PASSWORD;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_wrong_password_then_retry() {
    let server = TestServer::spawn(18771).await.expect("spawn server");

    let mut watcher = server.connect().await.expect("connect");
    let reply = watcher.godview("sheep").await.unwrap();
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "wrong observer password");

    let init = watcher.godview(OBSERVER_PASSWORD).await.unwrap();
    assert_eq!(init["type"], "init");
    let channels = init["channels"].as_object().unwrap();
    assert_eq!(channels.len(), 3);
    assert_eq!(channels["werewolf"]["description"], "Werewolves only");
    assert!(channels["public"]["messages"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_observer_mirrors_all_traffic() {
    let server = TestServer::spawn(18772).await.expect("spawn server");

    let mut watcher = server.connect().await.expect("connect");
    watcher.godview(OBSERVER_PASSWORD).await.unwrap();

    let mut wolf = server.connect().await.expect("connect");
    wolf.register("p1", "Aki", "werewolf").await.unwrap();

    let joined = watcher.recv().await.unwrap();
    assert_eq!(joined["type"], "player_joined");
    assert_eq!(joined["player"]["name"], "Aki");
    assert_eq!(joined["player"]["is_alive"], true);

    wolf.send(json!({"type": "chat", "channel": "werewolf", "content": "psst"}))
        .await
        .unwrap();
    let mirrored = watcher.recv().await.unwrap();
    assert_eq!(mirrored["type"], "channel_message");
    assert_eq!(mirrored["channel"], "werewolf");
    assert_eq!(mirrored["message"]["content"], "psst");
    assert_eq!(mirrored["message"]["player"], "Aki");

    wolf.send(json!({"type": "action", "action": "attack", "target": "Ben"}))
        .await
        .unwrap();
    let action = watcher.recv().await.unwrap();
    assert_eq!(action["type"], "action");
    assert_eq!(action["player_id"], "p1");
    assert_eq!(action["action"]["target"], "Ben");

    // Actions are never echoed to players. The wolf only sees its own chat
    // and the history reply that follows it.
    let own = wolf.recv().await.unwrap();
    assert_eq!(own["content"], "psst");
    let history = wolf.recv().await.unwrap();
    assert_eq!(history["type"], "history");
    assert_eq!(history["channel"], "werewolf");
    assert!(wolf.expect_silence(Duration::from_millis(300)).await);
}

#[tokio::test]
async fn test_start_game_broadcasts_introduction() {
    let server = TestServer::spawn(18773).await.expect("spawn server");

    let mut player = server.connect().await.expect("connect");
    player.register("p1", "Aki", "villager").await.unwrap();

    let mut watcher = server.connect().await.expect("connect");
    watcher.godview(OBSERVER_PASSWORD).await.unwrap();
    watcher.send(json!({"command": "start_game"})).await.unwrap();

    let intro = player.recv().await.unwrap();
    assert_eq!(intro["type"], "system");
    assert_eq!(intro["channel"], "public");
    assert_eq!(intro["phase"], "introduction");
    assert!(intro.get("player").is_none());

    let mirrored = watcher.recv_type("channel_message").await.unwrap();
    assert_eq!(mirrored["message"]["phase"], "introduction");
}
