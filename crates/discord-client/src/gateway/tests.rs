use tokio::sync::mpsc;

use super::connection::{HeartbeatState, PayloadAction};
use super::*;

#[test]
fn message_create_payload_parses() {
    let data = serde_json::json!({
        "id": "1190000000000000000",
        "channel_id": "1100",
        "type": 0,
        "content": "Strands #12\n💡🔵🔵",
        "author": { "id": "7", "username": "bob" },
        "mentions": []
    });
    let message = GatewayClient::parse_message_create(&data).unwrap();
    assert_eq!(message.channel_id, "1100");
    assert_eq!(message.author.username, "bob");
}

#[test]
fn message_create_without_author_is_rejected() {
    let data = serde_json::json!({ "id": "1", "content": "hi" });
    assert!(GatewayClient::parse_message_create(&data).is_none());
}

#[test]
fn backoff_doubles_up_to_cap() {
    assert_eq!(GatewayClient::backoff_duration(1), Duration::from_secs(2));
    assert_eq!(GatewayClient::backoff_duration(3), Duration::from_secs(8));
    assert_eq!(GatewayClient::backoff_duration(10), MAX_BACKOFF);
}

#[tokio::test]
async fn dispatch_forwards_message_and_tracks_sequence() {
    let (tx, mut rx) = mpsc::channel(4);
    let mut sequence = None;
    let text = r#"{"op":0,"s":42,"t":"MESSAGE_CREATE","d":{
        "id":"5","channel_id":"9","type":0,"content":"x",
        "author":{"id":"1","username":"carol"}}}"#;
    let action = GatewayClient::handle_payload(text, &mut sequence, &tx)
        .await
        .unwrap();
    assert_eq!(action, PayloadAction::Continue);
    assert_eq!(sequence, Some(42));
    assert_eq!(rx.recv().await.unwrap().author.username, "carol");
}

#[tokio::test]
async fn control_opcodes_map_to_actions() {
    let (tx, _rx) = mpsc::channel(1);
    let mut sequence = Some(3);
    let cases = [
        (r#"{"op":1,"d":null}"#, PayloadAction::HeartbeatNow),
        (r#"{"op":7,"d":null}"#, PayloadAction::Reconnect),
        (r#"{"op":9,"d":false}"#, PayloadAction::InvalidSession),
        (r#"{"op":11}"#, PayloadAction::HeartbeatAcked),
    ];
    for (text, expected) in cases {
        let action = GatewayClient::handle_payload(text, &mut sequence, &tx)
            .await
            .unwrap();
        assert_eq!(action, expected, "{text}");
    }
    assert_eq!(sequence, Some(3));
}

#[tokio::test]
async fn missing_ack_fails_the_next_beat() {
    let (tx, _rx) = mpsc::channel(1);
    let mut sequence = None;
    let mut state = HeartbeatState::default();

    state.beat().unwrap();
    let action = GatewayClient::handle_payload(r#"{"op":11}"#, &mut sequence, &tx)
        .await
        .unwrap();
    assert_eq!(action, PayloadAction::HeartbeatAcked);
    state.ack();

    // Acked, so the next beat goes out; nothing answers it.
    state.beat().unwrap();
    let typing = r#"{"op":0,"s":5,"t":"TYPING_START","d":{}}"#;
    let action = GatewayClient::handle_payload(typing, &mut sequence, &tx)
        .await
        .unwrap();
    assert_eq!(action, PayloadAction::Continue);
    assert!(matches!(state.beat(), Err(DiscordError::Timeout)));
}

#[test]
fn only_repeated_failures_warrant_a_restart() {
    assert!(GatewayExit::TooManyFailures.should_restart());
    assert!(!GatewayExit::AuthFailed.should_restart());
    assert!(!GatewayExit::Shutdown.should_restart());
}
