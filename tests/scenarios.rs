//! End-to-end behaviour of client, server and duplex events.

use std::sync::Arc;

use serde_json::Value;
use siox::{ChannelTransport, Error, Reply, prelude::*};

#[derive(Debug, PartialEq, Serialize, Deserialize, JsonSchema, Schema)]
struct Ping {
    value: i64,
}

#[derive(Serialize, Deserialize, JsonSchema, Schema)]
struct Pong {
    value: i64,
}

#[derive(Serialize, Deserialize, JsonSchema, Schema)]
struct Msg {
    text: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Schema)]
#[serde(rename_all = "camelCase")]
struct Account {
    user_name: String,
    password: String,
    nickname: Option<String>,
}

#[derive(Serialize, Deserialize, JsonSchema, Schema)]
struct Pair {
    first: i64,
    second: String,
}

#[test]
fn test_ping_without_ack() {
    let mut ping = ClientEvent::<Ping>::new().with_name("ping");
    ping.bind(|ping: Ping| Ok(ping.value + 1));
    assert_eq!(ping.call(json!({"value": 1})).unwrap(), Reply::One(json!(2)));
}

#[test]
fn test_pong_ack_force_wrap() {
    let mut ping = ClientEvent::<Ping>::new()
        .with_ack::<Pong>(AckOptions::default().with_force_wrap(true));
    ping.bind(|_: Ping| Ok(5));
    assert_eq!(
        ping.call(json!({"value": 1})).unwrap(),
        Reply::One(json!({"data": {"value": 5}}))
    );
}

#[test]
fn test_parse_returns_declared_fields() {
    let event = ClientEvent::<Account>::new();
    let fields = event
        .parse(json!({"userName": "ann", "password": "x", "extra": 1}))
        .unwrap();
    assert_eq!(
        Value::Object(fields),
        json!({"userName": "ann", "password": "x", "nickname": null})
    );
}

#[test]
fn test_invalid_payload_never_reaches_handler() {
    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = calls.clone();
    let mut ping = ClientEvent::<Ping>::new();
    ping.bind(move |ping: Ping| {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(ping.value)
    });

    for payload in [json!({}), json!({"value": "1"}), json!("ping")] {
        assert!(matches!(ping.call(payload), Err(Error::Validation { .. })));
    }
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn test_ack_render_options() {
    let options = AckOptions::default().with_render(
        RenderOptions::default()
            .with_exclude(["password"])
            .with_by_alias(false),
    );
    let mut login = ClientEvent::<Msg>::new().with_ack::<Account>(options);
    login.bind(|msg: Msg| {
        Ok(json!({"userName": msg.text, "password": "secret", "nickname": null}))
    });

    assert_eq!(
        login.call(json!({"text": "ann"})).unwrap(),
        Reply::One(json!({"user_name": "ann"}))
    );
}

#[test]
fn test_packed_ack() {
    let mut event = ClientEvent::<Ping>::new().with_ack::<Pair>(AckOptions::default());
    event.bind_packed(|ping: Ping| Ok(vec![json!(ping.value), json!("two")]));
    assert_eq!(
        event.call(json!({"value": 1})).unwrap(),
        Reply::Many(vec![json!(1), json!("two")])
    );

    event.bind_packed(|_: Ping| Ok(vec![json!("not a number"), json!("two")]));
    assert!(matches!(
        event.call(json!({"value": 1})),
        Err(Error::Validation { .. })
    ));
}

#[test]
fn test_attach_ack_twice_replaces() {
    let mut event = ClientEvent::<Ping>::new();
    event.bind(|ping: Ping| Ok(ping.value));
    event.attach_ack::<Pong>(AckOptions::default().with_force_wrap(true));
    event.attach_ack::<Pong>(AckOptions::default().with_force_wrap(true));
    assert_eq!(
        event.call(json!({"value": 3})).unwrap(),
        Reply::One(json!({"data": {"value": 3}}))
    );
}

#[test]
fn test_duplex_attach_name() {
    let mut duplex = DuplexEvent::<Msg>::similar();
    duplex.attach_name("message");
    assert_eq!(duplex.client().name().as_deref(), Some("message"));
    assert_eq!(duplex.server().name().as_deref(), Some("message"));
}

#[test]
fn test_doc_namespace_tag_only_without_call_namespace() {
    let event = ClientEvent::<Ping>::new()
        .with_name("ping")
        .with_namespace("/game");
    let tagged = Value::Object(event.create_doc(None, None));
    let untagged = Value::Object(event.create_doc(Some("/game"), None));
    assert_eq!(tagged["publish"]["tags"], json!([{"name": "namespace-/game"}]));
    assert!(untagged["publish"].get("tags").is_none());
    assert!(untagged["publish"].get("description").is_none());
}

#[tokio::test]
async fn test_channel_transport_delivers_emissions() {
    let (transport, mut rx) = ChannelTransport::new(4);
    let message = ServerEvent::<Msg>::new().with_name("message");
    message
        .emit(&transport, EmitOptions::default(), Msg { text: "hi".into() })
        .unwrap();

    let emission = rx.recv().await.unwrap();
    assert_eq!(&*emission.event, "message");
    assert_eq!(emission.payload, json!({"text": "hi"}));
}
