#![cfg(feature = "test-harness")]

//! Emitting scenarios checked against the crate's recording transport.

use std::sync::Arc;

use serde_json::{Map, Value};
use siox::{AsyncApi, Namespace, Reply, prelude::*, testing::RecordingTransport};

#[derive(Serialize, Deserialize, JsonSchema, Schema)]
struct Msg {
    text: String,
}

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_server_event_emits_to_room() {
    let transport = RecordingTransport::new();
    let message = ServerEvent::<Msg>::new().with_name("message");
    message
        .emit_fields(&transport, EmitOptions::to_room("r1"), object(json!({"text": "hi"})))
        .unwrap();

    let sent = transport.last().unwrap();
    assert_eq!(&*sent.event, "message");
    assert_eq!(sent.payload, json!({"text": "hi"}));
    assert_eq!(sent.room.as_deref(), Some("r1"));
}

#[test]
fn test_chat_namespace_round_trip() {
    let transport = Arc::new(RecordingTransport::new());
    let sink = transport.clone();

    let mut message = DuplexEvent::<Msg>::similar().with_description("Chat message");
    message.bind_with_event(move |msg: Msg, event: &ServerEvent<Msg>| {
        event.emit(&sink, EmitOptions::to_room("lobby").with_include_self(false), msg)
    });

    let mut chat = Namespace::new("/chat");
    chat.add_named("message", message).unwrap();

    let reply = chat
        .handle(&transport, EmitOptions::to_room("sid-1"), "message", json!({"text": "hi"}))
        .unwrap();
    assert_eq!(reply, Some(Reply::One(Value::Null)));

    let sent = transport.last().unwrap();
    assert_eq!(&*sent.event, "message");
    assert_eq!(sent.namespace.as_deref(), Some("/chat"));
    assert_eq!(sent.room.as_deref(), Some("lobby"));
    assert!(!sent.include_self);

    chat.handle(&transport, EmitOptions::to_room("sid-1"), "message", json!({}))
        .unwrap();
    let error = transport.last().unwrap();
    assert_eq!(&*error.event, "error");
    assert_eq!(error.room.as_deref(), Some("sid-1"));
    assert_eq!(error.payload["code"], json!(400));

    let mut api = AsyncApi::new("Chat", "1.0.0");
    api.add_namespace(&chat);
    let document = api.document();
    assert_eq!(
        document["channels"]["/chat/message"]["description"],
        json!("Chat message")
    );
    assert!(document["components"]["messages"]["Msg"]["payload"].is_object());
}


#[test]
fn test_kept_clone_emits_under_registered_name() {
    let transport = RecordingTransport::new();
    let notice = ServerEvent::<Msg>::new().with_name("notice");
    let mut emitter = notice.clone();

    let mut chat = Namespace::new("/chat");
    chat.add(notice).unwrap();
    emitter.attach_name("announcement");

    emitter
        .emit(&transport, EmitOptions::default(), Msg { text: "hi".into() })
        .unwrap();
    let sent = transport.last().unwrap();
    assert_eq!(&*sent.event, "announcement");
    assert_eq!(sent.namespace.as_deref(), Some("/chat"));
    assert!(chat.contains("announcement"));
    assert!(chat.docs().contains_key("announcement"));
}
