use siox::{AsyncApi, ChannelTransport, Namespace, Reply, prelude::*};

#[derive(Serialize, Deserialize, JsonSchema, Schema)]
struct Msg {
    text: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Schema)]
#[serde(rename_all = "camelCase")]
struct Join {
    room_id: String,
    nickname: Option<String>,
}

#[derive(Serialize, Deserialize, JsonSchema, Schema)]
struct Joined {
    members: u32,
}

#[tokio::main]
async fn main() -> siox::Result {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let (transport, mut rx) = ChannelTransport::new(32);

    let mut message = DuplexEvent::<Msg>::similar().with_description("Chat message");
    let sink = transport.clone();
    message.bind_with_event(move |msg: Msg, event: &ServerEvent<Msg>| {
        event.emit(&sink, EmitOptions::to_room("lobby").with_include_self(false), msg)
    });

    let mut join = ClientEvent::<Join>::new()
        .with_description("Join a room")
        .with_ack::<Joined>(AckOptions::default().with_force_wrap(true));
    join.bind(|join: Join| {
        println!("{} joins {}", join.nickname.as_deref().unwrap_or("anonymous"), join.room_id);
        Ok(json!({"members": 2}))
    });

    let mut chat = Namespace::new("/chat");
    chat.add_named("message", message)?;
    chat.add_named("join", join)?;

    let reply = chat.handle(
        &transport,
        EmitOptions::to_room("sid-1"),
        "join",
        json!({"roomId": "lobby", "nickname": "ann"}),
    )?;
    if let Some(Reply::One(ack)) = reply {
        println!("join ack: {ack}");
    }

    chat.handle(&transport, EmitOptions::to_room("sid-1"), "message", json!({"text": "hi"}))?;
    chat.handle(&transport, EmitOptions::to_room("sid-1"), "message", json!({"txt": "typo"}))?;

    drop(chat);
    drop(transport);
    while let Some(emission) = rx.recv().await {
        println!(
            "-> {} {} room={:?}",
            emission.event,
            emission.payload,
            emission.room.as_deref()
        );
    }

    let mut api = AsyncApi::new("Chat", "1.0.0");
    let mut docs = Namespace::new("/chat");
    docs.add_named("message", DuplexEvent::<Msg>::similar())?;
    docs.add_named("join", ClientEvent::<Join>::new().with_ack::<Joined>(AckOptions::default()))?;
    api.add_namespace(&docs);
    println!("{:#}", api.document());

    Ok(())
}
