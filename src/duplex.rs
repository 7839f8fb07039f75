use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::{
    AckOptions, BaseEvent, ClientEvent, EmitOptions, Handler, Identity, RenderOptions, Result,
    Schema, ServerEvent, Transport,
    doc::{DocMap, MessageDoc},
};

/// A named pairing of one client and one server event.
///
/// Both sides share the duplex's [`Identity`], so renaming or moving the pair
/// to another namespace through any of the three handles is seen by all of
/// them. Binding goes to the client side, emitting to the server side.
///
/// The server side lives in a cell shared by clones of the duplex and by
/// handlers bound with [`DuplexEvent::bind_with_event`], so options set after
/// binding apply to every emit path.
///
/// # Examples
///
/// ```rust,ignore
/// let mut chat = DuplexEvent::<Msg>::similar().with_name("message");
/// chat.bind_with_event(|msg: Msg, event: &ServerEvent<Msg>| {
///     event.emit(&transport, EmitOptions::to_room("lobby"), msg)
/// });
/// ```
pub struct DuplexEvent<C, S = C> {
    identity: Identity,
    client: ClientEvent<C>,
    server: Arc<RwLock<ServerEvent<S>>>,
    description: Option<Arc<str>>,
    additional_docs: Option<DocMap>,
}

impl<C: Schema, S: Schema> DuplexEvent<C, S> {
    /// Pairs two events.
    ///
    /// The pair adopts the client's identity, so clones of the client taken
    /// earlier stay attached. A name or namespace the client lacks is taken
    /// from the server side. The server side is moved onto the client's
    /// identity: clones of it taken before pairing are detached and keep
    /// their old name.
    pub fn new(client: ClientEvent<C>, mut server: ServerEvent<S>) -> Self {
        let identity = client.identity().clone();
        if let (None, Some(name)) = (identity.name(), server.name()) {
            identity.set_name(name);
        }
        if let (None, Some(namespace)) = (identity.namespace(), server.namespace()) {
            identity.set_namespace(namespace);
        }
        server.set_identity(identity.clone());
        Self {
            identity,
            client,
            server: Arc::new(RwLock::new(server)),
            description: None,
            additional_docs: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.attach_name(name);
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.attach_namespace(namespace);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_docs(mut self, additional_docs: DocMap) -> Self {
        self.additional_docs = Some(additional_docs);
        self
    }

    /// Rendering options used when emitting.
    ///
    /// Reaches handlers already bound with [`DuplexEvent::bind_with_event`].
    pub fn with_server_options(self, options: RenderOptions) -> Self {
        self.set_server_options(options);
        self
    }

    pub fn set_server_options(&self, options: RenderOptions) {
        self.server.write().set_options(options);
    }

    pub fn with_ack<A: Schema>(mut self, options: AckOptions) -> Self {
        self.client.attach_ack::<A>(options);
        self
    }

    pub fn client(&self) -> &ClientEvent<C> {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut ClientEvent<C> {
        &mut self.client
    }

    /// A copy of the server side. It shares the pair's identity, its
    /// rendering options are those in effect now.
    pub fn server(&self) -> ServerEvent<S> {
        self.server.read().clone()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn bind<F, R>(&mut self, f: F) -> &mut Self
    where
        F: Fn(C) -> Result<R> + Send + Sync + 'static,
        R: Serialize,
    {
        self.client.bind(f);
        self
    }

    pub fn bind_packed<F, I>(&mut self, f: F) -> &mut Self
    where
        F: Fn(C) -> Result<I> + Send + Sync + 'static,
        I: IntoIterator,
        I::Item: Serialize,
    {
        self.client.bind_packed(f);
        self
    }

    /// Binds a function that also receives this pair's server side, so it can
    /// emit in response.
    ///
    /// The function sees the server side as it is when called, not as it was
    /// when bound.
    pub fn bind_with_event<F, R>(&mut self, f: F) -> &mut Self
    where
        F: Fn(C, &ServerEvent<S>) -> Result<R> + Send + Sync + 'static,
        R: Serialize,
    {
        let server = Arc::clone(&self.server);
        self.client.bind(move |model: C| {
            let server = server.read().clone();
            f(model, &server)
        });
        self
    }

    pub fn attach_ack<A: Schema>(&mut self, options: AckOptions) -> &mut Self {
        self.client.attach_ack::<A>(options);
        self
    }

    pub fn call(&self, data: Value) -> Result<crate::Reply> {
        self.client.call(data)
    }

    pub fn emit<T>(&self, transport: &T, options: EmitOptions, data: S) -> Result<()>
    where
        T: Transport + ?Sized,
    {
        self.server.read().emit(transport, options, data)
    }

    pub fn emit_fields<T>(
        &self,
        transport: &T,
        options: EmitOptions,
        fields: Map<String, Value>,
    ) -> Result<()>
    where
        T: Transport + ?Sized,
    {
        self.server.read().emit_fields(transport, options, fields)
    }
}

impl<S: Schema> DuplexEvent<S, S> {
    /// Builds a client and a server event over the same schema.
    pub fn similar() -> Self {
        Self::new(ClientEvent::new(), ServerEvent::new())
    }

    /// Like [`DuplexEvent::similar`], with an acknowledgment schema on the client side.
    pub fn similar_with_ack<A: Schema>(options: AckOptions) -> Self {
        Self::new(ClientEvent::new().with_ack::<A>(options), ServerEvent::new())
    }
}

impl<C, S> Clone for DuplexEvent<C, S> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            client: self.client.clone(),
            server: Arc::clone(&self.server),
            description: self.description.clone(),
            additional_docs: self.additional_docs.clone(),
        }
    }
}

impl<C, S> std::fmt::Debug for DuplexEvent<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplexEvent")
            .field("client", &self.client)
            .field("server", &*self.server.read())
            .finish()
    }
}

impl<C: Schema, S: Schema> BaseEvent for DuplexEvent<C, S> {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Client (`publish`) and server (`subscribe`) fragments in one object.
    ///
    /// The pair's stored extras, then `additional_docs`, are passed to both sides.
    fn create_doc(&self, namespace: Option<&str>, additional_docs: Option<&DocMap>) -> DocMap {
        let mut extras = self.additional_docs.clone().unwrap_or_default();
        if let Some(docs) = additional_docs {
            extras.extend(docs.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        let mut doc = self.client.create_doc(namespace, Some(&extras));
        doc.extend(self.server.read().create_doc(namespace, Some(&extras)));
        if let Some(description) = &self.description {
            doc.insert("description".into(), json!(description));
        }
        doc
    }

    fn messages(&self) -> Vec<MessageDoc> {
        let mut messages = self.client.messages();
        for message in self.server.read().messages() {
            if !messages.iter().any(|m| m.name == message.name) {
                messages.push(message);
            }
        }
        messages
    }

    fn handler(&self) -> Option<Handler> {
        self.client.handler()
    }
}
