use serde_json::{Map, Value};

use crate::{
    BaseEvent, EmitOptions, Emission, Error, Event, Identity, RenderOptions, Result, Schema,
    Transport,
    doc::{DocMap, MessageDoc},
    render::render_model,
    schema::from_fields,
};

/// An outbound event: a message flowing from the application to remote callers.
///
/// Payloads are rendered with the event's [`RenderOptions`] and handed to a
/// [`Transport`] as an [`Emission`]. Instances may be built from field names or
/// aliases alike (see [`ServerEvent::emit_fields`]).
///
/// # Examples
///
/// ```rust,ignore
/// let message = ServerEvent::<Msg>::new().with_name("message");
/// message.emit(&transport, EmitOptions::to_room("r1"), Msg { text: "hi".into() })?;
/// ```
pub struct ServerEvent<S> {
    event: Event<S>,
    options: RenderOptions,
}

impl<S: Schema> ServerEvent<S> {
    pub fn new() -> Self {
        Self {
            event: Event::new(),
            options: RenderOptions::default(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.event = self.event.with_name(name);
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.event = self.event.with_namespace(namespace);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.event = self.event.with_description(description);
        self
    }

    pub fn with_docs(mut self, additional_docs: DocMap) -> Self {
        self.event = self.event.with_docs(additional_docs);
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn event(&self) -> &Event<S> {
        &self.event
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub(crate) fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    pub(crate) fn set_identity(&mut self, identity: Identity) {
        self.event.identity = identity;
    }

    /// Renders `data` and dispatches it through `transport`.
    ///
    /// The namespace is taken from `options`, falling back to the event's own.
    pub fn emit<T>(&self, transport: &T, options: EmitOptions, data: S) -> Result<()>
    where
        T: Transport + ?Sized,
    {
        let name = self.event.identity.name().ok_or(Error::Unnamed)?;
        let payload = render_model(&data, &self.options)?;
        let options = EmitOptions {
            namespace: options.namespace.or_else(|| self.event.identity.namespace()),
            ..options
        };
        tracing::debug!(event = %name, room = ?options.room, "emitting server event");
        transport.emit(Emission::new(name, payload, options))
    }

    /// Builds the payload from `fields`, keyed by field names or aliases, then emits it.
    pub fn emit_fields<T>(
        &self,
        transport: &T,
        options: EmitOptions,
        fields: Map<String, Value>,
    ) -> Result<()>
    where
        T: Transport + ?Sized,
    {
        let data = from_fields::<S>(fields)?;
        self.emit(transport, options, data)
    }
}

impl<S: Schema> Default for ServerEvent<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for ServerEvent<S> {
    fn clone(&self) -> Self {
        Self {
            event: self.event.clone(),
            options: self.options.clone(),
        }
    }
}

impl<S> std::fmt::Debug for ServerEvent<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerEvent")
            .field("event", &self.event)
            .field("options", &self.options)
            .finish()
    }
}

impl<S: Schema> BaseEvent for ServerEvent<S> {
    fn identity(&self) -> &Identity {
        &self.event.identity
    }

    fn create_doc(&self, namespace: Option<&str>, additional_docs: Option<&DocMap>) -> DocMap {
        let mut doc = DocMap::new();
        doc.insert(
            "subscribe".into(),
            Value::Object(self.event.create_doc(namespace, additional_docs)),
        );
        doc
    }

    fn messages(&self) -> Vec<MessageDoc> {
        vec![self.event.message()]
    }
}
