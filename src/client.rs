use std::{borrow::Cow, sync::Arc};

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::{
    BaseEvent, Error, Event, Identity, RenderOptions, Result, Schema,
    doc::{DocMap, MessageDoc},
    render::{render_model, render_packed, render_value},
    schema::validate,
};

/// Acknowledgment handed back to the transport after a client event was handled.
///
/// The shape is fixed when the handler is bound: [`ClientEvent::bind`] always
/// produces [`Reply::One`], [`ClientEvent::bind_packed`] always [`Reply::Many`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A single acknowledgment value.
    One(Value),
    /// Several positional acknowledgment values.
    Many(Vec<Value>),
}

impl Reply {
    /// Collapses the reply into one JSON value; `Many` becomes an array.
    pub fn into_value(self) -> Value {
        match self {
            Reply::One(value) => value,
            Reply::Many(values) => Value::Array(values),
        }
    }
}

/// Transport-facing callable produced by binding a client event.
///
/// Takes the raw incoming payload, returns the acknowledgment. Validation errors
/// are returned unchanged; translating them is the host's job (see
/// [`Namespace::handle`](crate::Namespace::handle)).
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(Value) -> Result<Reply> + Send + Sync>);

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Reply> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn call(&self, data: Value) -> Result<Reply> {
        (self.0)(data)
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Handler")
    }
}

/// Rendering options for acknowledgments.
///
/// # Examples
///
/// ```rust
/// use siox::{AckOptions, RenderOptions};
///
/// let options = AckOptions::default()
///     .with_render(RenderOptions::default().with_exclude(["secret"]))
///     .with_force_wrap(true);   // single replies become {"data": ...}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AckOptions {
    pub render: RenderOptions,

    /// Wrap single replies in a `{"data": ...}` envelope.
    /// Default: false
    pub force_wrap: bool,
}

impl AckOptions {
    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    pub fn with_force_wrap(mut self, force_wrap: bool) -> Self {
        self.force_wrap = force_wrap;
        self
    }
}

type BoundFn<S> = Arc<dyn Fn(S) -> Result<Reply> + Send + Sync>;
type AckFn = Arc<dyn Fn(Reply) -> Result<Reply> + Send + Sync>;

#[derive(Clone)]
struct Ack {
    schema: Cow<'static, str>,
    options: AckOptions,
    render: AckFn,
}

impl Ack {
    fn new<A: Schema>(options: AckOptions) -> Self {
        let render_options = options.render.clone();
        let force_wrap = options.force_wrap;
        let render: AckFn = Arc::new(move |reply: Reply| -> Result<Reply> {
            match reply {
                Reply::One(value) => {
                    let rendered = render_value::<A>(single_value::<A>(value), &render_options)?;
                    Ok(Reply::One(if force_wrap {
                        json!({ "data": rendered })
                    } else {
                        rendered
                    }))
                }
                Reply::Many(values) => {
                    Ok(Reply::Many(render_packed::<A>(values, &render_options)?))
                }
            }
        });
        Self {
            schema: A::name(),
            options,
            render,
        }
    }
}

/// A bare value returned for a single-field ack schema stands for that field.
fn single_value<A: Schema>(value: Value) -> Value {
    match (value, A::fields()) {
        (Value::Object(map), _) => Value::Object(map),
        (value, [field]) => {
            let mut map = Map::new();
            map.insert(field.to_string(), value);
            Value::Object(map)
        }
        (value, _) => value,
    }
}

fn to_json<R: Serialize>(value: &R) -> Result<Value> {
    serde_json::to_value(value).map_err(|source| Error::Render {
        schema: Cow::Borrowed(std::any::type_name::<R>()),
        source,
    })
}

/// An inbound event: a message flowing from a remote caller into the application.
///
/// Incoming data is validated against `S` before the bound function sees it.
/// If an acknowledgment schema is attached, the function's result is validated
/// and rendered against it before being handed back to the transport.
///
/// # Examples
///
/// ```rust,ignore
/// let mut ping = ClientEvent::<Ping>::new().with_name("ping");
/// ping.bind(|ping: Ping| Ok(ping.value + 1));
///
/// let reply = ping.call(json!({"value": 1}))?;
/// assert_eq!(reply, Reply::One(json!(2)));
/// ```
pub struct ClientEvent<S> {
    event: Event<S>,
    bound: Option<BoundFn<S>>,
    ack: Option<Ack>,
}

impl<S: Schema> ClientEvent<S> {
    pub fn new() -> Self {
        Self {
            event: Event::new(),
            bound: None,
            ack: None,
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

    pub fn with_ack<A: Schema>(mut self, options: AckOptions) -> Self {
        self.attach_ack::<A>(options);
        self
    }

    pub fn event(&self) -> &Event<S> {
        &self.event
    }

    pub(crate) fn set_identity(&mut self, identity: Identity) {
        self.event.identity = identity;
    }

    /// Validates `raw` against `S` and returns its fields by serialized name.
    pub fn parse(&self, raw: Value) -> Result<Map<String, Value>> {
        let model = self.parse_model(raw)?;
        match render_model(&model, &RenderOptions::default().with_exclude_none(false))? {
            Value::Object(fields) => Ok(fields),
            _ => Err(Error::Validation {
                schema: S::name(),
                source: serde::de::Error::custom("schema doesn't describe an object"),
            }),
        }
    }

    pub fn parse_model(&self, raw: Value) -> Result<S> {
        validate(raw)
    }

    /// Binds a function returning a single value.
    ///
    /// Replaces any previously bound function.
    pub fn bind<F, R>(&mut self, f: F) -> &mut Self
    where
        F: Fn(S) -> Result<R> + Send + Sync + 'static,
        R: Serialize,
    {
        self.bound = Some(Arc::new(move |model: S| -> Result<Reply> {
            Ok(Reply::One(to_json(&f(model)?)?))
        }));
        self
    }

    /// Binds a function returning an ordered sequence of values.
    ///
    /// With an ack schema, the i-th value is validated as the schema's i-th field.
    pub fn bind_packed<F, I>(&mut self, f: F) -> &mut Self
    where
        F: Fn(S) -> Result<I> + Send + Sync + 'static,
        I: IntoIterator,
        I::Item: Serialize,
    {
        self.bound = Some(Arc::new(move |model: S| -> Result<Reply> {
            let values = f(model)?
                .into_iter()
                .map(|value| to_json(&value))
                .collect::<Result<Vec<_>>>()?;
            Ok(Reply::Many(values))
        }));
        self
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Sets the acknowledgment schema and its rendering options.
    ///
    /// Acknowledgment rendering is applied when the [`Handler`] is produced, so
    /// calling this again (before or after binding) replaces the previous ack
    /// schema instead of stacking a second rendering step on top of it.
    pub fn attach_ack<A: Schema>(&mut self, options: AckOptions) -> &mut Self {
        self.ack = Some(Ack::new::<A>(options));
        self
    }

    pub fn detach_ack(&mut self) -> &mut Self {
        self.ack = None;
        self
    }

    /// Name of the attached acknowledgment schema.
    pub fn ack_schema(&self) -> Option<&str> {
        self.ack.as_ref().map(|ack| ack.schema.as_ref())
    }

    pub fn ack_options(&self) -> Option<&AckOptions> {
        self.ack.as_ref().map(|ack| &ack.options)
    }

    /// Invokes the bound function the way the transport would.
    pub fn call(&self, data: Value) -> Result<Reply> {
        match self.bound_handler() {
            Some(handler) => handler.call(data),
            None => Err(Error::NotBound(
                self.event.identity.name().unwrap_or_else(|| S::name().into()),
            )),
        }
    }

    fn bound_handler(&self) -> Option<Handler> {
        let bound = self.bound.clone()?;
        let ack = self.ack.as_ref().map(|ack| ack.render.clone());
        let identity = self.event.identity.clone();
        Some(Handler::new(move |data| {
            tracing::debug!(event = ?identity.name(), "handling client event");
            let reply = bound(validate::<S>(data)?)?;
            match &ack {
                Some(render) => render(reply),
                None => Ok(reply),
            }
        }))
    }
}

impl<S: Schema> Default for ClientEvent<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for ClientEvent<S> {
    fn clone(&self) -> Self {
        Self {
            event: self.event.clone(),
            bound: self.bound.clone(),
            ack: self.ack.clone(),
        }
    }
}

impl<S> std::fmt::Debug for ClientEvent<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientEvent")
            .field("event", &self.event)
            .field("bound", &self.bound.is_some())
            .field("ack", &self.ack.as_ref().map(|ack| &ack.schema))
            .finish()
    }
}

impl<S: Schema> BaseEvent for ClientEvent<S> {
    fn identity(&self) -> &Identity {
        &self.event.identity
    }

    fn create_doc(&self, namespace: Option<&str>, additional_docs: Option<&DocMap>) -> DocMap {
        let mut doc = DocMap::new();
        doc.insert(
            "publish".into(),
            Value::Object(self.event.create_doc(namespace, additional_docs)),
        );
        doc
    }

    fn messages(&self) -> Vec<MessageDoc> {
        vec![self.event.message()]
    }

    fn handler(&self) -> Option<Handler> {
        self.bound_handler()
    }
}
