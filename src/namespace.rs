use std::sync::Arc;

use serde_json::{Value, json};

use crate::{
    BaseEvent, Config, EmitOptions, Emission, Error, Handler, Reply, Result, Transport,
    doc::{DocMap, MessageDoc},
};

struct Entry {
    event: Box<dyn BaseEvent>,
    handler: Option<Handler>,
}

impl Entry {
    fn is_named(&self, name: &str) -> bool {
        self.event.name().as_deref() == Some(name)
    }
}

/// A group of named events served under one namespace.
///
/// - Register events with `add(event)` or `add_named(name, event)`.
/// - Route incoming messages with `dispatch(event, data)`, or `handle(...)` to
///   have failures reported back to the caller.
/// - Collect documentation with `docs()` and `messages()`.
///
/// Registering attaches the namespace's path to the event. Keep a clone of a
/// server or duplex event before adding it if you need to emit through it;
/// clones share name and namespace with the registered event. Names are read
/// from the events on every lookup, so renaming a registered event through a
/// clone moves its dispatch key and its documentation channel along with it.
///
/// The handler of a client or duplex event is captured when it is added, so
/// bind it (and attach its ack schema) first.
pub struct Namespace {
    path: Arc<str>,
    config: Arc<Config>,
    entries: Vec<Entry>,
}

impl Namespace {
    pub fn new(path: &str) -> Self {
        Self::with_config(path, Config::default())
    }

    pub fn with_config(path: &str, config: Config) -> Self {
        Self {
            path: Arc::from(path),
            config: Arc::new(config),
            entries: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn config(&self) -> &Config {
        self.config.as_ref()
    }

    /// Registers an already named event.
    pub fn add<E: BaseEvent + 'static>(&mut self, mut event: E) -> Result<()> {
        let name = event.name().ok_or(Error::Unnamed)?;
        if self.contains(&name) {
            return Err(Error::EventAlreadyExists(name));
        }
        event.attach_namespace(&self.path);
        let handler = event.handler();
        tracing::debug!(namespace = %self.path, event = %name, bound = handler.is_some(), "event registered");
        self.entries.push(Entry {
            event: Box::new(event),
            handler,
        });
        Ok(())
    }

    /// Names the event, then registers it.
    pub fn add_named<E: BaseEvent + 'static>(&mut self, name: &str, mut event: E) -> Result<()> {
        if self.contains(name) {
            return Err(Error::EventAlreadyExists(Arc::from(name)));
        }
        event.attach_name(name);
        self.add(event)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.is_named(name))
    }

    /// Current names of registered events, in registration order.
    pub fn event_names(&self) -> Vec<Arc<str>> {
        self.entries.iter().filter_map(|e| e.event.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn BaseEvent> {
        self.find(name).map(|e| e.event.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.is_named(name))
    }

    /// Routes an incoming message to the handler registered under `event`.
    ///
    /// Errors, including validation failures, are returned unchanged.
    pub fn dispatch(&self, event: &str, data: Value) -> Result<Reply> {
        let entry = self
            .find(event)
            .ok_or_else(|| Error::UnknownEvent(Arc::from(event)))?;
        let handler = entry
            .handler
            .as_ref()
            .ok_or_else(|| Error::NotBound(Arc::from(event)))?;
        tracing::debug!(namespace = %self.path, event, "dispatching");
        handler.call(data)
    }

    /// Like [`Namespace::dispatch`], but failures are reported to the caller.
    ///
    /// A failed dispatch is logged and emitted as the configured error event
    /// (`{"code": ..., "message": ...}`) routed by `reply_to`; `Ok(None)` is
    /// returned. Critical [`Error::Event`] values are returned as errors after
    /// being reported, so the host can drop the connection.
    pub fn handle<T>(
        &self,
        transport: &T,
        reply_to: EmitOptions,
        event: &str,
        data: Value,
    ) -> Result<Option<Reply>>
    where
        T: Transport + ?Sized,
    {
        let err = match self.dispatch(event, data) {
            Ok(reply) => return Ok(Some(reply)),
            Err(err) => err,
        };

        let code = err.code();
        tracing::warn!(namespace = %self.path, event, code, error = %err, "event failed");

        let message = if code >= 500 && !self.config.expose_internal_errors {
            "Internal error".to_string()
        } else {
            match &err {
                Error::Event { message, .. } => message.to_string(),
                other => other.to_string(),
            }
        };
        let options = EmitOptions {
            namespace: reply_to.namespace.clone().or_else(|| Some(self.path.clone())),
            ..reply_to
        };
        transport.emit(Emission::new(
            self.config.error_event.clone(),
            json!({ "code": code, "message": message, "event": event }),
            options,
        ))?;

        if err.is_critical() { Err(err) } else { Ok(None) }
    }

    /// Documentation of every registered event, keyed by event name.
    pub fn docs(&self) -> DocMap {
        self.entries
            .iter()
            .filter_map(|e| {
                let name = e.event.name()?;
                Some((name.to_string(), Value::Object(e.event.create_doc(None, None))))
            })
            .collect()
    }

    /// Component messages of every registered event, without duplicates.
    pub fn messages(&self) -> Vec<MessageDoc> {
        let mut messages: Vec<MessageDoc> = Vec::new();
        for message in self.entries.iter().flat_map(|e| e.event.messages()) {
            if !messages.iter().any(|m| m.name == message.name) {
                messages.push(message);
            }
        }
        messages
    }
}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Namespace")
            .field("path", &self.path)
            .field("events", &self.event_names())
            .finish()
    }
}
