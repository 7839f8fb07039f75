use std::{marker::PhantomData, sync::Arc};

use serde_json::{Value, json};

use crate::{
    Handler, Identity, Schema,
    doc::{DocMap, MessageDoc, merge_docs, message_ref, namespace_tag},
    schema::json_schema,
};

/// Capability shared by every event kind: identity, documentation and,
/// for events that accept incoming messages, a bound handler.
///
/// Implemented by [`ClientEvent`](crate::ClientEvent),
/// [`ServerEvent`](crate::ServerEvent) and [`DuplexEvent`](crate::DuplexEvent).
/// A [`Namespace`](crate::Namespace) stores registered events as
/// `Box<dyn BaseEvent>`.
pub trait BaseEvent: Send + Sync {
    fn identity(&self) -> &Identity;

    /// Name the event is sent and received under.
    fn name(&self) -> Option<Arc<str>> {
        self.identity().name()
    }

    fn namespace(&self) -> Option<Arc<str>> {
        self.identity().namespace()
    }

    fn attach_name(&mut self, name: &str) {
        self.identity().set_name(name);
    }

    fn attach_namespace(&mut self, namespace: &str) {
        self.identity().set_namespace(namespace);
    }

    /// Documentation fragment for this event.
    ///
    /// `namespace` given at call time suppresses the namespace tag.
    /// `additional_docs` overrides the event's stored extras.
    fn create_doc(&self, namespace: Option<&str>, additional_docs: Option<&DocMap>) -> DocMap;

    /// `components.messages` entries for the schemas this event refers to.
    fn messages(&self) -> Vec<MessageDoc>;

    /// Transport-facing callable, if this event accepts incoming messages.
    fn handler(&self) -> Option<Handler> {
        None
    }
}

/// Common core of client and server events: identity, a payload schema
/// reference, a description and documentation extras.
///
/// Holds no instance of `S`; the schema is only used to name the message
/// and to validate or render payloads.
pub struct Event<S> {
    pub(crate) identity: Identity,
    description: Option<Arc<str>>,
    additional_docs: Option<DocMap>,
    _schema: PhantomData<fn() -> S>,
}

impl<S: Schema> Event<S> {
    pub fn new() -> Self {
        Self {
            identity: Identity::default(),
            description: None,
            additional_docs: None,
            _schema: PhantomData,
        }
    }

    pub fn with_name(self, name: &str) -> Self {
        self.identity.set_name(name);
        self
    }

    pub fn with_namespace(self, namespace: &str) -> Self {
        self.identity.set_namespace(namespace);
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

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn additional_docs(&self) -> Option<&DocMap> {
        self.additional_docs.as_ref()
    }

    pub fn create_doc(&self, namespace: Option<&str>, additional_docs: Option<&DocMap>) -> DocMap {
        let tags = match namespace {
            Some(_) => Vec::new(),
            None => vec![namespace_tag(self.identity.namespace().as_deref())],
        };

        let mut doc = DocMap::new();
        doc.insert("description".into(), json!(self.description));
        doc.insert("tags".into(), Value::Array(tags));
        doc.insert("message".into(), message_ref(&S::name()));
        merge_docs(doc, [self.additional_docs.as_ref(), additional_docs])
    }

    pub fn message(&self) -> MessageDoc {
        MessageDoc {
            name: S::name(),
            payload: json_schema::<S>(),
        }
    }
}

impl<S: Schema> Default for Event<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for Event<S> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            description: self.description.clone(),
            additional_docs: self.additional_docs.clone(),
            _schema: PhantomData,
        }
    }
}

impl<S> std::fmt::Debug for Event<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.identity.name())
            .field("namespace", &self.identity.namespace())
            .field("schema", &std::any::type_name::<S>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use schemars::JsonSchema;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, JsonSchema)]
    struct Ping {
        value: i64,
    }
    impl Schema for Ping {}

    #[derive(Serialize, Deserialize, JsonSchema)]
    struct Named {
        value: i64,
    }
    impl Schema for Named {
        fn name() -> Cow<'static, str> {
            Cow::Borrowed("game.Named")
        }
    }

    #[test]
    fn test_doc_without_call_namespace_has_tag() {
        let event = Event::<Ping>::new().with_namespace("/game");
        let doc = event.create_doc(None, None);
        assert_eq!(
            Value::Object(doc),
            json!({
                "tags": [{"name": "namespace-/game"}],
                "message": {"$ref": "#/components/messages/Ping"},
            })
        );
    }

    #[test]
    fn test_doc_with_call_namespace_has_no_tag() {
        let event = Event::<Ping>::new().with_namespace("/game");
        let doc = event.create_doc(Some("/game"), None);
        assert!(!doc.contains_key("tags"));
    }

    #[test]
    fn test_doc_uses_declared_schema_name() {
        let doc = Event::<Named>::new().create_doc(Some("/"), None);
        assert_eq!(
            doc["message"],
            json!({"$ref": "#/components/messages/game.Named"})
        );
    }

    #[test]
    fn test_doc_description_and_extras() {
        let stored = json!({"summary": "stored", "x-internal": true});
        let call = json!({"summary": "call"});
        let event = Event::<Ping>::new()
            .with_description("Ping the server")
            .with_docs(stored.as_object().cloned().unwrap());
        let doc = event.create_doc(Some("/"), call.as_object());
        assert_eq!(doc["description"], json!("Ping the server"));
        assert_eq!(doc["summary"], json!("call"));
        assert_eq!(doc["x-internal"], json!(true));
    }

    #[test]
    fn test_message_component() {
        let message = Event::<Ping>::new().message();
        assert_eq!(message.name, "Ping");
        assert!(message.payload["properties"].get("value").is_some());
    }
}
