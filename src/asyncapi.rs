use serde_json::{Map, Value, json};

use crate::{Namespace, doc::DEFAULT_NAMESPACE};

pub const ASYNCAPI_VERSION: &str = "2.2.0";

/// Builder of an AsyncAPI document from registered namespaces.
///
/// Channels are keyed by event name for the default namespace, and by
/// `<namespace>/<event>` otherwise, so equally named events of different
/// namespaces don't collide. Component messages are shared and deduplicated
/// by name.
///
/// # Examples
///
/// ```rust,ignore
/// let mut api = AsyncApi::new("Chat", "1.0.0");
/// api.add_namespace(&chat);
/// let document = api.document();
/// ```
#[derive(Debug, Clone)]
pub struct AsyncApi {
    title: String,
    version: String,
    description: Option<String>,
    channels: Map<String, Value>,
    messages: Map<String, Value>,
}

impl AsyncApi {
    pub fn new(title: &str, version: &str) -> Self {
        Self {
            title: title.to_string(),
            version: version.to_string(),
            description: None,
            channels: Map::new(),
            messages: Map::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn add_namespace(&mut self, namespace: &Namespace) -> &mut Self {
        let prefix = match namespace.path() {
            DEFAULT_NAMESPACE => None,
            path => Some(path.trim_end_matches('/')),
        };
        for (name, doc) in namespace.docs() {
            let channel = match prefix {
                Some(prefix) => format!("{prefix}/{name}"),
                None => name,
            };
            self.channels.insert(channel, doc);
        }
        for message in namespace.messages() {
            if !self.messages.contains_key(&*message.name) {
                self.messages
                    .insert(message.name.to_string(), message.to_value());
            }
        }
        self
    }

    pub fn document(&self) -> Value {
        let mut info = json!({
            "title": self.title,
            "version": self.version,
        });
        if let Some(description) = &self.description {
            info["description"] = json!(description);
        }
        json!({
            "asyncapi": ASYNCAPI_VERSION,
            "info": info,
            "channels": self.channels,
            "components": {"messages": self.messages},
        })
    }
}
