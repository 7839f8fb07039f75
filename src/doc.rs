//! Helpers for AsyncAPI-shaped documentation fragments.

use std::borrow::Cow;

use serde_json::{Map, Value, json};

/// Free-form documentation fields, merged into generated fragments.
pub type DocMap = Map<String, Value>;

/// Namespace reported for events that don't declare one.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Reference to a message under `#/components/messages`.
pub fn message_ref(schema_name: &str) -> Value {
    json!({ "$ref": format!("#/components/messages/{schema_name}") })
}

pub fn namespace_tag(namespace: Option<&str>) -> Value {
    json!({ "name": format!("namespace-{}", namespace.unwrap_or(DEFAULT_NAMESPACE)) })
}

/// An entry of `components.messages`: a schema name and its JSON Schema payload.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDoc {
    pub name: Cow<'static, str>,
    pub payload: Value,
}

impl MessageDoc {
    pub fn to_value(&self) -> Value {
        json!({ "name": self.name, "payload": self.payload })
    }
}

/// Merges `layers` over `base` (later layers win), then drops empty values.
pub fn merge_docs<'a>(base: DocMap, layers: impl IntoIterator<Item = Option<&'a DocMap>>) -> DocMap {
    let mut doc = base;
    for layer in layers.into_iter().flatten() {
        doc.extend(layer.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    remove_empty(doc)
}

/// Drops keys whose value is `null`, `""`, `[]` or `{}`.
pub fn remove_empty(doc: DocMap) -> DocMap {
    doc.into_iter().filter(|(_, v)| !is_empty(v)).collect()
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(value: Value) -> DocMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_message_ref() {
        assert_eq!(
            message_ref("chat.Message"),
            json!({"$ref": "#/components/messages/chat.Message"})
        );
    }

    #[test]
    fn test_namespace_tag_defaults_to_root() {
        assert_eq!(namespace_tag(None), json!({"name": "namespace-/"}));
        assert_eq!(namespace_tag(Some("/chat")), json!({"name": "namespace-/chat"}));
    }

    #[test]
    fn test_later_layers_win() {
        let base = doc(json!({"summary": "base", "description": "d"}));
        let stored = doc(json!({"summary": "stored", "x-stored": true}));
        let call = doc(json!({"summary": "call"}));
        let merged = merge_docs(base, [Some(&stored), None, Some(&call)]);
        assert_eq!(
            Value::Object(merged),
            json!({"summary": "call", "description": "d", "x-stored": true})
        );
    }

    #[test]
    fn test_empty_values_dropped() {
        let base = doc(json!({"a": null, "b": "", "c": [], "d": {}, "e": 0, "f": false}));
        let merged = merge_docs(base, Vec::<Option<&DocMap>>::new());
        assert_eq!(Value::Object(merged), json!({"e": 0, "f": false}));
    }

    #[test]
    fn test_override_can_blank_a_key() {
        let base = doc(json!({"description": "d"}));
        let call = doc(json!({"description": null}));
        assert!(merge_docs(base, [Some(&call)]).is_empty());
    }
}
