use std::borrow::Cow;

use schemars::JsonSchema;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// A payload description: field names, types and validation rules.
///
/// Validation and serialization are delegated to serde, the payload's JSON
/// Schema (used in generated documentation) to schemars. This trait only adds
/// what serde doesn't expose at runtime: a display name and the field layout.
///
/// Usually derived with `#[derive(Schema)]`, which reads serde's `rename`,
/// `rename_all` and `skip` attributes and an optional `#[schema(name = "...")]`.
///
/// # Names
///
/// [`Schema::name`] is the name used in documentation references
/// (`#/components/messages/<name>`). The default implementation returns the
/// type's own name without its module path.
///
/// # Fields and aliases
///
/// [`Schema::fields`] lists serialized field names in declaration order. It drives
/// packed acknowledgments, where the i-th value is validated as the i-th field.
/// [`Schema::aliases`] pairs each Rust field name with its serialized name, so
/// payloads can be built from either and rendered with either.
pub trait Schema: Serialize + DeserializeOwned + JsonSchema + Send + Sync + 'static {
    fn name() -> Cow<'static, str> {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        Cow::Borrowed(base.rsplit("::").next().unwrap_or(base))
    }

    fn fields() -> &'static [&'static str] {
        &[]
    }

    fn aliases() -> &'static [(&'static str, &'static str)] {
        &[]
    }
}

/// Validates a raw payload against `S`.
///
/// `null` is treated as an empty object, so schemas without required fields
/// accept a missing payload.
pub fn validate<S: Schema>(raw: Value) -> Result<S> {
    let raw = match raw {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(raw).map_err(|source| Error::Validation {
        schema: S::name(),
        source,
    })
}

/// Builds an `S` from a map keyed by field names, aliases, or a mix of both.
pub fn from_fields<S: Schema>(fields: Map<String, Value>) -> Result<S> {
    let fields = fields
        .into_iter()
        .map(|(key, value)| (to_alias::<S>(&key).to_string(), value))
        .collect::<Map<_, _>>();
    validate(Value::Object(fields))
}

/// Serialized name for a Rust field name. Unknown keys are returned as-is.
pub(crate) fn to_alias<S: Schema>(key: &str) -> &str {
    S::aliases()
        .iter()
        .find(|(field, _)| *field == key)
        .map(|(_, alias)| *alias)
        .unwrap_or(key)
}

/// Rust field name for a serialized name. Unknown keys are returned as-is.
pub(crate) fn to_field<S: Schema>(key: &str) -> &str {
    S::aliases()
        .iter()
        .find(|(_, alias)| *alias == key)
        .map(|(field, _)| *field)
        .unwrap_or(key)
}

/// JSON Schema of `S`, as embedded in generated documentation.
pub fn json_schema<S: Schema>() -> Value {
    let root = schemars::schema_for!(S);
    serde_json::to_value(root).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Serialize, Deserialize, JsonSchema)]
    struct Ping {
        value: i64,
    }
    impl Schema for Ping {}

    #[derive(Serialize, Deserialize, JsonSchema)]
    struct Profile {
        #[serde(rename = "displayName")]
        display_name: String,
        age: Option<u8>,
    }
    impl Schema for Profile {
        fn name() -> Cow<'static, str> {
            Cow::Borrowed("users.Profile")
        }

        fn fields() -> &'static [&'static str] {
            &["displayName", "age"]
        }

        fn aliases() -> &'static [(&'static str, &'static str)] {
            &[("display_name", "displayName"), ("age", "age")]
        }
    }

    #[test]
    fn test_default_name_is_type_name() {
        assert_eq!(Ping::name(), "Ping");
    }

    #[test]
    fn test_declared_name() {
        assert_eq!(Profile::name(), "users.Profile");
    }

    #[test]
    fn test_validate_ok() {
        let ping: Ping = validate(json!({"value": 3})).unwrap();
        assert_eq!(ping.value, 3);
    }

    #[test]
    fn test_validate_missing_field() {
        let err = validate::<Ping>(json!({})).err().unwrap();
        assert!(matches!(err, Error::Validation { ref schema, .. } if schema == "Ping"));
    }

    #[test]
    fn test_validate_wrong_type() {
        assert!(validate::<Ping>(json!({"value": "three"})).is_err());
    }

    #[derive(Serialize, Deserialize, JsonSchema)]
    struct Presence {
        away: Option<bool>,
    }
    impl Schema for Presence {}

    #[test]
    fn test_validate_null_as_empty_object() {
        let presence = validate::<Presence>(Value::Null).unwrap();
        assert_eq!(presence.away, None);
        assert!(validate::<Ping>(Value::Null).is_err());
    }

    #[test]
    fn test_from_fields_accepts_field_names_and_aliases() {
        let mut by_name = Map::new();
        by_name.insert("display_name".into(), json!("Ada"));
        let profile: Profile = from_fields(by_name).unwrap();
        assert_eq!(profile.display_name, "Ada");

        let mut by_alias = Map::new();
        by_alias.insert("displayName".into(), json!("Grace"));
        by_alias.insert("age".into(), json!(36));
        let profile: Profile = from_fields(by_alias).unwrap();
        assert_eq!(profile.display_name, "Grace");
        assert_eq!(profile.age, Some(36));
    }

    #[test]
    fn test_alias_lookup() {
        assert_eq!(to_alias::<Profile>("display_name"), "displayName");
        assert_eq!(to_field::<Profile>("displayName"), "display_name");
        assert_eq!(to_alias::<Profile>("unknown"), "unknown");
    }

    #[test]
    fn test_json_schema_lists_properties() {
        let schema = json_schema::<Profile>();
        assert!(schema["properties"].get("displayName").is_some());
    }
}
