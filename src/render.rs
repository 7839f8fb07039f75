use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::{
    Error, Result, Schema,
    schema::{to_field, validate},
};

/// Knobs controlling how a schema instance is turned into an outgoing payload.
///
/// Each event keeps its own copy; builders take the options by value, so one
/// record is never shared between events.
///
/// # Examples
///
/// ```rust
/// use siox::RenderOptions;
///
/// let options = RenderOptions::default()
///     .with_exclude(["password"])   // never sent
///     .with_exclude_none(false);    // keep explicit nulls
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Top-level fields to keep. `None` keeps everything.
    /// Both Rust field names and serialized names match.
    pub include: Option<BTreeSet<String>>,

    /// Top-level fields to drop, applied after `include`.
    pub exclude: Option<BTreeSet<String>>,

    /// Drop `null` values at any depth.
    /// Default: true
    pub exclude_none: bool,

    /// Emit serialized (aliased) names instead of Rust field names.
    /// Default: true
    pub by_alias: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            include: None,
            exclude: None,
            exclude_none: true,
            by_alias: true,
        }
    }
}

impl RenderOptions {
    pub fn with_include<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.include = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_exclude<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.exclude = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_exclude_none(mut self, exclude_none: bool) -> Self {
        self.exclude_none = exclude_none;
        self
    }

    pub fn with_by_alias(mut self, by_alias: bool) -> Self {
        self.by_alias = by_alias;
        self
    }

    fn keeps<S: Schema>(&self, serialized: &str) -> bool {
        let field = to_field::<S>(serialized);
        let listed = |set: &BTreeSet<String>| set.contains(serialized) || set.contains(field);
        self.include.as_ref().is_none_or(listed) && !self.exclude.as_ref().is_some_and(listed)
    }
}

/// Serializes `model` and applies `options`.
pub fn render_model<S: Schema>(model: &S, options: &RenderOptions) -> Result<Value> {
    let value = serde_json::to_value(model).map_err(|source| Error::Render {
        schema: S::name(),
        source,
    })?;
    Ok(apply_options::<S>(value, options))
}

/// Validates `raw` against `S`, then renders the result.
pub fn render_value<S: Schema>(raw: Value, options: &RenderOptions) -> Result<Value> {
    let model: S = validate(raw)?;
    render_model(&model, options)
}

/// Renders an ordered sequence of values against the fields of `S`.
///
/// The i-th value is taken as the i-th field of `S`; the assembled object is
/// validated as a whole, rendered, and the rendered fields are returned in
/// declaration order. Fields removed by `options` drop out of the result.
pub fn render_packed<S: Schema>(values: Vec<Value>, options: &RenderOptions) -> Result<Vec<Value>> {
    let fields = S::fields();
    if values.len() > fields.len() {
        return Err(Error::PackArity {
            schema: S::name(),
            expected: fields.len(),
            got: values.len(),
        });
    }

    let packed = fields
        .iter()
        .zip(values)
        .map(|(field, value)| (field.to_string(), value))
        .collect::<Map<_, _>>();

    // Render with aliases so fields can be looked up by their serialized names
    let mut rendered =
        match render_value::<S>(Value::Object(packed), &options.clone().with_by_alias(true))? {
            Value::Object(map) => map,
            other => return Ok(vec![other]),
        };

    Ok(fields
        .iter()
        .filter(|field| options.keeps::<S>(field))
        .map(|field| rendered.remove(*field).unwrap_or(Value::Null))
        .collect())
}

fn apply_options<S: Schema>(value: Value, options: &RenderOptions) -> Value {
    let value = if options.exclude_none {
        drop_nulls(value)
    } else {
        value
    };

    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| options.keeps::<S>(key))
                .map(|(key, value)| {
                    if options.by_alias {
                        (key, value)
                    } else {
                        (to_field::<S>(&key).to_string(), value)
                    }
                })
                .collect(),
        ),
        other => other,
    }
}

fn drop_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, drop_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(drop_nulls).collect()),
        other => other,
    }
}
