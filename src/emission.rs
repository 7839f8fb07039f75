use std::{sync::Arc, time::SystemTime};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::EmissionId;

/// Where and how a server event is delivered.
///
/// - `room`: target room; `None` broadcasts to the whole namespace.
/// - `namespace`: overrides the event's own namespace.
/// - `include_self`: when false the sender is excluded from a room/broadcast.
///
/// # Examples
///
/// ```rust
/// use siox::EmitOptions;
///
/// let options = EmitOptions::default()
///     .with_room("lobby")
///     .with_include_self(false);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub room: Option<Arc<str>>,
    pub namespace: Option<Arc<str>>,

    /// Default: true
    pub include_self: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions {
            room: None,
            namespace: None,
            include_self: true,
        }
    }
}

impl EmitOptions {
    pub fn to_room(room: &str) -> Self {
        Self::default().with_room(room)
    }

    pub fn with_room(mut self, room: &str) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_include_self(mut self, include_self: bool) -> Self {
        self.include_self = include_self;
        self
    }
}

/// A rendered server event, as handed to a [`Transport`](crate::Transport).
///
/// - `id`: unique identifier of this emission.
/// - `timestamp`: creation time in nanoseconds since Unix epoch (truncated to `u64`).
/// - `event`: event name.
/// - `payload`: the payload, already validated and rendered.
/// - `room`, `namespace`, `include_self`: routing, see [`EmitOptions`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emission {
    id: EmissionId,
    timestamp: u64,
    pub event: Arc<str>,
    pub payload: Value,
    pub room: Option<Arc<str>>,
    pub namespace: Option<Arc<str>>,
    pub include_self: bool,
}

impl Emission {
    pub fn new(event: Arc<str>, payload: Value, options: EmitOptions) -> Self {
        Self {
            id: Uuid::new_v4().as_u128(),
            timestamp: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default(),
            event,
            payload,
            room: options.room,
            namespace: options.namespace,
            include_self: options.include_self,
        }
    }

    /// Unique identifier for this emission.
    pub fn id(&self) -> EmissionId {
        self.id
    }

    /// Timestamp in nanoseconds since Unix epoch (u64 truncation).
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}
