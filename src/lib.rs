//! Siox: schema-validated, self-documenting events for real-time socket servers.
//!
//! Events are typed by a [`Schema`]: a serde model that also describes itself
//! as JSON Schema. On top of it siox offers:
//!
//! - [`ClientEvent`]: incoming messages, validated and passed to a bound
//!   function whose result is rendered into an acknowledgment.
//! - [`ServerEvent`]: outgoing messages, rendered and handed to a [`Transport`].
//! - [`DuplexEvent`]: a client and a server event sharing one name.
//! - [`Namespace`]: registry and dispatcher of named events.
//! - [`AsyncApi`]: AsyncAPI documentation of registered namespaces.
//!
//! ```rust,ignore
//! use siox::prelude::*;
//!
//! #[derive(Serialize, Deserialize, JsonSchema, Schema)]
//! struct Ping { value: i64 }
//!
//! let mut ping = ClientEvent::<Ping>::new();
//! ping.bind(|p: Ping| Ok(p.value + 1));
//!
//! let mut ns = Namespace::new("/game");
//! ns.add_named("ping", ping)?;
//! assert_eq!(ns.dispatch("ping", json!({"value": 1}))?, Reply::One(json!(2)));
//! ```

mod asyncapi;
mod client;
mod config;
mod duplex;
mod emission;
mod error;
mod event;
mod identity;
mod namespace;
mod render;
mod server;
mod transport;

pub mod doc;
pub mod schema;

#[cfg(any(test, feature = "test-harness"))]
pub mod testing;

pub use asyncapi::{ASYNCAPI_VERSION, AsyncApi};
pub use client::{AckOptions, ClientEvent, Handler, Reply};
pub use config::Config;
pub use duplex::DuplexEvent;
pub use emission::{EmitOptions, Emission};
pub use error::Error;
pub use event::{BaseEvent, Event};
pub use identity::Identity;
pub use namespace::Namespace;
pub use render::{RenderOptions, render_model, render_packed, render_value};
pub use schema::Schema;
pub use server::ServerEvent;
pub use transport::{ChannelTransport, Transport};

#[cfg(feature = "macros")]
pub use siox_macros::Schema;

pub type Result<T = ()> = std::result::Result<T, Error>;

/// Unique identifier of an [`Emission`].
pub type EmissionId = u128;

pub mod prelude {
    pub use crate::{
        AckOptions, AsyncApi, BaseEvent, ClientEvent, DuplexEvent, EmitOptions, Error as SioxError,
        Namespace, RenderOptions, Reply, Schema, ServerEvent, Transport,
    };
    pub use schemars::JsonSchema;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::json;
}
