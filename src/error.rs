use std::{borrow::Cow, sync::Arc};

use tokio::sync::mpsc::error::TrySendError;

use crate::Emission;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Payload doesn't match schema '{schema}': {source}")]
    Validation {
        schema: Cow<'static, str>,
        #[source]
        source: serde_json::Error,
    },

    #[error("Couldn't render '{schema}': {source}")]
    Render {
        schema: Cow<'static, str>,
        #[source]
        source: serde_json::Error,
    },

    #[error("Schema '{schema}' declares {expected} fields, but {got} values were packed")]
    PackArity {
        schema: Cow<'static, str>,
        expected: usize,
        got: usize,
    },

    #[error("Event must be named before it is emitted or registered")]
    Unnamed,

    #[error("Event '{0}' has no handler bound")]
    NotBound(Arc<str>),

    #[error("No event named '{0}' in this namespace")]
    UnknownEvent(Arc<str>),

    #[error("Event with name '{0}' already exists.")]
    EventAlreadyExists(Arc<str>),

    #[error("Event error {code}: {message}")]
    Event {
        code: u16,
        message: Arc<str>,
        critical: bool,
    },

    #[error("Couldn't send the message: {0}")]
    SendError(String),

    #[error("The message channel has reached its capacity.")]
    ChannelIsFull,

    #[error("Error external to siox occured: {0}")]
    External(Arc<str>),
}

impl Error {
    /// Error raised from within a handler, reported back to the caller.
    pub fn event(code: u16, message: impl Into<Arc<str>>) -> Self {
        Error::Event {
            code,
            message: message.into(),
            critical: false,
        }
    }

    /// Like [`Error::event`], but the host is expected to drop the connection.
    pub fn critical(code: u16, message: impl Into<Arc<str>>) -> Self {
        Error::Event {
            code,
            message: message.into(),
            critical: true,
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, Error::Event { critical: true, .. })
    }

    /// Status code reported to the remote side.
    pub fn code(&self) -> u16 {
        match self {
            Error::Event { code, .. } => *code,
            Error::Validation { .. } | Error::PackArity { .. } => 400,
            Error::UnknownEvent(_) | Error::NotBound(_) => 404,
            _ => 500,
        }
    }
}

impl From<TrySendError<Arc<Emission>>> for Error {
    fn from(e: TrySendError<Arc<Emission>>) -> Self {
        match e {
            TrySendError::Full(_) => Error::ChannelIsFull,
            TrySendError::Closed(_) => Error::SendError(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::channel;

    #[test]
    fn test_codes() {
        assert_eq!(Error::event(422, "nope").code(), 422);
        assert_eq!(Error::UnknownEvent("ping".into()).code(), 404);
        assert_eq!(Error::NotBound("notice".into()).code(), 404);
        assert_eq!(Error::Unnamed.code(), 500);
        assert_eq!(Error::External("db".into()).code(), 500);
    }

    #[test]
    fn test_only_critical_event_errors_are_critical() {
        assert!(Error::critical(401, "go away").is_critical());
        assert!(!Error::event(401, "go away").is_critical());
        assert!(!Error::ChannelIsFull.is_critical());
    }

    #[test]
    fn test_from_try_send_error() {
        let (tx, rx) = channel::<Arc<Emission>>(1);
        let emission = || Arc::new(Emission::new("a".into(), serde_json::Value::Null, Default::default()));
        tx.try_send(emission()).unwrap();
        assert!(matches!(Error::from(tx.try_send(emission()).unwrap_err()), Error::ChannelIsFull));
        drop(rx);
        assert!(matches!(Error::from(tx.try_send(emission()).unwrap_err()), Error::SendError(_)));
    }
}
