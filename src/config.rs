use std::sync::Arc;

/// Configuration of a [`Namespace`](crate::Namespace).
///
/// Use the builder pattern to customize, or use [`Default`] for sensible defaults.
///
/// # Examples
///
/// ```rust
/// use siox::Config;
///
/// let config = Config::default()
///     .with_error_event("failure")          // event name for reported errors
///     .with_expose_internal_errors(true);   // send full messages for 5xx errors
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Event sent back to the caller when [`Namespace::handle`] reports a failure.
    /// Default: "error"
    ///
    /// [`Namespace::handle`]: crate::Namespace::handle
    pub error_event: Arc<str>,

    /// Whether messages of internal (code 500) errors are sent to the caller.
    /// When false they are replaced with a generic message and only logged.
    /// Default: false
    pub expose_internal_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            error_event: Arc::from("error"),
            expose_internal_errors: false,
        }
    }
}

impl Config {
    pub fn with_error_event(mut self, event: &str) -> Self {
        self.error_event = Arc::from(event);
        self
    }

    pub fn with_expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }
}
