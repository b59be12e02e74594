use crate::config::ConfigStore;
use crate::error::RouteError;
use crate::stream::{Stream, SubscriptionId};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Anything that can be pushed into the dispatcher.
///
/// Only [`DispatchEvent::Path`] reaches route pipelines; every other value is
/// dropped at the door.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEvent {
    Path(String),
    /// Non-string payload (numbers, objects, `null`, ...)
    Signal(Value),
}

impl From<&str> for DispatchEvent {
    fn from(path: &str) -> Self {
        DispatchEvent::Path(path.to_string())
    }
}

impl From<String> for DispatchEvent {
    fn from(path: String) -> Self {
        DispatchEvent::Path(path)
    }
}

impl From<&String> for DispatchEvent {
    fn from(path: &String) -> Self {
        DispatchEvent::Path(path.clone())
    }
}

impl From<Value> for DispatchEvent {
    fn from(value: Value) -> Self {
        match value {
            Value::String(path) => DispatchEvent::Path(path),
            other => DispatchEvent::Signal(other),
        }
    }
}

/// Decides whether an error escaping a subscriber reaches the caller of `push`.
#[derive(Debug, Clone)]
pub struct ErrorPolicy {
    store: Arc<ConfigStore>,
    silent: Option<bool>,
}

impl ErrorPolicy {
    /// Follow the store's current `silentErrors` value.
    #[must_use]
    pub fn live(store: Arc<ConfigStore>) -> Self {
        Self {
            store,
            silent: None,
        }
    }

    /// Fixed policy when `silent` is `Some`, live otherwise.
    #[must_use]
    pub fn with_override(store: Arc<ConfigStore>, silent: Option<bool>) -> Self {
        Self { store, silent }
    }

    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.silent.unwrap_or_else(|| self.store.silent_errors())
    }

    /// Swallow `result`'s error when silent, pass it through otherwise.
    pub fn apply(&self, result: Result<(), RouteError>, source: &str) -> Result<(), RouteError> {
        match result {
            Err(err) if self.is_silent() => {
                warn!(route_pattern = %source, error = %err, "Route error silenced");
                Ok(())
            }
            other => other,
        }
    }
}

/// Fan-out point between location changes and route channels.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    stream: Stream<String>,
    store: Arc<ConfigStore>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self {
            stream: Stream::new(),
            store,
        }
    }

    /// Forward `event` to every registered subscriber.
    ///
    /// Non-string events are discarded. With the propagate policy the first
    /// error raised by a subscriber is returned after all subscribers ran.
    pub fn push(&self, event: impl Into<DispatchEvent>) -> Result<(), RouteError> {
        match event.into() {
            DispatchEvent::Path(path) => {
                trace!(
                    path = %path,
                    subscribers = self.stream.subscriber_count(),
                    "Dispatching path"
                );
                self.stream.push(&path)
            }
            DispatchEvent::Signal(value) => {
                debug!(value = %value, "Dropped non-string dispatch value");
                Ok(())
            }
        }
    }

    /// Subscribe a raw path handler. Its errors follow the live policy.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&str) -> Result<(), RouteError> + Send + Sync + 'static,
    {
        let policy = self.policy();
        self.stream
            .on_value(move |path: &String| policy.apply(handler(path), "<dispatcher>"))
    }

    /// Register a route channel input; the channel applies its own policy.
    pub(crate) fn forward<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&String) -> Result<(), RouteError> + Send + Sync + 'static,
    {
        self.stream.on_value(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.stream.off_value(id)
    }

    /// Observe errors that escape their route channel.
    pub fn on_error<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&RouteError) + Send + Sync + 'static,
    {
        self.stream.on_error(handler)
    }

    pub fn off_error(&self, id: SubscriptionId) -> bool {
        self.stream.off_error(id)
    }

    /// Number of registered forwarding subscribers.
    #[must_use]
    pub fn forwarding_count(&self) -> usize {
        self.stream.subscriber_count()
    }

    /// Live policy bound to this dispatcher's store.
    #[must_use]
    pub fn policy(&self) -> ErrorPolicy {
        ErrorPolicy::live(Arc::clone(&self.store))
    }
}
