use crate::error::RouteError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Value subscriber. Returning `Err` reports the failure on the error channel.
pub type ValueHandler<T> = Arc<dyn Fn(&T) -> Result<(), RouteError> + Send + Sync>;
/// Error observer.
pub type ErrorHandler = Arc<dyn Fn(&RouteError) + Send + Sync>;
/// End observer.
pub type EndHandler = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by the `on_*` methods, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Handlers<T> {
    value: Vec<(SubscriptionId, ValueHandler<T>)>,
    error: Vec<(SubscriptionId, ErrorHandler)>,
    end: Vec<(SubscriptionId, EndHandler)>,
}

impl<T> Default for Handlers<T> {
    fn default() -> Self {
        Self {
            value: Vec::new(),
            error: Vec::new(),
            end: Vec::new(),
        }
    }
}

struct Inner<T> {
    handlers: Mutex<Handlers<T>>,
    ended: AtomicBool,
    next_id: AtomicU64,
}

/// Synchronous multi-subscriber channel with separate value, error and end
/// subscriptions. Cloning yields another handle to the same channel.
pub struct Stream<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Stream<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Inner {
                handlers: Mutex::new(Handlers::default()),
                ended: AtomicBool::new(false),
                next_id: AtomicU64::new(0),
            }),
        }
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.inner.handlers.lock();
        f.debug_struct("Stream")
            .field("value_subscribers", &handlers.value.len())
            .field("error_subscribers", &handlers.error.len())
            .field("end_subscribers", &handlers.end.len())
            .field("ended", &self.is_ended())
            .finish()
    }
}

fn remove<H>(list: &mut Vec<(SubscriptionId, H)>, id: SubscriptionId) -> bool {
    let before = list.len();
    list.retain(|(sid, _)| *sid != id);
    list.len() != before
}

impl<T> Stream<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Subscribe to values. Ignored (but still returns an id) once ended.
    pub fn on_value<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&T) -> Result<(), RouteError> + Send + Sync + 'static,
    {
        let id = self.next_id();
        if !self.is_ended() {
            self.inner.handlers.lock().value.push((id, Arc::new(handler)));
        }
        id
    }

    pub fn on_error<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&RouteError) + Send + Sync + 'static,
    {
        let id = self.next_id();
        if !self.is_ended() {
            self.inner.handlers.lock().error.push((id, Arc::new(handler)));
        }
        id
    }

    /// Subscribe to the end of the stream. Runs immediately if already ended.
    pub fn on_end<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        if self.is_ended() {
            handler();
        } else {
            self.inner.handlers.lock().end.push((id, Arc::new(handler)));
        }
        id
    }

    pub fn off_value(&self, id: SubscriptionId) -> bool {
        remove(&mut self.inner.handlers.lock().value, id)
    }

    pub fn off_error(&self, id: SubscriptionId) -> bool {
        remove(&mut self.inner.handlers.lock().error, id)
    }

    pub fn off_end(&self, id: SubscriptionId) -> bool {
        remove(&mut self.inner.handlers.lock().end, id)
    }

    fn notify_error(&self, err: &RouteError) {
        let observers: Vec<ErrorHandler> = self
            .inner
            .handlers
            .lock()
            .error
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for observer in observers {
            observer(err);
        }
    }

    /// Deliver `value` to every value subscriber.
    ///
    /// Returns the first subscriber error after all subscribers have run.
    pub fn push(&self, value: &T) -> Result<(), RouteError> {
        if self.is_ended() {
            trace!("Push after end ignored");
            return Ok(());
        }

        let subscribers: Vec<ValueHandler<T>> = self
            .inner
            .handlers
            .lock()
            .value
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();

        let mut first_error = None;
        for subscriber in subscribers {
            if self.is_ended() {
                break;
            }
            if let Err(err) = subscriber(value) {
                self.notify_error(&err);
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Report `err` to the error observers and hand it back as `Err`.
    pub fn raise(&self, err: RouteError) -> Result<(), RouteError> {
        self.notify_error(&err);
        Err(err)
    }

    /// End the stream: notify end observers once and drop every subscriber.
    pub fn end(&self) {
        if self.inner.ended.swap(true, Ordering::SeqCst) {
            return;
        }
        let end_observers = {
            let mut handlers = self.inner.handlers.lock();
            let end = std::mem::take(&mut handlers.end);
            handlers.value.clear();
            handlers.error.clear();
            end
        };
        for (_, observer) in end_observers {
            observer();
        }
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.inner.ended.load(Ordering::SeqCst)
    }

    /// Number of value subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.handlers.lock().value.len()
    }
}
