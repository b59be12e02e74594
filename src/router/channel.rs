use crate::config::ConfigStore;
use crate::dispatcher::{Dispatcher, ErrorPolicy};
use crate::error::RouteError;
use crate::location::{to_url, ParsedRoute, UrlParser};
use crate::pattern::CompiledPattern;
use crate::pipeline::{Pipeline, Step};
use crate::stream::{Stream, SubscriptionId};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Where a route reads its base prefix from.
#[derive(Debug, Clone)]
pub(crate) enum BaseSource {
    Live(Arc<ConfigStore>),
    Fixed(Arc<str>),
}

impl BaseSource {
    pub(crate) fn current(&self) -> String {
        match self {
            BaseSource::Live(store) => store.base(),
            BaseSource::Fixed(base) => base.to_string(),
        }
    }
}

/// Per-route input registered with the dispatcher.
///
/// Holds only what one event needs; it does not own the [`RouteChannel`]
/// handle, so the dispatcher never keeps a channel's subscribers reachable
/// through a cycle.
pub(crate) struct RouteInput {
    pub(crate) pattern: Arc<CompiledPattern>,
    pub(crate) pipeline: Pipeline,
    pub(crate) base: BaseSource,
    pub(crate) policy: ErrorPolicy,
    pub(crate) url_parser: Arc<dyn UrlParser>,
    pub(crate) output: Stream<ParsedRoute>,
}

impl RouteInput {
    fn process(&self, path: &str) -> Result<(), RouteError> {
        let path = match self.pipeline.run(path.to_string()) {
            Ok(Step::Continue(path)) => path,
            Ok(Step::Drop) => return Ok(()),
            Err(err) => return self.output.raise(err),
        };
        let base = self.base.current();
        match to_url(&path, &self.pattern, &base, self.url_parser.as_ref()) {
            Ok(parsed) => self.output.push(&parsed),
            Err(err) => self.output.raise(err),
        }
    }

    pub(crate) fn handle(&self, path: &str) -> Result<(), RouteError> {
        if self.output.is_ended() {
            return Ok(());
        }
        self.policy.apply(self.process(path), self.pattern.source())
    }
}

struct ChannelInner {
    pattern: Arc<CompiledPattern>,
    stream: Stream<ParsedRoute>,
    dispatcher: Dispatcher,
    forward_id: Mutex<Option<SubscriptionId>>,
}

/// Subscribable stream of [`ParsedRoute`]s for one pattern.
///
/// Cloning yields another handle to the same channel. Dropping handles does not
/// unregister the channel; call [`RouteChannel::close`].
#[derive(Clone)]
pub struct RouteChannel {
    inner: Arc<ChannelInner>,
}

impl fmt::Debug for RouteChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteChannel")
            .field("pattern", &self.inner.pattern.source())
            .field("subscribers", &self.inner.stream.subscriber_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl RouteChannel {
    pub(crate) fn new(
        pattern: Arc<CompiledPattern>,
        stream: Stream<ParsedRoute>,
        dispatcher: Dispatcher,
        forward_id: SubscriptionId,
    ) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                pattern,
                stream,
                dispatcher,
                forward_id: Mutex::new(Some(forward_id)),
            }),
        }
    }

    /// Subscribe to matches. An `Err` from the handler is a subscriber error.
    pub fn on_value<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ParsedRoute) -> Result<(), RouteError> + Send + Sync + 'static,
    {
        self.inner.stream.on_value(handler)
    }

    /// Observe every error raised for this route, silenced or not.
    pub fn on_error<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&RouteError) + Send + Sync + 'static,
    {
        self.inner.stream.on_error(handler)
    }

    pub fn on_end<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.stream.on_end(handler)
    }

    pub fn off_value(&self, id: SubscriptionId) -> bool {
        self.inner.stream.off_value(id)
    }

    pub fn off_error(&self, id: SubscriptionId) -> bool {
        self.inner.stream.off_error(id)
    }

    pub fn off_end(&self, id: SubscriptionId) -> bool {
        self.inner.stream.off_end(id)
    }

    /// Unregister from the dispatcher and end the channel.
    ///
    /// Idempotent, and safe to call from inside one of this channel's own
    /// subscribers.
    pub fn close(&self) {
        let Some(id) = self.inner.forward_id.lock().take() else {
            return;
        };
        self.inner.dispatcher.unsubscribe(id);
        self.inner.stream.end();
        info!(
            route_pattern = %self.inner.pattern.source(),
            routes_count = self.inner.dispatcher.forwarding_count(),
            "Route channel closed"
        );
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.stream.is_ended()
    }

    #[must_use]
    pub fn pattern(&self) -> &CompiledPattern {
        &self.inner.pattern
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.stream.subscriber_count()
    }
}
