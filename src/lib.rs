//! # pathstream
//!
//! **pathstream** is a client-side route matcher: location changes go into one
//! dispatcher, and every registered route pattern gets its own channel that
//! emits a parsed URL with extracted parameters whenever the pattern matches.
//!
//! ## Overview
//!
//! A route is created once and then stays live until it is closed. Pattern
//! compilation happens at creation time, so a malformed pattern is reported
//! immediately; per event the work is a base/hash strip, one regex match and
//! building the result.
//!
//! ## Architecture
//!
//! - **[`config`]** - route options, per-route overrides and the shared defaults store
//! - **[`pattern`]** - `:name` pattern compiler and its reverse (path building)
//! - **[`normalize`]** - base, hash and percent-decoding transforms
//! - **[`pipeline`]** - per-route stage chain with a continue / drop signal
//! - **[`matcher`]** - the match gate stage
//! - **[`location`]** - URL parsing and the [`ParsedRoute`](location::ParsedRoute) builder
//! - **[`stream`]** - the synchronous event channel everything is built on
//! - **[`dispatcher`]** - fan-out from pushed locations to route channels
//! - **[`router`]** - route channel factory and routing context
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - the `pathstream` command-line tool
//!
//! ### Event Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant App
//!     participant Dispatcher
//!     participant Route as RouteChannel
//!     participant Pipeline
//!     participant Subscriber
//!
//!     App->>Dispatcher: push("/app/users/42")
//!     Dispatcher->>Route: forward (registration order)
//!     Route->>Pipeline: strip base, strip hash, match
//!     alt no match
//!         Pipeline-->>Route: Drop
//!     else match
//!         Pipeline-->>Route: Continue("/users/42")
//!         Route->>Route: to_url (decode params, keep query raw)
//!         Route->>Subscriber: ParsedRoute { params: {id: "42"} }
//!     end
//!     Subscriber-->>Dispatcher: Ok / Err (error policy)
//!     Dispatcher-->>App: Result
//! ```
//!
//! ## Quick Start
//!
//! The global API works on one lazily created [`Router`](router::Router). Its
//! defaults come from `PATHSTREAM_BASE` and `PATHSTREAM_SILENT_ERRORS`.
//!
//! ```rust
//! use pathstream::config::Overrides;
//!
//! let users = pathstream::route_with("/users/:id", &Overrides::new().base("/app")).unwrap();
//! users.on_value(|route| {
//!     println!("user {:?} search {}", route.param("id"), route.search());
//!     Ok(())
//! });
//!
//! pathstream::push("/app/users/42").unwrap();
//! users.close();
//! ```
//!
//! Libraries and tests that need isolation create their own
//! [`Router`](router::Router) instead.
//!
//! ## Decoding
//!
//! Captured parameter values are percent-decoded one component at a time, so
//! `%2F` inside a segment becomes `/` in the parameter but never splits the
//! path. The query string in `search` is passed through exactly as received.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod location;
pub mod logging;
pub mod matcher;
pub mod normalize;
pub mod pattern;
pub mod pipeline;
pub mod router;
pub mod stream;

pub use config::{Overrides, RouteOptions};
pub use dispatcher::DispatchEvent;
pub use error::RouteError;
pub use location::{ParsedRoute, RouteParams};
pub use pattern::{ParamValue, PathBuilder, PathParams};
pub use router::{RouteChannel, Router};

use once_cell::sync::Lazy;
use std::sync::Arc;

static ROUTER: Lazy<Router> = Lazy::new(|| Router::with_options(RouteOptions::from_env()));

/// The process-wide router behind the free functions of this crate.
#[must_use]
pub fn router() -> &'static Router {
    &ROUTER
}

/// Create a route channel on the global router.
pub fn route(pattern: &str) -> Result<RouteChannel, RouteError> {
    ROUTER.route(pattern)
}

/// Create a route channel with per-route overrides on the global router.
pub fn route_with(pattern: &str, overrides: &Overrides) -> Result<RouteChannel, RouteError> {
    ROUTER.route_with(pattern, overrides)
}

/// Update the global defaults (recognised keys only).
pub fn configure(overrides: &Overrides) -> Result<Arc<RouteOptions>, RouteError> {
    ROUTER.configure(overrides)
}

/// Snapshot of the global defaults.
#[must_use]
pub fn defaults() -> Arc<RouteOptions> {
    ROUTER.defaults()
}

/// Global defaults overlaid with `overrides`.
pub fn merge_options(overrides: &Overrides) -> Result<RouteOptions, RouteError> {
    ROUTER.merge_options(overrides)
}

/// Push a location into the global dispatcher.
pub fn push(event: impl Into<DispatchEvent>) -> Result<(), RouteError> {
    ROUTER.push(event)
}

/// Reverse-compile `pattern` with the global defaults.
pub fn compile_reverse(pattern: &str) -> Result<PathBuilder, RouteError> {
    ROUTER.compile_reverse(pattern, &Overrides::new())
}

/// Build a path for `pattern` with the global defaults.
pub fn to_path(pattern: &str, params: &PathParams) -> Result<String, RouteError> {
    ROUTER.to_path(pattern, params)
}
