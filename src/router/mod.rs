//! # Router Module
//!
//! Route channel factory and the context object that ties the configuration
//! store, the dispatcher and the pattern compiler together.
//!
//! ## Overview
//!
//! A [`Router`] owns one [`ConfigStore`](crate::config::ConfigStore) and one
//! [`Dispatcher`](crate::dispatcher::Dispatcher). Every call to
//! [`Router::route`] compiles a pattern once and registers a new
//! [`RouteChannel`] with the dispatcher. Each pushed path then runs through the
//! channel's own pipeline:
//!
//! 1. **decode-uri** (only with `decodeUri: true`) whole-path decoding
//! 2. **strip-base** removes the configured base prefix
//! 3. **strip-hash** (only with `hash: true`) removes one leading `#`
//! 4. **match** drops the event when the compiled pattern does not match
//! 5. the URL builder turns the path into a [`ParsedRoute`](crate::location::ParsedRoute)
//!
//! ## Live vs snapshot options
//!
//! `base` and `silentErrors` are read from the store for every event unless
//! the route overrides them, so `configure` affects routes that already exist.
//! Compiler options, `hash` and `decodeUri` are fixed when the route is
//! created.
//!
//! ## Example
//!
//! ```rust
//! use pathstream::router::Router;
//! use std::sync::{Arc, Mutex};
//!
//! let router = Router::new();
//! let users = router.route("/users/:id").unwrap();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! users.on_value(move |route| {
//!     sink.lock().unwrap().push(route.param("id").map(str::to_string));
//!     Ok(())
//! });
//!
//! router.push("/users/42").unwrap();
//! router.push("/posts/1").unwrap();
//! assert_eq!(*seen.lock().unwrap(), vec![Some("42".to_string())]);
//! users.close();
//! ```

mod channel;
mod core;
#[cfg(test)]
mod tests;

pub use channel::RouteChannel;
pub use core::{Router, RouterBuilder};
