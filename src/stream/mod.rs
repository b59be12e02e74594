//! # Stream Module
//!
//! The event-channel primitive both the dispatcher and every route channel are
//! built on.
//!
//! ## Semantics
//!
//! - Delivery is synchronous: [`Stream::push`] calls every value subscriber
//!   before it returns, in subscription order.
//! - Handler lists are snapshotted before each delivery. Subscribing,
//!   unsubscribing or ending the stream from inside a callback is safe; a
//!   handler removed mid-delivery still sees the value currently in flight, but
//!   once the stream has ended nothing else is delivered.
//! - A value subscriber that returns `Err` does not stop delivery to the
//!   others. The error goes to every error observer and the first one is
//!   returned from `push`.
//! - [`Stream::end`] is idempotent. End observers run once; afterwards every
//!   handler list is cleared and further pushes are ignored.
//!
//! ## Example
//!
//! ```rust
//! use pathstream::stream::Stream;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let stream: Stream<String> = Stream::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&seen);
//! stream.on_value(move |_path| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//!     Ok(())
//! });
//!
//! stream.push(&"/users/1".to_string()).unwrap();
//! stream.end();
//! stream.push(&"/users/2".to_string()).unwrap();
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! ```

mod core;

pub use core::{EndHandler, ErrorHandler, Stream, SubscriptionId, ValueHandler};
