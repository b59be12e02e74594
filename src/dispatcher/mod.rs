//! # Dispatcher Module
//!
//! The process-wide entry point for location changes. Every route channel
//! registers one forwarding subscriber here; [`Dispatcher::push`] hands each
//! string it receives to all of them, in registration order.
//!
//! ## Overview
//!
//! ```text
//! navigation / push(value)
//!        │
//!        ▼
//!   DispatchEvent ── Signal(non-string) ──▶ dropped (debug log)
//!        │
//!      Path
//!        │
//!        ├──▶ route channel #1 pipeline
//!        ├──▶ route channel #2 pipeline
//!        └──▶ ...
//! ```
//!
//! ## Error Handling
//!
//! A failure inside one route channel never stops delivery to the others. Each
//! forwarding subscriber applies an [`ErrorPolicy`]:
//!
//! - `silentErrors == false` (default): the error is reported on the error
//!   stream and returned from `push`.
//! - `silentErrors == true`: the error is reported on the route channel's own
//!   error stream, logged at `warn` and swallowed.
//!
//! The policy reads the live `silentErrors` value from the configuration store
//! unless the route was created with an explicit override.
//!
//! The dispatcher is never ended; route channels come and go around it.

mod core;
#[cfg(test)]
mod tests;

pub use core::{DispatchEvent, Dispatcher, ErrorPolicy};
