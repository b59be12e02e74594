//! # Error Module
//!
//! A single error type covers every failure the routing pipeline can report.
//!
//! ## Taxonomy
//!
//! | Kind | Variant | Where it surfaces |
//! |------|---------|-------------------|
//! | Malformed pattern | [`RouteError::Pattern`] | Returned synchronously from `route()` |
//! | Reverse compile failure | [`RouteError::Param`] | Returned from [`PathBuilder::build`](crate::pattern::PathBuilder::build) |
//! | URL construction | [`RouteError::Url`], [`RouteError::CaptureMismatch`] | Route channel error stream |
//! | Bad percent-encoding | [`RouteError::Decode`] | Route channel error stream |
//! | Bad configuration value | [`RouteError::Config`] | Returned from `configure()` / `merge_options()` |
//! | Subscriber failure | [`RouteError::Subscriber`] | Error stream, then the `silentErrors` policy |
//!
//! A path that simply does not match a route is **not** an error: the pipeline
//! drops it for that channel (see [`Step::Drop`](crate::pipeline::Step::Drop)).
//! The same goes for non-string values pushed into the dispatcher.

use std::fmt;
use std::sync::Arc;

/// Boxed error raised by subscriber callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error reported by pattern compilation, URL construction or subscribers.
///
/// `RouteError` is `Clone` so a single failure can be handed to every error
/// observer of a stream and still be returned to the caller of `push`.
#[derive(Debug, Clone)]
pub enum RouteError {
    /// The pattern compiler rejected a route pattern.
    Pattern {
        /// The pattern as given by the caller
        pattern: String,
        /// Character offset the problem was detected at, when known
        index: Option<usize>,
        /// Human readable reason
        message: String,
    },
    /// Reverse compilation could not produce a path from the given parameters.
    Param {
        /// Parameter name (or positional index rendered as a string)
        name: String,
        /// Why the value was rejected
        message: String,
    },
    /// The matched path could not be turned into a URL record.
    Url {
        /// The path handed to the URL parser
        input: String,
        /// Parser message
        message: String,
    },
    /// Percent-decoding produced invalid UTF-8 or hit a malformed escape.
    Decode {
        /// The offending input
        input: String,
        /// Decoder message
        message: String,
    },
    /// The matcher accepted a path in the gate but produced no captures.
    CaptureMismatch {
        /// Pattern source
        pattern: String,
        /// Path that passed the gate
        path: String,
    },
    /// An option override had the wrong shape or type.
    Config {
        /// Deserializer message
        message: String,
    },
    /// A subscriber callback failed while handling a value.
    Subscriber(Arc<BoxError>),
}

impl RouteError {
    /// Wrap any error raised inside a subscriber callback.
    pub fn subscriber<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        RouteError::Subscriber(Arc::new(err.into()))
    }

    pub(crate) fn pattern(pattern: &str, index: Option<usize>, message: impl Into<String>) -> Self {
        RouteError::Pattern {
            pattern: pattern.to_string(),
            index,
            message: message.into(),
        }
    }

    pub(crate) fn param(name: impl fmt::Display, message: impl Into<String>) -> Self {
        RouteError::Param {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// True for errors detected while building the route (as opposed to per event).
    #[must_use]
    pub fn is_construction(&self) -> bool {
        matches!(self, RouteError::Pattern { .. } | RouteError::Config { .. })
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::Pattern {
                pattern,
                index: Some(index),
                message,
            } => write!(f, "invalid route pattern '{pattern}' at {index}: {message}"),
            RouteError::Pattern {
                pattern,
                index: None,
                message,
            } => write!(f, "invalid route pattern '{pattern}': {message}"),
            RouteError::Param { name, message } => {
                write!(f, "cannot build path for parameter \"{name}\": {message}")
            }
            RouteError::Url { input, message } => {
                write!(f, "cannot parse '{input}' as a URL: {message}")
            }
            RouteError::Decode { input, message } => {
                write!(f, "cannot decode '{input}': {message}")
            }
            RouteError::CaptureMismatch { pattern, path } => write!(
                f,
                "pattern '{pattern}' accepted '{path}' but produced no captures"
            ),
            RouteError::Config { message } => write!(f, "invalid route options: {message}"),
            RouteError::Subscriber(err) => write!(f, "subscriber failed: {err}"),
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteError::Subscriber(err) => Some(&***err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RouteError {
    fn from(err: serde_json::Error) -> Self {
        RouteError::Config {
            message: err.to_string(),
        }
    }
}
