//! # Location Module
//!
//! URL records and the builder that turns a matched path into a
//! [`ParsedRoute`].
//!
//! ## URL parsing
//!
//! Parsing goes through the [`UrlParser`] trait so the rest of the crate does
//! not care which host it runs on:
//!
//! - [`LegacyUrlParser`] - lenient splitter that keeps relative paths as they
//!   are (`foo/bar` has pathname `foo/bar` and no host). Default on native hosts.
//! - [`WhatwgUrlParser`] - standards parser backed by the `url` crate; needs an
//!   absolute input or an absolute base. Default on wasm hosts.
//!
//! ## Decoding
//!
//! Only captured parameter values are component-decoded. The `search` of the
//! record is never decoded by this crate, so `%26` inside a query value cannot
//! turn into a structural `&`.

mod builder;
mod parser;

pub use builder::{to_url, NamedParams, ParsedRoute, RouteParams};
pub use parser::{LegacyUrlParser, WhatwgUrlParser};

use crate::error::RouteError;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Parsed URL components.
///
/// `search` and `hash` keep their leading `?` / `#` and are empty when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UrlRecord {
    /// Scheme with trailing colon, e.g. `https:`
    pub protocol: Option<String>,
    /// `hostname[:port]`
    pub host: Option<String>,
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub pathname: String,
    pub search: String,
    pub hash: String,
    /// The full input as parsed
    pub href: String,
}

/// URL parser capability.
pub trait UrlParser: Send + Sync + fmt::Debug {
    /// Parse `input`, resolving it against `base` when it is relative.
    fn parse(&self, input: &str, base: &str) -> Result<UrlRecord, RouteError>;
}

/// Parser for the current host: WHATWG on wasm, legacy elsewhere.
#[must_use]
pub fn default_url_parser() -> Arc<dyn UrlParser> {
    if cfg!(target_family = "wasm") {
        Arc::new(WhatwgUrlParser)
    } else {
        Arc::new(LegacyUrlParser)
    }
}
