//! # Match Gate
//!
//! Decides whether a normalized path belongs to a route. A miss is reported as
//! [`Step::Drop`], never as an error.

use crate::pattern::CompiledPattern;
use crate::pipeline::Step;
use tracing::debug;

/// True iff `path` satisfies the compiled matcher.
#[inline]
#[must_use]
pub fn matches(path: &str, pattern: &CompiledPattern) -> bool {
    pattern.is_match(path)
}

/// Pass `path` through when it matches, otherwise drop the event.
#[must_use]
pub fn match_or_skip(path: String, pattern: &CompiledPattern) -> Step<String> {
    if matches(&path, pattern) {
        Step::Continue(path)
    } else {
        debug!(path = %path, route_pattern = %pattern.source(), "No route match");
        Step::Drop
    }
}
