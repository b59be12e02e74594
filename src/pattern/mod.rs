//! # Pattern Module
//!
//! Route pattern compilation: pattern string in, matcher plus capture keys out,
//! and the reverse direction from parameters back to a path.
//!
//! ## Overview
//!
//! The rest of the crate only depends on the [`PatternCompiler`] trait. The
//! bundled [`PathToRegexp`] compiler understands the usual path-template syntax:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `:name` | Named parameter, matches up to the next delimiter |
//! | `:name(\d+)` | Named parameter with a custom sub-pattern |
//! | `(.*)` | Unnamed parameter, keyed by position (`0`, `1`, ...) |
//! | `:name?` `:name*` `:name+` | Optional, zero-or-more, one-or-more |
//! | `{/prefix:name.suffix}?` | Group with explicit prefix and suffix |
//! | `\?` | Escaped literal character |
//!
//! A `/` or `.` right before a parameter becomes its prefix (configurable with
//! the `prefixes` option), so `/:id?` also matches the path without the slash.
//!
//! ## Example
//!
//! ```rust
//! use pathstream::config::RouteOptions;
//! use pathstream::pattern::{PathParams, PathToRegexp, PatternCompiler};
//!
//! let options = RouteOptions::default();
//! let compiled = PathToRegexp.compile("/users/:id", &options).unwrap();
//! assert!(compiled.is_match("/users/42"));
//! assert_eq!(compiled.keys()[0].name.to_string(), "id");
//!
//! let builder = PathToRegexp.compile_reverse("/users/:id", &options).unwrap();
//! let path = builder.build(&PathParams::new().with("id", "42")).unwrap();
//! assert_eq!(path, "/users/42");
//! ```

mod lexer;
mod parse;
mod regexp;
mod reverse;

pub use reverse::{ParamValue, PathBuilder, PathParams};

use crate::config::RouteOptions;
use crate::error::RouteError;
use regex::{Captures, Regex};
use std::fmt;

/// Repetition modifier attached to a key or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modifier {
    #[default]
    None,
    /// `?`
    Optional,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Modifier {
    pub(crate) fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "?" => Modifier::Optional,
            "*" => Modifier::ZeroOrMore,
            "+" => Modifier::OneOrMore,
            _ => Modifier::None,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Modifier::None => "",
            Modifier::Optional => "?",
            Modifier::ZeroOrMore => "*",
            Modifier::OneOrMore => "+",
        }
    }

    #[must_use]
    pub fn optional(self) -> bool {
        matches!(self, Modifier::Optional | Modifier::ZeroOrMore)
    }

    #[must_use]
    pub fn repeats(self) -> bool {
        matches!(self, Modifier::ZeroOrMore | Modifier::OneOrMore)
    }
}

/// Name of a capture key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyName {
    Named(String),
    /// Unnamed `( ... )` groups are numbered from zero in pattern order
    Index(usize),
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyName::Named(name) => f.write_str(name),
            KeyName::Index(idx) => write!(f, "{idx}"),
        }
    }
}

/// Describes one capture of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub name: KeyName,
    pub prefix: String,
    pub suffix: String,
    /// Sub-pattern the captured value must match
    pub pattern: String,
    pub modifier: Modifier,
}

impl Key {
    #[must_use]
    pub fn optional(&self) -> bool {
        self.modifier.optional()
    }

    #[must_use]
    pub fn repeats(&self) -> bool {
        self.modifier.repeats()
    }
}

/// Matcher plus ordered capture keys. Immutable once built.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
    keys: Vec<Key>,
}

impl CompiledPattern {
    #[must_use]
    pub fn new(source: impl Into<String>, regex: Regex, keys: Vec<Key>) -> Self {
        Self {
            source: source.into(),
            regex,
            keys,
        }
    }

    /// Wrap a prebuilt regex. Its captures are delivered positionally.
    #[must_use]
    pub fn from_regex(regex: Regex) -> Self {
        Self {
            source: regex.as_str().to_string(),
            regex,
            keys: Vec::new(),
        }
    }

    /// Pattern string the matcher was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    #[inline]
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    #[must_use]
    pub fn captures<'p>(&self, path: &'p str) -> Option<Captures<'p>> {
        self.regex.captures(path)
    }
}

/// Pattern compiler capability.
pub trait PatternCompiler: Send + Sync + fmt::Debug {
    /// Compile `pattern` into a matcher and its capture keys.
    fn compile(&self, pattern: &str, options: &RouteOptions)
        -> Result<CompiledPattern, RouteError>;

    /// Compile `pattern` into a path builder.
    fn compile_reverse(
        &self,
        pattern: &str,
        options: &RouteOptions,
    ) -> Result<PathBuilder, RouteError>;
}

/// Default compiler for `:name` style path templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathToRegexp;

impl PatternCompiler for PathToRegexp {
    fn compile(
        &self,
        pattern: &str,
        options: &RouteOptions,
    ) -> Result<CompiledPattern, RouteError> {
        let tokens = parse::parse(pattern, options)?;
        let source = regexp::to_regex_source(&tokens, options);
        let regex = regexp::build_regex(pattern, &source, options)?;
        let keys = tokens
            .into_iter()
            .filter_map(|token| match token {
                parse::Token::Key(key) => Some(key),
                _ => None,
            })
            .collect();
        Ok(CompiledPattern::new(pattern, regex, keys))
    }

    fn compile_reverse(
        &self,
        pattern: &str,
        options: &RouteOptions,
    ) -> Result<PathBuilder, RouteError> {
        let tokens = parse::parse(pattern, options)?;
        PathBuilder::new(pattern, tokens, options)
    }
}
