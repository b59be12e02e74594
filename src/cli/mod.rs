//! # CLI Module
//!
//! Command-line front end for the `pathstream` binary.
//!
//! ## Commands
//!
//! ### `match`
//!
//! Registers one route channel per `--pattern`, then reads locations from
//! stdin (one per line) and pushes each into the dispatcher. Every emission is
//! printed to stdout as one JSON line:
//!
//! ```bash
//! printf '/users/42\n/posts/7?draft=1\n' | pathstream match -p /users/:id -p /posts/:id
//! ```
//!
//! Options:
//! - `-p, --pattern <PATTERN>` - route pattern, repeatable (required)
//! - `--base <BASE>` - base prefix stripped before matching (also `PATHSTREAM_BASE`)
//! - `--hash` - strip one leading `#` before matching
//! - `--decode-uri` - decode the whole path before matching
//! - `--sensitive`, `--strict` - pattern compiler switches
//! - `--silent-errors` - log failing locations and keep going instead of exiting
//!
//! ### `build`
//!
//! Reverse-compiles a pattern:
//!
//! ```bash
//! pathstream build /users/:id/files/:path+ --param id=42 --param path=a --param path=b
//! # /users/42/files/a/b
//! ```
//!
//! Repeating a `--param` name produces an array value for `*` / `+`
//! parameters.
//!
//! ## Logging
//!
//! Logs go to stderr, configured through the `PATHSTREAM_LOG_*` variables (see
//! [`crate::logging`]). The CLI defaults to `warn` when no level is set.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{parse_param, run, run_cli, Cli, Commands};
