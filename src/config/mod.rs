//! # Configuration Module
//!
//! Route options and the process-wide store they live in.
//!
//! ## Overview
//!
//! Every route channel is built from a [`RouteOptions`] value produced by merging
//! per-route [`Overrides`] on top of the store defaults:
//!
//! ```text
//! ConfigStore defaults ──merge_options(overrides)──▶ RouteOptions (per route)
//!        ▲
//!        └── configure(overrides)   (allow-listed keys only)
//! ```
//!
//! - [`ConfigStore::merge_options`] is pure; unknown keys are carried along in
//!   [`RouteOptions::extra`] so newer compiler options keep flowing through.
//! - [`ConfigStore::configure`] is the only mutator and ignores keys the
//!   defaults do not already have, so a typo never lands in the store.
//!
//! ## Live vs snapshot
//!
//! | Option | Read |
//! |--------|------|
//! | `base`, `silentErrors` | per event, from the store (unless overridden per route) |
//! | `sensitive`, `strict`, `start`, `end`, `delimiter`, `endsWith`, `prefixes`, `encode` | once, when the pattern is compiled |
//! | `hash`, `decodeUri` | once, when the pipeline is built |
//!
//! ## Environment Variables
//!
//! [`RouteOptions::from_env`] reads:
//!
//! - `PATHSTREAM_BASE` - base prefix stripped from every path (default: empty)
//! - `PATHSTREAM_SILENT_ERRORS` - `true` to swallow subscriber errors (default: `false`)

mod core;

pub use core::{ConfigStore, EncodeFn, Overrides, RouteOptions};

#[cfg(test)]
mod tests;
