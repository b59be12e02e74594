use crate::config::Overrides;
use crate::error::RouteError;
use crate::location::ParsedRoute;
use crate::logging::{init_logging_with_config, LogConfig};
use crate::pattern::{ParamValue, PathParams};
use crate::router::Router;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Command-line interface for pathstream
#[derive(Debug, Parser)]
#[command(name = "pathstream", version)]
#[command(about = "Match locations against route patterns", long_about = None)]
pub struct Cli {
    /// Pretty debug logging on stderr
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Read locations from stdin and print one JSON line per route match
    Match {
        /// Route pattern (repeat for several routes)
        #[arg(short, long = "pattern", required = true)]
        patterns: Vec<String>,

        /// Base prefix stripped before matching
        #[arg(long, env = "PATHSTREAM_BASE")]
        base: Option<String>,

        /// Strip one leading '#' before matching
        #[arg(long, default_value_t = false)]
        hash: bool,

        /// Decode the whole path before matching
        #[arg(long, default_value_t = false)]
        decode_uri: bool,

        /// Case sensitive matching
        #[arg(long, default_value_t = false)]
        sensitive: bool,

        /// Disallow an optional trailing delimiter
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Log failing locations and continue instead of exiting
        #[arg(long, default_value_t = false)]
        silent_errors: bool,
    },
    /// Build a concrete path from a pattern and parameters
    Build {
        /// Route pattern, e.g. /users/:id
        pattern: String,

        /// Parameter as name=value (repeat a name for array values)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

/// Parse a `name=value` pair.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got '{raw}'")),
    }
}

fn path_params(pairs: &[(String, String)]) -> PathParams {
    let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (name, value) in pairs {
        grouped.entry(name).or_default().push(value.clone());
    }
    grouped
        .into_iter()
        .map(|(name, mut values)| {
            let value = if values.len() == 1 {
                ParamValue::Single(values.remove(0))
            } else {
                ParamValue::Repeated(values)
            };
            (name, value)
        })
        .collect()
}

#[derive(Serialize)]
struct MatchLine<'a> {
    pattern: &'a str,
    #[serde(flatten)]
    route: &'a ParsedRoute,
}

fn match_overrides(
    base: Option<&str>,
    hash: bool,
    decode_uri: bool,
    sensitive: bool,
    strict: bool,
    silent_errors: bool,
) -> Overrides {
    let mut overrides = Overrides::new();
    if let Some(base) = base {
        overrides = overrides.base(base);
    }
    if hash {
        overrides = overrides.hash(true);
    }
    if decode_uri {
        overrides = overrides.decode_uri(true);
    }
    if sensitive {
        overrides = overrides.sensitive(true);
    }
    if strict {
        overrides = overrides.strict(true);
    }
    if silent_errors {
        overrides = overrides.silent_errors(true);
    }
    overrides
}

fn run_match<R: BufRead, W: Write>(
    router: &Router,
    patterns: &[String],
    overrides: &Overrides,
    input: R,
    output: &mut W,
) -> Result<()> {
    let pending: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let mut channels = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let channel = router
            .route_with(pattern, overrides)
            .with_context(|| format!("Failed to register route '{pattern}'"))?;
        let sink = Arc::clone(&pending);
        let source = pattern.clone();
        channel.on_value(move |route| {
            let line = serde_json::to_string(&MatchLine {
                pattern: &source,
                route,
            })
            .map_err(RouteError::subscriber)?;
            sink.lock().push(line);
            Ok(())
        });
        channels.push(channel);
    }

    let mut outcome = Ok(());
    for line in input.lines() {
        let line = line.context("Failed to read location from stdin")?;
        let location = line.trim();
        if location.is_empty() {
            continue;
        }
        let pushed = router
            .push(location)
            .with_context(|| format!("Failed to route '{location}'"));
        for json in pending.lock().drain(..) {
            writeln!(output, "{json}").context("Failed to write match")?;
        }
        if pushed.is_err() {
            outcome = pushed;
            break;
        }
    }

    for channel in &channels {
        channel.close();
    }
    outcome
}

/// Execute a parsed command against `router`.
pub fn run<R: BufRead, W: Write>(cli: Cli, router: &Router, input: R, output: &mut W) -> Result<()> {
    match cli.command {
        Commands::Match {
            patterns,
            base,
            hash,
            decode_uri,
            sensitive,
            strict,
            silent_errors,
        } => {
            let overrides = match_overrides(
                base.as_deref(),
                hash,
                decode_uri,
                sensitive,
                strict,
                silent_errors,
            );
            run_match(router, &patterns, &overrides, input, output)
        }
        Commands::Build { pattern, params } => {
            let path = router
                .to_path(&pattern, &path_params(&params))
                .with_context(|| format!("Failed to build path for '{pattern}'"))?;
            writeln!(output, "{path}").context("Failed to write path")?;
            Ok(())
        }
    }
}

/// Logging for the binary: quiet unless asked, so stdout stays JSON.
pub(crate) fn log_config(verbose: bool) -> LogConfig {
    if verbose {
        return LogConfig::default_dev();
    }
    let mut config = LogConfig::from_env();
    if std::env::var_os("PATHSTREAM_LOG_LEVEL").is_none() {
        config.log_level = "warn".to_string();
    }
    config
}

/// Entry point of the `pathstream` binary.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = init_logging_with_config(&log_config(cli.verbose)) {
        eprintln!("Warning: {err:#}");
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut output = stdout.lock();
    run(cli, crate::router(), stdin.lock(), &mut output)
}
