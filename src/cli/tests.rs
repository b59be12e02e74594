//! Unit tests for CLI commands

use crate::cli::commands::log_config;
use crate::cli::{parse_param, run, Cli, Commands};
use crate::logging::LogFormat;
use crate::router::Router;
use clap::Parser;
use serde_json::Value;
use std::io::Cursor;

fn run_with_input(args: &[&str], input: &str) -> (anyhow::Result<()>, String) {
    let cli = Cli::try_parse_from(args).unwrap();
    let router = Router::new();
    let mut output = Vec::new();
    let result = run(cli, &router, Cursor::new(input.to_string()), &mut output);
    (result, String::from_utf8(output).unwrap())
}

#[test]
fn test_match_command_parses() {
    let cli = Cli::try_parse_from([
        "pathstream",
        "match",
        "-p",
        "/users/:id",
        "--pattern",
        "/posts/:id",
        "--hash",
        "--silent-errors",
    ])
    .unwrap();

    match cli.command {
        Commands::Match {
            patterns,
            hash,
            silent_errors,
            decode_uri,
            ..
        } => {
            assert_eq!(patterns, vec!["/users/:id", "/posts/:id"]);
            assert!(hash);
            assert!(silent_errors);
            assert!(!decode_uri);
        }
        Commands::Build { .. } => panic!("Expected Match command"),
    }
}

#[test]
fn test_match_requires_pattern() {
    assert!(Cli::try_parse_from(["pathstream", "match"]).is_err());
}

#[test]
fn test_parse_param() {
    assert_eq!(
        parse_param("id=42").unwrap(),
        ("id".to_string(), "42".to_string())
    );
    assert_eq!(
        parse_param("q=a=b").unwrap(),
        ("q".to_string(), "a=b".to_string())
    );
    assert!(parse_param("novalue").is_err());
    assert!(parse_param("=x").is_err());
}

#[test]
fn test_match_prints_one_line_per_emission() {
    let (result, output) = run_with_input(
        &["pathstream", "match", "-p", "/users/:id", "-p", "/users/(.*)"],
        "/users/42\n\n/posts/1\n",
    );
    result.unwrap();

    let lines: Vec<Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["pattern"], "/users/:id");
    assert_eq!(lines[0]["params"]["id"], "42");
    assert_eq!(lines[0]["pathname"], "/users/42");
    assert_eq!(lines[1]["params"]["0"], "42");
}

#[test]
fn test_match_with_base() {
    let (result, output) = run_with_input(
        &["pathstream", "match", "-p", "/users/:id", "--base", "/app"],
        "/users/8\n/app/users/7\n",
    );
    result.unwrap();
    // the base is removed when present, paths without it still match
    let lines: Vec<Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["params"]["id"], "8");
    assert_eq!(lines[1]["params"]["id"], "7");
    assert_eq!(lines[1]["pathname"], "/users/7");
}

#[test]
fn test_build_command() {
    let (result, output) = run_with_input(
        &[
            "pathstream",
            "build",
            "/users/:id/files/:path+",
            "--param",
            "id=42",
            "-p",
            "path=a",
            "-p",
            "path=b",
        ],
        "",
    );
    result.unwrap();
    assert_eq!(output.trim(), "/users/42/files/a/b");
}

#[test]
fn test_build_command_missing_param() {
    let (result, _) = run_with_input(&["pathstream", "build", "/users/:id"], "");
    assert!(result.is_err());
}

#[test]
fn test_verbose_selects_dev_logging() {
    let cli = Cli::try_parse_from(["pathstream", "build", "/a", "--verbose"]).unwrap();
    assert!(cli.verbose);
    let quiet = Cli::try_parse_from(["pathstream", "build", "/a"]).unwrap();
    assert!(!quiet.verbose);

    let config = log_config(true);
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.format, LogFormat::Pretty);
    assert!(config.include_location);
}
