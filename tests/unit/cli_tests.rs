//! Unit tests for CLI argument parsing and validation

use clap::Parser;
use std::path::PathBuf;
use tabrecon::cli::{Cli, OutputFormat};

#[test]
fn test_cli_positional_inputs() {
    let cli = Cli::try_parse_from(&["tabrecon", "base1.csv", "base2.xlsx"]).unwrap();
    assert_eq!(cli.base_a, PathBuf::from("base1.csv"));
    assert_eq!(cli.base_b, PathBuf::from("base2.xlsx"));
    assert!(cli.key.is_none());
    assert!(cli.report.is_none());
    assert!(cli.config.is_none());
    assert!(!cli.verbose);
}

#[test]
fn test_cli_short_flags() {
    let cli = Cli::try_parse_from(&[
        "tabrecon", "a.csv", "b.csv", "-k", "id,branch", "-r", "out.xlsx", "-v",
    ])
    .unwrap();
    assert_eq!(cli.key.as_deref(), Some("id,branch"));
    assert_eq!(cli.report, Some(PathBuf::from("out.xlsx")));
    assert!(cli.verbose);
}

#[test]
fn test_cli_long_flags() {
    let cli = Cli::try_parse_from(&[
        "tabrecon",
        "a.xlsx",
        "b.xlsx",
        "--key",
        "id",
        "--report",
        "out.json",
        "--config",
        "recon.json",
        "--sheet",
        "Data",
        "--format",
        "json",
        "--quiet",
    ])
    .unwrap();
    assert_eq!(cli.key.as_deref(), Some("id"));
    assert_eq!(cli.config, Some(PathBuf::from("recon.json")));
    assert_eq!(cli.sheet.as_deref(), Some("Data"));
    assert_eq!(cli.format, OutputFormat::Json);
    assert!(cli.quiet);
}

#[test]
fn test_cli_blank_key_is_accepted() {
    let cli = Cli::try_parse_from(&["tabrecon", "a.csv", "b.csv", "--key", ""]).unwrap();
    assert_eq!(cli.key.as_deref(), Some(""));
}

#[test]
fn test_cli_requires_two_inputs() {
    assert!(Cli::try_parse_from(&["tabrecon"]).is_err());
    assert!(Cli::try_parse_from(&["tabrecon", "a.csv"]).is_err());
}

#[test]
fn test_cli_rejects_unknown_format() {
    assert!(Cli::try_parse_from(&["tabrecon", "a.csv", "b.csv", "--format", "yaml"]).is_err());
}
