//! Command-line interface for tabrecon

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tabrecon")]
#[command(about = "Reconcile two tabular data files and report every divergence")]
#[command(version)]
pub struct Cli {
    /// First table (base A): csv, tsv, parquet, json or spreadsheet
    pub base_a: PathBuf,

    /// Second table (base B)
    pub base_b: PathBuf,

    /// Comma-separated key columns; rows are paired by position when omitted or blank
    #[arg(short, long)]
    pub key: Option<String>,

    /// Report path (.xlsx or .json); defaults to a timestamped .xlsx name
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Worksheet to read from spreadsheet inputs
    #[arg(long)]
    pub sheet: Option<String>,

    /// Output format: "pretty", "json"
    #[arg(long, default_value = "pretty", value_parser = OutputFormat::parse)]
    pub format: OutputFormat,

    /// Quiet output (machine-readable)
    #[arg(long)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse output format string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}
