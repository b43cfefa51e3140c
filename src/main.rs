//! Main entry point for tabrecon CLI

use clap::Parser;
use tabrecon::cli::Cli;
use tabrecon::commands::execute;
use tabrecon::duckdb_config;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG, when set, takes precedence over the default level
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = duckdb_config::init_duckdb() {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    match execute(cli) {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
