//! Command implementation for the tabrecon CLI

use crate::align::KeySpec;
use crate::cli::{Cli, OutputFormat};
use crate::config::ReconConfig;
use crate::data::{DataProcessor, LoadOptions, LoadedTable};
use crate::duckdb_config::DuckDbConfig;
use crate::error::{ReconError, Result};
use crate::hash::HashComputer;
use crate::output::{JsonFormatter, PrettyPrinter, ReportStatus};
use crate::progress::ProgressReporter;
use crate::reconcile::{reconcile, Reconciliation};
use crate::report::{default_report_path, ReportFormat, ReportWriter, RunMetadata};
use chrono::Local;
use std::path::{Path, PathBuf};

/// How a run ended, mapped to the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Identical,
    Divergent,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Identical => 0,
            Outcome::Divergent => 1,
        }
    }
}

/// Settings for one run after CLI flags are layered over the config file
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub key: KeySpec,
    pub report_path: PathBuf,
    pub config: ReconConfig,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl RunSettings {
    /// CLI flags win over config values; an explicit blank `--key` means positional
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = ReconConfig::load_or_default(cli.config.as_deref())?;

        let key = match &cli.key {
            Some(spec) => KeySpec::parse(Some(spec.as_str()))?,
            None if config.key_columns.is_empty() => KeySpec::Positional,
            None => KeySpec::columns(config.key_columns.iter().cloned())?,
        };

        if cli.sheet.is_some() {
            config.sheet = cli.sheet.clone();
        }

        let report_path = match cli.report.clone().or_else(|| config.report_path.clone()) {
            Some(path) => {
                if ReportFormat::detect(&path).is_none() {
                    return Err(ReconError::unsupported_format(path));
                }
                path
            }
            None => default_report_path(Local::now()),
        };

        if cli.quiet || cli.format == OutputFormat::Json {
            config.show_progress = false;
        }

        Ok(Self {
            key,
            report_path,
            config,
            format: cli.format,
            quiet: cli.quiet,
        })
    }

    fn pretty(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Pretty
    }
}

/// Execute a reconciliation run
pub fn execute(cli: Cli) -> Result<Outcome> {
    let settings = RunSettings::resolve(&cli)?;
    run(&cli.base_a, &cli.base_b, &settings)
}

/// Load both inputs, reconcile them, print the outcome and write the report
pub fn run(base_a: &Path, base_b: &Path, settings: &RunSettings) -> Result<Outcome> {
    for path in [base_a, base_b] {
        if !DataProcessor::is_supported_format(path) {
            return Err(ReconError::unsupported_format(path));
        }
    }

    let mut progress = if settings.config.show_progress {
        ProgressReporter::new_for_run()
    } else {
        ProgressReporter::new_minimal()
    };

    let processor =
        DataProcessor::new_with_options(&DuckDbConfig::new(), LoadOptions::from(&settings.config))?;
    let loaded_a = load(&processor, base_a, &mut progress)?;
    let loaded_b = load(&processor, base_b, &mut progress)?;

    let metadata = RunMetadata::new(
        base_a,
        base_b,
        HashComputer::fingerprint(&loaded_a.table),
        HashComputer::fingerprint(&loaded_b.table),
    );

    progress.start_reconcile();
    let result = reconcile(&loaded_a.table, &loaded_b.table, &settings.key)?;
    progress.finish_reconcile(&format!(
        "Reconciled: {} divergences",
        result.stats.total_divergences
    ));

    let report = if result.is_identical() {
        log::info!("No divergences found; no report written");
        ReportStatus::Skipped
    } else {
        write_report(&result, &metadata, &settings.report_path, &mut progress)
    };
    progress.clear();

    match settings.format {
        _ if settings.quiet => {
            PrettyPrinter::print_quiet(&result, &report, settings.config.preview_limit)
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::format_run(&result, &metadata, report.path())?)
        }
        OutputFormat::Pretty => print_pretty(base_a, base_b, settings, &result, report.path()),
    }

    if settings.pretty() {
        PrettyPrinter::print_elapsed(progress.elapsed());
    }

    Ok(if result.is_identical() {
        Outcome::Identical
    } else {
        Outcome::Divergent
    })
}

fn load(
    processor: &DataProcessor,
    path: &Path,
    progress: &mut ProgressReporter,
) -> Result<LoadedTable> {
    progress.start_load(&format!("Loading {}...", path.display()));
    let loaded = processor.load_table(path)?;
    progress.finish_load(&format!(
        "Loaded {} ({} rows)",
        path.display(),
        loaded.table.row_count()
    ));
    Ok(loaded)
}

/// A failed write is logged and reported; the in-memory result stays intact
fn write_report(
    result: &Reconciliation,
    metadata: &RunMetadata,
    path: &Path,
    progress: &mut ProgressReporter,
) -> ReportStatus {
    progress.start_report(&format!("Writing report to {}...", path.display()));

    match ReportWriter::new(result, metadata).write(path) {
        Ok(_) => {
            progress.finish_report("Report written");
            ReportStatus::Written(path.to_path_buf())
        }
        Err(e) => {
            log::warn!("Failed to write report to {}: {}", path.display(), e);
            eprintln!("⚠️  Could not write report to {}: {}", path.display(), e);
            ReportStatus::Failed(format!("{}: {}", path.display(), e))
        }
    }
}

fn print_pretty(
    base_a: &Path,
    base_b: &Path,
    settings: &RunSettings,
    result: &Reconciliation,
    report: Option<&Path>,
) {
    PrettyPrinter::print_run_header(base_a, base_b, &result.stats.key);
    println!();
    PrettyPrinter::print_summary(result);

    if result.is_identical() {
        return;
    }

    println!();
    match report {
        Some(path) => PrettyPrinter::print_report_written(path),
        None => PrettyPrinter::print_preview(&result.divergences, settings.config.preview_limit),
    }
}
