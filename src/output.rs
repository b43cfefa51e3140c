//! Output formatting utilities

use crate::divergence::{DivergenceKind, DivergenceRecord};
use crate::error::Result;
use crate::reconcile::Reconciliation;
use crate::report::RunMetadata;
use crate::summary::SummaryStats;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the report for a run ended up
#[derive(Debug, Clone, PartialEq)]
pub enum ReportStatus {
    /// Identical inputs, nothing to write
    Skipped,
    Written(PathBuf),
    /// The write failed with this message
    Failed(String),
}

impl ReportStatus {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ReportStatus::Written(path) => Some(path),
            _ => None,
        }
    }
}

/// Pretty printer for tabrecon output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print the run header
    pub fn print_run_header(base_a: &Path, base_b: &Path, key: &str) {
        println!("🔍 Reconciling {} → {}", base_a.display(), base_b.display());
        println!("└─ Key: {}", key);
    }

    /// Print column-set differences found by structure validation
    pub fn print_structure(stats: &SummaryStats) {
        if stats.columns_only_in_a.is_empty() && stats.columns_only_in_b.is_empty() {
            println!("├─ ✅ Structure: same columns ({})", stats.common_columns);
            return;
        }

        println!("├─ ⚠️  Structure: column sets differ");
        if !stats.columns_only_in_a.is_empty() {
            println!("│  ├─ Only in A (ignored): {}", stats.columns_only_in_a.join(", "));
        }
        if !stats.columns_only_in_b.is_empty() {
            println!("│  ├─ Only in B (ignored): {}", stats.columns_only_in_b.join(", "));
        }
        println!("│  └─ Compared on {} common columns", stats.common_columns);
    }

    /// Print the summary by kind
    pub fn print_summary(result: &Reconciliation) {
        let stats = &result.stats;
        println!("📊 Reconciliation summary");
        println!("├─ Rows: {} in A, {} in B", stats.rows_a, stats.rows_b);
        Self::print_structure(stats);
        println!(
            "├─ Pairs matched: {} ({} columns compared)",
            stats.pairs_matched, stats.compared_columns
        );

        if result.is_identical() {
            println!("└─ ✅ Tables are identical");
            return;
        }

        println!("└─ ❌ Divergences: {}", stats.total_divergences);
        let kinds: Vec<(DivergenceKind, usize)> = stats
            .divergences_by_kind
            .iter()
            .map(|(kind, count)| (*kind, *count))
            .collect();
        for (i, (kind, count)) in kinds.iter().enumerate() {
            let prefix = if i == kinds.len() - 1 { "   └─" } else { "   ├─" };
            println!("{} {}: {}", prefix, kind, count);
        }
    }

    /// Print up to `limit` divergences
    pub fn print_preview(divergences: &[DivergenceRecord], limit: usize) {
        if divergences.is_empty() {
            return;
        }

        let shown = divergences.len().min(limit);
        println!("📋 First {} of {} divergences:", shown, divergences.len());
        for (i, record) in divergences.iter().take(shown).enumerate() {
            let prefix = if i == shown - 1 { "└─" } else { "├─" };
            println!("{} {}", prefix, format_divergence(record));
        }
    }

    /// Print where the report went
    pub fn print_report_written(path: &Path) {
        println!("💾 Report saved to: {}", path.display());
    }

    pub fn print_elapsed(elapsed: Duration) {
        println!("⏱️  Finished in {:.2}s", elapsed.as_secs_f64());
    }

    /// Machine-readable `key=value` lines
    pub fn print_quiet(result: &Reconciliation, report: &ReportStatus, preview_limit: usize) {
        for line in quiet_lines(result, report, preview_limit) {
            println!("{}", line);
        }
    }
}

/// One-line rendering of a divergence
pub fn format_divergence(record: &DivergenceRecord) -> String {
    format!(
        "[{}] {} (A: {}, B: {})",
        record.kind, record.description, record.value_a, record.value_b
    )
}

fn quiet_lines(
    result: &Reconciliation,
    report: &ReportStatus,
    preview_limit: usize,
) -> Vec<String> {
    let stats = &result.stats;
    let mut lines = vec![format!("identical={}", result.is_identical())];
    for (kind, count) in &stats.divergences_by_kind {
        lines.push(format!("{}={}", kind.label().to_lowercase(), count));
    }
    lines.push(format!("total_divergences={}", stats.total_divergences));
    match report {
        ReportStatus::Skipped => {}
        ReportStatus::Written(path) => lines.push(format!("report={}", path.display())),
        ReportStatus::Failed(message) => {
            lines.push(format!("report_error={}", message));
            // the preview is the only place the divergences still show up
            for record in result.divergences.iter().take(preview_limit) {
                lines.push(format!("divergence={}", format_divergence(record)));
            }
        }
    }
    lines
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Format a whole run: metadata, summary metrics, divergences and report path
    pub fn format_run(
        result: &Reconciliation,
        metadata: &RunMetadata,
        report: Option<&Path>,
    ) -> Result<String> {
        let json = serde_json::json!({
            "metadata": metadata,
            "identical": result.is_identical(),
            "summary": result.stats.metrics(),
            "divergences": result.divergences,
            "report": report.map(|p| p.display().to_string()),
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }
}
