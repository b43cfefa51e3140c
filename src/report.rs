//! Divergence reports: a multi-sheet workbook or a JSON document

use crate::divergence::{DivergenceKind, DivergenceRecord, Observed};
use crate::error::{ReconError, Result};
use crate::hash::TableFingerprint;
use crate::reconcile::Reconciliation;
use crate::summary::MetricValue;
use crate::table::Value;
use chrono::{DateTime, Local};
use indexmap::IndexMap;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DIVERGENCES_SHEET: &str = "Divergences";
pub const SUMMARY_SHEET: &str = "Summary";
pub const STATS_SHEET: &str = "Stats by kind";

/// Excel's limit on worksheet name length
const MAX_SHEET_NAME: usize = 31;

const DIVERGENCE_HEADERS: [&str; 6] =
    ["key", "kind", "column", "value_a", "value_b", "description"];

/// Report output formats, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Xlsx,
    Json,
}

impl ReportFormat {
    pub fn detect(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "xlsx" => Some(Self::Xlsx),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Where the inputs came from and what they contained
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub generated_at: DateTime<Local>,
    pub tool_version: String,
    pub source_a: PathBuf,
    pub source_b: PathBuf,
    pub fingerprint_a: TableFingerprint,
    pub fingerprint_b: TableFingerprint,
}

impl RunMetadata {
    pub fn new(
        source_a: &Path,
        source_b: &Path,
        fingerprint_a: TableFingerprint,
        fingerprint_b: TableFingerprint,
    ) -> Self {
        Self {
            generated_at: Local::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            source_a: source_a.to_path_buf(),
            source_b: source_b.to_path_buf(),
            fingerprint_a,
            fingerprint_b,
        }
    }
}

/// JSON report layout
#[derive(Debug, Serialize)]
struct ReportDocument<'r> {
    metadata: &'r RunMetadata,
    summary: IndexMap<String, MetricValue>,
    divergences: &'r [DivergenceRecord],
}

/// Timestamped report name used when no path is given
pub fn default_report_path(now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!("divergence_report_{}.xlsx", now.format("%Y%m%d_%H%M%S")))
}

/// Writes a reconciliation result to disk
pub struct ReportWriter<'r> {
    result: &'r Reconciliation,
    metadata: &'r RunMetadata,
}

impl<'r> ReportWriter<'r> {
    pub fn new(result: &'r Reconciliation, metadata: &'r RunMetadata) -> Self {
        Self { result, metadata }
    }

    /// Write the report in the format implied by `path`'s extension
    pub fn write(&self, path: &Path) -> Result<ReportFormat> {
        let format =
            ReportFormat::detect(path).ok_or_else(|| ReconError::unsupported_format(path))?;

        match format {
            ReportFormat::Xlsx => self.write_xlsx(path)?,
            ReportFormat::Json => self.write_json(path)?,
        }

        log::info!(
            "Wrote report with {} divergences to {}",
            self.result.divergences.len(),
            path.display()
        );
        Ok(format)
    }

    fn write_json(&self, path: &Path) -> Result<()> {
        let document = ReportDocument {
            metadata: self.metadata,
            summary: self.result.stats.metrics(),
            divergences: &self.result.divergences,
        };
        fs::write(path, serde_json::to_string_pretty(&document)?)?;
        Ok(())
    }

    fn write_xlsx(&self, path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        let sheet = workbook.add_worksheet().set_name(DIVERGENCES_SHEET)?;
        write_divergences(sheet, &header, &self.result.divergences)?;

        let sheet = workbook.add_worksheet().set_name(SUMMARY_SHEET)?;
        self.write_summary(sheet, &header)?;

        let sheet = workbook.add_worksheet().set_name(STATS_SHEET)?;
        sheet.write_string_with_format(0, 0, "kind", &header)?;
        sheet.write_string_with_format(0, 1, "count", &header)?;
        for (row, (kind, count)) in (1u32..).zip(&self.result.stats.divergences_by_kind) {
            sheet.write_string(row, 0, kind.label())?;
            sheet.write_number(row, 1, *count as f64)?;
        }

        for kind in self.result.kinds_present() {
            let records: Vec<DivergenceRecord> = self.result.of_kind(kind).cloned().collect();
            let sheet = workbook.add_worksheet().set_name(kind_sheet_name(kind))?;
            write_divergences(sheet, &header, &records)?;
        }

        workbook.save(path)?;
        Ok(())
    }

    fn write_summary(&self, sheet: &mut Worksheet, header: &Format) -> Result<()> {
        sheet.write_string_with_format(0, 0, "metric", header)?;
        sheet.write_string_with_format(0, 1, "value", header)?;

        let metadata = self.metadata;
        let mut rows: Vec<(String, MetricValue)> =
            self.result.stats.metrics().into_iter().collect();
        rows.extend([
            (
                "generated_at".to_string(),
                MetricValue::Text(metadata.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            ),
            ("source_a".to_string(), MetricValue::Text(metadata.source_a.display().to_string())),
            ("source_b".to_string(), MetricValue::Text(metadata.source_b.display().to_string())),
            (
                "fingerprint_a".to_string(),
                MetricValue::Text(metadata.fingerprint_a.content_hash.clone()),
            ),
            (
                "fingerprint_b".to_string(),
                MetricValue::Text(metadata.fingerprint_b.content_hash.clone()),
            ),
            ("tool_version".to_string(), MetricValue::Text(metadata.tool_version.clone())),
        ]);

        for (row, (name, value)) in (1u32..).zip(&rows) {
            sheet.write_string(row, 0, name)?;
            match value {
                MetricValue::Count(n) => sheet.write_number(row, 1, *n as f64)?,
                other => sheet.write_string(row, 1, other.to_string())?,
            };
        }

        sheet.set_column_width(0, 28)?;
        sheet.set_column_width(1, 40)?;
        Ok(())
    }
}

fn write_divergences(
    sheet: &mut Worksheet,
    header: &Format,
    records: &[DivergenceRecord],
) -> Result<()> {
    for (col, name) in (0u16..).zip(DIVERGENCE_HEADERS) {
        sheet.write_string_with_format(0, col, name, header)?;
    }

    for (row, record) in (1u32..).zip(records) {
        sheet.write_string(row, 0, &record.key)?;
        sheet.write_string(row, 1, record.kind.label())?;
        sheet.write_string(row, 2, &record.column)?;
        write_observed(sheet, row, 3, &record.value_a)?;
        write_observed(sheet, row, 4, &record.value_b)?;
        sheet.write_string(row, 5, &record.description)?;
    }

    sheet.set_column_width(5, 60)?;
    Ok(())
}

/// Numbers and booleans keep their cell type; everything else is text
fn write_observed(sheet: &mut Worksheet, row: u32, col: u16, observed: &Observed) -> Result<()> {
    match observed {
        Observed::Value(Value::Int(i)) => sheet.write_number(row, col, *i as f64)?,
        Observed::Value(Value::Float(f)) => sheet.write_number(row, col, *f)?,
        Observed::Value(Value::Bool(b)) => sheet.write_boolean(row, col, *b)?,
        other => sheet.write_string(row, col, other.to_string())?,
    };
    Ok(())
}

fn kind_sheet_name(kind: DivergenceKind) -> String {
    kind.label().chars().take(MAX_SHEET_NAME).collect()
}
