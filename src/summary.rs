//! Summary statistics accumulated across the reconciliation stages

use crate::align::Alignment;
use crate::divergence::{DivergenceKind, DivergenceRecord};
use crate::structure::StructureReport;
use crate::table::Table;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// A single metric value in the flat summary mapping
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(usize),
    List(Vec<String>),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(n) => write!(f, "{}", n),
            MetricValue::List(items) if items.is_empty() => f.write_str("-"),
            MetricValue::List(items) => f.write_str(&items.join(", ")),
            MetricValue::Text(text) => f.write_str(text),
        }
    }
}

/// Run-scoped statistics.
///
/// Each stage fills in its own section through a `record_*` method, so the
/// struct is passed forward from stage to stage rather than shared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub rows_a: usize,
    pub rows_b: usize,
    pub columns_a: usize,
    pub columns_b: usize,
    pub columns_only_in_a: Vec<String>,
    pub columns_only_in_b: Vec<String>,
    pub common_columns: usize,
    pub rows_a_after_projection: usize,
    pub rows_b_after_projection: usize,
    pub key: String,
    pub compared_columns: usize,
    pub pairs_matched: usize,
    pub rows_only_in_a: usize,
    pub rows_only_in_b: usize,
    pub divergences_by_kind: IndexMap<DivergenceKind, usize>,
    pub total_divergences: usize,
}

impl Default for SummaryStats {
    fn default() -> Self {
        Self {
            rows_a: 0,
            rows_b: 0,
            columns_a: 0,
            columns_b: 0,
            columns_only_in_a: Vec::new(),
            columns_only_in_b: Vec::new(),
            common_columns: 0,
            rows_a_after_projection: 0,
            rows_b_after_projection: 0,
            key: String::new(),
            compared_columns: 0,
            pairs_matched: 0,
            rows_only_in_a: 0,
            rows_only_in_b: 0,
            divergences_by_kind: DivergenceKind::ALL.iter().map(|k| (*k, 0)).collect(),
            total_divergences: 0,
        }
    }
}

impl SummaryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input shapes, before any projection
    pub fn record_inputs(&mut self, a: &Table, b: &Table) {
        self.rows_a = a.row_count();
        self.rows_b = b.row_count();
        self.columns_a = a.column_count();
        self.columns_b = b.column_count();
    }

    /// Structure validator outcome and the projected shapes
    pub fn record_structure(&mut self, report: &StructureReport, a: &Table, b: &Table) {
        self.columns_only_in_a = report.only_in_a.clone();
        self.columns_only_in_b = report.only_in_b.clone();
        self.common_columns = report.common.len();
        self.rows_a_after_projection = a.row_count();
        self.rows_b_after_projection = b.row_count();
    }

    /// Pair counts from the aligner
    pub fn record_alignment(&mut self, alignment: &Alignment<'_>) {
        self.key = alignment.key.to_string();
        self.pairs_matched = alignment.both_count();
        self.rows_only_in_a = alignment.only_a_count();
        self.rows_only_in_b = alignment.only_b_count();
    }

    /// Divergence totals from the detector
    pub fn record_divergences(
        &mut self,
        divergences: &[DivergenceRecord],
        compared_columns: usize,
    ) {
        self.compared_columns = compared_columns;
        for count in self.divergences_by_kind.values_mut() {
            *count = 0;
        }
        for record in divergences {
            *self.divergences_by_kind.entry(record.kind).or_insert(0) += 1;
        }
        self.total_divergences = divergences.len();
    }

    /// Divergences of one kind
    pub fn count(&self, kind: DivergenceKind) -> usize {
        self.divergences_by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// No divergences of any kind
    pub fn is_identical(&self) -> bool {
        self.total_divergences == 0
    }

    /// Flat metric-name → value mapping, in a stable presentation order
    pub fn metrics(&self) -> IndexMap<String, MetricValue> {
        let mut metrics = IndexMap::new();
        let mut put = |name: &str, value: MetricValue| {
            metrics.insert(name.to_string(), value);
        };

        put("rows_a", MetricValue::Count(self.rows_a));
        put("rows_b", MetricValue::Count(self.rows_b));
        put("columns_a", MetricValue::Count(self.columns_a));
        put("columns_b", MetricValue::Count(self.columns_b));
        put("columns_only_in_a", MetricValue::List(self.columns_only_in_a.clone()));
        put("columns_only_in_b", MetricValue::List(self.columns_only_in_b.clone()));
        put("common_columns", MetricValue::Count(self.common_columns));
        put("rows_a_after_projection", MetricValue::Count(self.rows_a_after_projection));
        put("rows_b_after_projection", MetricValue::Count(self.rows_b_after_projection));
        put("key", MetricValue::Text(self.key.clone()));
        put("compared_columns", MetricValue::Count(self.compared_columns));
        put("pairs_matched", MetricValue::Count(self.pairs_matched));
        put("rows_only_in_a", MetricValue::Count(self.rows_only_in_a));
        put("rows_only_in_b", MetricValue::Count(self.rows_only_in_b));
        for (kind, count) in &self.divergences_by_kind {
            put(
                &format!("divergences_{}", kind.label().to_lowercase()),
                MetricValue::Count(*count),
            );
        }
        put("total_divergences", MetricValue::Count(self.total_divergences));

        metrics
    }
}
