//! Reconciliation engine: validate → align → detect → summarise

use crate::align::{Aligner, KeySpec};
use crate::divergence::{DivergenceDetector, DivergenceKind, DivergenceRecord};
use crate::error::Result;
use crate::structure::StructureValidator;
use crate::summary::SummaryStats;
use crate::table::Table;
use serde::Serialize;

/// Output of one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub divergences: Vec<DivergenceRecord>,
    pub stats: SummaryStats,
}

impl Reconciliation {
    /// True when no divergence of any kind was found
    pub fn is_identical(&self) -> bool {
        self.divergences.is_empty()
    }

    /// Divergences of a single kind, in emission order
    pub fn of_kind(&self, kind: DivergenceKind) -> impl Iterator<Item = &DivergenceRecord> {
        self.divergences.iter().filter(move |d| d.kind == kind)
    }

    /// Kinds that occur at least once, in their canonical order
    pub fn kinds_present(&self) -> Vec<DivergenceKind> {
        DivergenceKind::ALL
            .into_iter()
            .filter(|kind| self.stats.count(*kind) > 0)
            .collect()
    }
}

/// Reconcile two loaded tables under a key specification.
///
/// Deterministic and side-effect free: the inputs are only read, and the
/// same inputs always yield the same divergences in the same order. Fails
/// only when a key column is missing after structure validation.
pub fn reconcile(a: &Table, b: &Table, key: &KeySpec) -> Result<Reconciliation> {
    let mut stats = SummaryStats::new();
    stats.record_inputs(a, b);

    let validated = StructureValidator::validate(a, b);
    stats.record_structure(&validated.report, &validated.a, &validated.b);

    let alignment = Aligner::align(&validated.a, &validated.b, key)?;
    stats.record_alignment(&alignment);

    let detector = DivergenceDetector::new(&validated.a, &validated.b, key.key_columns());
    let divergences = detector.detect(&alignment);
    stats.record_divergences(&divergences, detector.compared_columns().len());

    log::info!(
        "Reconciled {} pairs: {} divergences",
        alignment.pairs.len(),
        divergences.len()
    );

    Ok(Reconciliation { divergences, stats })
}
