//! Column-set validation and projection onto the shared columns

use crate::table::Table;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashSet;

/// Outcome of comparing the column sets of two tables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureReport {
    /// Columns present in both tables, in table A's order
    pub common: Vec<String>,
    /// Columns only table A has
    pub only_in_a: Vec<String>,
    /// Columns only table B has
    pub only_in_b: Vec<String>,
}

impl StructureReport {
    /// Compare the column sets of two tables
    pub fn compare(a: &Table, b: &Table) -> Self {
        let names_a: HashSet<&str> = a.columns().iter().map(String::as_str).collect();
        let names_b: HashSet<&str> = b.columns().iter().map(String::as_str).collect();

        let common = a
            .columns()
            .iter()
            .filter(|c| names_b.contains(c.as_str()))
            .cloned()
            .collect();
        let only_in_a = a
            .columns()
            .iter()
            .filter(|c| !names_b.contains(c.as_str()))
            .cloned()
            .collect();
        let only_in_b = b
            .columns()
            .iter()
            .filter(|c| !names_a.contains(c.as_str()))
            .cloned()
            .collect();

        Self {
            common,
            only_in_a,
            only_in_b,
        }
    }

    /// Both tables carry the same set of column names (order may differ)
    pub fn is_identical(&self) -> bool {
        self.only_in_a.is_empty() && self.only_in_b.is_empty()
    }
}

/// Tables after structure validation, borrowed when nothing had to be dropped
#[derive(Debug)]
pub struct ValidatedTables<'t> {
    pub a: Cow<'t, Table>,
    pub b: Cow<'t, Table>,
    pub report: StructureReport,
}

impl ValidatedTables<'_> {
    /// True when the tables had to be narrowed to their shared columns
    pub fn was_projected(&self) -> bool {
        matches!(self.a, Cow::Owned(_)) || matches!(self.b, Cow::Owned(_))
    }
}

/// Structure validator: first stage of a reconciliation run
pub struct StructureValidator;

impl StructureValidator {
    /// Intersect the column sets and project both tables onto the common columns.
    ///
    /// Never fails. An empty intersection leaves zero comparable columns while
    /// keeping every row, so missing rows are still detected downstream.
    pub fn validate<'t>(a: &'t Table, b: &'t Table) -> ValidatedTables<'t> {
        let report = StructureReport::compare(a, b);

        if report.is_identical() {
            log::debug!("Column sets match ({} columns)", report.common.len());
            return ValidatedTables {
                a: Cow::Borrowed(a),
                b: Cow::Borrowed(b),
                report,
            };
        }

        if !report.only_in_a.is_empty() {
            log::warn!("Columns only in table A: {:?}", report.only_in_a);
        }
        if !report.only_in_b.is_empty() {
            log::warn!("Columns only in table B: {:?}", report.only_in_b);
        }
        log::info!("Continuing with {} common columns", report.common.len());

        ValidatedTables {
            a: Cow::Owned(a.project(&report.common)),
            b: Cow::Owned(b.project(&report.common)),
            report,
        }
    }
}
