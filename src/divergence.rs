//! Divergence records and the detector that emits them from an alignment

use crate::align::{Alignment, Pairing};
use crate::table::{Cell, Table, Value};
use serde::Serialize;
use std::fmt;

/// Column label used by row-level divergences
pub const ALL_COLUMNS: &str = "ALL";

/// Category of a detected difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DivergenceKind {
    RowMissingInB,
    RowMissingInA,
    ValueMismatch,
}

impl DivergenceKind {
    pub const ALL: [DivergenceKind; 3] = [
        DivergenceKind::RowMissingInB,
        DivergenceKind::RowMissingInA,
        DivergenceKind::ValueMismatch,
    ];

    /// Stable label used in reports and metric names
    pub fn label(&self) -> &'static str {
        match self {
            Self::RowMissingInB => "ROW_MISSING_IN_B",
            Self::RowMissingInA => "ROW_MISSING_IN_A",
            Self::ValueMismatch => "VALUE_MISMATCH",
        }
    }
}

impl fmt::Display for DivergenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What one side of a divergence held.
///
/// `Null` is a cell that exists but holds no value; `RowPresent` and
/// `RowAbsent` describe whole rows and never stand in for cell values.
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    Value(Value),
    Null,
    RowPresent,
    RowAbsent,
}

impl Serialize for Observed {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match self {
            // JSON has no infinities; serde_json would write null and hide the divergence
            Observed::Value(Value::Float(f)) if !f.is_finite() => {
                serializer.serialize_str(&f.to_string())
            }
            Observed::Value(value) => value.serialize(serializer),
            Observed::Null => serializer.serialize_none(),
            Observed::RowPresent => serializer.serialize_str(Self::ROW_PRESENT),
            Observed::RowAbsent => serializer.serialize_str(Self::ROW_ABSENT),
        }
    }
}

impl Observed {
    pub const NULL: &'static str = "NULL";
    pub const ROW_PRESENT: &'static str = "ROW_PRESENT";
    pub const ROW_ABSENT: &'static str = "ROW_ABSENT";

    fn from_cell(cell: &Cell) -> Self {
        match cell {
            Some(value) => Observed::Value(value.clone()),
            None => Observed::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Observed::Null)
    }
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observed::Value(value) => write!(f, "{}", value),
            Observed::Null => f.write_str(Self::NULL),
            Observed::RowPresent => f.write_str(Self::ROW_PRESENT),
            Observed::RowAbsent => f.write_str(Self::ROW_ABSENT),
        }
    }
}

/// A single detected difference between the two tables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DivergenceRecord {
    pub key: String,
    pub kind: DivergenceKind,
    pub column: String,
    pub value_a: Observed,
    pub value_b: Observed,
    pub description: String,
}

impl DivergenceRecord {
    fn row_missing_in_b(key: &str, subject: Subject) -> Self {
        Self {
            key: key.to_string(),
            kind: DivergenceKind::RowMissingInB,
            column: ALL_COLUMNS.to_string(),
            value_a: Observed::RowPresent,
            value_b: Observed::RowAbsent,
            description: format!("{} exists in table A but not in table B", subject.row(key)),
        }
    }

    fn row_missing_in_a(key: &str, subject: Subject) -> Self {
        Self {
            key: key.to_string(),
            kind: DivergenceKind::RowMissingInA,
            column: ALL_COLUMNS.to_string(),
            value_a: Observed::RowAbsent,
            value_b: Observed::RowPresent,
            description: format!("{} exists in table B but not in table A", subject.row(key)),
        }
    }

    fn value_mismatch(key: &str, subject: Subject, column: &str, a: &Cell, b: &Cell) -> Self {
        Self {
            key: key.to_string(),
            kind: DivergenceKind::ValueMismatch,
            column: column.to_string(),
            value_a: Observed::from_cell(a),
            value_b: Observed::from_cell(b),
            description: format!("Divergence at {}, column \"{}\"", subject.at(key), column),
        }
    }
}

/// How a pair key reads in descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subject {
    Row,
    Key,
}

impl Subject {
    fn row(self, key: &str) -> String {
        match self {
            Subject::Row => format!("Row {}", key),
            Subject::Key => format!("Row with key {}", key),
        }
    }

    fn at(self, key: &str) -> String {
        match self {
            Subject::Row => format!("row {}", key),
            Subject::Key => format!("key {}", key),
        }
    }
}

/// A column compared cell by cell, with its position in each table
#[derive(Debug, Clone, PartialEq)]
pub struct ComparedColumn {
    pub name: String,
    pub index_a: usize,
    pub index_b: usize,
}

/// Cell equality: null equals null, null never equals a value, numbers compare numerically
pub fn cells_equal(a: &Cell, b: &Cell) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Walks an alignment and emits divergence records in pair order, then column order
pub struct DivergenceDetector {
    columns: Vec<ComparedColumn>,
    subject: Subject,
}

impl DivergenceDetector {
    /// Prepare a detector for two validated tables.
    ///
    /// Compared columns are the common columns in A's order, minus key columns.
    pub fn new(a: &Table, b: &Table, key_columns: &[String]) -> Self {
        let columns = a
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, name)| !key_columns.contains(*name))
            .filter_map(|(index_a, name)| {
                b.column_index(name).map(|index_b| ComparedColumn {
                    name: name.clone(),
                    index_a,
                    index_b,
                })
            })
            .collect();

        let subject = if key_columns.is_empty() {
            Subject::Row
        } else {
            Subject::Key
        };

        Self { columns, subject }
    }

    pub fn compared_columns(&self) -> &[ComparedColumn] {
        &self.columns
    }

    /// Emit all divergences for the alignment
    pub fn detect(&self, alignment: &Alignment<'_>) -> Vec<DivergenceRecord> {
        let mut divergences = Vec::new();

        for pair in &alignment.pairs {
            match pair.pairing {
                Pairing::OnlyA(_) => {
                    divergences.push(DivergenceRecord::row_missing_in_b(&pair.key, self.subject))
                }
                Pairing::OnlyB(_) => {
                    divergences.push(DivergenceRecord::row_missing_in_a(&pair.key, self.subject))
                }
                Pairing::Both { a, b } => self.compare_rows(&pair.key, a, b, &mut divergences),
            }
        }

        log::debug!(
            "Detected {} divergences across {} compared columns",
            divergences.len(),
            self.columns.len()
        );

        divergences
    }

    fn compare_rows(&self, key: &str, a: &[Cell], b: &[Cell], out: &mut Vec<DivergenceRecord>) {
        for column in &self.columns {
            let cell_a = &a[column.index_a];
            let cell_b = &b[column.index_b];

            if !cells_equal(cell_a, cell_b) {
                out.push(DivergenceRecord::value_mismatch(
                    key,
                    self.subject,
                    &column.name,
                    cell_a,
                    cell_b,
                ));
            }
        }
    }
}
