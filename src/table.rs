//! In-memory table model shared by the loaders and the reconciliation engine

use crate::error::{ReconError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A typed, non-null cell value.
///
/// Numbers compare numerically across the integer/float split, so `Int(2)`
/// equals `Float(2.0)`. Values of different kinds are never equal: the text
/// `"1"` does not equal the number `1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// A cell is either a value or null (`None`)
pub type Cell = Option<Value>;

/// One row of cells, positionally aligned with the table's columns
pub type Row = Vec<Cell>;

impl Value {
    /// Build a float value, mapping NaN to null
    pub fn from_f64(f: f64) -> Cell {
        if f.is_nan() {
            None
        } else {
            Some(Value::Float(f))
        }
    }

    /// Short type name used in logs and reports
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }

    /// Hashable form used when joining on key columns.
    ///
    /// Integral floats collapse onto the integer atom so that keys loaded as
    /// `1` in one file and `1.0` in the other still meet.
    pub fn key_atom(&self) -> KeyAtom {
        match self {
            Value::Bool(b) => KeyAtom::Bool(*b),
            Value::Int(i) => KeyAtom::Int(*i),
            Value::Float(f) => match integral_i64(*f) {
                Some(i) => KeyAtom::Int(i),
                None => KeyAtom::Float(f.to_bits()),
            },
            Value::Text(s) => KeyAtom::Text(s.clone()),
        }
    }
}

/// The exact integer a float holds, if it is integral and inside `i64` range
fn integral_i64(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => {
                integral_i64(*f) == Some(*i)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Hashable projection of a key cell; null keys join with null keys
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyAtom {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Text(String),
}

/// Render a cell for keys and console output
pub fn display_cell(cell: &Cell) -> String {
    match cell {
        Some(value) => value.to_string(),
        None => "NULL".to_string(),
    }
}

/// Named columns plus rows of typed cells.
///
/// Every row holds exactly one cell per column and column names are unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table, checking row widths and column-name uniqueness
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(ReconError::invalid_table(format!(
                    "duplicate column name '{}'",
                    name
                )));
            }
        }

        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ReconError::invalid_table(format!(
                "row {} has {} cells but the table has {} columns",
                index + 1,
                row.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    /// Convenience constructor for string column names
    pub fn from_rows(columns: &[&str], rows: Vec<Row>) -> Result<Self> {
        Self::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    /// A table with columns but no rows
    pub fn empty(columns: Vec<String>) -> Result<Self> {
        Self::new(columns, Vec::new())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (row position, column name); `None` when out of range
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[index])
    }

    /// New table restricted to `columns`, in the given order.
    ///
    /// Names missing from this table are skipped. Row order is preserved.
    pub fn project(&self, columns: &[String]) -> Table {
        let indices: Vec<usize> = columns
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();

        Table {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }
}
