//! Content fingerprints for loaded tables

use crate::table::{Cell, Table, Value};
use blake3::Hasher;
use serde::Serialize;

/// A hash value represented as a hex string
pub type HashValue = String;

/// Fingerprint of one loaded table, recorded in report metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableFingerprint {
    pub schema_hash: HashValue,
    pub content_hash: HashValue,
    pub row_count: usize,
    pub column_count: usize,
}

/// Hash computer for tables.
///
/// Cells are hashed with a type tag so that the text `"1"` and the number `1`
/// never collide. Integral floats hash like integers, matching how the engine
/// compares numbers.
pub struct HashComputer;

impl HashComputer {
    /// Compute hash for column names, in order
    pub fn hash_schema(columns: &[String]) -> HashValue {
        let mut hasher = Hasher::new();
        for name in columns {
            hasher.update(name.as_bytes());
            hasher.update(b"|");
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Compute hash for one row of cells
    pub fn hash_row(row: &[Cell]) -> HashValue {
        let mut hasher = Hasher::new();
        Self::update_row(&mut hasher, row);
        hasher.finalize().to_hex().to_string()
    }

    /// Fingerprint a whole table: schema plus every row in order
    pub fn fingerprint(table: &Table) -> TableFingerprint {
        let schema_hash = Self::hash_schema(table.columns());

        let mut hasher = Hasher::new();
        hasher.update(schema_hash.as_bytes());
        for row in table.rows() {
            Self::update_row(&mut hasher, row);
            hasher.update(b"\n");
        }

        TableFingerprint {
            schema_hash,
            content_hash: hasher.finalize().to_hex().to_string(),
            row_count: table.row_count(),
            column_count: table.column_count(),
        }
    }

    fn update_row(hasher: &mut Hasher, row: &[Cell]) {
        for cell in row {
            match cell {
                None => {
                    hasher.update(b"n");
                }
                Some(Value::Bool(b)) => {
                    hasher.update(if *b { b"b1" } else { b"b0" });
                }
                Some(Value::Int(i)) => {
                    hasher.update(b"i");
                    hasher.update(&i.to_le_bytes());
                }
                Some(Value::Float(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    hasher.update(b"i");
                    hasher.update(&(*f as i64).to_le_bytes());
                }
                Some(Value::Float(f)) => {
                    hasher.update(b"f");
                    hasher.update(&f.to_le_bytes());
                }
                Some(Value::Text(s)) => {
                    hasher.update(b"s");
                    hasher.update(&(s.len() as u64).to_le_bytes());
                    hasher.update(s.as_bytes());
                }
            }
            hasher.update(b"|");
        }
    }
}
