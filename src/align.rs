//! Key resolution and row alignment between two tables

use crate::error::{ReconError, Result};
use crate::table::{display_cell, Cell, KeyAtom, Table};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// How rows of the two tables are matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "columns", rename_all = "snake_case")]
pub enum KeySpec {
    /// Row i of A against row i of B
    Positional,
    /// Full outer join on these columns, in order
    Columns(Vec<String>),
}

impl KeySpec {
    /// Parse a comma-separated key list; blank input means positional alignment
    pub fn parse(spec: Option<&str>) -> Result<Self> {
        let columns: Vec<String> = spec
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        if columns.is_empty() {
            Ok(Self::Positional)
        } else {
            Self::columns(columns)
        }
    }

    /// Key on explicit columns; the list must be non-empty and free of repeats
    pub fn columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(ReconError::config("key column list must not be empty"));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(ReconError::config(format!(
                    "key column '{}' is listed more than once",
                    column
                )));
            }
        }

        Ok(Self::Columns(columns))
    }

    /// Key columns, empty for positional alignment
    pub fn key_columns(&self) -> &[String] {
        match self {
            Self::Positional => &[],
            Self::Columns(columns) => columns,
        }
    }

    pub fn is_positional(&self) -> bool {
        matches!(self, Self::Positional)
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positional => f.write_str("row position"),
            Self::Columns(columns) => f.write_str(&columns.join(", ")),
        }
    }
}

/// Rows matched under one key value. Both sides can never be absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pairing<'t> {
    Both { a: &'t [Cell], b: &'t [Cell] },
    OnlyA(&'t [Cell]),
    OnlyB(&'t [Cell]),
}

/// One aligned (or one-sided) pair with the rendered key it was matched on
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentPair<'t> {
    pub key: String,
    pub pairing: Pairing<'t>,
}

/// Full pairing of two tables under a key specification
#[derive(Debug, Clone)]
pub struct Alignment<'t> {
    pub pairs: Vec<AlignmentPair<'t>>,
    pub key: KeySpec,
}

impl Alignment<'_> {
    /// Pairs with a row on both sides
    pub fn both_count(&self) -> usize {
        self.pairs
            .iter()
            .filter(|p| matches!(p.pairing, Pairing::Both { .. }))
            .count()
    }

    /// Pairs holding only a row from table A
    pub fn only_a_count(&self) -> usize {
        self.pairs
            .iter()
            .filter(|p| matches!(p.pairing, Pairing::OnlyA(_)))
            .count()
    }

    /// Pairs holding only a row from table B
    pub fn only_b_count(&self) -> usize {
        self.pairs
            .iter()
            .filter(|p| matches!(p.pairing, Pairing::OnlyB(_)))
            .count()
    }
}

/// Builds alignments; never mutates its inputs
pub struct Aligner;

impl Aligner {
    /// Align two structure-validated tables
    pub fn align<'t>(a: &'t Table, b: &'t Table, key: &KeySpec) -> Result<Alignment<'t>> {
        let pairs = match key {
            KeySpec::Positional => Self::align_positional(a, b),
            KeySpec::Columns(columns) => Self::align_by_key(a, b, columns)?,
        };

        log::debug!("Aligned {} pairs using key: {}", pairs.len(), key);

        Ok(Alignment {
            pairs,
            key: key.clone(),
        })
    }

    /// Pair rows by index; the 1-based row number is the key
    fn align_positional<'t>(a: &'t Table, b: &'t Table) -> Vec<AlignmentPair<'t>> {
        let len = a.row_count().max(b.row_count());

        (0..len)
            .filter_map(|i| {
                let pairing = match (a.rows().get(i), b.rows().get(i)) {
                    (Some(ra), Some(rb)) => Pairing::Both { a: ra, b: rb },
                    (Some(ra), None) => Pairing::OnlyA(ra),
                    (None, Some(rb)) => Pairing::OnlyB(rb),
                    (None, None) => return None,
                };
                Some(AlignmentPair {
                    key: (i + 1).to_string(),
                    pairing,
                })
            })
            .collect()
    }

    /// Full outer join on the key columns with duplicate-key fan-out.
    ///
    /// Output order: A rows in table order, each followed by its B matches in
    /// B order, then the B rows whose key never occurs in A.
    fn align_by_key<'t>(
        a: &'t Table,
        b: &'t Table,
        columns: &[String],
    ) -> Result<Vec<AlignmentPair<'t>>> {
        let key_a = Self::resolve_key_indices(a, b, columns)?;
        let key_b: Vec<usize> = columns
            .iter()
            .filter_map(|c| b.column_index(c))
            .collect();

        let mut b_by_key: HashMap<Vec<KeyAtom>, Vec<usize>> = HashMap::new();
        for (index, row) in b.rows().iter().enumerate() {
            b_by_key
                .entry(key_atoms(row, &key_b))
                .or_default()
                .push(index);
        }

        let mut pairs = Vec::with_capacity(a.row_count().max(b.row_count()));
        let mut keys_in_a = HashSet::new();

        for row_a in a.rows() {
            let atoms = key_atoms(row_a, &key_a);
            let label = key_label(row_a, &key_a);

            match b_by_key.get(&atoms) {
                Some(matches) => {
                    for &j in matches {
                        pairs.push(AlignmentPair {
                            key: label.clone(),
                            pairing: Pairing::Both {
                                a: row_a,
                                b: &b.rows()[j],
                            },
                        });
                    }
                }
                None => pairs.push(AlignmentPair {
                    key: label,
                    pairing: Pairing::OnlyA(row_a),
                }),
            }

            keys_in_a.insert(atoms);
        }

        for row_b in b.rows() {
            if !keys_in_a.contains(&key_atoms(row_b, &key_b)) {
                pairs.push(AlignmentPair {
                    key: key_label(row_b, &key_b),
                    pairing: Pairing::OnlyB(row_b),
                });
            }
        }

        Ok(pairs)
    }

    /// Column positions of the key in table A, failing if either table lacks a key column
    fn resolve_key_indices(a: &Table, b: &Table, columns: &[String]) -> Result<Vec<usize>> {
        if columns.is_empty() {
            return Err(ReconError::config("key column list must not be empty"));
        }

        let mut indices = Vec::with_capacity(columns.len());
        for column in columns {
            let missing = match (a.column_index(column), b.has_column(column)) {
                (Some(index), true) => {
                    indices.push(index);
                    continue;
                }
                (None, true) => "table A",
                (Some(_), false) => "table B",
                (None, false) => "both tables",
            };
            return Err(ReconError::config(format!(
                "requested key column '{}' not found after structure validation (missing from {})",
                column, missing
            )));
        }

        Ok(indices)
    }
}

fn key_atoms(row: &[Cell], indices: &[usize]) -> Vec<KeyAtom> {
    indices
        .iter()
        .map(|&i| row[i].as_ref().map_or(KeyAtom::Null, |v| v.key_atom()))
        .collect()
}

/// Single keys render as the bare value, compound keys as `[v1, v2]`
fn key_label(row: &[Cell], indices: &[usize]) -> String {
    match indices {
        [single] => display_cell(&row[*single]),
        _ => format!(
            "[{}]",
            indices
                .iter()
                .map(|&i| display_cell(&row[i]))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}
