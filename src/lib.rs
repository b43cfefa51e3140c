//! # tabrecon
//!
//! Reconciles two tabular datasets: validates that they share columns,
//! aligns rows by key columns or by position, and reports every row present
//! on one side only and every cell whose values differ.

pub mod align;
pub mod cli;
pub mod commands;
pub mod config;
pub mod data;
pub mod divergence;
pub mod duckdb_config;
pub mod error;
pub mod hash;
pub mod output;
pub mod progress;
pub mod reconcile;
pub mod report;
pub mod structure;
pub mod summary;
pub mod table;

pub use align::KeySpec;
pub use divergence::{DivergenceKind, DivergenceRecord, Observed};
pub use error::{ReconError, Result};
pub use reconcile::{reconcile, Reconciliation};
pub use summary::SummaryStats;
pub use table::{Cell, Table, Value};
