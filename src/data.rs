//! Table loading: delimited and columnar files through DuckDB, spreadsheets through calamine

use crate::config::ReconConfig;
use crate::duckdb_config::DuckDbConfig;
use crate::error::{ReconError, Result};
use crate::table::{Cell, Table, Value};
use calamine::{open_workbook_auto, Data, Reader};
use duckdb::types::ValueRef;
use duckdb::Connection;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File formats the loader understands, detected from the extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Read through a DuckDB table function
    DuckDb(DuckDbFormat),
    /// Read through calamine
    Spreadsheet,
}

/// Formats DuckDB reads directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuckDbFormat {
    Csv,
    Tsv,
    Parquet,
    Json,
}

impl SourceFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn detect(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        let format = match extension.as_str() {
            "csv" | "txt" => Self::DuckDb(DuckDbFormat::Csv),
            "tsv" | "tab" => Self::DuckDb(DuckDbFormat::Tsv),
            "parquet" => Self::DuckDb(DuckDbFormat::Parquet),
            "json" | "jsonl" | "ndjson" => Self::DuckDb(DuckDbFormat::Json),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::Spreadsheet,
            _ => return None,
        };
        Some(format)
    }
}

/// Column information reported by the loader
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

/// A loaded table plus where it came from
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub source: PathBuf,
    pub format: SourceFormat,
    pub columns: Vec<ColumnInfo>,
    pub table: Table,
}

/// Options that change how files are read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOptions {
    pub sheet: Option<String>,
    pub delimiter: Option<char>,
    pub null_values: Vec<String>,
}

impl From<&ReconConfig> for LoadOptions {
    fn from(config: &ReconConfig) -> Self {
        Self {
            sheet: config.sheet.clone(),
            delimiter: config.csv_delimiter,
            null_values: config.null_values.clone(),
        }
    }
}

/// Loader for the supported file formats
pub struct DataProcessor {
    connection: Connection,
    options: LoadOptions,
}

impl DataProcessor {
    /// Create a new data processor with default settings
    pub fn new() -> Result<Self> {
        Self::new_with_options(&DuckDbConfig::new(), LoadOptions::default())
    }

    /// Create a new data processor with custom configuration
    pub fn new_with_options(duckdb: &DuckDbConfig, options: LoadOptions) -> Result<Self> {
        Ok(Self {
            connection: duckdb.open_connection()?,
            options,
        })
    }

    /// Check if file format is supported
    pub fn is_supported_format(file_path: &Path) -> bool {
        SourceFormat::detect(file_path).is_some()
    }

    /// Load a file into a table, rejecting unsupported formats up front
    pub fn load_table(&self, file_path: &Path) -> Result<LoadedTable> {
        let format = SourceFormat::detect(file_path)
            .ok_or_else(|| ReconError::unsupported_format(file_path))?;

        if !file_path.exists() {
            return Err(ReconError::invalid_input(format!(
                "File not found: {}",
                file_path.display()
            )));
        }

        if !file_path.is_file() {
            return Err(ReconError::invalid_input(format!(
                "Path is not a file: {}",
                file_path.display()
            )));
        }

        let loaded = match format {
            SourceFormat::Spreadsheet => self.load_spreadsheet(file_path)?,
            SourceFormat::DuckDb(format) => self.load_with_duckdb(file_path, format)?,
        };

        log::info!(
            "Loaded {}: {} rows, {} columns",
            file_path.display(),
            loaded.table.row_count(),
            loaded.table.column_count()
        );
        log::debug!(
            "Column types for {}: {:?}",
            file_path.display(),
            loaded
                .columns
                .iter()
                .map(|c| format!("{} {}", c.name, c.data_type))
                .collect::<Vec<_>>()
        );

        Ok(loaded)
    }

    /// Table function call that reads `file_path` in the given format
    fn source_sql(&self, file_path: &Path, format: DuckDbFormat) -> String {
        let path = sql_literal(&file_path.to_string_lossy());

        match format {
            DuckDbFormat::Csv | DuckDbFormat::Tsv => {
                let mut options = vec!["header = true".to_string()];

                let delimiter = match (format, self.options.delimiter) {
                    (_, Some(d)) => Some(d.to_string()),
                    (DuckDbFormat::Tsv, None) => Some("\t".to_string()),
                    _ => None,
                };
                if let Some(delimiter) = delimiter {
                    options.push(format!("delim = {}", sql_literal(&delimiter)));
                }

                if !self.options.null_values.is_empty() {
                    let tokens: Vec<String> = std::iter::once(String::new())
                        .chain(self.options.null_values.iter().cloned())
                        .map(|t| sql_literal(&t))
                        .collect();
                    options.push(format!("nullstr = [{}]", tokens.join(", ")));
                }

                format!("read_csv({}, {})", path, options.join(", "))
            }
            DuckDbFormat::Parquet => format!("read_parquet({})", path),
            DuckDbFormat::Json => format!("read_json_auto({})", path),
        }
    }

    fn load_with_duckdb(&self, file_path: &Path, format: DuckDbFormat) -> Result<LoadedTable> {
        let create_view_sql = format!(
            "CREATE OR REPLACE VIEW data_view AS SELECT * FROM {}",
            self.source_sql(file_path, format)
        );

        self.connection
            .execute(&create_view_sql, [])
            .map_err(|e| self.convert_duckdb_error(e, file_path))?;

        let columns = self.get_column_info()?;
        if columns.is_empty() {
            return Ok(LoadedTable {
                source: file_path.to_path_buf(),
                format: SourceFormat::DuckDb(format),
                columns,
                table: Table::empty(Vec::new())?,
            });
        }

        // Non-primitive columns (dates, times, lists, ...) are rendered by DuckDB itself
        let select_list = columns
            .iter()
            .map(|c| {
                let name = sql_identifier(&c.name);
                if is_primitive_type(&c.data_type) {
                    name
                } else {
                    format!("CAST({} AS VARCHAR)", name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        let mut stmt = self
            .connection
            .prepare(&format!("SELECT {} FROM data_view", select_list))
            .map_err(|e| {
                ReconError::data_processing(format!(
                    "Failed to prepare data extraction query: {}",
                    e
                ))
            })?;

        let column_count = columns.len();
        let rows = stmt
            .query_map([], |row| {
                let mut cells = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    cells.push(cell_from_duckdb(row.get_ref(i)?));
                }
                Ok(cells)
            })
            .map_err(|e| self.convert_duckdb_error(e, file_path))?;

        let mut data = Vec::new();
        for row in rows {
            data.push(row.map_err(|e| self.convert_duckdb_error(e, file_path))?);
        }

        let table = Table::new(columns.iter().map(|c| c.name.clone()).collect(), data)?;

        Ok(LoadedTable {
            source: file_path.to_path_buf(),
            format: SourceFormat::DuckDb(format),
            columns,
            table,
        })
    }

    /// Convert DuckDB errors to appropriate ReconError types
    fn convert_duckdb_error(&self, error: duckdb::Error, file_path: &Path) -> ReconError {
        let error_msg = error.to_string();

        if error_msg.contains("CSV Error")
            || error_msg.contains("Could not convert")
            || error_msg.contains("Invalid CSV")
            || error_msg.contains("Unterminated quoted field")
        {
            ReconError::invalid_input(format!(
                "Malformed CSV file '{}': {}",
                file_path.display(),
                error_msg
            ))
        } else if error_msg.contains("JSON") {
            ReconError::invalid_input(format!(
                "Malformed JSON file '{}': {}",
                file_path.display(),
                error_msg
            ))
        } else if error_msg.contains("No files found") || error_msg.contains("does not exist") {
            ReconError::invalid_input(format!("File not found: {}", file_path.display()))
        } else if error_msg.contains("Permission denied") {
            ReconError::invalid_input(format!(
                "Permission denied accessing file: {}",
                file_path.display()
            ))
        } else if error_msg.contains("UTF-8") || error_msg.contains("encoding") {
            ReconError::invalid_input(format!(
                "File encoding error '{}': {}",
                file_path.display(),
                error_msg
            ))
        } else {
            ReconError::DuckDb(error)
        }
    }

    /// Get column information from the current view
    fn get_column_info(&self) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self.connection.prepare("DESCRIBE data_view").map_err(|e| {
            ReconError::data_processing(format!("Failed to prepare describe query: {}", e))
        })?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get::<_, String>(0)?,
                    data_type: row.get::<_, String>(1)?,
                })
            })
            .map_err(|e| {
                ReconError::data_processing(format!("Failed to query column info: {}", e))
            })?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row.map_err(|e| {
                ReconError::data_processing(format!("Failed to process column info row: {}", e))
            })?);
        }

        Ok(columns)
    }

    /// First row is the header; blank header cells become `Unnamed: N`
    fn load_spreadsheet(&self, file_path: &Path) -> Result<LoadedTable> {
        let mut workbook = open_workbook_auto(file_path)?;
        let sheet_names = workbook.sheet_names().to_vec();

        let sheet = match &self.options.sheet {
            Some(name) if sheet_names.contains(name) => name.clone(),
            Some(name) => {
                return Err(ReconError::invalid_input(format!(
                    "Sheet '{}' not found in {} (available: {})",
                    name,
                    file_path.display(),
                    sheet_names.join(", ")
                )))
            }
            None => sheet_names.first().cloned().ok_or_else(|| {
                ReconError::invalid_input(format!(
                    "Spreadsheet contains no sheets: {}",
                    file_path.display()
                ))
            })?,
        };

        let range = workbook.worksheet_range(&sheet)?;
        let mut rows = range.rows();

        let header: Vec<String> = match rows.next() {
            Some(cells) => cells
                .iter()
                .enumerate()
                .map(|(i, cell)| match cell {
                    Data::Empty => format!("Unnamed: {}", i),
                    Data::String(s) if s.trim().is_empty() => format!("Unnamed: {}", i),
                    Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
                    other => other.to_string(),
                })
                .collect(),
            None => Vec::new(),
        };
        let header = dedupe_headers(header);

        let data: Vec<Vec<Cell>> = rows
            .map(|cells| cells.iter().map(cell_from_spreadsheet).collect())
            .collect();

        let columns = header
            .iter()
            .enumerate()
            .map(|(i, name)| ColumnInfo {
                name: name.clone(),
                data_type: infer_column_type(&data, i).to_string(),
            })
            .collect();

        log::debug!("Read sheet '{}' from {}", sheet, file_path.display());

        Ok(LoadedTable {
            source: file_path.to_path_buf(),
            format: SourceFormat::Spreadsheet,
            columns,
            table: Table::new(header, data)?,
        })
    }
}

/// DuckDB types that convert directly into a `Value`
fn is_primitive_type(data_type: &str) -> bool {
    let upper = data_type.to_uppercase();
    matches!(
        upper.as_str(),
        "BOOLEAN"
            | "TINYINT"
            | "SMALLINT"
            | "INTEGER"
            | "BIGINT"
            | "HUGEINT"
            | "UTINYINT"
            | "USMALLINT"
            | "UINTEGER"
            | "UBIGINT"
            | "FLOAT"
            | "DOUBLE"
            | "VARCHAR"
    ) || upper.starts_with("DECIMAL")
}

fn cell_from_duckdb(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => None,
        ValueRef::Boolean(b) => Some(Value::Bool(b)),
        ValueRef::TinyInt(i) => Some(Value::Int(i.into())),
        ValueRef::SmallInt(i) => Some(Value::Int(i.into())),
        ValueRef::Int(i) => Some(Value::Int(i.into())),
        ValueRef::BigInt(i) => Some(Value::Int(i)),
        ValueRef::HugeInt(i) => {
            Some(i64::try_from(i).map(Value::Int).unwrap_or(Value::Float(i as f64)))
        }
        ValueRef::UTinyInt(i) => Some(Value::Int(i.into())),
        ValueRef::USmallInt(i) => Some(Value::Int(i.into())),
        ValueRef::UInt(i) => Some(Value::Int(i.into())),
        ValueRef::UBigInt(i) => {
            Some(i64::try_from(i).map(Value::Int).unwrap_or(Value::Float(i as f64)))
        }
        ValueRef::Float(f) => Value::from_f64(f.into()),
        ValueRef::Double(f) => Value::from_f64(f),
        ValueRef::Decimal(d) => {
            let text = d.to_string();
            match text.parse::<f64>() {
                Ok(f) => Value::from_f64(f),
                Err(_) => Some(Value::Text(text)),
            }
        }
        ValueRef::Text(s) => Some(Value::Text(String::from_utf8_lossy(s).into_owned())),
        ValueRef::Blob(b) => Some(Value::Text(format!("<blob:{} bytes>", b.len()))),
        other => Some(Value::Text(format!("{:?}", other))),
    }
}

fn cell_from_spreadsheet(data: &Data) -> Cell {
    match data {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(Value::Text(s.clone())),
        Data::Int(i) => Some(Value::Int(*i)),
        Data::Float(f) => Value::from_f64(*f),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => Some(Value::Text(datetime.format("%Y-%m-%d %H:%M:%S").to_string())),
            None => Value::from_f64(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::Text(s.clone())),
        Data::Error(e) => Some(Value::Text(format!("#{:?}", e))),
    }
}

/// Type label for a spreadsheet column from its first non-null cell
fn infer_column_type(rows: &[Vec<Cell>], column: usize) -> &'static str {
    rows.iter()
        .find_map(|row| row.get(column).and_then(|c| c.as_ref()))
        .map_or("NULL", Value::type_name)
}

/// Repeated names get `.1`, `.2`, ... suffixes in order of appearance
fn dedupe_headers(names: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        let mut candidate = name.clone();
        while seen.contains_key(&candidate) {
            let counter = seen.entry(name.clone()).or_insert(0);
            *counter += 1;
            candidate = format!("{}.{}", name, counter);
        }
        seen.insert(candidate.clone(), 0);
        result.push(candidate);
    }

    result
}

fn sql_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn sql_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
