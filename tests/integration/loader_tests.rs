//! Integration tests for loading delimited, JSON and spreadsheet inputs

use crate::common::{sample_data, SheetCell, TestFixture};
use serde_json::json;
use tabrecon::data::{DataProcessor, DuckDbFormat, LoadOptions, SourceFormat};
use tabrecon::duckdb_config::DuckDbConfig;
use tabrecon::{ReconError, Value};

fn processor_with(options: LoadOptions) -> DataProcessor {
    DataProcessor::new_with_options(&DuckDbConfig::new(), options).unwrap()
}

#[test]
fn test_load_csv_preserves_order_and_types() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_csv("products.csv", &sample_data::products()).unwrap();

    let loaded = DataProcessor::new().unwrap().load_table(&path).unwrap();

    assert_eq!(loaded.format, SourceFormat::DuckDb(DuckDbFormat::Csv));
    assert_eq!(loaded.table.columns(), &["id", "name", "price"]);
    assert_eq!(loaded.table.row_count(), 3);
    assert_eq!(loaded.table.cell(0, "name"), Some(&Some(Value::from("Apple"))));
    assert_eq!(loaded.table.cell(2, "name"), Some(&Some(Value::from("Cherry"))));
    assert_eq!(loaded.table.cell(1, "price"), Some(&Some(Value::Float(0.75))));
}

#[test]
fn test_load_tsv() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_csv_raw("data.tsv", "id\tlabel\n1\tone, with comma\n").unwrap();

    let table = DataProcessor::new().unwrap().load_table(&path).unwrap().table;

    assert_eq!(table.columns(), &["id", "label"]);
    assert_eq!(table.cell(0, "label"), Some(&Some(Value::from("one, with comma"))));
}

#[test]
fn test_load_json_records() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_json(
            "data.json",
            &json!([
                {"id": 1, "name": "Apple", "price": 1.5},
                {"id": 2, "name": "Banana", "price": null}
            ]),
        )
        .unwrap();

    let table = DataProcessor::new().unwrap().load_table(&path).unwrap().table;

    assert_eq!(table.row_count(), 2);
    assert_eq!(table.cell(0, "id"), Some(&Some(Value::Int(1))));
    assert_eq!(table.cell(1, "price"), Some(&None));
}

#[test]
fn test_load_parquet() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.path("data.parquet");
    let writer = duckdb::Connection::open_in_memory().unwrap();
    writer
        .execute_batch(&format!(
            "COPY (SELECT * FROM (VALUES (1, 'Apple'), (2, NULL)) t(id, name) ORDER BY id) \
             TO '{}' (FORMAT PARQUET)",
            path.display()
        ))
        .unwrap();

    let loaded = DataProcessor::new().unwrap().load_table(&path).unwrap();

    assert_eq!(loaded.format, SourceFormat::DuckDb(DuckDbFormat::Parquet));
    assert_eq!(loaded.table.columns(), &["id", "name"]);
    assert_eq!(loaded.table.cell(0, "name"), Some(&Some(Value::from("Apple"))));
    assert_eq!(loaded.table.cell(1, "id"), Some(&Some(Value::Int(2))));
    assert_eq!(loaded.table.cell(1, "name"), Some(&None));
}

#[test]
fn test_load_xlsx_first_sheet() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_xlsx(
            "data.xlsx",
            "Sheet1",
            &["id", "name", "amount"],
            &[
                vec![SheetCell::Number(1.0), SheetCell::Text("Alice"), SheetCell::Number(10.5)],
                vec![SheetCell::Number(2.0), SheetCell::Empty, SheetCell::Number(20.0)],
            ],
        )
        .unwrap();

    let loaded = DataProcessor::new().unwrap().load_table(&path).unwrap();
    let table = &loaded.table;

    assert_eq!(loaded.format, SourceFormat::Spreadsheet);
    assert_eq!(table.columns(), &["id", "name", "amount"]);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.cell(0, "id"), Some(&Some(Value::Int(1))));
    assert_eq!(table.cell(1, "name"), Some(&None));
    assert_eq!(table.cell(0, "amount"), Some(&Some(Value::Float(10.5))));
}

#[test]
fn test_xlsx_blank_and_duplicate_headers() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_xlsx(
            "headers.xlsx",
            "Sheet1",
            &["id", "", "v", "v"],
            &[vec![
                SheetCell::Number(1.0),
                SheetCell::Text("x"),
                SheetCell::Number(2.0),
                SheetCell::Number(3.0),
            ]],
        )
        .unwrap();

    let table = DataProcessor::new().unwrap().load_table(&path).unwrap().table;

    assert_eq!(table.columns(), &["id", "Unnamed: 1", "v", "v.1"]);
}

#[test]
fn test_xlsx_named_sheet() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_xlsx("named.xlsx", "Data", &["id"], &[vec![SheetCell::Number(1.0)]])
        .unwrap();

    let found = processor_with(LoadOptions {
        sheet: Some("Data".to_string()),
        ..LoadOptions::default()
    })
    .load_table(&path)
    .unwrap();
    assert_eq!(found.table.row_count(), 1);

    let err = processor_with(LoadOptions {
        sheet: Some("Missing".to_string()),
        ..LoadOptions::default()
    })
    .load_table(&path)
    .unwrap_err();
    assert!(matches!(err, ReconError::InvalidInput { .. }));
    assert!(err.to_string().contains("Missing"));
}

#[test]
fn test_csv_and_xlsx_load_comparable_values() {
    let fixture = TestFixture::new().unwrap();
    let csv = fixture.create_csv("a.csv", &[vec!["id", "amount"], vec!["1", "100"]]).unwrap();
    let xlsx = fixture
        .create_xlsx(
            "b.xlsx",
            "Sheet1",
            &["id", "amount"],
            &[vec![SheetCell::Number(1.0), SheetCell::Number(100.0)]],
        )
        .unwrap();

    let processor = DataProcessor::new().unwrap();
    let a = processor.load_table(&csv).unwrap().table;
    let b = processor.load_table(&xlsx).unwrap().table;

    assert_eq!(a.rows(), b.rows());
}
