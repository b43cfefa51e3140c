//! Integration tests for xlsx and JSON report writing

use crate::common::assertions::{assert_file_exists_and_not_empty, sheet_names, sheet_rows};
use crate::common::TestFixture;
use calamine::Data;
use std::path::Path;
use tabrecon::hash::HashComputer;
use tabrecon::report::{
    ReportFormat, ReportWriter, RunMetadata, DIVERGENCES_SHEET, STATS_SHEET, SUMMARY_SHEET,
};
use tabrecon::{reconcile, KeySpec, ReconError, Reconciliation, Table, Value};

fn scenario() -> (Reconciliation, RunMetadata) {
    let a = Table::from_rows(
        &["id", "amount"],
        vec![
            vec![Some(Value::Int(1)), Some(Value::Int(100))],
            vec![Some(Value::Int(2)), Some(Value::Int(200))],
        ],
    )
    .unwrap();
    let b = Table::from_rows(
        &["id", "amount"],
        vec![
            vec![Some(Value::Int(1)), Some(Value::Int(100))],
            vec![Some(Value::Int(2)), Some(Value::Int(250))],
            vec![Some(Value::Int(3)), Some(Value::Int(300))],
        ],
    )
    .unwrap();

    let result = reconcile(&a, &b, &KeySpec::columns(["id"]).unwrap()).unwrap();
    let metadata = RunMetadata::new(
        Path::new("a.csv"),
        Path::new("b.csv"),
        HashComputer::fingerprint(&a),
        HashComputer::fingerprint(&b),
    );
    (result, metadata)
}

#[test]
fn test_xlsx_report_sheets() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.path("report.xlsx");
    let (result, metadata) = scenario();

    let format = ReportWriter::new(&result, &metadata).write(&path).unwrap();

    assert_eq!(format, ReportFormat::Xlsx);
    assert_file_exists_and_not_empty(&path);
    assert_eq!(
        sheet_names(&path),
        vec![DIVERGENCES_SHEET, SUMMARY_SHEET, STATS_SHEET, "ROW_MISSING_IN_A", "VALUE_MISMATCH"]
    );
}

#[test]
fn test_xlsx_divergence_rows() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.path("report.xlsx");
    let (result, metadata) = scenario();
    ReportWriter::new(&result, &metadata).write(&path).unwrap();

    let rows = sheet_rows(&path, DIVERGENCES_SHEET);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], Data::String("key".to_string()));
    assert_eq!(rows[1][1], Data::String("VALUE_MISMATCH".to_string()));
    assert_eq!(rows[1][2], Data::String("amount".to_string()));
    assert_eq!(rows[1][3], Data::Float(200.0));
    assert_eq!(rows[1][4], Data::Float(250.0));
    assert_eq!(rows[2][1], Data::String("ROW_MISSING_IN_A".to_string()));
    assert_eq!(rows[2][3], Data::String("ROW_ABSENT".to_string()));
    assert_eq!(rows[2][4], Data::String("ROW_PRESENT".to_string()));
}

#[test]
fn test_xlsx_summary_and_stats() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.path("report.xlsx");
    let (result, metadata) = scenario();
    ReportWriter::new(&result, &metadata).write(&path).unwrap();

    let summary = sheet_rows(&path, SUMMARY_SHEET);
    let total = summary
        .iter()
        .find(|row| row[0] == Data::String("total_divergences".to_string()))
        .expect("total row");
    assert_eq!(total[1], Data::Float(2.0));
    assert!(summary
        .iter()
        .any(|row| row[0] == Data::String("fingerprint_a".to_string())));

    let stats = sheet_rows(&path, STATS_SHEET);
    assert_eq!(stats.len(), 4);
    assert_eq!(stats[1][0], Data::String("ROW_MISSING_IN_B".to_string()));
    assert_eq!(stats[1][1], Data::Float(0.0));
}

#[test]
fn test_json_report_document() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.path("report.json");
    let (result, metadata) = scenario();

    let format = ReportWriter::new(&result, &metadata).write(&path).unwrap();
    assert_eq!(format, ReportFormat::Json);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["summary"]["total_divergences"], 2);
    assert_eq!(json["summary"]["key"], "id");
    assert_eq!(json["divergences"][0]["kind"], "VALUE_MISMATCH");
    assert_eq!(json["divergences"][0]["value_a"], 200);
    assert_eq!(json["divergences"][1]["value_a"], "ROW_ABSENT");
    assert_eq!(json["metadata"]["source_a"], "a.csv");
    assert_eq!(
        json["metadata"]["fingerprint_a"]["content_hash"],
        metadata.fingerprint_a.content_hash.as_str()
    );
}

#[test]
fn test_unsupported_report_extension() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.path("report.txt");
    let (result, metadata) = scenario();

    let err = ReportWriter::new(&result, &metadata).write(&path).unwrap_err();
    assert!(matches!(err, ReconError::UnsupportedFormat { .. }));
    assert!(!path.exists());
}
