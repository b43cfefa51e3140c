//! End-to-end runs through the CLI entry point

use crate::common::assertions::{assert_file_exists_and_not_empty, sheet_names, sheet_rows};
use crate::common::{sample_data, CliTestRunner, SheetCell};
use calamine::Data;
use std::fs;
use tabrecon::commands::Outcome;

#[test]
fn test_keyed_run_writes_report() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_csv("a.csv", &sample_data::amounts_a()).unwrap();
    let b = fixture.create_csv("b.csv", &sample_data::amounts_b()).unwrap();
    let report = fixture.path("report.xlsx");

    runner.expect_outcome(
        &[
            a.to_str().unwrap(),
            b.to_str().unwrap(),
            "--key",
            "id",
            "--report",
            report.to_str().unwrap(),
        ],
        Outcome::Divergent,
    );

    assert_file_exists_and_not_empty(&report);
    let rows = sheet_rows(&report, "Divergences");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][0], Data::String("2".to_string()));
    assert_eq!(rows[2][0], Data::String("3".to_string()));
}

#[test]
fn test_identical_inputs_exit_clean_without_report() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_csv("a.csv", &sample_data::products()).unwrap();
    let b = fixture.create_csv("b.csv", &sample_data::products()).unwrap();
    let report = fixture.path("report.xlsx");

    for key in ["id", ""] {
        runner.expect_outcome(
            &[
                a.to_str().unwrap(),
                b.to_str().unwrap(),
                "-k",
                key,
                "-r",
                report.to_str().unwrap(),
                "--quiet",
            ],
            Outcome::Identical,
        );
    }

    assert!(!report.exists());
}

#[test]
fn test_positional_run() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture
        .create_csv("a.csv", &[vec!["n", "s"], vec!["1", "a"], vec!["2", "b"]])
        .unwrap();
    let b = fixture.create_csv("b.csv", &[vec!["n", "s"], vec!["1", "a"]]).unwrap();
    let report = fixture.path("report.json");

    runner.expect_outcome(
        &[a.to_str().unwrap(), b.to_str().unwrap(), "-r", report.to_str().unwrap()],
        Outcome::Divergent,
    );

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["summary"]["total_divergences"], 1);
    assert_eq!(json["summary"]["key"], "row position");
    assert_eq!(json["divergences"][0]["kind"], "ROW_MISSING_IN_B");
    assert_eq!(json["divergences"][0]["key"], "2");
}

#[test]
fn test_extra_columns_are_ignored() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture
        .create_csv("a.csv", &[vec!["id", "x", "y"], vec!["1", "10", "a"]])
        .unwrap();
    let b = fixture
        .create_csv("b.csv", &[vec!["id", "x", "z"], vec!["1", "10", "b"]])
        .unwrap();

    runner.expect_outcome(
        &[a.to_str().unwrap(), b.to_str().unwrap(), "-k", "id", "--quiet"],
        Outcome::Identical,
    );
}

#[test]
fn test_csv_against_xlsx() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_csv("a.csv", &sample_data::amounts_a()).unwrap();
    let b = fixture
        .create_xlsx(
            "b.xlsx",
            "Sheet1",
            &["id", "amount"],
            &[
                vec![SheetCell::Number(2.0), SheetCell::Number(200.0)],
                vec![SheetCell::Number(1.0), SheetCell::Number(100.0)],
            ],
        )
        .unwrap();

    runner.expect_outcome(
        &[a.to_str().unwrap(), b.to_str().unwrap(), "-k", "id", "--quiet"],
        Outcome::Identical,
    );
}

#[test]
fn test_key_from_config_file() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_csv("a.csv", &sample_data::amounts_a()).unwrap();
    let b = fixture.create_csv("b.csv", &sample_data::amounts_b()).unwrap();
    let report = fixture.path("from_config.xlsx");
    let config = fixture
        .create_json(
            "recon.json",
            &serde_json::json!({
                "key_columns": ["id"],
                "report_path": report,
                "show_progress": false
            }),
        )
        .unwrap();

    runner.expect_outcome(
        &[a.to_str().unwrap(), b.to_str().unwrap(), "--config", config.to_str().unwrap()],
        Outcome::Divergent,
    );

    let names = sheet_names(&report);
    assert!(names.contains(&"ROW_MISSING_IN_A".to_string()));
    assert!(names.contains(&"VALUE_MISMATCH".to_string()));
    assert!(!names.contains(&"ROW_MISSING_IN_B".to_string()));
}

#[test]
fn test_json_output_mode() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_csv("a.csv", &sample_data::amounts_a()).unwrap();
    let b = fixture.create_csv("b.csv", &sample_data::amounts_b()).unwrap();
    let report = fixture.path("report.json");

    runner.expect_outcome(
        &[
            a.to_str().unwrap(),
            b.to_str().unwrap(),
            "-k",
            "id",
            "-r",
            report.to_str().unwrap(),
            "--format",
            "json",
        ],
        Outcome::Divergent,
    );
    assert_file_exists_and_not_empty(&report);
}
