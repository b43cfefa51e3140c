//! Edge cases: bad inputs, missing keys, nulls and report failures

use crate::common::{sample_data, CliTestRunner};
use tabrecon::commands::Outcome;
use tabrecon::ReconError;

#[test]
fn test_unsupported_input_format() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_csv("a.csv", &sample_data::products()).unwrap();
    let b = fixture.create_csv_raw("b.docx", "not a table").unwrap();

    let err = runner.expect_failure(&[a.to_str().unwrap(), b.to_str().unwrap(), "--quiet"]);
    assert!(matches!(err, ReconError::UnsupportedFormat { .. }));
}

#[test]
fn test_missing_input_file() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_csv("a.csv", &sample_data::products()).unwrap();
    let missing = fixture.path("missing.csv");

    let err = runner.expect_failure(&[a.to_str().unwrap(), missing.to_str().unwrap(), "--quiet"]);
    assert!(matches!(err, ReconError::InvalidInput { .. }));
}

#[test]
fn test_key_column_dropped_by_projection() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_csv("a.csv", &[vec!["id", "v"], vec!["1", "x"]]).unwrap();
    let b = fixture.create_csv("b.csv", &[vec!["code", "v"], vec!["1", "x"]]).unwrap();

    let err = runner.expect_failure(&[
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "-k",
        "id",
        "--quiet",
    ]);
    assert!(err.is_config());
    assert!(err.to_string().contains("not found after structure validation"));
}

#[test]
fn test_empty_cells_compare_as_null() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture
        .create_csv_raw("a.csv", "id,name,note\n1,Alice,\n2,Bob,x\n")
        .unwrap();
    let b = fixture
        .create_csv_raw("b.csv", "id,name,note\n1,Alice,\n2,Bob,x\n")
        .unwrap();

    runner.expect_outcome(
        &[a.to_str().unwrap(), b.to_str().unwrap(), "-k", "id", "--quiet"],
        Outcome::Identical,
    );
}

#[test]
fn test_duplicate_keys_do_not_fail() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture
        .create_csv("a.csv", &[vec!["k", "v"], vec!["1", "x1"], vec!["1", "x2"]])
        .unwrap();
    let b = fixture.create_csv("b.csv", &[vec!["k", "v"], vec!["1", "y"]]).unwrap();
    let report = fixture.path("dups.json");

    runner.expect_outcome(
        &[
            a.to_str().unwrap(),
            b.to_str().unwrap(),
            "-k",
            "k",
            "-r",
            report.to_str().unwrap(),
            "--quiet",
        ],
        Outcome::Divergent,
    );

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["summary"]["pairs_matched"], 2);
    assert_eq!(json["summary"]["divergences_value_mismatch"], 2);
}

#[test]
fn test_report_failure_keeps_outcome() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_csv("a.csv", &sample_data::amounts_a()).unwrap();
    let b = fixture.create_csv("b.csv", &sample_data::amounts_b()).unwrap();
    let report = fixture.path("no_such_dir").join("report.xlsx");

    runner.expect_outcome(
        &[a.to_str().unwrap(), b.to_str().unwrap(), "-k", "id", "-r", report.to_str().unwrap()],
        Outcome::Divergent,
    );
    assert!(!report.exists());
}

#[test]
fn test_unknown_config_field() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let a = fixture.create_csv("a.csv", &sample_data::products()).unwrap();
    let config = fixture
        .create_json("bad.json", &serde_json::json!({ "keys": ["id"] }))
        .unwrap();

    let err = runner.expect_failure(&[
        a.to_str().unwrap(),
        a.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert!(err.is_config());
}
