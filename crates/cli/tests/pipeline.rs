use std::io::Write;

use assert_cmd::Command;
use tempfile::NamedTempFile;

fn sql_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

fn stdout_of(assert: assert_cmd::assert::Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).expect("stdout is utf-8")
}

#[test]
fn parse_reports_ok_status_for_a_valid_create_table() {
    let file = sql_file("CREATE TABLE widgets (id INT, name TEXT);");

    let assert = Command::cargo_bin("sqlsight")
        .expect("locate sqlsight binary")
        .arg("parse")
        .arg(file.path())
        .assert()
        .success();

    assert!(stdout_of(assert).contains("analyze status: Ok"));
}

#[test]
fn stats_emits_a_json_payload_with_scan_parse_analyze_sections() {
    let file = sql_file("SELECT id FROM widgets;");

    let assert = Command::cargo_bin("sqlsight")
        .expect("locate sqlsight binary")
        .arg("stats")
        .arg(file.path())
        .assert()
        .success();

    let stdout = stdout_of(assert);
    assert!(stdout.contains("\"scan\""));
    assert!(stdout.contains("\"parse\""));
    assert!(stdout.contains("\"analyze\""));
}

#[test]
fn complete_runs_end_to_end_without_erroring() {
    let file = sql_file("SELECT id FROM wid");

    Command::cargo_bin("sqlsight")
        .expect("locate sqlsight binary")
        .arg("complete")
        .arg(file.path())
        .arg("--offset")
        .arg("18")
        .assert()
        .success();
}

#[test]
fn reading_a_missing_file_fails_with_a_nonzero_exit_code() {
    Command::cargo_bin("sqlsight")
        .expect("locate sqlsight binary")
        .arg("parse")
        .arg("/nonexistent/path/does-not-exist.sql")
        .assert()
        .failure();
}
