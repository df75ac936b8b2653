//! End-to-end integration tests for gradesheet.
//!
//! These exercise the public API only: fixture files are written to a temp
//! directory and read back through the file-level entry points.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use gradesheet::{
    calculate_actual_cgpa, parse_file, parse_file_sync, parse_rows, parse_text, write_csv_file,
    CellValue, CreditRule, EditError, ExtractionStrategy, GradeSheetError, InputFormat,
    ParserConfig, RetakeType, StandardCreditTable, Transcript, Violation,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

const SHEET: &str = "\
BRAC University
UNOFFICIAL COPY
GRADE SHEET
Student ID: 20101234
PROGRAM: Bachelor of Science in Computer Science
Course No Course Title Credits Earned Grade Grade Points
SEMESTER: Fall 2020
CSE110 PROGRAMMING LANGUAGE I 3.00 A 4.00
MAT110 DIFFERENTIAL CALCULUS 3.00 B+ 3.30
CSE220 DATA STRUCTURES 0.00 F 0.00
MAT091 REMEDIAL MATHEMATICS 0.00 P 0.00
SEMESTER Credits Attempted 12.00 Credits Earned 6.00 GPA 2.43
SEMESTER: Spring 2021
CSE220 DATA STRUCTURES (RP) 3.00 B 3.00
EEE102L ELECTRICAL CIRCUITS LAB 1.00 A- 3.70
CUMULATIVE Credits 13.00 CGPA 3.37
Page 1 of 1
";

fn write_fixture(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write fixture");
    path
}

/// Route library logs to the test harness; `RUST_LOG=debug` shows merges and skips.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn codes(t: &Transcript) -> Vec<&str> {
    t.courses().iter().map(|c| c.course_code.as_str()).collect()
}

// ── Text documents ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_parse_text_file() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "sheet.txt", SHEET);

    let output = parse_file(&path, InputFormat::Auto, &ParserConfig::default())
        .await
        .expect("parse should succeed");

    assert_eq!(output.stats.strategy, ExtractionStrategy::Lines);
    assert_eq!(output.stats.candidates, 6);

    let t = Transcript::from_output(output);
    assert_eq!(codes(&t), vec!["CSE110", "MAT110", "CSE220", "MAT091", "EEE102L"]);

    // the retake displaced the failed attempt in its original slot
    let cse220 = &t.courses()[2];
    assert_eq!(cse220.retake, Some(RetakeType::Rp));
    assert!(!cse220.is_failed);
    assert_eq!(cse220.grade_points, 3.0);

    let prep = &t.courses()[3];
    assert_eq!(prep.credits, 0.0);
    assert!(!prep.is_failed);

    // (12 + 9.9 + 9 + 0 + 3.7) / (3 + 3 + 3 + 0 + 1)
    assert!((t.cgpa() - 3.46).abs() < 1e-9);
    assert_eq!(t.credit_courses(), 4);
    assert_eq!(t.earned_credits(), 10.0);
}

#[test]
fn test_parse_file_sync() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "sheet.txt", SHEET);
    let output = parse_file_sync(&path, InputFormat::Text, &ParserConfig::default()).unwrap();
    assert_eq!(output.courses.len(), 5);
}

#[test]
fn test_block_on_async_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "sheet.txt", SHEET);
    let config = ParserConfig::default();
    let output = tokio_test::block_on(parse_file(&path, InputFormat::Auto, &config)).unwrap();
    assert_eq!(output.courses[0].course_code, "CSE110");
}

#[tokio::test]
async fn test_no_courses_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "empty.txt", "BRAC University\nGRADE SHEET\n");
    let err = parse_file(&path, InputFormat::Auto, &ParserConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GradeSheetError::NoCoursesFound));
    assert!(err.to_string().contains("No courses found"));
}

#[tokio::test]
async fn test_missing_file() {
    let err = parse_file("/no/such/sheet.txt", InputFormat::Auto, &ParserConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GradeSheetError::FileNotFound { .. }));
}

// ── Spreadsheet documents ────────────────────────────────────────────────────

#[tokio::test]
async fn test_parse_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let csv = "\
Course Analysis,,,,
Course Code,Credits Earned,Grade Points,Quality Points,Type
CSE110,3,4.00,12.00,From Grade Sheet
MAT110,3,3.30,9.90,Retake (RT)
,,,,
SUMMARY,,,,
Total Courses,2,,,
";
    let path = write_fixture(dir.path(), "analysis.csv", csv);
    let output = parse_file(&path, InputFormat::Auto, &ParserConfig::default())
        .await
        .unwrap();

    assert_eq!(output.stats.strategy, ExtractionStrategy::Table);
    let t = Transcript::from_output(output);
    assert_eq!(codes(&t), vec!["CSE110", "MAT110"]);
    assert_eq!(t.courses()[1].retake, Some(RetakeType::Rt));
    assert!((t.cgpa() - 3.65).abs() < 1e-9);
}

#[tokio::test]
async fn test_parse_rows_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(
        dir.path(),
        "rows.json",
        r#"[["1", "ENG101", 3, 3.7], ["2", "BUS201", 3, 0], ["3", "MAT092", 0, 0]]"#,
    );
    let output = parse_file(&path, InputFormat::Rows, &ParserConfig::default())
        .await
        .unwrap();
    let t = Transcript::from_output(output);
    // the row that fixed the column layout is treated as the header
    assert_eq!(codes(&t), vec!["BUS201", "MAT092"]);
    assert!(!t.courses()[0].is_failed); // 3 credits with 0 grade points is a plain F
    assert_eq!(t.courses()[1].credits, 0.0);
    assert_eq!(t.earned_credits(), 0.0);
}

#[tokio::test]
async fn test_corrupt_workbook_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "grades.xlsx", "not a zip archive");
    let err = parse_file(&path, InputFormat::Auto, &ParserConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GradeSheetError::ExtractionFailed { .. }));
}

#[tokio::test]
async fn test_parse_fragments_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let body = r#"[
        [
            {"text": "3.00", "x": 300, "y": 701},
            {"text": "CSE110", "x": 50, "y": 700},
            {"text": "A", "x": 350, "y": 700},
            {"text": "4.00", "x": 400, "y": 699}
        ],
        [
            {"text": "MAT110", "x": 50, "y": 700},
            {"text": "3.00", "x": 300, "y": 700},
            {"text": "3.30", "x": 400, "y": 700}
        ]
    ]"#;
    let path = write_fixture(dir.path(), "frags.json", body);
    let output = parse_file(&path, InputFormat::Auto, &ParserConfig::default())
        .await
        .unwrap();
    assert_eq!(output.courses.len(), 2);
    assert!((calculate_actual_cgpa(gradesheet::calculate_cgpa(&output.courses)) - 3.65).abs() < 1e-9);
}

#[test]
fn test_rows_in_memory_guess_columns() {
    let rows = vec![
        vec![CellValue::from("CSE110"), 3.0.into(), 4.0.into()],
        vec![CellValue::from("MAT110"), 3.0.into(), 3.3.into()],
        vec![CellValue::from("Total"), 3.0.into(), CellValue::Empty],
    ];
    let output = parse_rows(&rows, &ParserConfig::default());
    assert_eq!(output.courses.len(), 1);
    assert_eq!(output.courses[0].course_code, "MAT110");
    assert_eq!(output.stats.lines_skipped, 1);
}

// ── Configuration ────────────────────────────────────────────────────────────

#[test]
fn test_custom_policy_and_prep_courses() {
    let table = StandardCreditTable::default()
        .with_rule(CreditRule::new(r"^CSE4\d{2}$", 4.0).unwrap());
    let config = ParserConfig::builder()
        .credit_policy(Arc::new(table))
        .prep_course("eng090")
        .skip_pattern("Transcript of Records")
        .build()
        .unwrap();

    let text = "\
Transcript of Records CSE999 1.00 1.00
CSE470 SOFTWARE ENGINEERING 0.00 F 0.00
ENG090 PRE-UNIVERSITY ENGLISH 0.00 P 0.00
";
    let output = parse_text(text, &config);
    assert_eq!(output.stats.lines_skipped, 1);
    assert_eq!(output.courses.len(), 2);
    assert_eq!(output.courses[0].credits, 4.0);
    assert!(output.courses[0].is_failed);
    assert_eq!(output.courses[1].credits, 0.0);
}

#[test]
fn test_invalid_config_rejected() {
    let err = ParserConfig::builder().line_tolerance(-1.0).build().unwrap_err();
    assert!(matches!(err, GradeSheetError::InvalidConfig(_)));
    assert!(CreditRule::new("([", 3.0).is_err());
}

// ── Editing and export ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_what_if_edits_and_export() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "sheet.txt", SHEET);
    let output = parse_file(&path, InputFormat::Auto, &ParserConfig::default())
        .await
        .unwrap();
    let mut t = Transcript::from_output(output);
    let original = t.cgpa();

    let idx = t.position("CSE220").unwrap();
    t.update_grade_points(idx, 4.0).unwrap();
    assert!(t.cgpa() > original);
    assert!((t.original_cgpa() - original).abs() < 1e-12);
    assert!(t.is_modified());

    let err = t.add_manual_course("CSE110", 3.0, 4.0).unwrap_err();
    assert_eq!(
        err,
        EditError::InvalidCourse(vec![Violation::DuplicateCode("CSE110".into())])
    );
    t.add_manual_course("cse470", 3.0, 3.7).unwrap();

    let summary = t.summary();
    assert_eq!(summary.total_courses, 6);
    assert!((summary.current_cgpa - original).abs() < 1e-12);
    assert!((summary.dream_cgpa - t.cgpa()).abs() < 1e-12);

    let export = dir.path().join("out").join("analysis.csv");
    write_csv_file(&t, &export).await.unwrap();
    let written = std::fs::read_to_string(&export).unwrap();
    assert!(written.contains("CSE470,3,3.70,11.10,Manual"));
    assert!(written.contains("Dream Actual CGPA"));

    t.reset_to_original().unwrap();
    assert_eq!(t.courses().len(), 5);
    assert!(!t.is_modified());
}
