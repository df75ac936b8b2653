//! # gradesheet
//!
//! Turn the text of a university grade sheet into structured course records,
//! reconcile retakes, and compute credit-weighted CGPA figures.
//!
//! ## Why heuristics?
//!
//! Grade sheets reach us as whatever a PDF text extractor or spreadsheet
//! reader produces: rows torn across lines, columns merged, headers repeated
//! on every page. There is no schema to validate against, so the parser leans
//! on the few things every sheet shares: a course code, a credits value and a
//! grade-point value, in that order.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file / text / fragments / rows
//!  │
//!  ├─ 1. Input      read the file; PDF text via pdf-extract (spawn_blocking)
//!  ├─ 2. Normalise  trim lines, or regroup positioned fragments into lines
//!  ├─ 3. Classify   drop headers, semester banners and summary rows
//!  ├─ 4. Extract    line pass, word-window fallback, or column discovery
//!  ├─ 5. Reconcile  one record per course code; retakes win
//!  └─ 6. Aggregate  CGPA, earned credits, rounded "actual" CGPA
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use gradesheet::{parse_text, ParserConfig, Transcript};
//!
//! let text = "CSE110 PROGRAMMING LANGUAGE I 3.00 A 4.00\n\
//!             MAT110 DIFFERENTIAL CALCULUS 3.00 B+ 3.30\n";
//! let output = parse_text(text, &ParserConfig::default());
//! let mut transcript = Transcript::from_output(output);
//! assert!((transcript.cgpa() - 3.65).abs() < 1e-9);
//!
//! // what if MAT110 were retaken for an A?
//! transcript.update_grade_points(1, 4.0).unwrap();
//! assert!((transcript.cgpa() - 4.0).abs() < 1e-9);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `gradesheet` binary (clap + anyhow + tracing-subscriber) |
//! | `pdf`   | on      | PDF text extraction through `pdf-extract` |
//!
//! Disable both when using only the in-memory parsers:
//! ```toml
//! gradesheet = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod transcript;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use aggregate::{
    calculate_actual_cgpa, calculate_cgpa, calculate_credit_courses, calculate_earned_credits,
    calculate_total_credits, Summary,
};
pub use config::{ParserConfig, ParserConfigBuilder};
pub use error::{EditError, GradeSheetError, Violation};
pub use export::{write_csv, write_csv_file, ExportRow};
pub use output::{CourseOrigin, CourseRecord, ExtractionStrategy, ParseOutput, ParseStats, RetakeType};
pub use parse::{parse_document, parse_file, parse_file_sync, parse_fragments, parse_rows, parse_text};
pub use pipeline::credits::{CreditPolicy, CreditRule, StandardCreditTable};
pub use pipeline::input::{load_document, InputFormat, RawDocument};
pub use pipeline::normalize::{PageText, TextFragment};
pub use pipeline::tabular::CellValue;
pub use transcript::Transcript;
