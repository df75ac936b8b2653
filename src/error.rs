//! Error types for the gradesheet library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`GradeSheetError`]: fatal. The document cannot be turned into a
//!   record set at all (file missing, the PDF/CSV/JSON collaborator failed,
//!   nothing course-shaped was found). Returned as `Err(GradeSheetError)` from
//!   the file-level `parse_*` functions. No partial record set accompanies it.
//!
//! * [`EditError`]: rejected edit. A grade-point change, deletion or
//!   manual addition on a [`crate::transcript::Transcript`] violated a
//!   constraint. The record set is left untouched.
//!
//! Malformed individual lines, rows and token windows are *not* errors: the
//! extractors skip them silently and the absence of a record is the signal.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the gradesheet library.
#[derive(Debug, Error)]
pub enum GradeSheetError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Grade sheet not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file extension / requested format is not one we can read.
    #[error("Unsupported input format for '{path}': {detail}")]
    UnsupportedFormat { path: PathBuf, detail: String },

    /// The text or row extraction collaborator failed (corrupt PDF,
    /// malformed CSV, invalid fragment JSON, ...).
    #[error("Error processing '{path}': {detail}\nTry again with a different file.")]
    ExtractionFailed { path: PathBuf, detail: String },

    // ── Content errors ────────────────────────────────────────────────────
    /// Extraction finished but not a single course record was accepted.
    #[error("No courses found. Make sure this is a valid grade sheet with course code, credits and grade point columns.")]
    NoCoursesFound,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an export file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A single constraint broken by a manual course entry or grade edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    MissingCode,
    MalformedCode(String),
    DuplicateCode(String),
    CreditsOutOfRange(f64),
    GradePointsOutOfRange(f64),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingCode => write!(f, "Course code is required"),
            Violation::MalformedCode(code) => write!(
                f,
                "Course code '{code}' must be in format like CSE110, EEE102L, MAT215, etc."
            ),
            Violation::DuplicateCode(code) => write!(f, "Course code {code} already exists"),
            Violation::CreditsOutOfRange(_) => write!(f, "Credits must be between 0.5 and 10"),
            Violation::GradePointsOutOfRange(_) => {
                write!(f, "Grade points must be between 0.00 and 4.00")
            }
        }
    }
}

/// Why an edit on a [`crate::transcript::Transcript`] was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    /// One or more constraints failed; all of them are listed.
    #[error("{}", join_violations(.0))]
    InvalidCourse(Vec<Violation>),

    /// The index does not address a record in the current set.
    #[error("Course not found at index {index}")]
    CourseNotFound { index: usize },

    /// There is no parsed snapshot to restore.
    #[error("No original data to reset to")]
    NothingToReset,
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(". ")
}
