//! Output types: course records and per-parse statistics.

use crate::error::GradeSheetError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which retake marker(s) were found next to a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetakeType {
    #[serde(rename = "RP")]
    Rp,
    #[serde(rename = "RT")]
    Rt,
    #[serde(rename = "RP/RT")]
    RpRt,
}

impl RetakeType {
    /// Combine the two marker flags; `None` when neither was seen.
    pub fn from_flags(has_rp: bool, has_rt: bool) -> Option<Self> {
        match (has_rp, has_rt) {
            (true, true) => Some(RetakeType::RpRt),
            (true, false) => Some(RetakeType::Rp),
            (false, true) => Some(RetakeType::Rt),
            (false, false) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RetakeType::Rp => "RP",
            RetakeType::Rt => "RT",
            RetakeType::RpRt => "RP/RT",
        }
    }
}

impl fmt::Display for RetakeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a record came from, as shown in the export "Type" column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseOrigin {
    Manual,
    Retake(RetakeType),
    GradeSheet,
}

impl fmt::Display for CourseOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseOrigin::Manual => f.write_str("Manual"),
            CourseOrigin::Retake(t) => write!(f, "Retake ({t})"),
            CourseOrigin::GradeSheet => f.write_str("From Grade Sheet"),
        }
    }
}

/// One course attempt extracted from a grade sheet (or typed in by hand).
///
/// Quality points are never stored; [`CourseRecord::quality_points`] derives
/// them from the two factors so they cannot drift after an edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub course_code: String,
    pub credits: f64,
    pub grade_points: f64,
    /// `Some` when an RP/RT marker accompanied this attempt.
    pub retake: Option<RetakeType>,
    /// The sheet reported 0 credits / 0 grade points and the credits were
    /// substituted from the credit policy.
    pub is_failed: bool,
    pub is_manually_added: bool,
}

impl CourseRecord {
    /// A record produced by one of the extractors.
    pub fn extracted(
        course_code: impl Into<String>,
        credits: f64,
        grade_points: f64,
        retake: Option<RetakeType>,
        is_failed: bool,
    ) -> Self {
        Self {
            course_code: course_code.into(),
            credits,
            grade_points,
            retake,
            is_failed,
            is_manually_added: false,
        }
    }

    /// A record entered directly by the user.
    pub fn manual(course_code: impl Into<String>, credits: f64, grade_points: f64) -> Self {
        Self {
            course_code: course_code.into(),
            credits,
            grade_points,
            retake: None,
            is_failed: false,
            is_manually_added: true,
        }
    }

    pub fn quality_points(&self) -> f64 {
        self.credits * self.grade_points
    }

    pub fn is_retake(&self) -> bool {
        self.retake.is_some()
    }

    pub fn origin(&self) -> CourseOrigin {
        if self.is_manually_added {
            CourseOrigin::Manual
        } else if let Some(t) = self.retake {
            CourseOrigin::Retake(t)
        } else {
            CourseOrigin::GradeSheet
        }
    }
}

/// Which extraction path produced the records of a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Nothing was accepted.
    #[default]
    None,
    /// Line-based extraction over normalised text.
    Lines,
    /// Word-window fallback after the line pass found nothing.
    Words,
    /// Header-driven row extraction.
    Table,
}

/// Counters collected while parsing one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseStats {
    /// Non-empty lines (or data rows) examined.
    pub lines_total: usize,
    /// Lines dropped by the classifier, or rows skipped as summary/total.
    pub lines_skipped: usize,
    /// Candidate records emitted to the reconciler before deduplication.
    pub candidates: usize,
    pub strategy: ExtractionStrategy,
    pub duration_ms: u64,
}

/// The finalized record set for one document plus its statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseOutput {
    pub courses: Vec<CourseRecord>,
    pub stats: ParseStats,
}

impl ParseOutput {
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Surface an empty record set as [`GradeSheetError::NoCoursesFound`].
    pub fn into_result(self) -> Result<Self, GradeSheetError> {
        if self.courses.is_empty() {
            Err(GradeSheetError::NoCoursesFound)
        } else {
            Ok(self)
        }
    }
}
