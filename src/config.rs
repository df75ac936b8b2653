//! Parser configuration.
//!
//! All extraction behaviour is controlled through [`ParserConfig`], built via
//! its [`ParserConfigBuilder`]. The defaults reproduce the grade-sheet layout
//! the heuristics were tuned on; each knob exists because another
//! institution's sheet needed it.

use crate::error::GradeSheetError;
use crate::pipeline::credits::{CreditPolicy, StandardCreditTable};
use std::fmt;
use std::sync::Arc;

/// Boilerplate substrings that mark a line as noise (case-sensitive).
pub const DEFAULT_SKIP_PATTERNS: &[&str] = &[
    "SEMESTER:",
    "CUMULATIVE",
    "Credits Attempted",
    "Course No",
    "Course Title",
    "GRADE SHEET",
    "Student ID",
    "BRAC University",
    "PROGRAM:",
    "Page ",
    "UNOFFICIAL COPY",
    "GPA ",
    "CGPA ",
];

/// Remedial courses whose 0/0 is genuine rather than a missing credit value.
pub const DEFAULT_PREP_COURSES: &[&str] = &["MAT091", "MAT092", "ENG091"];

/// Configuration for a parse.
///
/// Built via [`ParserConfig::builder()`] or using [`ParserConfig::default()`].
///
/// # Example
/// ```rust
/// use gradesheet::ParserConfig;
///
/// let config = ParserConfig::builder()
///     .skip_pattern("Transcript of Records")
///     .line_tolerance(3.0)
///     .build()
///     .unwrap();
/// assert!(config.skip_patterns.iter().any(|p| p == "Transcript of Records"));
/// ```
#[derive(Clone)]
pub struct ParserConfig {
    /// Lines containing any of these substrings are discarded before
    /// extraction. Default: [`DEFAULT_SKIP_PATTERNS`].
    pub skip_patterns: Vec<String>,

    /// Courses exempt from failed-course credit substitution.
    /// Default: [`DEFAULT_PREP_COURSES`].
    pub prep_courses: Vec<String>,

    /// Credits assumed for a course reported as 0/0. Default: [`StandardCreditTable`].
    pub credit_policy: Arc<dyn CreditPolicy>,

    /// Vertical distance within which positioned fragments share a line. Default: 5.0.
    pub line_tolerance: f64,

    /// Upper bound for accepted credits. Default and ceiling: 10.
    pub max_credits: f64,

    /// Upper bound for accepted grade points. Default and ceiling: 4.0.
    pub max_grade_points: f64,

    /// Tokens before a course code scanned for retake markers in the word
    /// fallback. Default: 3.
    pub context_before: usize,

    /// Tokens after a course code scanned for retake markers. Default: 10.
    pub context_after: usize,

    /// Tokens after a course code searched for decimal numbers. Default: 9.
    pub number_lookahead: usize,

    /// Rows searched for column headers in tabular input. Default: 5.
    pub header_scan_rows: usize,

    /// Rows searched for a bare course code when no header is found. Default: 3.
    pub guess_scan_rows: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            skip_patterns: DEFAULT_SKIP_PATTERNS.iter().map(|s| s.to_string()).collect(),
            prep_courses: DEFAULT_PREP_COURSES.iter().map(|s| s.to_string()).collect(),
            credit_policy: Arc::new(StandardCreditTable::default()),
            line_tolerance: 5.0,
            max_credits: 10.0,
            max_grade_points: 4.0,
            context_before: 3,
            context_after: 10,
            number_lookahead: 9,
            header_scan_rows: 5,
            guess_scan_rows: 3,
        }
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("skip_patterns", &self.skip_patterns)
            .field("prep_courses", &self.prep_courses)
            .field("credit_policy", &"<dyn CreditPolicy>")
            .field("line_tolerance", &self.line_tolerance)
            .field("max_credits", &self.max_credits)
            .field("max_grade_points", &self.max_grade_points)
            .field("context_before", &self.context_before)
            .field("context_after", &self.context_after)
            .field("number_lookahead", &self.number_lookahead)
            .field("header_scan_rows", &self.header_scan_rows)
            .field("guess_scan_rows", &self.guess_scan_rows)
            .finish()
    }
}

impl ParserConfig {
    /// Create a new builder for `ParserConfig`.
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn is_prep_course(&self, course_code: &str) -> bool {
        crate::pipeline::credits::is_prep_course(course_code, &self.prep_courses)
    }

    /// Range check applied to every candidate before reconciliation.
    pub fn accepts(&self, credits: f64, grade_points: f64) -> bool {
        (0.0..=self.max_credits).contains(&credits)
            && (0.0..=self.max_grade_points).contains(&grade_points)
    }
}

/// Builder for [`ParserConfig`].
#[derive(Debug)]
pub struct ParserConfigBuilder {
    config: ParserConfig,
}

impl ParserConfigBuilder {
    /// Add one boilerplate substring to the default list.
    pub fn skip_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.skip_patterns.push(pattern.into());
        self
    }

    /// Replace the boilerplate list entirely.
    pub fn skip_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.skip_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn prep_course(mut self, code: impl Into<String>) -> Self {
        let code = code.into().trim().to_uppercase();
        if !self.config.prep_courses.contains(&code) {
            self.config.prep_courses.push(code);
        }
        self
    }

    pub fn credit_policy(mut self, policy: Arc<dyn CreditPolicy>) -> Self {
        self.config.credit_policy = policy;
        self
    }

    pub fn line_tolerance(mut self, tolerance: f64) -> Self {
        self.config.line_tolerance = tolerance;
        self
    }

    pub fn max_credits(mut self, max: f64) -> Self {
        self.config.max_credits = max;
        self
    }

    pub fn max_grade_points(mut self, max: f64) -> Self {
        self.config.max_grade_points = max;
        self
    }

    pub fn context_window(mut self, before: usize, after: usize) -> Self {
        self.config.context_before = before;
        self.config.context_after = after;
        self
    }

    pub fn number_lookahead(mut self, n: usize) -> Self {
        self.config.number_lookahead = n;
        self
    }

    pub fn header_scan_rows(mut self, n: usize) -> Self {
        self.config.header_scan_rows = n.max(1);
        self
    }

    pub fn guess_scan_rows(mut self, n: usize) -> Self {
        self.config.guess_scan_rows = n.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ParserConfig, GradeSheetError> {
        let c = &self.config;
        if !c.line_tolerance.is_finite() || c.line_tolerance < 0.0 {
            return Err(GradeSheetError::InvalidConfig(format!(
                "line tolerance must be ≥ 0, got {}",
                c.line_tolerance
            )));
        }
        // Bounds may tighten the record invariants but never relax them.
        if !(c.max_credits > 0.0 && c.max_credits <= 10.0) {
            return Err(GradeSheetError::InvalidConfig(format!(
                "max credits must be in (0, 10], got {}",
                c.max_credits
            )));
        }
        if !(c.max_grade_points > 0.0 && c.max_grade_points <= 4.0) {
            return Err(GradeSheetError::InvalidConfig(format!(
                "max grade points must be in (0, 4], got {}",
                c.max_grade_points
            )));
        }
        if c.number_lookahead < 2 {
            return Err(GradeSheetError::InvalidConfig(
                "number lookahead must be ≥ 2 (credits and grade points)".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_grade_sheet_layout() {
        let c = ParserConfig::default();
        assert_eq!(c.skip_patterns.len(), 13);
        assert!(c.is_prep_course("MAT091"));
        assert!(c.is_prep_course("ENG091"));
        assert!(!c.is_prep_course("CSE110"));
        assert_eq!(c.line_tolerance, 5.0);
        assert_eq!(c.number_lookahead, 9);
    }

    #[test]
    fn accepts_bounds_inclusive() {
        let c = ParserConfig::default();
        assert!(c.accepts(0.0, 0.0));
        assert!(c.accepts(10.0, 4.0));
        assert!(!c.accepts(10.5, 3.0));
        assert!(!c.accepts(3.0, 4.01));
        assert!(!c.accepts(f64::NAN, 3.0));
    }

    #[test]
    fn prep_course_is_normalised_and_deduplicated() {
        let c = ParserConfig::builder()
            .prep_course(" mat091 ")
            .prep_course("phy090")
            .build()
            .unwrap();
        assert_eq!(c.prep_courses.iter().filter(|p| *p == "MAT091").count(), 1);
        assert!(c.is_prep_course("PHY090"));
    }

    #[test]
    fn invalid_tolerance_rejected() {
        let err = ParserConfig::builder().line_tolerance(-1.0).build().unwrap_err();
        assert!(matches!(err, GradeSheetError::InvalidConfig(_)));
    }

    #[test]
    fn bounds_cannot_exceed_record_ranges() {
        assert!(ParserConfig::builder().max_credits(10.5).build().is_err());
        assert!(ParserConfig::builder().max_grade_points(5.0).build().is_err());
        assert!(ParserConfig::builder().max_credits(f64::NAN).build().is_err());
        assert!(ParserConfig::builder().max_credits(0.0).build().is_err());

        let c = ParserConfig::builder()
            .max_credits(6.0)
            .max_grade_points(4.0)
            .build()
            .unwrap();
        assert!(!c.accepts(7.0, 3.0));
    }

    #[test]
    fn tiny_lookahead_rejected() {
        assert!(ParserConfig::builder().number_lookahead(1).build().is_err());
    }

    #[test]
    fn debug_elides_policy() {
        let s = format!("{:?}", ParserConfig::default());
        assert!(s.contains("<dyn CreditPolicy>"));
    }
}
