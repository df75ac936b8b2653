//! Caller-owned record set with an immutable parsed snapshot.
//!
//! A [`Transcript`] holds the finalized records of one document plus a copy
//! taken at parse time. Edits (grade changes, deletions, manual additions)
//! touch only the working set; [`Transcript::reset_to_original`] restores the
//! snapshot. Every edit validates first and leaves the set untouched on error.

use crate::aggregate::{self, Summary};
use crate::error::{EditError, Violation};
use crate::output::{CourseRecord, ParseOutput};
use crate::pipeline::markers;
use tracing::{debug, info};

const MAX_MANUAL_CREDITS: f64 = 10.0;
const MAX_GRADE_POINTS: f64 = 4.0;
const GRADE_EPSILON: f64 = 0.001;

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    courses: Vec<CourseRecord>,
    original: Vec<CourseRecord>,
}

impl Transcript {
    /// An empty transcript with no snapshot (manual entry only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a parsed record set and snapshot it.
    pub fn from_records(courses: Vec<CourseRecord>) -> Self {
        Self {
            original: courses.clone(),
            courses,
        }
    }

    pub fn from_output(output: ParseOutput) -> Self {
        Self::from_records(output.courses)
    }

    pub fn courses(&self) -> &[CourseRecord] {
        &self.courses
    }

    pub fn original_courses(&self) -> &[CourseRecord] {
        &self.original
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Position of `course_code` in the working set.
    pub fn position(&self, course_code: &str) -> Option<usize> {
        self.courses.iter().position(|c| c.course_code == course_code)
    }

    // ── Aggregates ────────────────────────────────────────────────────────

    pub fn cgpa(&self) -> f64 {
        aggregate::calculate_cgpa(&self.courses)
    }

    pub fn original_cgpa(&self) -> f64 {
        aggregate::calculate_cgpa(&self.original)
    }

    pub fn earned_credits(&self) -> f64 {
        aggregate::calculate_earned_credits(&self.courses)
    }

    pub fn credit_courses(&self) -> usize {
        aggregate::calculate_credit_courses(&self.courses)
    }

    pub fn total_credits(&self) -> f64 {
        aggregate::calculate_total_credits(&self.courses)
    }

    pub fn summary(&self) -> Summary {
        Summary::compute(&self.courses, &self.original)
    }

    /// `true` when a parsed course was deleted or its grade points changed.
    /// Manually added courses do not count.
    pub fn is_modified(&self) -> bool {
        let parsed_remaining = self.courses.iter().filter(|c| !c.is_manually_added).count();
        if parsed_remaining < self.original.len() {
            return true;
        }
        self.courses
            .iter()
            .filter(|c| !c.is_manually_added)
            .any(|c| {
                self.original
                    .iter()
                    .find(|o| o.course_code == c.course_code)
                    .is_some_and(|o| (o.grade_points - c.grade_points).abs() > GRADE_EPSILON)
            })
    }

    // ── Edits ─────────────────────────────────────────────────────────────

    /// Set the grade points of the course at `index`; quality points follow.
    pub fn update_grade_points(&mut self, index: usize, grade_points: f64) -> Result<(), EditError> {
        if !grade_points.is_finite() || !(0.0..=MAX_GRADE_POINTS).contains(&grade_points) {
            return Err(EditError::InvalidCourse(vec![
                Violation::GradePointsOutOfRange(grade_points),
            ]));
        }
        let course = self
            .courses
            .get_mut(index)
            .ok_or(EditError::CourseNotFound { index })?;
        debug!(
            "{}: grade points {:.2} → {:.2}",
            course.course_code, course.grade_points, grade_points
        );
        course.grade_points = grade_points;
        Ok(())
    }

    /// Remove and return the course at `index`.
    pub fn delete_course(&mut self, index: usize) -> Result<CourseRecord, EditError> {
        if index >= self.courses.len() {
            return Err(EditError::CourseNotFound { index });
        }
        let removed = self.courses.remove(index);
        debug!("deleted {}", removed.course_code);
        Ok(removed)
    }

    /// Append a user-entered course after validating every field.
    ///
    /// The code is trimmed and upper-cased first. All violations are reported
    /// together.
    pub fn add_manual_course(
        &mut self,
        course_code: &str,
        credits: f64,
        grade_points: f64,
    ) -> Result<&CourseRecord, EditError> {
        let code = course_code.trim().to_uppercase();
        let mut violations = Vec::new();

        if code.is_empty() {
            violations.push(Violation::MissingCode);
        } else if !markers::is_course_code(&code) {
            violations.push(Violation::MalformedCode(code.clone()));
        }
        if !code.is_empty() && self.position(&code).is_some() {
            violations.push(Violation::DuplicateCode(code.clone()));
        }
        if !credits.is_finite() || credits <= 0.0 || credits > MAX_MANUAL_CREDITS {
            violations.push(Violation::CreditsOutOfRange(credits));
        }
        if !grade_points.is_finite() || !(0.0..=MAX_GRADE_POINTS).contains(&grade_points) {
            violations.push(Violation::GradePointsOutOfRange(grade_points));
        }

        if !violations.is_empty() {
            return Err(EditError::InvalidCourse(violations));
        }

        info!("added {} manually", code);
        self.courses
            .push(CourseRecord::manual(code, credits, grade_points));
        Ok(&self.courses[self.courses.len() - 1])
    }

    /// Discard every edit and restore the parsed snapshot.
    pub fn reset_to_original(&mut self) -> Result<(), EditError> {
        if self.original.is_empty() {
            return Err(EditError::NothingToReset);
        }
        self.courses = self.original.clone();
        Ok(())
    }
}
