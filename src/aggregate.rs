//! Grade-point aggregates over a record set.

use crate::output::CourseRecord;
use serde::{Deserialize, Serialize};

/// Credit-weighted average: Σ quality points / Σ credits, 0 when undefined.
pub fn calculate_cgpa(records: &[CourseRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let quality: f64 = records.iter().map(CourseRecord::quality_points).sum();
    let credits = calculate_total_credits(records);
    if credits > 0.0 {
        quality / credits
    } else {
        0.0
    }
}

/// Credits attempted (nominal credits of every record).
pub fn calculate_total_credits(records: &[CourseRecord]) -> f64 {
    records.iter().map(|r| r.credits).sum()
}

/// Credits actually earned: failed and zero-grade courses contribute nothing.
pub fn calculate_earned_credits(records: &[CourseRecord]) -> f64 {
    records
        .iter()
        .filter(|r| !r.is_failed && r.grade_points != 0.0)
        .map(|r| r.credits)
        .sum()
}

/// Number of courses that carry credit.
pub fn calculate_credit_courses(records: &[CourseRecord]) -> usize {
    records.iter().filter(|r| r.credits > 0.0).count()
}

/// Round a CGPA to two decimals, rounding up when the third decimal is ≥ 5
/// and truncating otherwise.
///
/// ```rust
/// use gradesheet::calculate_actual_cgpa;
///
/// assert!((calculate_actual_cgpa(3.655) - 3.66).abs() < 1e-9);
/// assert!((calculate_actual_cgpa(3.654) - 3.65).abs() < 1e-9);
/// ```
pub fn calculate_actual_cgpa(cgpa: f64) -> f64 {
    let hundredths = cgpa * 100.0;
    let third_decimal = ((cgpa * 1000.0) % 10.0).floor();
    if third_decimal >= 5.0 {
        hundredths.ceil() / 100.0
    } else {
        hundredths.floor() / 100.0
    }
}

/// The figures shown next to a record set and written under an export.
///
/// "Current" is computed over the parsed snapshot, "dream" over the edited
/// set, so a user can see what re-taking a course would do to their CGPA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_courses: usize,
    pub credit_courses: usize,
    pub total_credits: f64,
    pub earned_credits: f64,
    pub current_cgpa: f64,
    pub current_actual_cgpa: f64,
    pub dream_cgpa: f64,
    pub dream_actual_cgpa: f64,
}

impl Summary {
    pub fn compute(current: &[CourseRecord], original: &[CourseRecord]) -> Self {
        let current_cgpa = calculate_cgpa(original);
        let dream_cgpa = calculate_cgpa(current);
        Self {
            total_courses: current.len(),
            credit_courses: calculate_credit_courses(current),
            total_credits: calculate_total_credits(current),
            earned_credits: calculate_earned_credits(current),
            current_cgpa,
            current_actual_cgpa: calculate_actual_cgpa(current_cgpa),
            dream_cgpa,
            dream_actual_cgpa: calculate_actual_cgpa(dream_cgpa),
        }
    }
}
