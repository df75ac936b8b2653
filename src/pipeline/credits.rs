//! Failed-course credit resolution.
//!
//! Many grade sheets print `0.00` credits *and* `0.00` grade points for an F
//! grade, dropping the real credit weight. Counting such a course as zero
//! credits would leave it out of the CGPA denominator entirely, so the
//! extractors substitute a nominal credit value keyed on the course-code
//! prefix.
//!
//! The table is institution-specific and approximate. It sits behind the
//! [`CreditPolicy`] trait so callers can plug in their own catalogue.
//! Preparatory courses (see [`crate::config::ParserConfig::prep_courses`])
//! carry genuine zero credits and never reach the policy.

use crate::error::GradeSheetError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Maps a course code to the credit hours assumed for a failed attempt.
pub trait CreditPolicy: Send + Sync {
    fn standard_credits(&self, course_code: &str) -> f64;
}

/// One pattern → credits rule.
#[derive(Debug, Clone)]
pub struct CreditRule {
    pattern: Regex,
    credits: f64,
}

impl CreditRule {
    /// Compile a rule; the pattern is matched against the whole course code,
    /// so anchor it (`^...$`) when a prefix match is not intended.
    pub fn new(pattern: &str, credits: f64) -> Result<Self, GradeSheetError> {
        let pattern = Regex::new(pattern).map_err(|e| {
            GradeSheetError::InvalidConfig(format!("credit rule pattern '{pattern}': {e}"))
        })?;
        if !credits.is_finite() || credits < 0.0 {
            return Err(GradeSheetError::InvalidConfig(format!(
                "credit rule credits must be ≥ 0, got {credits}"
            )));
        }
        Ok(Self { pattern, credits })
    }

    pub fn matches(&self, course_code: &str) -> bool {
        self.pattern.is_match(course_code)
    }

    pub fn credits(&self) -> f64 {
        self.credits
    }
}

static DEFAULT_RULES: Lazy<Vec<CreditRule>> = Lazy::new(|| {
    [
        (r"^(CSE|EEE|ECE)\d{3}$", 3.0),
        (r"^(CSE|EEE|ECE)\d{3}L$", 1.0),
        (r"^MAT\d{3}$", 3.0),
        (r"^(PHY|CHE)\d{3}$", 3.0),
        (r"^(PHY|CHE)\d{3}L$", 1.0),
        (r"^ENG\d{3}$", 3.0),
        (r"^BUS\d{3}$", 3.0),
    ]
    .into_iter()
    .map(|(p, c)| CreditRule {
        pattern: Regex::new(p).unwrap(),
        credits: c,
    })
    .collect()
});

/// Fallback credits when no rule matches.
pub const DEFAULT_CREDITS: f64 = 3.0;

/// Ordered rule table; the first matching rule wins.
#[derive(Debug, Clone)]
pub struct StandardCreditTable {
    rules: Vec<CreditRule>,
    default_credits: f64,
}

impl Default for StandardCreditTable {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.clone(),
            default_credits: DEFAULT_CREDITS,
        }
    }
}

impl StandardCreditTable {
    /// Put `rule` ahead of every existing rule.
    pub fn with_rule(mut self, rule: CreditRule) -> Self {
        self.rules.insert(0, rule);
        self
    }

    pub fn with_default_credits(mut self, credits: f64) -> Self {
        self.default_credits = credits;
        self
    }

    pub fn rules(&self) -> &[CreditRule] {
        &self.rules
    }
}

impl CreditPolicy for StandardCreditTable {
    fn standard_credits(&self, course_code: &str) -> f64 {
        self.rules
            .iter()
            .find(|r| r.matches(course_code))
            .map_or(self.default_credits, CreditRule::credits)
    }
}

/// `true` when `course_code` is in the preparatory exclusion set.
pub fn is_prep_course(course_code: &str, prep_courses: &[String]) -> bool {
    prep_courses.iter().any(|p| p == course_code)
}
