//! Course record extraction from normalised text.
//!
//! ## Two strategies
//!
//! Page-layout text extraction segments lines inconsistently. When a course
//! row lands on one physical line, [`extract_from_line`] is precise: code at
//! the start, credits first, grade points last. When rows are torn apart the
//! line pass finds nothing, and [`extract_from_tokens`] scans the flattened
//! token stream instead, trading precision for recall. The word pass only
//! runs when the line pass accepted zero records for the whole document.
//!
//! ## Interior numbers
//!
//! A line such as `CSE110 ... 3.00 A 4.00 4.00` may carry extra numeric
//! columns. Only the first (credits) and last (grade points) decimals are
//! used; anything between is ignored. Sheets with additional trailing numeric
//! columns will be mis-read.

use crate::config::ParserConfig;
use crate::output::{CourseRecord, RetakeType};
use crate::pipeline::markers;
use tracing::debug;

/// Apply failed-course substitution and range validation to raw values.
///
/// A 0/0 pair on a non-preparatory course means the sheet omitted the credit
/// weight of a failed attempt; credits come from the configured policy and
/// the record is flagged `is_failed`.
pub(crate) fn candidate(
    course_code: &str,
    credits: f64,
    grade_points: f64,
    retake: Option<RetakeType>,
    config: &ParserConfig,
) -> Option<CourseRecord> {
    let failed = credits == 0.0 && grade_points == 0.0 && !config.is_prep_course(course_code);
    let credits = if failed {
        config.credit_policy.standard_credits(course_code)
    } else {
        credits
    };

    if !config.accepts(credits, grade_points) {
        debug!(
            "{}: rejected out-of-range values credits={} grade_points={}",
            course_code, credits, grade_points
        );
        return None;
    }

    Some(CourseRecord::extracted(
        course_code,
        credits,
        grade_points,
        retake,
        failed,
    ))
}

/// Line-based extraction for one already-classified line.
pub fn extract_from_line(line: &str, config: &ParserConfig) -> Option<CourseRecord> {
    let code = markers::leading_course_code(line)?;
    let retake = markers::detect_retake(line);

    let numbers = markers::decimal_numbers(line);
    let (&credits, &grade_points) = match (numbers.first(), numbers.last()) {
        (Some(first), Some(last)) if numbers.len() >= 2 => (first, last),
        _ => {
            debug!("{}: fewer than two decimals on line", code);
            return None;
        }
    };

    candidate(code, credits, grade_points, retake, config)
}

/// Word-window fallback over the flattened token stream.
///
/// For every bare course-code token, retake markers are looked for in a
/// window around it and decimals in the tokens following it. Adjacent pairs
/// of those decimals are tried in order as (credits, grade points); the first
/// pair that survives validation is taken.
pub fn extract_from_tokens<S: AsRef<str>>(tokens: &[S], config: &ParserConfig) -> Vec<CourseRecord> {
    let mut out = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let code = token.as_ref();
        if !markers::is_bare_course_code(code) {
            continue;
        }

        let ctx_start = i.saturating_sub(config.context_before);
        let ctx_end = (i + config.context_after + 1).min(tokens.len());
        let context = tokens[ctx_start..ctx_end]
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(" ");
        let retake = markers::detect_retake(&context);

        let num_end = (i + 1 + config.number_lookahead).min(tokens.len());
        let numbers: Vec<f64> = tokens[i + 1..num_end]
            .iter()
            .filter_map(|t| markers::decimal_token(t.as_ref()))
            .collect();
        if numbers.len() < 2 {
            continue;
        }

        let accepted = numbers
            .windows(2)
            .find_map(|pair| candidate(code, pair[0], pair[1], retake, config));

        if let Some(record) = accepted {
            debug!(
                "word fallback: {} credits={} grade_points={}",
                record.course_code, record.credits, record.grade_points
            );
            out.push(record);
        }
    }

    out
}
