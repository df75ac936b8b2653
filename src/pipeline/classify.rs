//! Line classification: drop institutional boilerplate before extraction.
//!
//! Semester banners and summary rows often *start* with text that looks like
//! a course code or carry two decimals ("Credits Attempted 6.00 ... GPA
//! 3.65"), so they must be removed before pattern matching rather than
//! rejected by it.

/// `true` when `line` contains any of `patterns` (case-sensitive).
pub fn should_skip_line<S: AsRef<str>>(line: &str, patterns: &[S]) -> bool {
    patterns.iter().any(|p| line.contains(p.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SKIP_PATTERNS;

    #[test]
    fn headers_and_summaries_are_skipped() {
        for line in [
            "Course No Course Title Credits Earned Grade Grade Points",
            "SEMESTER: Spring 2023",
            "SEMESTER Credits Attempted 6.00 Credits Earned 6.00 GPA 3.65",
            "CUMULATIVE Credits 60.00",
            "Page 1 of 3",
            "UNOFFICIAL COPY",
        ] {
            assert!(should_skip_line(line, DEFAULT_SKIP_PATTERNS), "{line}");
        }
    }

    #[test]
    fn course_lines_pass() {
        assert!(!should_skip_line(
            "CSE110 PROGRAMMING LANGUAGE I 3.00 A 4.00",
            DEFAULT_SKIP_PATTERNS
        ));
    }

    #[test]
    fn match_is_case_sensitive() {
        assert!(!should_skip_line("cumulative totals", DEFAULT_SKIP_PATTERNS));
        // "GPA " needs the trailing space
        assert!(!should_skip_line("CSE110 GPA-bearing 3.00 4.00", DEFAULT_SKIP_PATTERNS));
    }
}
