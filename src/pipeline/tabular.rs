//! Row/column extraction for spreadsheet-shaped input.
//!
//! A spreadsheet reader hands us a matrix of cells. Column positions are
//! discovered from fuzzy header names ("Course Code", "Credits Earned",
//! "Grade Points"); failing that, the first row holding a bare course code is
//! taken to be laid out as code | credits | grade points. Each data row then
//! goes through the same retake detection, failed-course substitution and
//! range checks as text input.

use crate::config::ParserConfig;
use crate::output::CourseRecord;
use crate::pipeline::extract::candidate;
use crate::pipeline::markers;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One spreadsheet cell as delivered by the row collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

static RE_LEADING_FLOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap());

impl CellValue {
    /// Cell rendered as text, the way a spreadsheet shows it.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Numeric value; text cells yield their leading number (`"3.00 cr"` → 3.0).
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => RE_LEADING_FLOAT
                .find(s.trim_start())
                .and_then(|m| m.as_str().parse().ok()),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// Resolved column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    /// First row holding course data.
    pub first_data_row: usize,
    pub course_code: usize,
    pub credits: usize,
    pub grade_points: usize,
}

impl Columns {
    fn width(&self) -> usize {
        self.course_code.max(self.credits).max(self.grade_points) + 1
    }
}

/// Candidates from one row matrix plus row counters.
#[derive(Debug, Clone, Default)]
pub struct TableExtraction {
    pub columns: Option<Columns>,
    pub candidates: Vec<CourseRecord>,
    pub rows_total: usize,
    pub rows_skipped: usize,
}

/// Locate code / credits / grade-point columns.
pub fn locate_columns(rows: &[Vec<CellValue>], config: &ParserConfig) -> Option<Columns> {
    let mut header_row = None;
    let mut code_col = None;
    let mut credits_col = None;
    let mut gp_col = None;

    for (i, row) in rows.iter().take(config.header_scan_rows).enumerate() {
        for (j, cell) in row.iter().enumerate() {
            let text = cell.to_text().trim().to_lowercase();
            if text.contains("course") && text.contains("code") {
                code_col = Some(j);
                header_row = Some(i);
            } else if text.contains("credit") && credits_col.is_none() {
                credits_col = Some(j);
                header_row = Some(i);
            } else if text.contains("grade") && text.contains("point") && gp_col.is_none() {
                gp_col = Some(j);
                header_row = Some(i);
            }
        }
        if code_col.is_some() && credits_col.is_some() && gp_col.is_some() {
            break;
        }
    }

    if let Some(h) = header_row {
        return match (code_col, credits_col, gp_col) {
            (Some(course_code), Some(credits), Some(grade_points)) => Some(Columns {
                first_data_row: h + 1,
                course_code,
                credits,
                grade_points,
            }),
            _ => {
                debug!("partial header in row {}; no usable columns", h);
                None
            }
        };
    }

    // No header text at all: look for a bare code in the leading columns.
    for (i, row) in rows.iter().take(config.guess_scan_rows).enumerate() {
        if row.len() < 3 {
            continue;
        }
        let hit = row
            .iter()
            .take(3)
            .position(|cell| markers::is_bare_course_code_ignore_case(cell.to_text().trim()));
        if let Some(j) = hit {
            debug!("guessed columns {}..={} from row {}", j, j + 2, i);
            // The row that fixed the layout acts as the header.
            return Some(Columns {
                first_data_row: i + 1,
                course_code: j,
                credits: j + 1,
                grade_points: j + 2,
            });
        }
    }

    None
}

/// Extract candidate records from a row matrix.
pub fn extract_rows(rows: &[Vec<CellValue>], config: &ParserConfig) -> TableExtraction {
    let Some(cols) = locate_columns(rows, config) else {
        return TableExtraction::default();
    };

    let mut out = TableExtraction {
        columns: Some(cols),
        ..TableExtraction::default()
    };

    for row in rows.iter().skip(cols.first_data_row) {
        out.rows_total += 1;
        if row.len() < cols.width() {
            out.rows_skipped += 1;
            continue;
        }

        let code = row[cols.course_code].to_text().trim().to_string();
        let lower = code.to_lowercase();
        if code.is_empty() || lower.contains("summary") || lower.contains("total") {
            out.rows_skipped += 1;
            continue;
        }

        let row_text = row
            .iter()
            .map(CellValue::to_text)
            .collect::<Vec<_>>()
            .join(" ");
        let retake = markers::detect_retake(&row_text);

        let (Some(credits), Some(grade_points)) = (
            row[cols.credits].as_number(),
            row[cols.grade_points].as_number(),
        ) else {
            debug!("{}: non-numeric credits or grade points", code);
            out.rows_skipped += 1;
            continue;
        };

        let code = code.to_uppercase();
        match candidate(&code, credits, grade_points, retake, config) {
            Some(record) => out.candidates.push(record),
            None => out.rows_skipped += 1,
        }
    }

    out
}
