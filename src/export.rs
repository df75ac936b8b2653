//! Spreadsheet export of a transcript.
//!
//! One row per course (code, credits, grade points, quality points, origin),
//! then a blank row and a SUMMARY block with the aggregate figures.

use crate::error::GradeSheetError;
use crate::transcript::Transcript;
use serde::Serialize;
use std::io;
use std::path::Path;
use tracing::info;

/// One exported row. Summary rows reuse the same five columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Course Code")]
    pub course_code: String,
    #[serde(rename = "Credits Earned")]
    pub credits: String,
    #[serde(rename = "Grade Points")]
    pub grade_points: String,
    #[serde(rename = "Quality Points")]
    pub quality_points: String,
    #[serde(rename = "Type")]
    pub kind: String,
}

impl ExportRow {
    fn summary(label: &str, value: String) -> Self {
        Self {
            course_code: label.to_string(),
            credits: value,
            ..Self::default()
        }
    }
}

/// Rows in export order: courses, a blank separator, then the summary block.
pub fn rows(transcript: &Transcript) -> Vec<ExportRow> {
    let mut out: Vec<ExportRow> = transcript
        .courses()
        .iter()
        .map(|c| ExportRow {
            course_code: c.course_code.clone(),
            credits: c.credits.to_string(),
            grade_points: format!("{:.2}", c.grade_points),
            quality_points: format!("{:.2}", c.quality_points()),
            kind: c.origin().to_string(),
        })
        .collect();

    let s = transcript.summary();
    out.push(ExportRow::default());
    out.push(ExportRow::summary("SUMMARY", String::new()));
    out.push(ExportRow::summary("Total Courses", s.total_courses.to_string()));
    out.push(ExportRow::summary("Credit Courses", s.credit_courses.to_string()));
    out.push(ExportRow::summary("Total Credits", format!("{:.2}", s.total_credits)));
    out.push(ExportRow::summary("Earned Credits", format!("{:.2}", s.earned_credits)));
    out.push(ExportRow::summary("Current CGPA", format!("{:.4}", s.current_cgpa)));
    out.push(ExportRow::summary(
        "Current Actual CGPA",
        format!("{:.2}", s.current_actual_cgpa),
    ));
    out.push(ExportRow::summary("Dream CGPA", format!("{:.4}", s.dream_cgpa)));
    out.push(ExportRow::summary(
        "Dream Actual CGPA",
        format!("{:.2}", s.dream_actual_cgpa),
    ));
    out
}

/// Write the export as CSV (with a header row) to `writer`.
pub fn write_csv<W: io::Write>(transcript: &Transcript, writer: W) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows(transcript) {
        wtr.serialize(row)?;
    }
    wtr.flush()
}

/// Write the export to `path` atomically (temp file + rename).
///
/// # Errors
/// `NoCoursesFound` for an empty transcript; `OutputWriteFailed` when the
/// file cannot be written.
pub async fn write_csv_file(
    transcript: &Transcript,
    path: impl AsRef<Path>,
) -> Result<(), GradeSheetError> {
    if transcript.is_empty() {
        return Err(GradeSheetError::NoCoursesFound);
    }
    let path = path.as_ref();
    let write_failed = |source: io::Error| GradeSheetError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut buf = Vec::new();
    write_csv(transcript, &mut buf).map_err(write_failed)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(write_failed)?;
    }

    let tmp_path = path.with_extension("csv.tmp");
    tokio::fs::write(&tmp_path, &buf)
        .await
        .map_err(write_failed)?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(write_failed)?;

    info!("Exported {} course(s) to {}", transcript.len(), path.display());
    Ok(())
}
