//! Parsing entry points.
//!
//! The in-memory functions ([`parse_text`], [`parse_fragments`],
//! [`parse_rows`]) never fail: an unreadable document simply yields an empty
//! [`ParseOutput`]. The file-level functions add input loading and surface an
//! empty result as [`GradeSheetError::NoCoursesFound`].

use crate::config::ParserConfig;
use crate::error::GradeSheetError;
use crate::output::{CourseRecord, ExtractionStrategy, ParseOutput, ParseStats};
use crate::pipeline::input::{self, InputFormat, RawDocument};
use crate::pipeline::normalize::{self, TextFragment};
use crate::pipeline::reconcile::CourseMap;
use crate::pipeline::tabular::{self, CellValue};
use crate::pipeline::{classify, extract};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Parse plain extracted text (page texts already joined with `\n`).
pub fn parse_text(text: &str, config: &ParserConfig) -> ParseOutput {
    let start = Instant::now();
    info!("Parsing text document ({} bytes)", text.len());
    let lines = normalize::lines_from_text(text);
    finish(parse_lines(&lines, text, config), start)
}

/// Parse positioned fragments, one `Vec` per page in page order.
pub fn parse_fragments(pages: &[Vec<TextFragment>], config: &ParserConfig) -> ParseOutput {
    let start = Instant::now();
    info!("Parsing {} page(s) of positioned fragments", pages.len());
    let lines: Vec<String> = pages
        .iter()
        .flat_map(|page| normalize::lines_from_fragments(page, config.line_tolerance))
        .collect();
    let full_text = lines.join("\n");
    finish(parse_lines(&lines, &full_text, config), start)
}

/// Parse a spreadsheet-shaped row matrix.
pub fn parse_rows(rows: &[Vec<CellValue>], config: &ParserConfig) -> ParseOutput {
    let start = Instant::now();
    info!("Parsing {} spreadsheet row(s)", rows.len());
    let table = tabular::extract_rows(rows, config);

    let mut stats = ParseStats {
        lines_total: table.rows_total,
        lines_skipped: table.rows_skipped,
        candidates: table.candidates.len(),
        ..ParseStats::default()
    };
    let courses = reconcile(table.candidates);
    if !courses.is_empty() {
        stats.strategy = ExtractionStrategy::Table;
    }
    finish(ParseOutput { courses, stats }, start)
}

/// Dispatch a loaded document to the matching parser.
pub fn parse_document(document: &RawDocument, config: &ParserConfig) -> ParseOutput {
    match document {
        RawDocument::Text(text) => parse_text(text, config),
        RawDocument::Pages(pages) => parse_text(&normalize::assemble_pages(pages.clone()), config),
        RawDocument::Fragments(pages) => parse_fragments(pages, config),
        RawDocument::Rows(rows) => parse_rows(rows, config),
    }
}

/// Load and parse a grade-sheet file.
///
/// # Errors
/// - `FileNotFound` / `PermissionDenied` when the file cannot be read
/// - `UnsupportedFormat` when the format cannot be inferred or is not built in
/// - `ExtractionFailed` when the PDF, workbook, CSV or JSON collaborator fails
/// - `NoCoursesFound` when nothing course-shaped was accepted
pub async fn parse_file(
    path: impl AsRef<Path>,
    format: InputFormat,
    config: &ParserConfig,
) -> Result<ParseOutput, GradeSheetError> {
    let document = input::load_document(path, format).await?;
    parse_document(&document, config).into_result()
}

/// Blocking wrapper around [`parse_file`]. Creates a private runtime, so it
/// must not be called from inside an async context.
pub fn parse_file_sync(
    path: impl AsRef<Path>,
    format: InputFormat,
    config: &ParserConfig,
) -> Result<ParseOutput, GradeSheetError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| GradeSheetError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(parse_file(path, format, config))
}

// ── Internals ─────────────────────────────────────────────────────────────

/// Line pass over classified lines; word fallback over `full_text` when the
/// line pass accepted nothing.
fn parse_lines(lines: &[String], full_text: &str, config: &ParserConfig) -> ParseOutput {
    let mut stats = ParseStats {
        lines_total: lines.len(),
        ..ParseStats::default()
    };

    let mut candidates = Vec::new();
    for line in lines {
        if classify::should_skip_line(line, &config.skip_patterns) {
            debug!("skip: {}", line);
            stats.lines_skipped += 1;
            continue;
        }
        if let Some(record) = extract::extract_from_line(line, config) {
            candidates.push(record);
        }
    }

    if !candidates.is_empty() {
        stats.strategy = ExtractionStrategy::Lines;
    } else {
        debug!("line pass found no courses; falling back to word windows");
        let tokens = normalize::tokens(full_text);
        candidates = extract::extract_from_tokens(&tokens, config);
        if !candidates.is_empty() {
            stats.strategy = ExtractionStrategy::Words;
        }
    }

    stats.candidates = candidates.len();
    ParseOutput {
        courses: reconcile(candidates),
        stats,
    }
}

fn reconcile(candidates: Vec<CourseRecord>) -> Vec<CourseRecord> {
    let mut map = CourseMap::new();
    for candidate in candidates {
        map.handle_duplicate(candidate);
    }
    map.into_records()
}

fn finish(mut output: ParseOutput, start: Instant) -> ParseOutput {
    output.stats.duration_ms = start.elapsed().as_millis() as u64;
    if output.courses.is_empty() {
        warn!(
            "No courses found ({} lines, {} skipped)",
            output.stats.lines_total, output.stats.lines_skipped
        );
    } else {
        info!(
            "Parsed {} course(s) from {} candidate(s) via {:?} in {}ms",
            output.courses.len(),
            output.stats.candidates,
            output.stats.strategy,
            output.stats.duration_ms
        );
    }
    output
}
