//! Input resolution: read a grade-sheet file into a raw document.
//!
//! Every supported format is turned into one of the shapes the extractors
//! understand ([`RawDocument`]). The format is either given explicitly or
//! inferred from the file extension. Collaborator failures (corrupt PDF or
//! workbook, malformed CSV, invalid JSON) are fatal and reported as
//! [`GradeSheetError::ExtractionFailed`]; no partial document is returned.

use crate::error::GradeSheetError;
use crate::pipeline::normalize::{PageText, TextFragment};
use crate::pipeline::tabular::CellValue;
use calamine::{open_workbook_auto, DataType, Reader};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// How to interpret an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Infer from the file extension.
    #[default]
    Auto,
    /// Plain text, one printed row per line.
    Text,
    /// PDF; text is extracted page by page.
    Pdf,
    /// JSON array of pages, each an array of `{text, x, y}` fragments.
    Fragments,
    /// Comma-separated rows.
    Csv,
    /// Spreadsheet workbook (`.xlsx`, `.xls`, `.xlsm`, `.ods`); first sheet only.
    Excel,
    /// JSON array of rows, each an array of cells.
    Rows,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Auto => "auto",
            InputFormat::Text => "text",
            InputFormat::Pdf => "pdf",
            InputFormat::Fragments => "fragments",
            InputFormat::Csv => "csv",
            InputFormat::Excel => "excel",
            InputFormat::Rows => "rows",
        }
    }

    /// Format implied by a file extension. `.json` stays [`InputFormat::Auto`]
    /// because it may hold either fragments or rows.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "text" => Some(InputFormat::Text),
            "pdf" => Some(InputFormat::Pdf),
            "csv" => Some(InputFormat::Csv),
            "xlsx" | "xls" | "xlsm" | "ods" => Some(InputFormat::Excel),
            "json" => Some(InputFormat::Auto),
            _ => None,
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputFormat {
    type Err = GradeSheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(InputFormat::Auto),
            "text" | "txt" => Ok(InputFormat::Text),
            "pdf" => Ok(InputFormat::Pdf),
            "fragments" => Ok(InputFormat::Fragments),
            "csv" => Ok(InputFormat::Csv),
            "excel" | "xlsx" | "xls" => Ok(InputFormat::Excel),
            "rows" => Ok(InputFormat::Rows),
            other => Err(GradeSheetError::InvalidConfig(format!(
                "unknown input format '{}' (expected auto, text, pdf, fragments, csv, excel or rows)",
                other
            ))),
        }
    }
}

/// A document as delivered by an extraction collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDocument {
    Text(String),
    Pages(Vec<PageText>),
    Fragments(Vec<Vec<TextFragment>>),
    Rows(Vec<Vec<CellValue>>),
}

/// Read `path` and hand back its raw document.
pub async fn load_document(
    path: impl AsRef<Path>,
    format: InputFormat,
) -> Result<RawDocument, GradeSheetError> {
    let path = path.as_ref().to_path_buf();
    let format = match format {
        InputFormat::Auto => InputFormat::from_extension(&path),
        explicit => Some(explicit),
    };

    // Workbooks are opened by path; everything else is read into memory.
    if format == Some(InputFormat::Excel) {
        info!("Loading {} as {}", path.display(), InputFormat::Excel);
        return read_excel(path).await.map(RawDocument::Rows);
    }

    let bytes = read_bytes(&path).await?;
    let format = format.ok_or_else(|| GradeSheetError::UnsupportedFormat {
        path: path.clone(),
        detail: "cannot infer format from extension; pass one explicitly".into(),
    })?;
    info!("Loading {} as {}", path.display(), format);

    match format {
        InputFormat::Text => decode_text(&path, bytes).map(RawDocument::Text),
        InputFormat::Pdf => extract_pdf(path, bytes).await.map(RawDocument::Pages),
        InputFormat::Csv => read_csv(&path, &bytes).map(RawDocument::Rows),
        InputFormat::Fragments => parse_json(&path, &bytes).map(RawDocument::Fragments),
        InputFormat::Rows => parse_json(&path, &bytes).map(RawDocument::Rows),
        InputFormat::Auto => sniff_json(&path, &bytes),
        InputFormat::Excel => read_excel(path).await.map(RawDocument::Rows),
    }
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>, GradeSheetError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| io_error(path, e))?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

fn io_error(path: &Path, e: std::io::Error) -> GradeSheetError {
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => GradeSheetError::PermissionDenied {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::NotFound => GradeSheetError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => extraction_failed(path, e),
    }
}

fn extraction_failed(path: &Path, detail: impl fmt::Display) -> GradeSheetError {
    GradeSheetError::ExtractionFailed {
        path: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

fn decode_text(path: &Path, bytes: Vec<u8>) -> Result<String, GradeSheetError> {
    String::from_utf8(bytes).map_err(|e| extraction_failed(path, e))
}

// ── PDF ───────────────────────────────────────────────────────────────────

#[cfg(feature = "pdf")]
async fn extract_pdf(path: PathBuf, bytes: Vec<u8>) -> Result<Vec<PageText>, GradeSheetError> {
    // pdf-extract is CPU-bound and panics on some malformed files.
    let task_path = path.clone();
    tokio::task::spawn_blocking(move || {
        use std::panic::{self, AssertUnwindSafe};
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        }));
        match result {
            Ok(Ok(pages)) => Ok(pages
                .into_iter()
                .enumerate()
                .map(|(i, text)| PageText {
                    page_num: i + 1,
                    text,
                })
                .collect::<Vec<_>>()),
            Ok(Err(e)) => Err(extraction_failed(&task_path, e)),
            Err(_) => Err(extraction_failed(
                &task_path,
                "PDF extraction panicked (malformed document)",
            )),
        }
    })
    .await
    .map_err(|e| GradeSheetError::Internal(format!("PDF extraction task failed: {}", e)))?
    .inspect(|pages| debug!("Extracted {} page(s) from {}", pages.len(), path.display()))
}

#[cfg(not(feature = "pdf"))]
async fn extract_pdf(path: PathBuf, _bytes: Vec<u8>) -> Result<Vec<PageText>, GradeSheetError> {
    Err(GradeSheetError::UnsupportedFormat {
        path,
        detail: "built without the `pdf` feature".into(),
    })
}

// ── Excel ─────────────────────────────────────────────────────────────────

async fn read_excel(path: PathBuf) -> Result<Vec<Vec<CellValue>>, GradeSheetError> {
    tokio::fs::metadata(&path)
        .await
        .map_err(|e| io_error(&path, e))?;

    let task_path = path.clone();
    tokio::task::spawn_blocking(move || {
        let mut workbook =
            open_workbook_auto(&task_path).map_err(|e| extraction_failed(&task_path, e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| extraction_failed(&task_path, "workbook has no worksheets"))?
            .map_err(|e| extraction_failed(&task_path, e))?;
        Ok(range
            .rows()
            .map(|row| row.iter().map(excel_cell).collect())
            .collect::<Vec<_>>())
    })
    .await
    .map_err(|e| GradeSheetError::Internal(format!("workbook task failed: {}", e)))?
    .inspect(|rows| debug!("Read {} row(s) from {}", rows.len(), path.display()))
}

fn excel_cell(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::String(s) => CellValue::from(s.trim()),
        DataType::Float(f) => CellValue::Number(*f),
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::Bool(b) => CellValue::Bool(*b),
        other => CellValue::from(other.to_string().trim()),
    }
}

// ── CSV / JSON ────────────────────────────────────────────────────────────

fn read_csv(path: &Path, bytes: &[u8]) -> Result<Vec<Vec<CellValue>>, GradeSheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| extraction_failed(path, e))?;
        rows.push(record.iter().map(CellValue::from).collect());
    }
    Ok(rows)
}

fn parse_json<T: serde::de::DeserializeOwned>(
    path: &Path,
    bytes: &[u8],
) -> Result<T, GradeSheetError> {
    serde_json::from_slice(bytes).map_err(|e| extraction_failed(path, e))
}

/// `.json` holds either fragment pages or rows; fragments are objects, so try
/// them first.
fn sniff_json(path: &Path, bytes: &[u8]) -> Result<RawDocument, GradeSheetError> {
    if let Ok(pages) = serde_json::from_slice::<Vec<Vec<TextFragment>>>(bytes) {
        if pages.iter().any(|p| !p.is_empty()) {
            return Ok(RawDocument::Fragments(pages));
        }
    }
    parse_json(path, bytes).map(RawDocument::Rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(name: &str, body: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(body.as_bytes())
            .unwrap();
        (dir, path)
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(InputFormat::from_extension(Path::new("a.PDF")), Some(InputFormat::Pdf));
        assert_eq!(InputFormat::from_extension(Path::new("a.txt")), Some(InputFormat::Text));
        assert_eq!(InputFormat::from_extension(Path::new("a.csv")), Some(InputFormat::Csv));
        assert_eq!(InputFormat::from_extension(Path::new("a.json")), Some(InputFormat::Auto));
        assert_eq!(InputFormat::from_extension(Path::new("a.xlsx")), Some(InputFormat::Excel));
        assert_eq!(InputFormat::from_extension(Path::new("a.ODS")), Some(InputFormat::Excel));
        assert_eq!(InputFormat::from_extension(Path::new("a.docx")), None);
        assert_eq!(InputFormat::from_extension(Path::new("noext")), None);
    }

    #[test]
    fn format_from_str() {
        assert_eq!("Rows".parse::<InputFormat>().unwrap(), InputFormat::Rows);
        assert_eq!("txt".parse::<InputFormat>().unwrap(), InputFormat::Text);
        assert_eq!("xlsx".parse::<InputFormat>().unwrap(), InputFormat::Excel);
        assert!(matches!(
            "docx".parse::<InputFormat>(),
            Err(GradeSheetError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = load_document("/definitely/not/here.txt", InputFormat::Auto)
            .await
            .unwrap_err();
        assert!(matches!(err, GradeSheetError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn unknown_extension_needs_explicit_format() {
        let (_dir, path) = fixture("sheet.dat", "CSE110 X 3.00 A 4.00\n");
        let err = load_document(&path, InputFormat::Auto).await.unwrap_err();
        assert!(matches!(err, GradeSheetError::UnsupportedFormat { .. }));

        let doc = load_document(&path, InputFormat::Text).await.unwrap();
        assert_eq!(doc, RawDocument::Text("CSE110 X 3.00 A 4.00\n".into()));
    }

    #[tokio::test]
    async fn csv_rows_are_flexible() {
        let (_dir, path) = fixture("sheet.csv", "Course Code,Credits,Grade Points\nCSE110,3.00,4.00,extra\n");
        let RawDocument::Rows(rows) = load_document(&path, InputFormat::Auto).await.unwrap() else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].len(), 4);
        assert_eq!(rows[1][0], CellValue::Text("CSE110".into()));
    }

    #[tokio::test]
    async fn json_sniffs_fragments_then_rows() {
        let (_d1, frag) = fixture(
            "frag.json",
            r#"[[{"text":"CSE110","x":10,"y":700},{"text":"3.00","x":300,"y":700}]]"#,
        );
        let doc = load_document(&frag, InputFormat::Auto).await.unwrap();
        assert!(matches!(doc, RawDocument::Fragments(ref p) if p[0].len() == 2));

        let (_d2, rows) = fixture("rows.json", r#"[["CSE110", 3, 4.0], [null, "x"]]"#);
        let doc = load_document(&rows, InputFormat::Auto).await.unwrap();
        assert!(matches!(doc, RawDocument::Rows(ref r) if r.len() == 2));
    }

    #[tokio::test]
    async fn bad_json_is_extraction_failure() {
        let (_dir, path) = fixture("bad.json", "{not json");
        let err = load_document(&path, InputFormat::Rows).await.unwrap_err();
        assert!(matches!(err, GradeSheetError::ExtractionFailed { .. }));
    }

    #[test]
    fn excel_cells_map_to_cell_values() {
        assert_eq!(excel_cell(&DataType::Empty), CellValue::Empty);
        assert_eq!(excel_cell(&DataType::String(" CSE110 ".into())), CellValue::Text("CSE110".into()));
        assert_eq!(excel_cell(&DataType::String("  ".into())), CellValue::Empty);
        assert_eq!(excel_cell(&DataType::Float(3.3)), CellValue::Number(3.3));
        assert_eq!(excel_cell(&DataType::Int(3)), CellValue::Number(3.0));
        assert_eq!(excel_cell(&DataType::Bool(true)), CellValue::Bool(true));
    }

    #[tokio::test]
    async fn corrupt_workbook_is_extraction_failure() {
        let (_dir, path) = fixture("sheet.xlsx", "PK this is not really a workbook");
        let err = load_document(&path, InputFormat::Auto).await.unwrap_err();
        assert!(matches!(err, GradeSheetError::ExtractionFailed { .. }));
    }

    #[tokio::test]
    async fn missing_workbook_is_not_found() {
        let err = load_document("/definitely/not/here.xlsx", InputFormat::Auto)
            .await
            .unwrap_err();
        assert!(matches!(err, GradeSheetError::FileNotFound { .. }));
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn corrupt_pdf_is_extraction_failure() {
        let (_dir, path) = fixture("broken.pdf", "%PDF-1.4 this is not really a pdf");
        let err = load_document(&path, InputFormat::Auto).await.unwrap_err();
        assert!(matches!(err, GradeSheetError::ExtractionFailed { .. }));
    }
}
