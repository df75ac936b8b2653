//! CLI binary for gradesheet.
//!
//! A thin shim over the library crate that maps CLI flags to `ParserConfig`,
//! applies what-if edits to the parsed transcript, and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use gradesheet::{
    parse_file, write_csv_file, CourseRecord, CreditRule, InputFormat, ParseStats, ParserConfig,
    StandardCreditTable, Summary, Transcript,
};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Parse a grade sheet and print the course table
  gradesheet gradesheet.pdf

  # Plain text already extracted by another tool
  gradesheet --format text sheet.dat

  # What if CSE220 were retaken for an A and MAT092 dropped?
  gradesheet sheet.pdf --set-grade CSE220=4.0 --drop MAT092

  # Plan a future course and export the result
  gradesheet sheet.pdf --add CSE470:3:3.7 --export analysis.csv

  # Structured output
  gradesheet --json sheet.csv > courses.json

INPUT FORMATS:
  text       one printed row per line
  pdf        text extracted page by page
  fragments  JSON: [[{"text": "CSE110", "x": 50, "y": 700}, ...], ...]
  csv        rows with a "Course Code / Credits / Grade Points" header
  excel      first sheet of an .xlsx/.xls/.ods workbook, same layout as csv
  rows       JSON: [["CSE110", 3, 4.0], ...]

ENVIRONMENT VARIABLES:
  Every flag can also be set through GRADESHEET_<FLAG>, e.g.
  GRADESHEET_FORMAT=csv or GRADESHEET_PREP_COURSE=MAT091,MAT092.
  RUST_LOG overrides the log filter.
"#;

/// Parse grade sheets into course records and compute CGPA.
#[derive(Parser, Debug)]
#[command(
    name = "gradesheet",
    version,
    about = "Parse grade sheets into course records and compute CGPA",
    long_about = "Extract course code, credits and grade points from a grade sheet (PDF, text, \
positioned fragments or spreadsheet rows), reconcile RP/RT retakes, and report CGPA. \
What-if edits show how retaking or dropping a course would move the result.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Grade-sheet file.
    input: PathBuf,

    /// Input format; `auto` infers it from the file extension.
    #[arg(long, env = "GRADESHEET_FORMAT", value_enum, default_value = "auto")]
    format: FormatArg,

    /// Output structured JSON instead of a table.
    #[arg(long, env = "GRADESHEET_JSON")]
    json: bool,

    /// Write the course table and summary to this CSV file.
    #[arg(long, env = "GRADESHEET_EXPORT")]
    export: Option<PathBuf>,

    /// Change grade points: CODE=GP (repeatable).
    #[arg(long = "set-grade", env = "GRADESHEET_SET_GRADE", value_delimiter = ',')]
    set_grade: Vec<String>,

    /// Remove a course by code (repeatable).
    #[arg(long, env = "GRADESHEET_DROP", value_delimiter = ',')]
    drop: Vec<String>,

    /// Add a course: CODE:CREDITS:GP (repeatable).
    #[arg(long, env = "GRADESHEET_ADD", value_delimiter = ',')]
    add: Vec<String>,

    /// Extra boilerplate substring; matching lines are ignored (repeatable).
    #[arg(long = "skip-pattern", env = "GRADESHEET_SKIP_PATTERN", value_delimiter = ',')]
    skip_pattern: Vec<String>,

    /// Extra preparatory course whose 0/0 is genuine (repeatable).
    #[arg(long = "prep-course", env = "GRADESHEET_PREP_COURSE", value_delimiter = ',')]
    prep_course: Vec<String>,

    /// Credits assumed for a failed course matching REGEX: REGEX=CREDITS (repeatable).
    #[arg(long = "credit-rule", env = "GRADESHEET_CREDIT_RULE", value_delimiter = ';')]
    credit_rule: Vec<String>,

    /// Vertical tolerance for grouping positioned fragments into lines.
    #[arg(long, env = "GRADESHEET_LINE_TOLERANCE", default_value_t = 5.0)]
    line_tolerance: f64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "GRADESHEET_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "GRADESHEET_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FormatArg {
    Auto,
    Text,
    Pdf,
    Fragments,
    Csv,
    Excel,
    Rows,
}

impl From<FormatArg> for InputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Auto => InputFormat::Auto,
            FormatArg::Text => InputFormat::Text,
            FormatArg::Pdf => InputFormat::Pdf,
            FormatArg::Fragments => InputFormat::Fragments,
            FormatArg::Csv => InputFormat::Csv,
            FormatArg::Excel => InputFormat::Excel,
            FormatArg::Rows => InputFormat::Rows,
        }
    }
}

/// JSON report: records with their derived quality points, plus aggregates.
#[derive(Serialize)]
struct Report<'a> {
    courses: Vec<ReportCourse<'a>>,
    summary: Summary,
    modified: bool,
    stats: &'a ParseStats,
}

#[derive(Serialize)]
struct ReportCourse<'a> {
    #[serde(flatten)]
    record: &'a CourseRecord,
    quality_points: f64,
    origin: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || cli.json {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Parse ────────────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let output = parse_file(&cli.input, cli.format.clone().into(), &config)
        .await
        .with_context(|| format!("Failed to parse {}", cli.input.display()))?;
    let stats = output.stats.clone();
    let mut transcript = Transcript::from_output(output);

    // ── What-if edits ────────────────────────────────────────────────────
    apply_edits(&cli, &mut transcript)?;

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let report = Report {
            courses: transcript
                .courses()
                .iter()
                .map(|c| ReportCourse {
                    record: c,
                    quality_points: c.quality_points(),
                    origin: c.origin().to_string(),
                })
                .collect(),
            summary: transcript.summary(),
            modified: transcript.is_modified(),
            stats: &stats,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        print_table(&transcript);
        print_summary(&transcript, &stats);
    }

    if let Some(ref path) = cli.export {
        write_csv_file(&transcript, path)
            .await
            .context("Export failed")?;
        if !cli.quiet {
            eprintln!("{}  exported  →  {}", green("✔"), bold(&path.display().to_string()));
        }
    }

    Ok(())
}

/// Map CLI args to `ParserConfig`.
fn build_config(cli: &Cli) -> Result<ParserConfig> {
    let mut builder = ParserConfig::builder().line_tolerance(cli.line_tolerance);

    for pattern in &cli.skip_pattern {
        builder = builder.skip_pattern(pattern.clone());
    }
    for code in &cli.prep_course {
        builder = builder.prep_course(code.clone());
    }

    if !cli.credit_rule.is_empty() {
        let mut table = StandardCreditTable::default();
        // `with_rule` prepends, so walk backwards to keep the order given.
        for spec in cli.credit_rule.iter().rev() {
            table = table.with_rule(parse_credit_rule(spec)?);
        }
        builder = builder.credit_policy(Arc::new(table));
    }

    builder.build().context("Invalid configuration")
}

/// Apply `--drop`, then `--set-grade`, then `--add`.
fn apply_edits(cli: &Cli, transcript: &mut Transcript) -> Result<()> {
    for code in &cli.drop {
        let code = code.trim().to_uppercase();
        let index = transcript
            .position(&code)
            .with_context(|| format!("--drop {code}: course not in transcript"))?;
        transcript.delete_course(index)?;
    }

    for spec in &cli.set_grade {
        let (code, gp) = parse_set_grade(spec)?;
        let index = transcript
            .position(&code)
            .with_context(|| format!("--set-grade {code}: course not in transcript"))?;
        transcript
            .update_grade_points(index, gp)
            .with_context(|| format!("--set-grade {spec}"))?;
    }

    for spec in &cli.add {
        let (code, credits, gp) = parse_add(spec)?;
        transcript
            .add_manual_course(&code, credits, gp)
            .with_context(|| format!("--add {spec}"))?;
    }

    Ok(())
}

/// Parse `CODE=GP`.
fn parse_set_grade(s: &str) -> Result<(String, f64)> {
    let (code, gp) = s
        .split_once('=')
        .with_context(|| format!("Invalid --set-grade '{s}': expected CODE=GP"))?;
    let gp: f64 = gp
        .trim()
        .parse()
        .with_context(|| format!("Invalid grade points in '{s}'"))?;
    Ok((code.trim().to_uppercase(), gp))
}

/// Parse `CODE:CREDITS:GP`.
fn parse_add(s: &str) -> Result<(String, f64, f64)> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    let [code, credits, gp] = parts.as_slice() else {
        anyhow::bail!("Invalid --add '{}': expected CODE:CREDITS:GP", s);
    };
    let credits: f64 = credits
        .parse()
        .with_context(|| format!("Invalid credits in '{s}'"))?;
    let gp: f64 = gp
        .parse()
        .with_context(|| format!("Invalid grade points in '{s}'"))?;
    Ok((code.to_string(), credits, gp))
}

/// Parse `REGEX=CREDITS`; the last `=` separates, so the pattern may contain one.
fn parse_credit_rule(s: &str) -> Result<CreditRule> {
    let (pattern, credits) = s
        .rsplit_once('=')
        .with_context(|| format!("Invalid --credit-rule '{s}': expected REGEX=CREDITS"))?;
    let credits: f64 = credits
        .trim()
        .parse()
        .with_context(|| format!("Invalid credits in '{s}'"))?;
    Ok(CreditRule::new(pattern.trim(), credits)?)
}

fn print_table(transcript: &Transcript) {
    println!(
        "{}",
        bold(&format!(
            "{:<10} {:>8} {:>8} {:>8}  {}",
            "Course", "Credits", "GP", "QP", "Type"
        ))
    );
    for c in transcript.courses() {
        let line = format!(
            "{:<10} {:>8.2} {:>8.2} {:>8.2}  {}",
            c.course_code,
            c.credits,
            c.grade_points,
            c.quality_points(),
            c.origin()
        );
        if c.is_failed {
            println!("{}", dim(&line));
        } else {
            println!("{line}");
        }
    }
}

fn print_summary(transcript: &Transcript, stats: &ParseStats) {
    let s = transcript.summary();
    println!();
    println!(
        "{} {} courses ({} with credit)  {:.2} credits  {:.2} earned",
        cyan("◆"),
        s.total_courses,
        s.credit_courses,
        s.total_credits,
        s.earned_credits
    );
    println!(
        "  CGPA        {:.4}  →  {}",
        s.current_cgpa,
        bold(&format!("{:.2}", s.current_actual_cgpa))
    );
    if transcript.is_modified() || s.total_courses != transcript.original_courses().len() {
        println!(
            "  Dream CGPA  {:.4}  →  {}",
            s.dream_cgpa,
            bold(&green(&format!("{:.2}", s.dream_actual_cgpa)))
        );
    }
    eprintln!(
        "{}",
        dim(&format!(
            "{} lines, {} skipped, {} candidates via {:?} in {}ms",
            stats.lines_total, stats.lines_skipped, stats.candidates, stats.strategy, stats.duration_ms
        ))
    );
}
