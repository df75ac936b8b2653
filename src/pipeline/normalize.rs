//! Normalisation: raw extracted text → trimmed lines and flat tokens.
//!
//! Grade sheets reach us in one of two shapes. Plain text (already split into
//! lines by the extraction collaborator) only needs trimming. Positioned
//! fragments carry page coordinates and must be regrouped into visual lines
//! first: fragments whose baselines sit within a small vertical tolerance
//! belong to one row of the printed table.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A run of text placed on a page at `(x, y)`.
///
/// The page origin is bottom-left, so larger `y` is higher on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }
}

/// Text of one page, tagged with its 1-indexed page number.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub page_num: usize,
    pub text: String,
}

/// Split on newlines, trim each line, drop empties.
pub fn lines_from_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Rebuild visual lines from positioned fragments.
///
/// Fragments are visited top-to-bottom. A fragment joins the current band
/// while its `y` lies within `tolerance` of the band's first fragment;
/// otherwise it opens a new band. Each band is then ordered left-to-right and
/// joined with single spaces.
pub fn lines_from_fragments(fragments: &[TextFragment], tolerance: f64) -> Vec<String> {
    let mut sorted: Vec<&TextFragment> = fragments.iter().collect();
    sorted.sort_by(|a, b| b.y.partial_cmp(&a.y).unwrap_or(Ordering::Equal));

    let mut bands: Vec<(f64, Vec<&TextFragment>)> = Vec::new();
    for frag in sorted {
        match bands.last_mut() {
            Some((anchor, members)) if (*anchor - frag.y).abs() <= tolerance => {
                members.push(frag);
            }
            _ => bands.push((frag.y, vec![frag])),
        }
    }

    bands
        .into_iter()
        .map(|(_, mut members)| {
            members.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
            members
                .iter()
                .map(|f| f.text.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect()
}

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs to one space, trim, split on space.
pub fn tokens(text: &str) -> Vec<String> {
    let collapsed = RE_WHITESPACE.replace_all(text, " ");
    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split(' ').map(str::to_string).collect()
}

/// Join page texts in page order, whatever order they arrived in.
pub fn assemble_pages(mut pages: Vec<PageText>) -> String {
    pages.sort_by_key(|p| p.page_num);
    pages
        .into_iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("\n")
}
