//! Pipeline stages for grade-sheet parsing.
//!
//! Each submodule implements one step. Only [`input`] touches the file
//! system; everything downstream is pure and synchronous.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ normalize ──▶ classify ──▶ extract ──▶ reconcile
//! (file)    (lines)       (skip)       (records)   (dedupe)
//!                  └────────── tabular ───────────┘
//!                             (row matrices)
//! ```
//!
//! 1. [`input`]: read a file into a raw document; PDF and workbook decoding
//!    run in `spawn_blocking`
//! 2. [`normalize`]: turn plain text or positioned fragments into lines
//! 3. [`classify`]: drop header, footer and summary lines
//! 4. [`extract`]: line pass, then the word-window fallback
//! 5. [`tabular`]: header/guess column discovery for row matrices
//! 6. [`reconcile`]: one record per course code, retakes first
//!
//! [`markers`] and [`credits`] are shared by the extractors.

pub mod classify;
pub mod credits;
pub mod extract;
pub mod input;
pub mod markers;
pub mod normalize;
pub mod reconcile;
pub mod tabular;
