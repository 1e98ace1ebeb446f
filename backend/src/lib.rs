//! # Local Trip Guide - roster consolidation and diversity report
//!
//! Schools send participant rosters as spreadsheets in their own layouts.
//! This crate finds the header in each sheet, maps it onto a fixed set of
//! canonical columns, tags rows with the semester and school from the file
//! name, removes duplicates and writes one report with a per-school
//! diversity score.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ xlsx / csv  │────▶│   Loader    │────▶│    Merge    │────▶│   Report    │
//! │  (per file) │     │ (per sheet) │     │ (dedup/tier)│     │ (+ scores)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use localtrip::{run, ReferenceTables, RunOptions};
//!
//! let files = vec!["2024-1학기_서울고.xlsx".into()];
//! let summary = run(&files, &ReferenceTables::default(), &RunOptions::default())?;
//! println!("{} records", summary.merge.output);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`logs`] - Console log with retained history
//! - [`tables`] - Column, nationality and region reference tables
//! - [`validation`] - JSON schema validation of table files
//! - [`parser`] - Raw sheet reading (calamine, CSV)
//! - [`models`] - Source tags and roster records
//! - [`sheet`] - Header location, column mapping, row selection
//! - [`loader`] - Per-file loading
//! - [`merge`] - Concatenation and tiered deduplication
//! - [`score`] - Per-school Shannon diversity
//! - [`report`] - Workbook output
//! - [`pipeline`] - End-to-end run

// Core modules
pub mod error;
pub mod logs;
pub mod models;
pub mod text;

// Configuration
pub mod tables;
pub mod validation;

// Input
pub mod loader;
pub mod parser;
pub mod sheet;

// Processing
pub mod merge;
pub mod score;

// Output
pub mod pipeline;
pub mod report;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ReportError, ReportResult, RunError, RunResult, SheetError, TableError, TableResult, WorkbookError,
    WorkbookResult,
};

// =============================================================================
// Re-exports - Models and tables
// =============================================================================

pub use models::{RosterRecord, ScoredRecord, SourceTag};
pub use tables::{CanonicalField, ReferenceTables};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use loader::{load_file, FileLoad, FileReport};
pub use parser::{read_workbook, RawSheet};
pub use sheet::{load_sheet, BlankRowPolicy, LoaderOptions, SheetReport};

// =============================================================================
// Re-exports - Merge, score, report
// =============================================================================

pub use merge::{merge_records, DedupPolicy, DedupTier, Merged};
pub use pipeline::{consolidate, run, RunOptions, RunSummary};
pub use report::{write_report, REPORT_FILE_NAME};
pub use score::{school_scores, SchoolScore};
