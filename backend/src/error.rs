//! Error types for the roster consolidation pipeline.
//!
//! One enum per layer:
//!
//! - [`TableError`] - Reference table loading and validation
//! - [`SheetError`] - Reading a single worksheet
//! - [`WorkbookError`] - Opening and decoding an input file
//! - [`ReportError`] - Writing the consolidated workbook
//! - [`RunError`] - Top-level orchestration errors
//!
//! `From` implementations let `?` cross layer boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Reference Table Errors
// =============================================================================

/// Errors while loading the alias/region tables.
#[derive(Debug, Error)]
pub enum TableError {
    /// Failed to read the tables file.
    #[error("Failed to read tables file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON or does not deserialize.
    #[error("Tables JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document does not match the embedded schema.
    #[error("Tables do not match schema: {}", .0.join("; "))]
    Schema(Vec<String>),

    /// Schema-valid but semantically unusable tables.
    #[error("Invalid tables: {0}")]
    Invalid(String),
}

// =============================================================================
// Sheet Errors
// =============================================================================

/// Errors while reading one worksheet. Never fatal to the file.
#[derive(Debug, Error)]
pub enum SheetError {
    /// The sheet range could not be read.
    #[error("Failed to read sheet '{sheet}': {message}")]
    Read { sheet: String, message: String },
}

impl SheetError {
    /// Name of the sheet the error belongs to.
    pub fn sheet(&self) -> &str {
        match self {
            SheetError::Read { sheet, .. } => sheet,
        }
    }
}

// =============================================================================
// Workbook Errors
// =============================================================================

/// Errors while opening an input file. The file is skipped, the run continues.
#[derive(Debug, Error)]
pub enum WorkbookError {
    /// Failed to read file bytes.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The spreadsheet container could not be opened or parsed.
    #[error("Failed to open workbook: {0}")]
    Open(String),

    /// Extension is neither a spreadsheet nor CSV.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Text decoding failed.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// CSV structure error.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Report Errors
// =============================================================================

/// Errors while writing the consolidated report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Spreadsheet writer failure (includes file system errors on save).
    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Failed to write the JSON run summary.
    #[error("Failed to write summary: {0}")]
    Io(#[from] std::io::Error),

    /// Summary serialization failure.
    #[error("Failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Run Errors (top-level)
// =============================================================================

/// Top-level errors returned by [`crate::pipeline::run`].
///
/// Per-file and per-sheet failures are not here: they are logged and
/// recorded in the run summary instead.
#[derive(Debug, Error)]
pub enum RunError {
    /// Reference table error.
    #[error("Tables error: {0}")]
    Tables(#[from] TableError),

    /// Report output error.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// No input files were given.
    #[error("No input files selected")]
    NoInput,

    /// Output location could not be derived from the inputs.
    #[error("Cannot determine output directory for {0}")]
    NoOutputDir(PathBuf),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Result type for sheet reads.
pub type SheetResult<T> = Result<T, SheetError>;

/// Result type for workbook operations.
pub type WorkbookResult<T> = Result<T, WorkbookError>;

/// Result type for report output.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for a whole run.
pub type RunResult<T> = Result<T, RunError>;
