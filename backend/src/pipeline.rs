//! High-level API: roster files in, consolidated report out.
//!
//! ```text
//! files ──▶ loader (per file, per sheet) ──▶ merge (dedup tiers)
//!                                              │
//!        report ◀── score (per school) ◀───────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use localtrip::pipeline::{run, RunOptions};
//! use localtrip::tables::ReferenceTables;
//!
//! let summary = run(&paths, &ReferenceTables::default(), &RunOptions::default())?;
//! println!("{} records written", summary.merge.output);
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{RunError, RunResult};
use crate::loader::{load_file, FileReport};
use crate::logs::{log_error, log_info, log_success, log_warning, LogEntry, LOG_SINK};
use crate::merge::{merge_records, DedupPolicy, MergeStats};
use crate::models::ScoredRecord;
use crate::report::{build_tables, default_report_path, write_report};
use crate::score::{school_scores, score_records, SchoolScore};
use crate::sheet::{LoaderOptions, SheetStatus};
use crate::tables::{CanonicalField, ReferenceTables};

/// Options for a consolidation run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub loader: LoaderOptions,
    pub policy: DedupPolicy,
    /// Report path; next to the first input when `None`
    pub output: Option<PathBuf>,
}

/// Everything computed from the inputs, before writing.
#[derive(Debug, Clone)]
pub struct Consolidated {
    pub files: Vec<FileReport>,
    /// Canonical columns mapped in at least one loaded sheet, in table order
    pub columns: Vec<CanonicalField>,
    pub merge: MergeStats,
    pub schools: Vec<SchoolScore>,
    pub records: Vec<ScoredRecord>,
}

/// Load, merge and score the given files.
pub fn consolidate(
    paths: &[PathBuf],
    tables: &ReferenceTables,
    options: &LoaderOptions,
    policy: &DedupPolicy,
) -> Consolidated {
    log_info(format!("📖 Reading {} file(s)...", paths.len()));

    let mut files = Vec::with_capacity(paths.len());
    let mut sets = Vec::with_capacity(paths.len());
    for path in paths {
        let load = load_file(path, tables, options);
        files.push(load.report);
        sets.push(load.records);
    }

    log_info("🔄 Merging and removing duplicates...");
    let merged = merge_records(sets, policy);
    for tier in &merged.stats.tiers {
        log_info(format!("[{}] {} duplicate(s) removed", tier.name, tier.removed));
    }

    let schools = school_scores(&merged.records);
    let records = score_records(merged.records, &schools, tables);
    let columns = mapped_columns(&files);

    Consolidated {
        files,
        columns,
        merge: merged.stats,
        schools,
        records,
    }
}

/// Union of the columns of every sheet that contributed records.
pub fn mapped_columns(files: &[FileReport]) -> Vec<CanonicalField> {
    let mut columns: Vec<CanonicalField> = files
        .iter()
        .flat_map(|f| &f.sheets)
        .filter(|s| matches!(s.status, SheetStatus::Loaded { .. }))
        .flat_map(|s| s.columns.iter().copied())
        .collect();
    columns.sort();
    columns.dedup();
    columns
}

/// JSON summary of one run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub files: Vec<FileReport>,
    pub merge: MergeStats,
    pub schools: Vec<SchoolScore>,
    /// Written report; `None` when there was nothing to merge
    pub output: Option<PathBuf>,
    pub logs: Vec<LogEntry>,
}

/// Run the whole pipeline and write the report.
///
/// An empty merge result is not an error: a warning is logged and no file is
/// written. The summary carries only the log entries of this run.
pub fn run(paths: &[PathBuf], tables: &ReferenceTables, options: &RunOptions) -> RunResult<RunSummary> {
    LOG_SINK.drain();
    let first = paths.first().ok_or(RunError::NoInput)?;
    let output = resolve_output(first, options.output.as_deref())?;

    let consolidated = consolidate(paths, tables, &options.loader, &options.policy);

    let written = if consolidated.records.is_empty() {
        log_warning("병합할 데이터가 없습니다 (nothing to merge)");
        None
    } else {
        log_info(format!("💾 Writing {}", output.display()));
        let report = build_tables(&consolidated.records, &consolidated.columns, &consolidated.schools);
        if let Err(e) = write_report(&output, &report) {
            log_error(format!("저장 실패: {}", e));
            return Err(e.into());
        }
        log_success(format!(
            "{} records ({} before dedup), {} school(s)",
            consolidated.merge.output,
            consolidated.merge.input,
            consolidated.schools.len()
        ));
        Some(output)
    };

    Ok(RunSummary {
        generated_at: Utc::now(),
        files: consolidated.files,
        merge: consolidated.merge,
        schools: consolidated.schools,
        output: written,
        logs: LOG_SINK.drain(),
    })
}

fn resolve_output(first: &Path, output: Option<&Path>) -> RunResult<PathBuf> {
    match output {
        Some(path) => Ok(path.to_path_buf()),
        None => default_report_path(first).ok_or_else(|| RunError::NoOutputDir(first.to_path_buf())),
    }
}
