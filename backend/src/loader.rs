//! File loading: every sheet of one input file.
//!
//! A file that cannot be opened is skipped with an error message; a sheet
//! that cannot be read or has no recognizable header is skipped on its own.
//! Neither stops the run.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::logs::{log_error, log_info, log_info_indent, log_success, log_warning_indent};
use crate::models::{RosterRecord, SourceTag};
use crate::parser::read_workbook;
use crate::sheet::{load_sheet, LoaderOptions, SheetReport, SheetStatus, SkipReason};
use crate::tables::ReferenceTables;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FileStatus {
    Loaded { records: usize },
    Failed { message: String },
}

/// What happened to one input file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub tag: SourceTag,
    #[serde(flatten)]
    pub status: FileStatus,
    pub sheets: Vec<SheetReport>,
}

impl FileReport {
    pub fn record_count(&self) -> usize {
        match self.status {
            FileStatus::Loaded { records } => records,
            FileStatus::Failed { .. } => 0,
        }
    }
}

/// Records of one file, in sheet order.
#[derive(Debug, Clone)]
pub struct FileLoad {
    pub report: FileReport,
    pub records: Vec<RosterRecord>,
}

/// Load every sheet of `path` and concatenate the survivors.
pub fn load_file(path: &Path, tables: &ReferenceTables, options: &LoaderOptions) -> FileLoad {
    let tag = SourceTag::from_path(path);
    log_info(format!("📄 {} ({} / {})", path.display(), tag.semester, tag.school));

    let workbook = match read_workbook(path) {
        Ok(workbook) => workbook,
        Err(e) => {
            log_error(format!("[오류] {}: {}", path.display(), e));
            return FileLoad {
                report: FileReport {
                    path: path.to_path_buf(),
                    tag,
                    status: FileStatus::Failed { message: e.to_string() },
                    sheets: Vec::new(),
                },
                records: Vec::new(),
            };
        }
    };

    let mut sheets = Vec::with_capacity(workbook.sheets.len());
    let mut records = Vec::new();

    for sheet in workbook.sheets {
        match sheet {
            Ok(raw) => {
                let load = load_sheet(&raw, &tag, tables, options);
                log_sheet(&load.report);
                records.extend(load.records);
                sheets.push(load.report);
            }
            Err(e) => {
                log_warning_indent(e.to_string(), 1);
                sheets.push(SheetReport::failed(e.sheet(), e.to_string()));
            }
        }
    }

    log_success(format!("{} records from {} sheet(s)", records.len(), sheets.len()));

    FileLoad {
        report: FileReport {
            path: path.to_path_buf(),
            tag,
            status: FileStatus::Loaded { records: records.len() },
            sheets,
        },
        records,
    }
}

fn log_sheet(report: &SheetReport) {
    match &report.status {
        SheetStatus::Loaded { records } => {
            let columns: Vec<&str> = report.columns.iter().map(|c| c.label()).collect();
            log_info_indent(
                format!(
                    "[{}] header row {}, columns [{}], {} records ({} excluded)",
                    report.name,
                    report.header_row.map_or(0, |r| r + 1),
                    columns.join(", "),
                    records,
                    report.excluded_rows
                ),
                1,
            );
        }
        SheetStatus::Skipped { reason: SkipReason::NoHeader } => {
            log_info_indent(format!("[{}] no header row, skipped", report.name), 1);
        }
        SheetStatus::Skipped { reason: SkipReason::Empty } => {
            log_info_indent(format!("[{}] no data rows, skipped", report.name), 1);
        }
        SheetStatus::Failed { message } => {
            log_warning_indent(format!("[{}] {}", report.name, message), 1);
        }
    }
}
