//! Consolidated report output.
//!
//! One workbook, overwritten on every run:
//!
//! | Sheet         | Rows                                    |
//! |---------------|-----------------------------------------|
//! | `종합`        | every merged record                     |
//! | `학교별 지표` | record count, nationalities, score      |
//! | `학기별 현황` | schools and unique participants        |
//! | `권역별 분포` | record count and share per region       |
//! | `학기×학교`   | participation grid (O / X)              |
//!
//! Every cell is centred and every column is as wide as its longest text
//! plus [`COLUMN_PADDING`].

pub mod summary;

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use serde::Serialize;

use crate::error::ReportResult;
use crate::models::ScoredRecord;
use crate::score::SchoolScore;
use crate::tables::CanonicalField;

pub use summary::{participation_table, records_table, region_table, school_table, semester_table};

/// File name of the consolidated workbook.
pub const REPORT_FILE_NAME: &str = "로컬트립가이드 종합보고서.xlsx";

/// Characters added to the longest cell of each column.
pub const COLUMN_PADDING: usize = 10;

/// Report location next to the first input file.
pub fn default_report_path(first_input: &Path) -> Option<PathBuf> {
    let dir = match first_input.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => return None,
    };
    Some(dir.join(REPORT_FILE_NAME))
}

// =============================================================================
// Tables
// =============================================================================

/// One output cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportCell {
    Text(String),
    Number(f64),
    Blank,
}

impl ReportCell {
    /// Length of the displayed text, in characters.
    pub fn display_len(&self) -> usize {
        match self {
            ReportCell::Text(s) => s.chars().count(),
            ReportCell::Number(n) => n.to_string().chars().count(),
            ReportCell::Blank => 0,
        }
    }
}

/// A sheet to write: header row plus data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<ReportCell>>,
}

impl ReportTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<ReportCell>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Width of each column: longest text (header included) + padding.
    pub fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let longest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(ReportCell::display_len)
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0);
                longest + COLUMN_PADDING
            })
            .collect()
    }
}

/// Every sheet of the report, main sheet first.
///
/// `fields` are the canonical columns of the main sheet.
pub fn build_tables(
    records: &[ScoredRecord],
    fields: &[CanonicalField],
    scores: &[SchoolScore],
) -> Vec<ReportTable> {
    vec![
        records_table(records, fields),
        school_table(scores),
        semester_table(records),
        region_table(records),
        participation_table(records),
    ]
}

// =============================================================================
// Writer
// =============================================================================

/// Write `tables` as one workbook at `path`, replacing any existing file.
pub fn write_report(path: &Path, tables: &[ReportTable]) -> ReportResult<()> {
    let mut workbook = Workbook::new();
    let centred = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    for table in tables {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&table.name)?;

        for (col, header) in table.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &centred)?;
        }

        for (i, row) in table.rows.iter().enumerate() {
            let row_num = (i + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    ReportCell::Text(s) => {
                        worksheet.write_string_with_format(row_num, col, s, &centred)?;
                    }
                    ReportCell::Number(n) => {
                        worksheet.write_number_with_format(row_num, col, *n, &centred)?;
                    }
                    ReportCell::Blank => {
                        worksheet.write_blank(row_num, col, &centred)?;
                    }
                }
            }
        }

        for (col, width) in table.column_widths().into_iter().enumerate() {
            worksheet.set_column_width(col as u16, width as f64)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> ReportResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
