//! Sheet loading: raw grid to tagged roster records.
//!
//! ```text
//! RAW ──header──▶ HEADER_LOCATED ──map──▶ COLUMNS_MAPPED ──cut──▶ ROWS_TRUNCATED
//!  │                                                                  │
//!  └─ no header ─▶ SKIPPED ◀── nothing left ── TAGGED ◀── FIELDS_NORMALIZED
//! ```
//!
//! A skipped sheet contributes no records and never fails the file.

pub mod columns;
pub mod header;

use serde::{Deserialize, Serialize};

use crate::models::{RosterRecord, SourceTag};
use crate::parser::{RawRow, RawSheet};
use crate::tables::{CanonicalField, ReferenceTables};
use crate::text::is_blank;

pub use columns::{map_columns, ColumnMap};
pub use header::{count_matches, find_header_row};

// =============================================================================
// Options
// =============================================================================

/// What a fully blank data row means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BlankRowPolicy {
    /// End of data: the blank row and everything after it are dropped
    Truncate,
    /// Drop blank rows individually and keep reading
    Skip,
}

/// Heuristic parameters for reading one sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderOptions {
    /// Rows scanned when looking for the header
    pub scan_rows: usize,
    /// Canonical fields a row must recognize to count as the header
    pub min_matches: usize,
    /// Handling of fully blank data rows
    pub blank_rows: BlankRowPolicy,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            scan_rows: 30,
            min_matches: 2,
            blank_rows: BlankRowPolicy::Truncate,
        }
    }
}

// =============================================================================
// Sheet Report
// =============================================================================

/// Why a sheet contributed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// No row in the scan window looked like a header
    NoHeader,
    /// Header found but no data rows survived truncation and filtering
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SheetStatus {
    Loaded { records: usize },
    Skipped { reason: SkipReason },
    Failed { message: String },
}

/// What happened to one sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetReport {
    pub name: String,
    #[serde(flatten)]
    pub status: SheetStatus,
    pub header_row: Option<usize>,
    pub columns: Vec<CanonicalField>,
    /// Data rows kept after blank-row handling
    pub data_rows: usize,
    /// Rows dropped for a missing or domestic/unknown nationality
    pub excluded_rows: usize,
}

impl SheetReport {
    fn new(name: &str, status: SheetStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
            header_row: None,
            columns: Vec::new(),
            data_rows: 0,
            excluded_rows: 0,
        }
    }

    /// Report for a sheet that could not be read at all.
    pub fn failed(name: &str, message: impl Into<String>) -> Self {
        Self::new(name, SheetStatus::Failed { message: message.into() })
    }

    pub fn record_count(&self) -> usize {
        match self.status {
            SheetStatus::Loaded { records } => records,
            _ => 0,
        }
    }
}

/// Records loaded from one sheet and the report describing how.
#[derive(Debug, Clone)]
pub struct SheetLoad {
    pub report: SheetReport,
    pub records: Vec<RosterRecord>,
}

// =============================================================================
// Loading
// =============================================================================

fn is_blank_row(row: &RawRow, columns: &ColumnMap) -> bool {
    columns
        .bindings()
        .iter()
        .all(|&(_, col)| is_blank(row.get(col).and_then(|c| c.as_deref())))
}

/// Data rows that count, according to the blank-row policy.
///
/// A row is blank when every mapped column is missing or whitespace-only;
/// unmapped columns are ignored.
pub fn select_rows<'a>(rows: &'a [RawRow], columns: &ColumnMap, policy: BlankRowPolicy) -> Vec<&'a RawRow> {
    match policy {
        BlankRowPolicy::Truncate => rows
            .iter()
            .take_while(|row| !is_blank_row(row, columns))
            .collect(),
        BlankRowPolicy::Skip => rows
            .iter()
            .filter(|row| !is_blank_row(row, columns))
            .collect(),
    }
}

/// Load one sheet into tagged, normalized records.
pub fn load_sheet(
    sheet: &RawSheet,
    tag: &SourceTag,
    tables: &ReferenceTables,
    options: &LoaderOptions,
) -> SheetLoad {
    let mut report = SheetReport::new(&sheet.name, SheetStatus::Skipped { reason: SkipReason::NoHeader });

    let Some(header_row) = find_header_row(&sheet.rows, &tables.columns, options.scan_rows, options.min_matches)
    else {
        return SheetLoad { report, records: Vec::new() };
    };
    report.header_row = Some(header_row);

    let columns = map_columns(&sheet.rows[header_row], &tables.columns);
    report.columns = columns.fields();

    let data = select_rows(&sheet.rows[header_row + 1..], &columns, options.blank_rows);
    report.data_rows = data.len();

    let filter_nationality = columns.contains(CanonicalField::Nationality);
    let mut records = Vec::with_capacity(data.len());

    for row in data {
        let mut record = RosterRecord::new(tag);
        for &(field, col) in columns.bindings() {
            record.set_field(field, row.get(col).cloned().flatten());
        }

        if filter_nationality {
            let unified = record
                .nationality
                .as_deref()
                .filter(|n| !tables.is_excluded_nationality(n))
                .map(|n| tables.unify_nationality(n));
            match unified {
                Some(n) => record.nationality = Some(n),
                None => {
                    report.excluded_rows += 1;
                    continue;
                }
            }
        }

        record.gender = record.gender.take().map(|g| tables.normalize_gender(&g));
        records.push(record);
    }

    report.status = if records.is_empty() {
        SheetStatus::Skipped { reason: SkipReason::Empty }
    } else {
        SheetStatus::Loaded { records: records.len() }
    };

    SheetLoad { report, records }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> RawRow {
        cells
            .iter()
            .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
            .collect()
    }

    fn tag() -> SourceTag {
        SourceTag {
            semester: "2024-1학기".into(),
            school: "서울고".into(),
        }
    }

    fn load(rows: Vec<RawRow>, options: &LoaderOptions) -> SheetLoad {
        let sheet = RawSheet::new("Sheet1", rows);
        load_sheet(&sheet, &tag(), &ReferenceTables::default(), options)
    }

    #[test]
    fn test_full_sheet() {
        let result = load(
            vec![
                row(&["유학생 명단"]),
                row(&["번호", "국가", "성별", "성명(영문)", "연락처"]),
                row(&["1", "터키", " f ", "Ayse", "010-1111-2222"]),
                row(&["2", "우즈벡", "M", "Timur", ""]),
            ],
            &LoaderOptions::default(),
        );

        assert_eq!(result.report.header_row, Some(1));
        assert_eq!(result.report.status, SheetStatus::Loaded { records: 2 });
        let first = &result.records[0];
        assert_eq!(first.semester(), "2024-1학기");
        assert_eq!(first.school(), "서울고");
        assert_eq!(first.nationality.as_deref(), Some("튀르키예"));
        assert_eq!(first.gender.as_deref(), Some("여"));
        assert_eq!(first.phone.as_deref(), Some("010-1111-2222"));
        assert_eq!(result.records[1].nationality.as_deref(), Some("우즈베키스탄"));
        assert_eq!(result.records[1].phone, None);
        // unmapped column "번호" is not carried
        assert_eq!(first.korean_name, None);
    }

    #[test]
    fn test_no_header_skips() {
        let result = load(vec![row(&["a", "b"]), row(&["1", "2"])], &LoaderOptions::default());
        assert_eq!(result.report.status, SheetStatus::Skipped { reason: SkipReason::NoHeader });
        assert!(result.records.is_empty());
    }

    #[test]
    fn test_truncates_at_first_blank_row() {
        let mut rows = vec![row(&["국적", "성명(영문)"])];
        for i in 0..10 {
            rows.push(row(&["몽골", &format!("Student {}", i)]));
        }
        rows.push(row(&["", "  "]));
        rows.push(row(&["중국", "After Gap"]));
        rows.push(row(&["합계", "11"]));

        let result = load(rows, &LoaderOptions::default());
        assert_eq!(result.report.data_rows, 10);
        assert_eq!(result.records.len(), 10);
        assert_eq!(result.records[9].latin_name.as_deref(), Some("Student 9"));
    }

    #[test]
    fn test_unmapped_cells_do_not_prevent_truncation() {
        let rows = vec![
            row(&["국적", "성명(영문)", "비고"]),
            row(&["몽골", "A", ""]),
            row(&["", "", "footer note"]),
            row(&["중국", "B", ""]),
        ];
        let result = load(rows, &LoaderOptions::default());
        assert_eq!(result.records.len(), 1);
    }

    #[test]
    fn test_skip_policy_keeps_reading() {
        let rows = vec![
            row(&["국적", "성명(영문)"]),
            row(&["몽골", "A"]),
            row(&["", ""]),
            row(&["중국", "B"]),
        ];
        let options = LoaderOptions {
            blank_rows: BlankRowPolicy::Skip,
            ..LoaderOptions::default()
        };
        let result = load(rows, &options);
        assert_eq!(result.records.len(), 2);
    }

    #[test]
    fn test_domestic_and_unknown_nationalities_dropped() {
        let rows = vec![
            row(&["국적", "성명(영문)"]),
            row(&["한국", "A"]),
            row(&[" 대한민국 ", "B"]),
            row(&["불명", "C"]),
            row(&["X", "D"]),
            row(&["", "E"]),
            row(&["베트남", "F"]),
        ];
        let result = load(rows, &LoaderOptions::default());
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].latin_name.as_deref(), Some("F"));
        assert_eq!(result.report.excluded_rows, 5);
    }

    #[test]
    fn test_all_rows_filtered_is_empty_skip() {
        let rows = vec![row(&["국적", "성별"]), row(&["한국", "M"])];
        let result = load(rows, &LoaderOptions::default());
        assert_eq!(result.report.status, SheetStatus::Skipped { reason: SkipReason::Empty });
    }

    #[test]
    fn test_without_nationality_column_rows_are_kept() {
        let rows = vec![row(&["성별", "성명(영문)"]), row(&["m", "A"])];
        let result = load(rows, &LoaderOptions::default());
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].nationality, None);
        assert_eq!(result.records[0].gender.as_deref(), Some("남"));
    }
}
