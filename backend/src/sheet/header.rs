//! Header row location.
//!
//! Exports from different schools put title lines, dates or notes above the
//! real header. The header is the first row, within a scan window, where
//! enough canonical fields have one of their aliases among the cells.

use std::collections::HashSet;

use crate::parser::RawRow;
use crate::tables::ColumnAlias;
use crate::text::normalize_key;

/// Number of canonical fields with at least one alias present in `row`.
pub fn count_matches(row: &RawRow, columns: &[ColumnAlias]) -> usize {
    let cells: HashSet<String> = row
        .iter()
        .flatten()
        .map(|c| normalize_key(c))
        .filter(|c| !c.is_empty())
        .collect();

    columns
        .iter()
        .filter(|entry| entry.aliases.iter().any(|a| cells.contains(&normalize_key(a))))
        .count()
}

/// Index of the first row among the first `scan_rows` with at least
/// `min_matches` recognized fields.
pub fn find_header_row(
    rows: &[RawRow],
    columns: &[ColumnAlias],
    scan_rows: usize,
    min_matches: usize,
) -> Option<usize> {
    rows.iter()
        .take(scan_rows)
        .position(|row| count_matches(row, columns) >= min_matches)
}
