//! Column mapping: header cells to canonical fields.

use serde::Serialize;

use crate::parser::RawRow;
use crate::tables::{CanonicalField, ColumnAlias};
use crate::text::normalize_key;

/// Resolved canonical fields and the source column each one reads from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnMap {
    bindings: Vec<(CanonicalField, usize)>,
}

impl ColumnMap {
    /// Source column for a field.
    pub fn get(&self, field: CanonicalField) -> Option<usize> {
        self.bindings
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, col)| *col)
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.get(field).is_some()
    }

    /// Bound fields in table order.
    pub fn fields(&self) -> Vec<CanonicalField> {
        self.bindings.iter().map(|(f, _)| *f).collect()
    }

    pub fn bindings(&self) -> &[(CanonicalField, usize)] {
        &self.bindings
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Bind each canonical field to a header column.
///
/// Aliases are tried in priority order; for the first alias present, the
/// left-most matching column wins. Unmatched fields are simply absent.
pub fn map_columns(header: &RawRow, columns: &[ColumnAlias]) -> ColumnMap {
    let normalized: Vec<Option<String>> = header
        .iter()
        .map(|cell| cell.as_deref().map(normalize_key))
        .collect();

    let bindings = columns
        .iter()
        .filter_map(|entry| {
            entry.aliases.iter().find_map(|alias| {
                let key = normalize_key(alias);
                normalized
                    .iter()
                    .position(|cell| cell.as_deref() == Some(key.as_str()))
                    .map(|col| (entry.field, col))
            })
        })
        .collect();

    ColumnMap { bindings }
}
