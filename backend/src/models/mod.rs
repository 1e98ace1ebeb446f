//! Domain models for the roster pipeline.
//!
//! - [`SourceTag`] - Semester and school derived from an input file path
//! - [`RosterRecord`] - One student row after normalization
//! - [`ScoredRecord`] - A merged record with its region and school score

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::tables::CanonicalField;

// =============================================================================
// Source Tag
// =============================================================================

/// Semester used when the path carries no semester token.
pub const UNSPECIFIED_SEMESTER: &str = "미지정";

/// School used when the file name has no `_<school>` segment.
pub const UNKNOWN_SCHOOL: &str = "미확인학교";

static SEMESTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(20\d{2})[-_.]?\s*(\d)학기").expect("valid semester pattern"));

/// Semester and school every record of one file is tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTag {
    pub semester: String,
    pub school: String,
}

impl SourceTag {
    pub fn from_path(path: &Path) -> Self {
        Self {
            semester: extract_semester(path),
            school: extract_school(path),
        }
    }
}

/// `"<year>-<term>학기"` from anywhere in the full path, else [`UNSPECIFIED_SEMESTER`].
pub fn extract_semester(path: &Path) -> String {
    let text = path.to_string_lossy();
    SEMESTER_RE
        .captures(&text)
        .map(|c| format!("{}-{}학기", &c[1], &c[2]))
        .unwrap_or_else(|| UNSPECIFIED_SEMESTER.to_string())
}

/// Second `_`-separated segment of the file stem, else [`UNKNOWN_SCHOOL`].
pub fn extract_school(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy())
        .and_then(|stem| stem.split('_').nth(1).map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_SCHOOL.to_string())
}

// =============================================================================
// Roster Record
// =============================================================================

/// One student row.
///
/// Semester and school are fixed at construction; the canonical fields hold
/// the source text (normalized only for nationality and gender).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRecord {
    semester: String,
    school: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub korean_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latin_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl RosterRecord {
    pub fn new(tag: &SourceTag) -> Self {
        Self {
            semester: tag.semester.clone(),
            school: tag.school.clone(),
            nationality: None,
            gender: None,
            korean_name: None,
            latin_name: None,
            phone: None,
        }
    }

    pub fn semester(&self) -> &str {
        &self.semester
    }

    pub fn school(&self) -> &str {
        &self.school
    }

    pub fn field(&self, field: CanonicalField) -> Option<&str> {
        match field {
            CanonicalField::Nationality => self.nationality.as_deref(),
            CanonicalField::Gender => self.gender.as_deref(),
            CanonicalField::KoreanName => self.korean_name.as_deref(),
            CanonicalField::LatinName => self.latin_name.as_deref(),
            CanonicalField::Phone => self.phone.as_deref(),
        }
    }

    pub fn set_field(&mut self, field: CanonicalField, value: Option<String>) {
        let slot = match field {
            CanonicalField::Nationality => &mut self.nationality,
            CanonicalField::Gender => &mut self.gender,
            CanonicalField::KoreanName => &mut self.korean_name,
            CanonicalField::LatinName => &mut self.latin_name,
            CanonicalField::Phone => &mut self.phone,
        };
        *slot = value;
    }

    /// Builder-style setter, mostly for tests and fixtures.
    pub fn with(mut self, field: CanonicalField, value: impl Into<String>) -> Self {
        self.set_field(field, Some(value.into()));
        self
    }

    /// Participant identity used for head counts: Korean name, else Latin name.
    pub fn participant_name(&self) -> Option<&str> {
        crate::text::non_blank(self.korean_name.as_deref())
            .or_else(|| crate::text::non_blank(self.latin_name.as_deref()))
    }
}

// =============================================================================
// Scored Record
// =============================================================================

/// A merged record ready for the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: RosterRecord,
    /// Region of the nationality; `None` when nationality is absent
    pub region: Option<String>,
    /// School diversity score; `None` when it could not be computed
    pub diversity: Option<f64>,
}
