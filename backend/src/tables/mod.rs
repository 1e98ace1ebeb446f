//! Reference tables: column aliases, nationality synonyms, region membership.
//!
//! The tables are plain data. They are built once (either the curated
//! defaults or a JSON file checked against `schemas/reference-tables.json`)
//! and handed by reference to the loader, mapper and scorer.
//!
//! ```rust,ignore
//! use localtrip::ReferenceTables;
//!
//! let tables = ReferenceTables::default();
//! assert_eq!(tables.unify_nationality(" 터키 "), "튀르키예");
//! assert_eq!(tables.map_region("몽골"), "동아시아");
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TableError, TableResult};
use crate::validation::validate_reference_tables;

// =============================================================================
// Canonical Fields
// =============================================================================

/// Fixed internal fields that differently-named source columns map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    Nationality,
    Gender,
    KoreanName,
    LatinName,
    Phone,
}

impl CanonicalField {
    /// All fields, in report column order.
    pub const ALL: [CanonicalField; 5] = [
        CanonicalField::Nationality,
        CanonicalField::Gender,
        CanonicalField::KoreanName,
        CanonicalField::LatinName,
        CanonicalField::Phone,
    ];

    /// Column header used in the report.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Nationality => "국적",
            Self::Gender => "성별",
            Self::KoreanName => "성명(한글)",
            Self::LatinName => "성명(영문)",
            Self::Phone => "휴대폰번호",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Table Entries
// =============================================================================

/// Recognized header spellings for one canonical field, highest priority first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnAlias {
    pub field: CanonicalField,
    pub aliases: Vec<String>,
}

/// Surface forms that all mean the same nationality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalityAlias {
    pub canonical: String,
    pub aliases: Vec<String>,
}

/// Nationalities grouped under one reporting region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub members: Vec<String>,
}

/// All lookup tables used during reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTables {
    /// Column aliases, one entry per canonical field
    pub columns: Vec<ColumnAlias>,
    /// Nationality synonyms
    pub nationalities: Vec<NationalityAlias>,
    /// Regions; on overlapping membership the earlier region wins
    pub regions: Vec<Region>,
    /// Region for nationalities listed nowhere
    pub other_region: String,
    /// Domestic/unknown nationality values dropped at load time (trimmed, exact)
    pub excluded_nationalities: Vec<String>,
    /// Upper-case gender codes and their display values
    pub gender_codes: BTreeMap<String, String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ReferenceTables {
    fn default() -> Self {
        let column = |field, aliases: &[&str]| ColumnAlias { field, aliases: strings(aliases) };
        let nationality = |canonical: &str, aliases: &[&str]| NationalityAlias {
            canonical: canonical.to_string(),
            aliases: strings(aliases),
        };
        let region = |name: &str, members: &[&str]| Region {
            name: name.to_string(),
            members: strings(members),
        };

        Self {
            columns: vec![
                column(CanonicalField::Nationality, &["국적", "국가"]),
                column(CanonicalField::Gender, &["성별"]),
                column(CanonicalField::KoreanName, &["성명(한글)", "성명(한국어)", "이름"]),
                column(CanonicalField::LatinName, &["성명(영문)", "성명(영어)", "이름(영문)", "영문이름"]),
                column(CanonicalField::Phone, &["휴대폰번호", "연락처", "전화번호", "핸드폰번호"]),
            ],
            nationalities: vec![
                nationality("호주", &["호주", "오스트레일리아"]),
                nationality("튀르키예", &["튀르키예", "터키"]),
                nationality("우즈베키스탄", &["우즈베키스탄", "우즈벡키스탄", "우주베키스탄", "우즈벡"]),
                nationality("카자흐스탄", &["카자흐스탄", "카자흐"]),
                nationality("대만", &["대만", "타이완"]),
            ],
            regions: vec![
                region("동남아시아", &["베트남", "미얀마", "캄보디아", "인도네시아", "필리핀", "라오스", "말레이시아", "태국"]),
                region("중앙아시아", &["우즈베키스탄", "키르기스스탄", "카자흐스탄", "투르크메니스탄"]),
                region("동아시아", &["몽골", "일본", "중국", "대만"]),
                region("남아시아", &["네팔", "방글라데시", "스리랑카", "인도", "파키스탄"]),
                region("북아메리카", &["미국", "캐나다"]),
                region(
                    "유럽",
                    &[
                        "독일", "프랑스", "스웨덴", "이탈리아", "루마니아", "핀란드", "덴마크", "우크라이나",
                        "네덜란드", "노르웨이", "스위스", "영국", "체코", "러시아",
                    ],
                ),
                region(
                    "아프리카",
                    &[
                        "코트디부아르", "나이지리아", "남아프리카공화국", "차드", "콩고", "가봉", "니제르",
                        "모로코", "브루나이", "짐바브웨", "탄자니아",
                    ],
                ),
                region("중동", &["튀르키예", "아제르바이잔", "이란", "예멘"]),
                region("오세아니아", &["호주"]),
                region("남아메리카", &["브라질", "콜롬비아", "아르헨티나", "페루"]),
            ],
            other_region: "기타".to_string(),
            excluded_nationalities: strings(&["한국", "대한민국", "", "불명", "X"]),
            gender_codes: [("M", "남"), ("F", "여")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl ReferenceTables {
    /// Parse tables from a JSON string, validating against the embedded schema.
    pub fn from_json(json: &str) -> TableResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Build tables from an already-parsed JSON document.
    pub fn from_value(value: &Value) -> TableResult<Self> {
        validate_reference_tables(value).map_err(TableError::Schema)?;
        let tables: Self = serde_json::from_value(value.clone())?;
        tables.check()?;
        Ok(tables)
    }

    /// Load tables from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> TableResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Serialize to pretty JSON (the format [`Self::from_json`] accepts).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Checks the schema cannot express.
    fn check(&self) -> TableResult<()> {
        let mut seen = HashSet::new();
        for entry in &self.columns {
            if !seen.insert(entry.field) {
                return Err(TableError::Invalid(format!(
                    "field '{}' has more than one alias entry",
                    entry.field
                )));
            }
        }
        Ok(())
    }

    /// Aliases for one field, if the field is mapped at all.
    pub fn column_aliases(&self, field: CanonicalField) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|c| c.field == field)
            .map(|c| c.aliases.as_slice())
    }

    /// Canonical spelling of a nationality.
    ///
    /// Matching is trimmed and case-insensitive; unknown values come back
    /// trimmed but otherwise untouched.
    pub fn unify_nationality(&self, value: &str) -> String {
        let trimmed = value.trim();
        let needle = trimmed.to_lowercase();
        self.nationalities
            .iter()
            .find(|n| n.aliases.iter().any(|a| a.to_lowercase() == needle))
            .map(|n| n.canonical.clone())
            .unwrap_or_else(|| trimmed.to_string())
    }

    /// True for domestic/unknown nationality values.
    pub fn is_excluded_nationality(&self, value: &str) -> bool {
        let trimmed = value.trim();
        self.excluded_nationalities.iter().any(|x| x == trimmed)
    }

    /// Region of a nationality. Total: unknown values map to `other_region`.
    pub fn map_region(&self, nationality: &str) -> &str {
        let needle = nationality.trim().to_lowercase();
        self.regions
            .iter()
            .find(|r| r.members.iter().any(|m| m.to_lowercase() == needle))
            .map(|r| r.name.as_str())
            .unwrap_or(&self.other_region)
    }

    /// Display value for a gender cell: trimmed, upper-cased, codes expanded.
    pub fn normalize_gender(&self, value: &str) -> String {
        let upper = value.trim().to_uppercase();
        match self.gender_codes.get(&upper) {
            Some(display) => display.clone(),
            None => upper,
        }
    }
}
