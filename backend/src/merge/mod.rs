//! Merge per-file records and remove duplicates.
//!
//! Deduplication is an ordered list of tiers. Each tier keeps the first
//! record for every key value and drops later ones:
//!
//! ```text
//! all files (selection order)
//!   │
//!   ├─ tier "phone"    scope: phone present   key: semester + phone
//!   │                  (records without phone pass through, appended after)
//!   │
//!   └─ tier "identity" scope: every record    key: semester + latin name
//!                                                  + school + nationality
//! ```
//!
//! Same-named students without a phone number collapse into one record.
//! That is accepted: the identity key is the only signal left.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::RosterRecord;
use crate::tables::CanonicalField;
use crate::text::non_blank;

// =============================================================================
// Policy
// =============================================================================

/// A component of a deduplication key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyField {
    Semester,
    School,
    Field(CanonicalField),
}

impl KeyField {
    /// Trimmed value; blank and missing compare equal.
    fn value<'a>(&self, record: &'a RosterRecord) -> Option<&'a str> {
        match self {
            KeyField::Semester => Some(record.semester()),
            KeyField::School => Some(record.school()),
            KeyField::Field(field) => non_blank(record.field(*field)),
        }
    }
}

/// Which records a tier looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TierScope {
    /// Every record
    All,
    /// Only records where this component is present; others pass through
    /// untouched and are placed after the deduplicated ones
    Present(KeyField),
}

/// One deduplication pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DedupTier {
    pub name: String,
    pub scope: TierScope,
    pub key: Vec<KeyField>,
}

impl DedupTier {
    fn key_of(&self, record: &RosterRecord) -> Vec<Option<String>> {
        self.key
            .iter()
            .map(|k| k.value(record).map(str::to_string))
            .collect()
    }

    fn in_scope(&self, record: &RosterRecord) -> bool {
        match self.scope {
            TierScope::All => true,
            TierScope::Present(field) => field.value(record).is_some(),
        }
    }

    /// Apply this tier, returning the surviving records.
    pub fn apply(&self, records: Vec<RosterRecord>) -> Vec<RosterRecord> {
        let (scoped, passthrough): (Vec<_>, Vec<_>) =
            records.into_iter().partition(|r| self.in_scope(r));

        let mut seen = HashSet::new();
        let mut kept: Vec<RosterRecord> = scoped
            .into_iter()
            .filter(|r| seen.insert(self.key_of(r)))
            .collect();
        kept.extend(passthrough);
        kept
    }
}

/// Ordered deduplication tiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DedupPolicy {
    pub tiers: Vec<DedupTier>,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self {
            tiers: vec![
                DedupTier {
                    name: "phone".to_string(),
                    scope: TierScope::Present(KeyField::Field(CanonicalField::Phone)),
                    key: vec![KeyField::Semester, KeyField::Field(CanonicalField::Phone)],
                },
                DedupTier {
                    name: "identity".to_string(),
                    scope: TierScope::All,
                    key: vec![
                        KeyField::Semester,
                        KeyField::Field(CanonicalField::LatinName),
                        KeyField::School,
                        KeyField::Field(CanonicalField::Nationality),
                    ],
                },
            ],
        }
    }
}

// =============================================================================
// Merge
// =============================================================================

/// Records removed by one tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierStats {
    pub name: String,
    pub removed: usize,
}

/// Counts before and after deduplication.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStats {
    pub input: usize,
    pub tiers: Vec<TierStats>,
    pub output: usize,
}

/// The merged, deduplicated dataset.
#[derive(Debug, Clone, Default)]
pub struct Merged {
    pub records: Vec<RosterRecord>,
    pub stats: MergeStats,
}

impl Merged {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Concatenate record sets in order and deduplicate them.
///
/// An empty input yields an empty result, not an error.
pub fn merge_records<I>(sets: I, policy: &DedupPolicy) -> Merged
where
    I: IntoIterator<Item = Vec<RosterRecord>>,
{
    let mut records: Vec<RosterRecord> = sets.into_iter().flatten().collect();
    let mut stats = MergeStats {
        input: records.len(),
        ..MergeStats::default()
    };

    if records.is_empty() {
        return Merged { records, stats };
    }

    for tier in &policy.tiers {
        let before = records.len();
        records = tier.apply(records);
        stats.tiers.push(TierStats {
            name: tier.name.clone(),
            removed: before - records.len(),
        });
    }

    stats.output = records.len();
    Merged { records, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceTag;

    fn record(semester: &str, school: &str, nationality: &str, name: &str, phone: &str) -> RosterRecord {
        let tag = SourceTag {
            semester: semester.into(),
            school: school.into(),
        };
        let mut r = RosterRecord::new(&tag)
            .with(CanonicalField::Nationality, nationality)
            .with(CanonicalField::LatinName, name);
        if !phone.is_empty() {
            r = r.with(CanonicalField::Phone, phone);
        }
        r
    }

    fn names(merged: &Merged) -> Vec<&str> {
        merged
            .records
            .iter()
            .filter_map(|r| r.latin_name.as_deref())
            .collect()
    }

    #[test]
    fn test_same_phone_first_wins() {
        let merged = merge_records(
            vec![
                vec![record("2024-1학기", "서울고", "몽골", "Bat", "010-1")],
                vec![record("2024-1학기", "부산고", "중국", "Li", "010-1")],
            ],
            &DedupPolicy::default(),
        );
        assert_eq!(names(&merged), vec!["Bat"]);
        assert_eq!(merged.stats.tiers[0].removed, 1);
    }

    #[test]
    fn test_same_phone_different_semester_kept() {
        let merged = merge_records(
            vec![vec![
                record("2024-1학기", "서울고", "몽골", "Bat", "010-1"),
                record("2024-2학기", "서울고", "몽골", "Bat", "010-1"),
            ]],
            &DedupPolicy::default(),
        );
        assert_eq!(merged.records.len(), 2);
    }

    #[test]
    fn test_identity_key_without_phone() {
        let base = || record("2024-1학기", "서울고", "몽골", "Bat", "");
        let merged = merge_records(vec![vec![base(), base()]], &DedupPolicy::default());
        assert_eq!(merged.records.len(), 1);

        // any one of the four fields differing keeps both
        let variants = vec![
            record("2024-2학기", "서울고", "몽골", "Bat", ""),
            record("2024-1학기", "부산고", "몽골", "Bat", ""),
            record("2024-1학기", "서울고", "중국", "Bat", ""),
            record("2024-1학기", "서울고", "몽골", "Dorj", ""),
        ];
        for other in variants {
            let merged = merge_records(vec![vec![base(), other]], &DedupPolicy::default());
            assert_eq!(merged.records.len(), 2);
        }
    }

    #[test]
    fn test_identity_tier_also_applies_to_phone_records() {
        let merged = merge_records(
            vec![vec![
                record("2024-1학기", "서울고", "몽골", "Bat", "010-1"),
                record("2024-1학기", "서울고", "몽골", "Bat", "010-2"),
            ]],
            &DedupPolicy::default(),
        );
        assert_eq!(merged.records.len(), 1);
        assert_eq!(merged.records[0].phone.as_deref(), Some("010-1"));
    }

    #[test]
    fn test_phone_records_ordered_before_phoneless() {
        // the phoneless record comes first in input but the phone record
        // survives the identity tier because it is placed first after tier 1
        let merged = merge_records(
            vec![vec![
                record("2024-1학기", "서울고", "몽골", "Bat", ""),
                record("2024-1학기", "서울고", "몽골", "Bat", "010-9"),
            ]],
            &DedupPolicy::default(),
        );
        assert_eq!(merged.records.len(), 1);
        assert_eq!(merged.records[0].phone.as_deref(), Some("010-9"));
    }

    #[test]
    fn test_blank_phone_counts_as_missing() {
        let mut blank = record("2024-1학기", "서울고", "몽골", "A", "");
        blank.phone = Some("   ".into());
        let other = {
            let mut r = record("2024-1학기", "서울고", "몽골", "B", "");
            r.phone = Some("".into());
            r
        };
        let merged = merge_records(vec![vec![blank, other]], &DedupPolicy::default());
        assert_eq!(merged.records.len(), 2);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let file = vec![
            record("2024-1학기", "서울고", "몽골", "Bat", "010-1"),
            record("2024-1학기", "서울고", "중국", "Li", ""),
            record("2024-1학기", "서울고", "베트남", "Nguyen", "010-2"),
        ];
        let once = merge_records(vec![file.clone()], &DedupPolicy::default());
        let twice = merge_records(vec![file.clone(), file], &DedupPolicy::default());
        assert_eq!(once.records, twice.records);
    }

    #[test]
    fn test_empty_input() {
        let merged = merge_records(Vec::<Vec<RosterRecord>>::new(), &DedupPolicy::default());
        assert!(merged.is_empty());
        assert_eq!(merged.stats.input, 0);
    }

    #[test]
    fn test_custom_policy_extra_tier() {
        let mut policy = DedupPolicy::default();
        policy.tiers.push(DedupTier {
            name: "korean-name".into(),
            scope: TierScope::Present(KeyField::Field(CanonicalField::KoreanName)),
            key: vec![KeyField::Semester, KeyField::Field(CanonicalField::KoreanName)],
        });
        let a = record("2024-1학기", "서울고", "몽골", "Bat", "").with(CanonicalField::KoreanName, "바트");
        let b = record("2024-1학기", "서울고", "몽골", "Bat E.", "").with(CanonicalField::KoreanName, "바트");
        let merged = merge_records(vec![vec![a, b]], &policy);
        assert_eq!(merged.records.len(), 1);
        assert_eq!(merged.stats.tiers.len(), 3);
    }
}
