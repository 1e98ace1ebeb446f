//! Per-school diversity score: Shannon entropy (base 2) of the nationality
//! distribution, truncated to two decimals.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{RosterRecord, ScoredRecord};
use crate::tables::ReferenceTables;
use crate::text::non_blank;

/// Score and counts for one school.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolScore {
    pub school: String,
    pub records: usize,
    /// Distinct nationalities
    pub nationalities: usize,
    /// `None` when none of the school's records has a nationality
    pub score: Option<f64>,
}

/// Shannon entropy in bits of a frequency distribution.
pub fn shannon_entropy(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let h: f64 = counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum();
    if h > 0.0 {
        h
    } else {
        0.0
    }
}

/// Floor to two decimals: 1.589 -> 1.58.
pub fn truncate_2(x: f64) -> f64 {
    (x * 100.0).floor() / 100.0
}

/// Scores for every school, ordered by school name.
pub fn school_scores(records: &[RosterRecord]) -> Vec<SchoolScore> {
    let mut by_school: BTreeMap<&str, (usize, BTreeMap<&str, usize>)> = BTreeMap::new();

    for record in records {
        let (count, nationalities) = by_school.entry(record.school()).or_default();
        *count += 1;
        if let Some(n) = non_blank(record.nationality.as_deref()) {
            *nationalities.entry(n).or_default() += 1;
        }
    }

    by_school
        .into_iter()
        .map(|(school, (count, nationalities))| {
            let counts: Vec<usize> = nationalities.values().copied().collect();
            SchoolScore {
                school: school.to_string(),
                records: count,
                nationalities: counts.len(),
                score: if counts.is_empty() {
                    None
                } else {
                    Some(truncate_2(shannon_entropy(&counts)))
                },
            }
        })
        .collect()
}

/// Join school scores and regions onto every record.
pub fn score_records(
    records: Vec<RosterRecord>,
    scores: &[SchoolScore],
    tables: &ReferenceTables,
) -> Vec<ScoredRecord> {
    let lookup: BTreeMap<&str, Option<f64>> = scores
        .iter()
        .map(|s| (s.school.as_str(), s.score))
        .collect();

    records
        .into_iter()
        .map(|record| {
            let diversity = lookup.get(record.school()).copied().flatten();
            let region = non_blank(record.nationality.as_deref())
                .map(|n| tables.map_region(n).to_string());
            ScoredRecord { record, region, diversity }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceTag;
    use crate::tables::CanonicalField;

    fn record(school: &str, nationality: Option<&str>) -> RosterRecord {
        let tag = SourceTag {
            semester: "2024-1학기".into(),
            school: school.into(),
        };
        let r = RosterRecord::new(&tag);
        match nationality {
            Some(n) => r.with(CanonicalField::Nationality, n),
            None => r,
        }
    }

    #[test]
    fn test_single_nationality_is_zero() {
        let records: Vec<_> = (0..7).map(|_| record("서울고", Some("몽골"))).collect();
        let scores = school_scores(&records);
        assert_eq!(scores[0].score, Some(0.0));
        assert!(scores[0].score.unwrap().is_sign_positive());
    }

    #[test]
    fn test_even_split_is_one() {
        let records = vec![
            record("서울고", Some("몽골")),
            record("서울고", Some("중국")),
            record("서울고", Some("몽골")),
            record("서울고", Some("중국")),
        ];
        assert_eq!(school_scores(&records)[0].score, Some(1.0));
    }

    #[test]
    fn test_three_way_split_truncates() {
        let records = vec![
            record("서울고", Some("몽골")),
            record("서울고", Some("중국")),
            record("서울고", Some("베트남")),
        ];
        // log2(3) = 1.58496...
        assert_eq!(school_scores(&records)[0].score, Some(1.58));
    }

    #[test]
    fn test_truncate_floors() {
        assert_eq!(truncate_2(0.999), 0.99);
        assert_eq!(truncate_2(1.0), 1.0);
        assert_eq!(truncate_2(0.811278), 0.81);
    }

    #[test]
    fn test_schools_scored_independently() {
        let records = vec![
            record("서울고", Some("몽골")),
            record("부산고", Some("몽골")),
            record("부산고", Some("중국")),
        ];
        let scores = school_scores(&records);
        // BTreeMap order: 부산고 < 서울고
        assert_eq!(scores[0].school, "부산고");
        assert_eq!(scores[0].score, Some(1.0));
        assert_eq!(scores[1].score, Some(0.0));
    }

    #[test]
    fn test_school_without_nationalities_not_computed() {
        let records = vec![record("대구고", None), record("대구고", Some("  "))];
        let scores = school_scores(&records);
        assert_eq!(scores[0].records, 2);
        assert_eq!(scores[0].score, None);
    }

    #[test]
    fn test_score_records_joins_score_and_region() {
        let tables = ReferenceTables::default();
        let records = vec![
            record("서울고", Some("몽골")),
            record("서울고", Some("아이슬란드")),
            record("서울고", None),
        ];
        let scores = school_scores(&records);
        let scored = score_records(records, &scores, &tables);

        assert_eq!(scored[0].diversity, Some(1.0));
        assert_eq!(scored[0].region.as_deref(), Some("동아시아"));
        assert_eq!(scored[1].region.as_deref(), Some("기타"));
        assert_eq!(scored[2].region, None);
        assert_eq!(scored[2].diversity, Some(1.0));
    }
}
