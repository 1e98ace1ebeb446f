//! Report tables: the consolidated roster plus per-school, per-semester and
//! per-region summaries and the semester by school participation grid.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::ScoredRecord;
use crate::score::{truncate_2, SchoolScore};
use crate::tables::CanonicalField;

use super::{ReportCell, ReportTable};

pub const MAIN_SHEET: &str = "종합";
pub const SCHOOL_SHEET: &str = "학교별 지표";
pub const SEMESTER_SHEET: &str = "학기별 현황";
pub const REGION_SHEET: &str = "권역별 분포";
pub const PARTICIPATION_SHEET: &str = "학기×학교";

pub const SEMESTER_HEADER: &str = "학기";
pub const SCHOOL_HEADER: &str = "학교";
pub const REGION_HEADER: &str = "권역";
pub const SCORE_HEADER: &str = "국제화지표";

pub const PARTICIPATED: &str = "O";
pub const NOT_PARTICIPATED: &str = "X";

fn text(value: Option<&str>) -> ReportCell {
    match value {
        Some(v) => ReportCell::Text(v.to_string()),
        None => ReportCell::Blank,
    }
}

/// Main sheet: one row per merged record.
///
/// `fields` are the canonical columns mapped in any loaded sheet, even when
/// every value in them is empty.
pub fn records_table(records: &[ScoredRecord], fields: &[CanonicalField]) -> ReportTable {
    let mut fields = fields.to_vec();
    fields.sort();
    fields.dedup();

    let mut headers = vec![SEMESTER_HEADER.to_string(), SCHOOL_HEADER.to_string()];
    headers.extend(fields.iter().map(|f| f.label().to_string()));
    headers.push(REGION_HEADER.to_string());
    headers.push(SCORE_HEADER.to_string());

    let rows = records
        .iter()
        .map(|r| {
            let mut row = vec![
                ReportCell::Text(r.record.semester().to_string()),
                ReportCell::Text(r.record.school().to_string()),
            ];
            row.extend(fields.iter().map(|f| text(r.record.field(*f))));
            row.push(text(r.region.as_deref()));
            row.push(r.diversity.map_or(ReportCell::Blank, ReportCell::Number));
            row
        })
        .collect();

    ReportTable::new(MAIN_SHEET, headers, rows)
}

/// One row per school.
pub fn school_table(scores: &[SchoolScore]) -> ReportTable {
    let headers = ["학교", "인원", "국적 수", SCORE_HEADER];
    let rows = scores
        .iter()
        .map(|s| {
            vec![
                ReportCell::Text(s.school.clone()),
                ReportCell::Number(s.records as f64),
                ReportCell::Number(s.nationalities as f64),
                s.score.map_or(ReportCell::Blank, ReportCell::Number),
            ]
        })
        .collect();
    ReportTable::new(SCHOOL_SHEET, headers.iter().map(|h| h.to_string()).collect(), rows)
}

/// Participating schools and unique participants per semester.
///
/// A participant is identified by Korean name, else Latin name; records with
/// neither are not counted.
pub fn semester_table(records: &[ScoredRecord]) -> ReportTable {
    let mut by_semester: BTreeMap<&str, (BTreeSet<&str>, BTreeSet<&str>)> = BTreeMap::new();
    for r in records {
        let (schools, participants) = by_semester.entry(r.record.semester()).or_default();
        schools.insert(r.record.school());
        if let Some(name) = r.record.participant_name() {
            participants.insert(name);
        }
    }

    let headers = ["학기", "참여 학교 수", "참여자 수"];
    let rows = by_semester
        .into_iter()
        .map(|(semester, (schools, participants))| {
            vec![
                ReportCell::Text(semester.to_string()),
                ReportCell::Number(schools.len() as f64),
                ReportCell::Number(participants.len() as f64),
            ]
        })
        .collect();
    ReportTable::new(SEMESTER_SHEET, headers.iter().map(|h| h.to_string()).collect(), rows)
}

/// Record count and share per region, largest first.
pub fn region_table(records: &[ScoredRecord]) -> ReportTable {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for region in records.iter().filter_map(|r| r.region.as_deref()) {
        *counts.entry(region).or_default() += 1;
    }
    let total: usize = counts.values().sum();

    let mut ordered: Vec<(&str, usize)> = counts.into_iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let headers = ["권역", "인원", "비율(%)"];
    let rows = ordered
        .into_iter()
        .map(|(region, count)| {
            vec![
                ReportCell::Text(region.to_string()),
                ReportCell::Number(count as f64),
                ReportCell::Number(truncate_2(count as f64 * 100.0 / total as f64)),
            ]
        })
        .collect();
    ReportTable::new(REGION_SHEET, headers.iter().map(|h| h.to_string()).collect(), rows)
}

/// Semester by school grid: `O` where the school sent at least one record
/// for that semester, `X` otherwise.
pub fn participation_table(records: &[ScoredRecord]) -> ReportTable {
    let semesters: BTreeSet<&str> = records.iter().map(|r| r.record.semester()).collect();
    let schools: BTreeSet<&str> = records.iter().map(|r| r.record.school()).collect();
    let pairs: BTreeSet<(&str, &str)> = records
        .iter()
        .map(|r| (r.record.semester(), r.record.school()))
        .collect();

    let mut headers = vec![SEMESTER_HEADER.to_string()];
    headers.extend(schools.iter().map(|s| s.to_string()));

    let rows = semesters
        .iter()
        .map(|semester| {
            let mut row = vec![ReportCell::Text(semester.to_string())];
            row.extend(schools.iter().map(|school| {
                let mark = if pairs.contains(&(*semester, *school)) {
                    PARTICIPATED
                } else {
                    NOT_PARTICIPATED
                };
                ReportCell::Text(mark.to_string())
            }));
            row
        })
        .collect();
    ReportTable::new(PARTICIPATION_SHEET, headers, rows)
}
