//! Full runs over real workbooks written with rust_xlsxwriter, read back with
//! calamine.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use localtrip::{run, ReferenceTables, RunOptions, REPORT_FILE_NAME};
use rust_xlsxwriter::Workbook;

/// Write one sheet per `(name, rows)` pair; empty strings leave the cell empty.
fn write_roster(path: &Path, sheets: &[(&str, Vec<Vec<&str>>)]) {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    worksheet.write_string(r as u32, c as u16, *value).unwrap();
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

fn read_sheet(path: &Path, sheet: &str) -> Vec<Vec<Data>> {
    let mut workbook = open_workbook_auto(path).unwrap();
    let range = workbook.worksheet_range(sheet).unwrap();
    range.rows().map(|r| r.to_vec()).collect()
}

fn text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn column(rows: &[Vec<Data>], header: &str) -> usize {
    rows[0].iter().position(|c| text(c) == header).unwrap()
}

fn two_schools(dir: &Path) -> Vec<PathBuf> {
    let seoul = dir.join("2024-1학기_서울고.xlsx");
    write_roster(
        &seoul,
        &[(
            "명단",
            vec![
                vec!["2024학년도 1학기 유학생 명단"],
                vec![],
                vec!["번호", "국적", "성별", "성명(한글)", "성명(영문)", "휴대폰번호"],
                vec!["1", "몽골", "M", "바트", "Bat", "010-1000-0001"],
                vec!["2", "중국", "f", "리", "Li", "010-1000-0002"],
                vec!["3", "대한민국", "M", "김", "Kim", "010-1000-0003"],
                vec![],
                vec!["비고", "", "", "", "", ""],
            ],
        )],
    );

    let busan = dir.join("2024-1학기_부산고.xlsx");
    write_roster(
        &busan,
        &[
            (
                "1반",
                vec![
                    vec!["국가", "성 별", "이름", "이름(영문)", "연락처"],
                    vec!["베트남", "F", "응우옌", "Nguyen", "010-2000-0001"],
                    vec!["우즈벡", "M", "알리", "Ali", "010-2000-0002"],
                ],
            ),
            ("메모", vec![vec!["이 시트는 명단이 아닙니다"]]),
            (
                "2반",
                vec![
                    vec!["국적", "성명(영문)", "휴대폰번호"],
                    vec!["오스트레일리아", "Smith", "010-2000-0003"],
                ],
            ),
        ],
    );

    vec![seoul, busan]
}

#[test]
fn test_two_schools_consolidated() {
    let dir = tempfile::tempdir().unwrap();
    let files = two_schools(dir.path());

    let summary = run(&files, &ReferenceTables::default(), &RunOptions::default()).unwrap();

    let report = dir.path().join(REPORT_FILE_NAME);
    assert_eq!(summary.output.as_deref(), Some(report.as_path()));
    assert_eq!(summary.merge.input, 5);
    assert_eq!(summary.merge.output, 5);

    let rows = read_sheet(&report, "종합");
    assert_eq!(rows.len(), 6);

    let semester = column(&rows, "학기");
    let school = column(&rows, "학교");
    let nationality = column(&rows, "국적");
    let gender = column(&rows, "성별");
    let region = column(&rows, "권역");
    let score = column(&rows, "국제화지표");
    assert_eq!((semester, school), (0, 1));
    assert_eq!(score, rows[0].len() - 1);

    let data = &rows[1..];
    assert!(data.iter().all(|r| text(&r[semester]) == "2024-1학기"));

    // selection order: 서울고 rows first
    assert_eq!(text(&data[0][school]), "서울고");
    assert_eq!(text(&data[1][gender]), "여");
    assert_eq!(text(&data[3][nationality]), "우즈베키스탄");
    assert_eq!(text(&data[3][region]), "중앙아시아");
    assert_eq!(text(&data[4][nationality]), "호주");
    assert_eq!(text(&data[4][school]), "부산고");

    // schools are scored independently: 2 nationalities vs 3
    assert_eq!(data[0][score], Data::Float(1.0));
    assert_eq!(data[2][score], Data::Float(1.58));
}

#[test]
fn test_summary_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let files = two_schools(dir.path());
    run(&files, &ReferenceTables::default(), &RunOptions::default()).unwrap();
    let report = dir.path().join(REPORT_FILE_NAME);

    let schools = read_sheet(&report, "학교별 지표");
    assert_eq!(schools.len(), 3);
    assert_eq!(text(&schools[1][0]), "부산고");
    assert_eq!(schools[1][1], Data::Float(3.0));

    let semesters = read_sheet(&report, "학기별 현황");
    assert_eq!(text(&semesters[1][0]), "2024-1학기");
    assert_eq!(semesters[1][1], Data::Float(2.0));
    assert_eq!(semesters[1][2], Data::Float(5.0));

    let regions = read_sheet(&report, "권역별 분포");
    assert_eq!(regions.len(), 5);
    let total: f64 = regions[1..]
        .iter()
        .filter_map(|r| match r[1] {
            Data::Float(n) => Some(n),
            _ => None,
        })
        .sum();
    assert_eq!(total, 5.0);

    let grid = read_sheet(&report, "학기×학교");
    assert_eq!(grid[0].iter().map(text).collect::<Vec<_>>(), vec!["학기", "부산고", "서울고"]);
    assert_eq!(grid[1].iter().map(text).collect::<Vec<_>>(), vec!["2024-1학기", "O", "O"]);
}

#[test]
fn test_duplicate_file_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let files = two_schools(dir.path());
    let doubled = vec![files[0].clone(), files[0].clone()];

    let once = run(&files[..1], &ReferenceTables::default(), &RunOptions::default()).unwrap();
    let twice = run(&doubled, &ReferenceTables::default(), &RunOptions::default()).unwrap();

    assert_eq!(once.merge.output, 2);
    assert_eq!(twice.merge.output, 2);
    assert_eq!(twice.merge.input, 4);
}

#[test]
fn test_unreadable_file_does_not_stop_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut files = two_schools(dir.path());
    let broken = dir.path().join("2024-1학기_대구고.xlsx");
    std::fs::write(&broken, b"garbage").unwrap();
    files.insert(0, broken);

    let output = dir.path().join("out").join("report.xlsx");
    std::fs::create_dir(dir.path().join("out")).unwrap();
    let options = RunOptions {
        output: Some(output.clone()),
        ..RunOptions::default()
    };

    let summary = run(&files, &ReferenceTables::default(), &options).unwrap();
    assert_eq!(summary.files.len(), 3);
    assert_eq!(summary.files[0].record_count(), 0);
    assert_eq!(summary.merge.output, 5);
    assert!(output.exists());
}
