//! Raw sheet reading: spreadsheets via calamine, CSV with encoding and
//! delimiter auto-detection.
//!
//! Produces headerless grids of optional cell text. No roster-specific logic
//! here; header location and column mapping happen in [`crate::sheet`].

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{SheetError, SheetResult, WorkbookError, WorkbookResult};

/// One raw row; `None` is an empty cell.
pub type RawRow = Vec<Option<String>>;

/// A headerless worksheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<RawRow>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self { name: name.into(), rows }
    }
}

/// Every sheet of a workbook, in workbook order. A sheet that failed to read
/// does not prevent the others from loading.
#[derive(Debug, Default)]
pub struct RawWorkbook {
    pub sheets: Vec<SheetResult<RawSheet>>,
}

/// Input container kinds, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Spreadsheet,
    Csv,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Spreadsheet),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Read every sheet of an input file.
pub fn read_workbook(path: &Path) -> WorkbookResult<RawWorkbook> {
    match SourceKind::from_path(path) {
        Some(SourceKind::Spreadsheet) => read_spreadsheet(path),
        Some(SourceKind::Csv) => {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("csv")
                .to_string();
            let rows = read_csv_file(path)?;
            Ok(RawWorkbook {
                sheets: vec![Ok(RawSheet::new(name, rows))],
            })
        }
        None => Err(WorkbookError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Read an xlsx/xls/xlsb/ods file into raw sheets.
pub fn read_spreadsheet(path: &Path) -> WorkbookResult<RawWorkbook> {
    let mut workbook = open_workbook_auto(path).map_err(|e| WorkbookError::Open(e.to_string()))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for sheet_name in sheet_names {
        let sheet = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| SheetError::Read {
                sheet: sheet_name.clone(),
                message: e.to_string(),
            })
            .map(|range| {
                // Range starts at the first used cell; pad back to A1 so row
                // indices match what the user sees.
                let (start_row, start_col) = range.start().unwrap_or((0, 0));
                let mut rows: Vec<RawRow> = vec![Vec::new(); start_row as usize];
                for row in range.rows() {
                    let mut cells: RawRow = vec![None; start_col as usize];
                    cells.extend(row.iter().map(cell_text));
                    rows.push(cells);
                }
                RawSheet::new(sheet_name.clone(), rows)
            });
        sheets.push(sheet);
    }

    Ok(RawWorkbook { sheets })
}

/// Text of a spreadsheet cell.
///
/// Whole floats print without a fractional part so phone numbers stored as
/// numbers stay comparable with the same number typed as text.
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                Some(format!("{}", *n as i64))
            } else {
                Some(format!("{}", n))
            }
        }
        Data::Int(n) => Some(n.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Some(format!("#{:?}", e)),
        Data::DateTime(dt) => Some(format!("{}", dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

// =============================================================================
// CSV
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "euc-kr" | "cp949" | "uhc" | "ks_c_5601-1987" => "euc-kr".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
///
/// Bytes that are valid UTF-8 are taken as UTF-8 whatever chardet said:
/// short Korean files are often misreported.
pub fn decode_content(bytes: &[u8], encoding: &str) -> WorkbookResult<String> {
    let decoded = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => match encoding.to_lowercase().as_str() {
            "utf-8" | "utf8" | "ascii" | "euc-kr" | "cp949" => decode_with(encoding_rs::EUC_KR, bytes)?,
            "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.to_string(),
            "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
            _ => String::from_utf8_lossy(bytes).to_string(),
        },
    };
    Ok(decoded.trim_start_matches('\u{feff}').to_string())
}

fn decode_with(encoding: &'static encoding_rs::Encoding, bytes: &[u8]) -> WorkbookResult<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(WorkbookError::Encoding(format!(
            "content is neither UTF-8 nor {}",
            encoding.name()
        )));
    }
    Ok(text.into_owned())
}

/// Detect the delimiter by counting occurrences in the first non-empty line
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("");

    let separators = [b',', b';', b'\t', b'|'];
    let mut best_sep = b',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep as char).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text into raw rows with an explicit delimiter.
///
/// No header handling: rosters often carry title lines above the header.
pub fn parse_csv_rows(content: &str, delimiter: u8) -> WorkbookResult<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
                .collect(),
        );
    }
    Ok(rows)
}

/// Read a CSV file with auto-detection of encoding and delimiter.
pub fn read_csv_file(path: &Path) -> WorkbookResult<Vec<RawRow>> {
    let bytes = std::fs::read(path)?;
    read_csv_bytes(&bytes)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn read_csv_bytes(bytes: &[u8]) -> WorkbookResult<Vec<RawRow>> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    parse_csv_rows(&content, delimiter)
}
