//! Comparison keys for alias matching.

/// Canonical comparison key: all whitespace removed, lower-cased.
///
/// Only used for matching. Stored values keep their original spelling.
pub fn normalize_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// True when a cell is missing or whitespace-only.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Trimmed, non-empty value or `None`.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_all_whitespace() {
        assert_eq!(normalize_key(" 성명 (영문) "), "성명(영문)");
        assert_eq!(normalize_key("Phone\tNumber\n"), "phonenumber");
        assert_eq!(normalize_key("이름\u{3000}(영문)"), "이름(영문)");
    }

    #[test]
    fn test_blank_detection() {
        assert!(is_blank(None));
        assert!(is_blank(Some("   ")));
        assert!(!is_blank(Some(" x ")));
        assert_eq!(non_blank(Some("  010-1234-5678 ")), Some("010-1234-5678"));
        assert_eq!(non_blank(Some(" ")), None);
    }
}
