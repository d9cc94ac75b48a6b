use calamine::Data;
use regex::Regex;

use crate::cells::{cell_is_blank, cell_str};

/// Scan the statement preamble for the account's Turkish IBAN.
///
/// Recognizes the layouts the supported banks actually produce:
/// - an `IBAN` label cell with the value in a later cell of the same row
/// - an inline `IBAN: TR...` within one cell
/// - a bare IBAN cell, contiguous (`TR` + 24 digits) or grouped with spaces
///   (`TR71 0011 1000 0000 0083 9266 37`)
///
/// Returned IBANs always have internal spaces removed.
pub fn extract_iban(grid: &[Vec<Data>], max_rows: usize) -> Option<String> {
    let tr_iban = Regex::new(r"^TR\d{24}$").ok()?;
    let inline = Regex::new(r"(?i)IBAN\s*:\s*(TR\d{24})").ok()?;

    for row in grid.iter().take(max_rows) {
        for (j, cell) in row.iter().enumerate() {
            if cell_is_blank(cell) {
                continue;
            }
            let cell_text = cell_str(cell).trim().to_string();

            // Label cell: the value lives further right on the same row
            if cell_text.eq_ignore_ascii_case("IBAN") {
                for later in &row[j + 1..] {
                    if cell_is_blank(later) {
                        continue;
                    }
                    let candidate: String = cell_str(later).split_whitespace().collect();
                    if tr_iban.is_match(&candidate) {
                        return Some(candidate);
                    }
                }
            }

            if cell_text.to_uppercase().contains("IBAN") {
                if let Some(caps) = inline.captures(&cell_text) {
                    return Some(caps[1].to_string());
                }
            }

            // The cell may be the IBAN itself, possibly space-grouped
            let squashed: String = cell_text.split_whitespace().collect();
            if tr_iban.is_match(&squashed) {
                return Some(squashed);
            }
        }
    }

    None
}

/// Fallback identity for statements that print a plain account number instead
/// of an IBAN (`Hesap No: 12345678`). Returns the `Account: N` form used as a
/// derived identifier.
pub fn extract_account_number(grid: &[Vec<Data>], max_rows: usize) -> Option<String> {
    let label = Regex::new(r"(?i)Hesap\s*No").ok()?;
    let inline = Regex::new(r"(?i)Hesap\s*No\s*:\s*(\d+)").ok()?;
    let digits = Regex::new(r"^\d+$").ok()?;

    for row in grid.iter().take(max_rows) {
        for (j, cell) in row.iter().enumerate() {
            if cell_is_blank(cell) {
                continue;
            }
            let cell_text = cell_str(cell).trim().to_string();
            if !label.is_match(&cell_text) {
                continue;
            }

            for later in &row[j + 1..] {
                if cell_is_blank(later) {
                    continue;
                }
                let candidate = cell_str(later).trim().to_string();
                if digits.is_match(&candidate) {
                    return Some(format!("Account: {}", candidate));
                }
            }

            if let Some(caps) = inline.captures(&cell_text) {
                return Some(format!("Account: {}", &caps[1]));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    const IBAN: &str = "TR710011100000000083926637";

    #[test]
    fn test_label_and_value_cells() {
        let grid = vec![vec![s("IBAN"), Data::Empty, s(IBAN)]];
        assert_eq!(extract_iban(&grid, 15).as_deref(), Some(IBAN));
    }

    #[test]
    fn test_space_grouped_iban_cell() {
        let grid = vec![vec![s("TR71 0011 1000 0000 0083 9266 37")]];
        assert_eq!(extract_iban(&grid, 15).as_deref(), Some(IBAN));
    }

    #[test]
    fn test_inline_iban() {
        let grid = vec![vec![s(&format!("IBAN: {}", IBAN))]];
        assert_eq!(extract_iban(&grid, 15).as_deref(), Some(IBAN));
    }

    #[test]
    fn test_label_with_space_grouped_value() {
        let grid = vec![vec![s("IBAN"), s("TR71 0011 1000 0000 0083 9266 37")]];
        assert_eq!(extract_iban(&grid, 15).as_deref(), Some(IBAN));
    }

    #[test]
    fn test_missing_iban() {
        let grid = vec![vec![s("Tarih"), s("Açıklama"), s("Tutar")]];
        assert_eq!(extract_iban(&grid, 15), None);
    }

    #[test]
    fn test_iban_outside_scan_window_is_ignored() {
        let mut grid: Vec<Vec<Data>> = (0..10).map(|_| vec![s("x")]).collect();
        grid.push(vec![s(IBAN)]);
        assert_eq!(extract_iban(&grid, 10), None);
        assert_eq!(extract_iban(&grid, 15).as_deref(), Some(IBAN));
    }

    #[test]
    fn test_account_number_label_and_value() {
        let grid = vec![vec![s("Hesap No"), s("839266")]];
        assert_eq!(
            extract_account_number(&grid, 15).as_deref(),
            Some("Account: 839266")
        );
    }

    #[test]
    fn test_account_number_inline() {
        let grid = vec![vec![s("Hesap No: 839266")]];
        assert_eq!(
            extract_account_number(&grid, 15).as_deref(),
            Some("Account: 839266")
        );
    }

    #[test]
    fn test_account_number_missing() {
        let grid = vec![vec![s("Müşteri Adı"), s("A. Yılmaz")]];
        assert_eq!(extract_account_number(&grid, 15), None);
    }
}
