use calamine::Data;

use crate::cells::{cell_is_blank, cell_str};

/// Keywords seen in the header rows of Turkish and English statement exports.
pub const DEFAULT_HEADER_KEYWORDS: &[&str] =
    &["tarih", "açıklama", "tutar", "date", "description", "amount"];

/// Rows scanned when looking for headers or account identifiers. Statement
/// preambles never run longer than this.
pub const HEADER_SCAN_ROWS: usize = 15;

/// Locate the header row by keyword scoring over the first
/// [`HEADER_SCAN_ROWS`] rows.
///
/// A candidate needs at least three cells and at least three case-insensitive
/// substring matches; a later row only replaces the current best when it
/// strictly exceeds its score, so the first row reaching the maximum wins.
pub fn find_header_row(grid: &[Vec<Data>], keywords: &[&str]) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut max_matches = 0usize;

    for (i, row) in grid.iter().take(HEADER_SCAN_ROWS).enumerate() {
        if row.len() < 3 {
            continue;
        }

        let mut matches = 0usize;
        for cell in row {
            if cell_is_blank(cell) {
                continue;
            }
            let cell_text = cell_str(cell).trim().to_lowercase();
            matches += keywords.iter().filter(|k| cell_text.contains(*k)).count();
        }

        if matches >= 3 && matches > max_matches {
            max_matches = matches;
            best = Some(i);
        }
    }

    best
}

/// A data row is worth looking at if anything in it is populated. Filters the
/// blank spacer rows banks leave between the header and the data.
pub fn is_valid_transaction_row(row: &[Data]) -> bool {
    !row.is_empty() && row.iter().any(|cell| !cell_is_blank(cell))
}

/// Deterministic transaction id: the cells joined with `|`, run through a
/// 32-bit rolling hash over UTF-16 code units and rendered in signed base-36.
///
/// This reproduces the hash previously stored ids were generated with, and
/// those ids are the cross-upload deduplication key. Do not swap this for a
/// stronger hash; changed ids would resurrect every already-imported row as a
/// duplicate.
pub fn generate_row_id(cells: &[String]) -> String {
    to_base36(i64::from(rolling_hash(&cells.join("|"))))
}

/// The raw 32-bit hash, exposed for the legacy-record id fallback which
/// renders the absolute value instead of the signed one.
pub fn rolling_hash(text: &str) -> i32 {
    let mut hash: i32 = 0;
    for unit in text.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(unit as i32);
    }
    hash
}

pub fn to_base36(value: i64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let negative = value < 0;
    let mut n = value.unsigned_abs();
    let mut buf = Vec::new();

    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    if negative {
        buf.push(b'-');
    }
    buf.reverse();

    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    fn owned(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_row_id_matches_reference_vectors() {
        // Expected values computed with the reference rolling-hash algorithm.
        assert_eq!(generate_row_id(&owned(&["a", "b", "c"])), "1jlbn2");
        assert_eq!(generate_row_id(&owned(&["x"])), "3c");
        assert_eq!(
            generate_row_id(&owned(&["01.01.2023", "Maaş", "5.000,00", "5.000,00"])),
            "-fefr2p"
        );
        assert_eq!(
            generate_row_id(&owned(&["02.01.2023", "Market", "-150,75", "4.849,25"])),
            "-w2sku7"
        );
    }

    #[test]
    fn test_row_id_is_idempotent() {
        let row = owned(&["01.01.2023", "Maaş", "5.000,00"]);
        assert_eq!(generate_row_id(&row), generate_row_id(&row));
    }

    #[test]
    fn test_row_id_empty_row() {
        assert_eq!(generate_row_id(&[]), "0");
    }

    #[test]
    fn test_find_header_row_locates_keyword_row() {
        let grid = vec![
            vec![s("Hesap Özeti"), Data::Empty, Data::Empty],
            vec![s("Tarih"), s("Açıklama"), s("Tutar"), s("Bakiye")],
            vec![s("01.01.2023"), s("Maaş"), s("5.000,00"), s("5.000,00")],
        ];
        assert_eq!(find_header_row(&grid, DEFAULT_HEADER_KEYWORDS), Some(1));
    }

    #[test]
    fn test_find_header_row_first_max_wins() {
        // Two rows scoring three matches each: the earlier one must win.
        let header = vec![s("Tarih"), s("Açıklama"), s("Tutar")];
        let grid = vec![header.clone(), header];
        assert_eq!(find_header_row(&grid, DEFAULT_HEADER_KEYWORDS), Some(0));
    }

    #[test]
    fn test_find_header_row_none_when_absent() {
        let grid = vec![
            vec![s("foo"), s("bar"), s("baz")],
            vec![Data::Float(1.0), Data::Float(2.0), Data::Float(3.0)],
        ];
        assert_eq!(find_header_row(&grid, DEFAULT_HEADER_KEYWORDS), None);
    }

    #[test]
    fn test_find_header_row_ignores_rows_past_scan_window() {
        let mut grid: Vec<Vec<Data>> = (0..HEADER_SCAN_ROWS)
            .map(|_| vec![s("a"), s("b"), s("c")])
            .collect();
        grid.push(vec![s("Tarih"), s("Açıklama"), s("Tutar")]);
        assert_eq!(find_header_row(&grid, DEFAULT_HEADER_KEYWORDS), None);
    }

    #[test]
    fn test_is_valid_transaction_row() {
        assert!(!is_valid_transaction_row(&[]));
        assert!(!is_valid_transaction_row(&[Data::Empty, Data::Empty]));
        assert!(!is_valid_transaction_row(&[s("")]));
        assert!(is_valid_transaction_row(&[Data::Empty, s("Maaş")]));
        assert!(is_valid_transaction_row(&[Data::Float(0.0)]));
    }
}
