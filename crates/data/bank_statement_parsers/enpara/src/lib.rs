use anyhow::{bail, Result};
use calamine::Data;
use chrono::NaiveDate;
use models::{ParseResult, Transaction, TransactionType, UNKNOWN_IBAN};
use statement_core::{
    cell_is_blank, cell_str, extract_iban, generate_row_id, parse_amount, parse_date, row_strings,
    BankDescriptor, BankParser, Grid,
};

pub const BANK_TYPE: &str = "enpara";

/// Enpara puts the IBAN right at the top of the sheet.
const IDENTITY_SCAN_ROWS: usize = 10;

// Enpara exports have no per-column headers, only one composite label row.
// Data cells sit at fixed offsets within each row.
const COL_DATE: usize = 3;
const COL_MOVEMENT: usize = 6;
const COL_DETAIL: usize = 9;
const COL_AMOUNT: usize = 12;
const COL_BALANCE: usize = 14;

/// Fixed-position parser for Enpara.com statement exports.
pub struct EnparaParser;

impl EnparaParser {
    pub fn new() -> Self {
        Self
    }

    pub fn descriptor() -> BankDescriptor {
        BankDescriptor {
            bank_type: BANK_TYPE,
            display_name: "Enpara.com",
            can_parse,
            build: || Box::new(EnparaParser::new()),
        }
    }
}

impl Default for EnparaParser {
    fn default() -> Self {
        Self::new()
    }
}

pub fn can_parse(filename: &str) -> bool {
    let name = filename.to_lowercase();
    name.contains("enpara")
        || name.contains("enparacom")
        || name.contains("enpara.com")
        || name.contains("qnb")
}

impl BankParser for EnparaParser {
    fn bank_type(&self) -> &'static str {
        BANK_TYPE
    }

    fn parse(&self, grid: &Grid) -> ParseResult {
        let Some(iban) = extract_iban(grid, IDENTITY_SCAN_ROWS) else {
            return ParseResult::structural_failure(
                BANK_TYPE,
                "Unable to extract IBAN from Enpara bank statement. IBAN is required for processing."
                    .to_string(),
                UNKNOWN_IBAN.to_string(),
            );
        };

        let Some(header_row) = find_composite_header_row(grid) else {
            return ParseResult::structural_failure(
                BANK_TYPE,
                "Unable to find header row in Enpara bank statement. Expected columns: Tarih, Hareket tipi, Açıklama, İşlem Tutarı, Bakiye"
                    .to_string(),
                iban,
            );
        };

        let mut transactions = Vec::new();
        let mut errors = Vec::new();

        for (i, row) in grid.iter().enumerate().skip(header_row + 1) {
            if !is_valid_enpara_row(row) {
                continue;
            }
            match map_row(row) {
                Ok(mut transaction) => {
                    if transaction.date.is_some() {
                        transaction.bank_type = BANK_TYPE.to_string();
                        transaction.iban = iban.clone();
                        transactions.push(transaction);
                    } else {
                        tracing::debug!(row = i + 1, "dropping row with unparseable date");
                    }
                }
                Err(e) => errors.push(format!("Error parsing row {}: {}", i + 1, e)),
            }
        }

        ParseResult {
            bank_type: BANK_TYPE.to_string(),
            transactions,
            file_name: String::new(),
            errors,
            iban,
        }
    }
}

/// The label row is one composite banner, not machine-parseable headers, so
/// the scan folds Turkish letters to ASCII and substring-tests the whole row.
fn find_composite_header_row(grid: &[Vec<Data>]) -> Option<usize> {
    for (i, row) in grid.iter().take(15).enumerate() {
        let joined = row.iter().map(cell_str).collect::<Vec<_>>().join(" ");
        let folded = fold_turkish(&joined);

        if folded.contains("tarih")
            && folded.contains("hareket tipi")
            && folded.contains("aciklama")
            && (folded.contains("islem tutari") || folded.contains("tutar"))
            && folded.contains("bakiye")
        {
            return Some(i);
        }
    }
    None
}

fn fold_turkish(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            'İ' | 'ı' | 'I' => Some('i'),
            'Ğ' | 'ğ' => Some('g'),
            'Ü' | 'ü' => Some('u'),
            'Ş' | 'ş' => Some('s'),
            'Ö' | 'ö' => Some('o'),
            'Ç' | 'ç' => Some('c'),
            '\u{0307}' => None, // combining dot left over from lowercased 'İ'
            _ => Some(c.to_ascii_lowercase()),
        })
        .collect()
}

fn is_valid_enpara_row(row: &[Data]) -> bool {
    if row.len() < 10 {
        return false;
    }
    let populated =
        |idx: usize| row.get(idx).map(|c| !cell_is_blank(c)).unwrap_or(false);

    populated(COL_DATE)
        && populated(COL_MOVEMENT)
        && populated(COL_DETAIL)
        && populated(COL_AMOUNT)
        && populated(COL_BALANCE)
}

fn map_row(row: &[Data]) -> Result<Transaction> {
    for idx in [COL_DATE, COL_MOVEMENT, COL_DETAIL, COL_AMOUNT, COL_BALANCE] {
        if let Some(Data::Error(e)) = row.get(idx) {
            bail!("unreadable cell at column {}: {:?}", idx, e);
        }
    }

    let raw = row_strings(row);
    let mut transaction = Transaction::from_raw(generate_row_id(&raw), raw);

    if let Some(date_cell) = row.get(COL_DATE) {
        transaction.date = parse_enpara_date(date_cell);
    }

    // Description is "movement type: detail" when both are present.
    let movement = row
        .get(COL_MOVEMENT)
        .map(|c| cell_str(c).trim().to_string())
        .unwrap_or_default();
    let detail = row
        .get(COL_DETAIL)
        .map(|c| cell_str(c).trim().to_string())
        .unwrap_or_default();
    transaction.description = match (movement.is_empty(), detail.is_empty()) {
        (false, false) => format!("{}: {}", movement, detail),
        (false, true) => movement,
        (true, false) => detail,
        (true, true) => String::new(),
    };

    if let Some(amount_cell) = row.get(COL_AMOUNT) {
        transaction.amount = parse_amount(amount_cell);
    }
    if let Some(balance_cell) = row.get(COL_BALANCE) {
        transaction.balance = parse_amount(balance_cell);
    }

    transaction.kind = if transaction.amount > 0.0 {
        TransactionType::Income
    } else if transaction.amount < 0.0 {
        TransactionType::Expense
    } else {
        TransactionType::Unknown
    };

    Ok(transaction)
}

/// Enpara prints `DD.MM.YYYY` in the web export and `YYYYMMDD` in the older
/// one; anything else goes through the shared date fallback.
fn parse_enpara_date(value: &Data) -> Option<NaiveDate> {
    if let Data::String(s) = value {
        let s = s.trim();

        if s.len() == 10 && s.is_ascii() && s.as_bytes()[2] == b'.' && s.as_bytes()[5] == b'.' {
            let day: u32 = s[0..2].parse().ok()?;
            let month: u32 = s[3..5].parse().ok()?;
            let year: i32 = s[6..10].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }

        if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
            let year: i32 = s[0..4].parse().ok()?;
            let month: u32 = s[4..6].parse().ok()?;
            let day: u32 = s[6..8].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }

    parse_date(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IBAN_ROW: &str = "TR71 0011 1000 0000 0083 9266 37";
    const IBAN: &str = "TR710011100000000083926637";

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    fn header_row() -> Vec<Data> {
        vec![
            s("Tarih"),
            Data::Empty,
            Data::Empty,
            Data::Empty,
            Data::Empty,
            Data::Empty,
            s("Hareket tipi"),
            Data::Empty,
            Data::Empty,
            s("Açıklama"),
            Data::Empty,
            Data::Empty,
            s("İşlem Tutarı"),
            Data::Empty,
            s("Bakiye"),
        ]
    }

    fn data_row(date: &str, movement: &str, detail: &str, amount: f64, balance: f64) -> Vec<Data> {
        vec![
            Data::Empty,
            Data::Empty,
            Data::Empty,
            s(date),
            Data::Empty,
            Data::Empty,
            s(movement),
            Data::Empty,
            Data::Empty,
            s(detail),
            Data::Empty,
            Data::Empty,
            Data::Float(amount),
            Data::Empty,
            Data::Float(balance),
        ]
    }

    fn base_grid(rows: Vec<Vec<Data>>) -> Grid {
        let mut grid = vec![vec![s("IBAN"), s(IBAN_ROW)], header_row()];
        grid.extend(rows);
        grid
    }

    #[test]
    fn test_expense_row() {
        let grid = base_grid(vec![data_row(
            "19.08.2025",
            "Encard Harcaması",
            "MARKET ALIŞVERİŞİ",
            -1067.98,
            29346.97,
        )]);
        let result = EnparaParser::new().parse(&grid);

        assert!(result.errors.is_empty());
        assert_eq!(result.iban, IBAN);
        assert_eq!(result.transactions.len(), 1);

        let t = &result.transactions[0];
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2025, 8, 19));
        assert_eq!(t.description, "Encard Harcaması: MARKET ALIŞVERİŞİ");
        assert_eq!(t.amount, -1067.98);
        assert_eq!(t.balance, 29346.97);
        assert_eq!(t.kind, TransactionType::Expense);
        assert_eq!(t.bank_type, BANK_TYPE);
        // Reference id for this exact row content
        assert_eq!(t.id, "-6rukjy");
    }

    #[test]
    fn test_income_row() {
        let grid = base_grid(vec![data_row(
            "20.08.2025",
            "Gelen Transfer",
            "MAAŞ ÖDEMESİ",
            45000.0,
            74346.97,
        )]);
        let result = EnparaParser::new().parse(&grid);

        assert_eq!(result.transactions.len(), 1);
        let t = &result.transactions[0];
        assert_eq!(t.kind, TransactionType::Income);
        assert_eq!(t.amount, 45000.0);
        assert_eq!(t.id, "kmdx37");
    }

    #[test]
    fn test_compact_date_format() {
        let grid = base_grid(vec![data_row(
            "20250819",
            "Encard Harcaması",
            "MARKET",
            -10.0,
            100.0,
        )]);
        let result = EnparaParser::new().parse(&grid);
        assert_eq!(
            result.transactions[0].date,
            NaiveDate::from_ymd_opt(2025, 8, 19)
        );
    }

    #[test]
    fn test_missing_iban_is_structural_failure() {
        let grid = vec![
            header_row(),
            data_row("19.08.2025", "Encard Harcaması", "MARKET", -10.0, 100.0),
        ];
        let result = EnparaParser::new().parse(&grid);

        assert!(result.transactions.is_empty());
        assert_eq!(result.iban, UNKNOWN_IBAN);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("Unable to extract IBAN"));
    }

    #[test]
    fn test_missing_header_is_structural_failure() {
        let grid = vec![
            vec![s("IBAN"), s(IBAN_ROW)],
            data_row("19.08.2025", "Encard Harcaması", "MARKET", -10.0, 100.0),
        ];
        let result = EnparaParser::new().parse(&grid);

        assert!(result.transactions.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("Unable to find header row"));
    }

    #[test]
    fn test_short_and_sparse_rows_are_skipped() {
        let mut sparse = data_row("19.08.2025", "Encard Harcaması", "MARKET", -10.0, 100.0);
        sparse[COL_DETAIL] = Data::Empty;
        let grid = base_grid(vec![
            vec![s("Toplam")],
            sparse,
            data_row("19.08.2025", "Encard Harcaması", "MARKET", -10.0, 100.0),
        ]);
        let result = EnparaParser::new().parse(&grid);
        assert_eq!(result.transactions.len(), 1);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_folded_header_detection_handles_turkish_letters() {
        assert_eq!(fold_turkish("İşlem Tutarı"), "islem tutari");
        assert_eq!(fold_turkish("Açıklama"), "aciklama");
        assert_eq!(fold_turkish("BAKİYE"), "bakiye");
    }

    #[test]
    fn test_can_parse_filenames() {
        assert!(can_parse("enpara_hesap.xlsx"));
        assert!(can_parse("QNB-statement.xlsx"));
        assert!(can_parse("Enpara.com-2025.xlsx"));
        assert!(!can_parse("ziraat.xlsx"));
    }
}
