use anyhow::{bail, Result};
use calamine::Data;
use models::{ParseResult, Transaction, TransactionType, UNKNOWN_IBAN};
use statement_core::{
    cell_str, extract_account_number, extract_iban, find_header_row, generate_row_id,
    is_valid_transaction_row, parse_amount, parse_date, row_strings, BankDescriptor, BankParser,
    Grid,
};

pub const BANK_TYPE: &str = "ziraat";

/// Rows of preamble scanned for the IBAN / account number.
const IDENTITY_SCAN_ROWS: usize = 15;

/// Labels Ziraat exports use across their layout revisions. Scored by
/// `find_header_row`; broader than the role tables below on purpose, since
/// columns like the receipt number help locate the header but map to nothing.
const HEADER_KEYWORDS: &[&str] = &[
    "tarih",
    "işlem tarihi",
    "date",
    "açıklama",
    "işlem açıklama",
    "description",
    "memo",
    "tutar",
    "miktar",
    "amount",
    "işlem tutarı",
    "bakiye",
    "balance",
    "borç",
    "debit",
    "gider",
    "alacak",
    "credit",
    "gelir",
    "fiş no",
    "fiş",
];

// Column-role tables. Order and overlap are contractual: `tutar` counts as an
// amount column only when the balance table does not also match, and
// debit/credit columns override sign-derived typing. Keep these as data so
// new dialect labels stay additive.
const DATE_COLS: &[&str] = &["tarih", "işlem tarihi", "date", "tarih/saat"];
const DESCRIPTION_COLS: &[&str] = &["açıklama", "işlem açıklama", "description", "memo", "detay"];
const AMOUNT_COLS: &[&str] = &["tutar", "miktar", "amount", "işlem tutarı"];
const BALANCE_COLS: &[&str] = &["bakiye", "balance", "kalan bakiye"];
const DEBIT_COLS: &[&str] = &["borç", "debit", "gider", "çıkış", "ödeme"];
const CREDIT_COLS: &[&str] = &["alacak", "credit", "gelir", "giriş", "para yatırma"];

/// Keyword-column-mapped parser for Ziraat Bankası statement exports.
pub struct ZiraatParser;

impl ZiraatParser {
    pub fn new() -> Self {
        Self
    }

    pub fn descriptor() -> BankDescriptor {
        BankDescriptor {
            bank_type: BANK_TYPE,
            display_name: "Ziraat Bankası",
            can_parse,
            build: || Box::new(ZiraatParser::new()),
        }
    }
}

impl Default for ZiraatParser {
    fn default() -> Self {
        Self::new()
    }
}

pub fn can_parse(filename: &str) -> bool {
    let name = filename.to_lowercase();
    name.contains("ziraat") || name.contains("zb")
}

impl BankParser for ZiraatParser {
    fn bank_type(&self) -> &'static str {
        BANK_TYPE
    }

    fn parse(&self, grid: &Grid) -> ParseResult {
        // The account identity is mandatory. Ziraat statements carry either an
        // IBAN or a plain "Hesap No"; without one the rows cannot be tied to
        // an account and the whole file is rejected.
        let Some(iban) = extract_iban(grid, IDENTITY_SCAN_ROWS)
            .or_else(|| extract_account_number(grid, IDENTITY_SCAN_ROWS))
        else {
            return ParseResult::structural_failure(
                BANK_TYPE,
                "Unable to extract IBAN from Ziraat bank statement. IBAN is required for processing."
                    .to_string(),
                UNKNOWN_IBAN.to_string(),
            );
        };

        let Some(header_row) = find_header_row(grid, HEADER_KEYWORDS) else {
            return ParseResult::structural_failure(
                BANK_TYPE,
                "Unable to find header row in Ziraat bank statement. Expected columns: Tarih, Açıklama, Tutar"
                    .to_string(),
                iban,
            );
        };

        let headers: Vec<String> = grid[header_row]
            .iter()
            .map(|h| cell_str(h).trim().to_lowercase())
            .collect();

        let mut transactions = Vec::new();
        let mut errors = Vec::new();

        for (i, row) in grid.iter().enumerate().skip(header_row + 1) {
            if !is_valid_transaction_row(row) {
                continue;
            }
            match map_row(row, &headers) {
                Ok(mut transaction) => {
                    if transaction.date.is_some() {
                        transaction.bank_type = BANK_TYPE.to_string();
                        transaction.iban = iban.clone();
                        transactions.push(transaction);
                    } else {
                        // Rows without a parseable date are not transactions
                        // (subtotals, footers); dropped without an error.
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

fn map_row(row: &[Data], headers: &[String]) -> Result<Transaction> {
    let raw = row_strings(row);
    let mut transaction = Transaction::from_raw(generate_row_id(&raw), raw);

    for (header, value) in headers.iter().zip(row.iter()) {
        if header.is_empty() || matches!(value, Data::Empty) {
            continue;
        }
        if let Data::Error(e) = value {
            bail!("unreadable cell under '{}': {:?}", header, e);
        }

        if is_date_column(header) {
            transaction.date = parse_date(value);
        } else if is_description_column(header) {
            transaction.description = cell_str(value).trim().to_string();
        } else if is_amount_column(header) {
            transaction.amount = parse_amount(value);
        } else if is_balance_column(header) {
            transaction.balance = parse_amount(value);
        } else if is_debit_column(header) {
            let amount = parse_amount(value);
            if amount > 0.0 {
                transaction.kind = TransactionType::Expense;
                transaction.amount = -amount;
            }
        } else if is_credit_column(header) {
            let amount = parse_amount(value);
            if amount > 0.0 {
                transaction.kind = TransactionType::Income;
                transaction.amount = amount;
            }
        }
    }

    // Sign-derived type only applies where no explicit debit/credit column
    // already decided.
    if transaction.kind == TransactionType::Unknown && transaction.amount != 0.0 {
        transaction.kind = if transaction.amount > 0.0 {
            TransactionType::Income
        } else {
            TransactionType::Expense
        };
    }

    Ok(transaction)
}

fn is_date_column(header: &str) -> bool {
    DATE_COLS.iter().any(|k| header.contains(k))
}

fn is_description_column(header: &str) -> bool {
    DESCRIPTION_COLS.iter().any(|k| header.contains(k))
}

fn is_amount_column(header: &str) -> bool {
    AMOUNT_COLS.iter().any(|k| header.contains(k)) && !is_balance_column(header)
}

fn is_balance_column(header: &str) -> bool {
    BALANCE_COLS.iter().any(|k| header.contains(k))
}

fn is_debit_column(header: &str) -> bool {
    DEBIT_COLS.iter().any(|k| header.contains(k))
}

fn is_credit_column(header: &str) -> bool {
    CREDIT_COLS.iter().any(|k| header.contains(k))
}
