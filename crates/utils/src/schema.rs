//! Validation and migration for previously persisted transaction records.
//!
//! Records written by earlier tool versions predate the mandatory-IBAN rule.
//! Before trusting stored data, it is validated against the current schema;
//! records that cannot be brought up to date are discarded by the caller.

use chrono::NaiveDate;
use models::{Transaction, TransactionType};
use serde_json::Value;
use statement_core::{rolling_hash, to_base36};

#[derive(Debug)]
pub struct SchemaValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// Set when the stored data is broken badly enough that the safe move is
    /// clearing the store rather than patching individual records.
    pub requires_clear: bool,
}

const REQUIRED_FIELDS: &[&str] = &[
    "id",
    "date",
    "description",
    "amount",
    "balance",
    "type",
    "rawData",
];

const VALID_TYPES: &[&str] = &["income", "expense", "unknown"];

/// Structural check of one stored record against the current schema.
pub fn validate_schema(record: &Value) -> SchemaValidation {
    let mut errors = Vec::new();
    let mut requires_clear = false;

    match record.get("iban") {
        None => {
            errors.push("Transaction missing required field: iban".to_string());
            requires_clear = true;
        }
        Some(Value::Null) => {
            errors.push("Transaction has null or undefined IBAN".to_string());
            requires_clear = true;
        }
        Some(value) if !value.is_string() => {
            errors.push("Transaction IBAN must be a string".to_string());
            requires_clear = true;
        }
        Some(_) => {}
    }

    for field in REQUIRED_FIELDS {
        if record.get(field).is_none() {
            errors.push(format!("Transaction missing required field: {}", field));
            requires_clear = true;
        }
    }

    if let Some(kind) = record.get("type").and_then(|v| v.as_str()) {
        if !VALID_TYPES.contains(&kind) {
            errors.push(format!("Invalid transaction type: {}", kind));
        }
    }

    SchemaValidation {
        is_valid: errors.is_empty(),
        errors,
        requires_clear,
    }
}

/// Validate a whole stored batch; error messages carry the record index.
pub fn validate_stored(records: &[Value]) -> SchemaValidation {
    let mut errors = Vec::new();
    let mut requires_clear = false;

    for (i, record) in records.iter().enumerate() {
        let validation = validate_schema(record);
        if !validation.is_valid {
            errors.push(format!(
                "Transaction at index {}: {}",
                i,
                validation.errors.join(", ")
            ));
            requires_clear |= validation.requires_clear;
        }
    }

    SchemaValidation {
        is_valid: errors.is_empty(),
        errors,
        requires_clear,
    }
}

/// Bring a legacy record up to the current schema.
///
/// A record with neither an `iban` nor an `accountNumber` cannot be tied to an
/// account anymore; `None` means "cannot migrate, discard".
pub fn migrate_transaction(record: &Value) -> Option<Transaction> {
    let iban = match record.get("iban").and_then(|v| v.as_str()) {
        Some(iban) if !iban.is_empty() => iban.to_string(),
        _ => {
            let account = record.get("accountNumber")?;
            match account {
                Value::String(s) if !s.is_empty() => format!("Account: {}", s),
                Value::Number(n) => format!("Account: {}", n),
                _ => return None,
            }
        }
    };

    let id = match record.get("id").and_then(|v| v.as_str()) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => legacy_record_id(record),
    };

    let date = record
        .get("date")
        .and_then(|v| v.as_str())
        .and_then(parse_stored_date);

    let description = record
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let amount = record.get("amount").and_then(|v| v.as_f64()).unwrap_or(0.0);
    let balance = record
        .get("balance")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);

    let kind = match record.get("type").and_then(|v| v.as_str()) {
        Some("income") => TransactionType::Income,
        Some("expense") => TransactionType::Expense,
        _ => TransactionType::Unknown,
    };

    let raw_data = record
        .get("rawData")
        .and_then(|v| v.as_array())
        .map(|cells| {
            cells
                .iter()
                .map(|c| match c {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    let bank_type = record
        .get("bankType")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    Some(Transaction {
        id,
        date,
        description,
        amount,
        balance,
        kind,
        raw_data,
        bank_type,
        iban,
    })
}

/// Id fallback for records stored before ids existed: the same rolling hash
/// as row ids, over a canonical JSON of the identifying fields, rendered
/// unsigned.
fn legacy_record_id(record: &Value) -> String {
    let canonical = serde_json::json!({
        "date": record.get("date").cloned().unwrap_or(Value::Null),
        "description": record.get("description").cloned().unwrap_or(Value::Null),
        "amount": record.get("amount").cloned().unwrap_or(Value::Null),
        "balance": record.get("balance").cloned().unwrap_or(Value::Null),
    });

    let hash = rolling_hash(&canonical.to_string());
    to_base36(i64::from(hash).abs())
}

fn parse_stored_date(s: &str) -> Option<NaiveDate> {
    // Stored dates are either plain dates or full timestamps; the date part
    // always leads.
    let date_part = s.get(0..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
