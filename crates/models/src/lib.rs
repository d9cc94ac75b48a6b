use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel used when a statement's IBAN could not be located.
pub const UNKNOWN_IBAN: &str = "UNKNOWN";

// Transaction models
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
	Income,
	Expense,
	Unknown,
}

impl TransactionType {
	pub fn as_str(&self) -> &'static str {
		match self {
			TransactionType::Income => "income",
			TransactionType::Expense => "expense",
			TransactionType::Unknown => "unknown",
		}
	}
}

impl Default for TransactionType {
	fn default() -> Self {
		TransactionType::Unknown
	}
}

/// One normalized financial movement. Field names serialize in camelCase to
/// stay readable alongside records persisted by earlier tool versions.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
	pub id: String,
	pub date: Option<NaiveDate>,
	pub description: String,
	pub amount: f64,
	pub balance: f64,
	#[serde(rename = "type")]
	pub kind: TransactionType,
	pub raw_data: Vec<String>,
	#[serde(default)]
	pub bank_type: String,
	pub iban: String,
}

impl Transaction {
	/// Blank transaction carrying only its identity and the source row.
	/// Parsers fill the remaining fields column by column.
	pub fn from_raw(id: String, raw_data: Vec<String>) -> Self {
		Self {
			id,
			date: None,
			description: String::new(),
			amount: 0.0,
			balance: 0.0,
			kind: TransactionType::Unknown,
			raw_data,
			bank_type: String::new(),
			iban: UNKNOWN_IBAN.to_string(),
		}
	}
}

// Parse output models
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
	pub bank_type: String,
	pub transactions: Vec<Transaction>,
	pub file_name: String,
	pub errors: Vec<String>,
	pub iban: String,
}

impl ParseResult {
	/// Empty result used by parsers when a structural failure aborts the file.
	pub fn structural_failure(bank_type: &str, error: String, iban: String) -> Self {
		Self {
			bank_type: bank_type.to_string(),
			transactions: Vec::new(),
			file_name: String::new(),
			errors: vec![error],
			iban,
		}
	}
}

/// Dispatcher output: the parse result plus file metadata.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ParsedStatement {
	#[serde(flatten)]
	pub result: ParseResult,
	pub file_size: u64,
	pub parsed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BankInfo {
	#[serde(rename = "type")]
	pub bank_type: String,
	pub name: String,
	pub can_auto_detect: bool,
}

/// Guard before trusting an externally sourced transaction. The type system
/// already pins the field types; what remains is that the date parsed and the
/// account identity is present.
pub fn validate_transaction(transaction: &Transaction) -> bool {
	!transaction.id.is_empty() && transaction.date.is_some() && !transaction.iban.is_empty()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> Transaction {
		Transaction {
			id: "abc123".to_string(),
			date: NaiveDate::from_ymd_opt(2023, 1, 1),
			description: "Maaş".to_string(),
			amount: 5000.0,
			balance: 5000.0,
			kind: TransactionType::Income,
			raw_data: vec!["01.01.2023".to_string(), "Maaş".to_string()],
			bank_type: "ziraat".to_string(),
			iban: "TR710011100000000083926637".to_string(),
		}
	}

	#[test]
	fn test_validate_accepts_complete_transaction() {
		assert!(validate_transaction(&sample()));
	}

	#[test]
	fn test_validate_rejects_missing_date() {
		let mut t = sample();
		t.date = None;
		assert!(!validate_transaction(&t));
	}

	#[test]
	fn test_validate_rejects_empty_iban() {
		let mut t = sample();
		t.iban = String::new();
		assert!(!validate_transaction(&t));
	}

	#[test]
	fn test_from_raw_defaults() {
		let t = Transaction::from_raw("id1".to_string(), vec!["x".to_string()]);
		assert_eq!(t.kind, TransactionType::Unknown);
		assert_eq!(t.iban, UNKNOWN_IBAN);
		assert_eq!(t.amount, 0.0);
		assert!(t.date.is_none());
	}

	#[test]
	fn test_transaction_type_serializes_lowercase() {
		let json = serde_json::to_string(&TransactionType::Income).unwrap();
		assert_eq!(json, "\"income\"");
	}
}
