pub mod cells;
pub mod iban;
pub mod normalize;
pub mod parser;
pub mod rows;

// Re-export commonly used items
pub use crate::cells::{cell_is_blank, cell_str, first_sheet_grid, row_strings, Grid};
pub use crate::iban::{extract_account_number, extract_iban};
pub use crate::normalize::{parse_amount, parse_date};
pub use crate::parser::{BankDescriptor, BankParser};
pub use crate::rows::{
    find_header_row, generate_row_id, is_valid_transaction_row, rolling_hash, to_base36,
    DEFAULT_HEADER_KEYWORDS,
};
