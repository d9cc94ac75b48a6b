pub mod schema;
pub mod transactions;

// Re-export commonly used items
pub use crate::schema::{migrate_transaction, validate_schema, validate_stored, SchemaValidation};
pub use crate::transactions::{
    merge_transactions_with_deduplication, sort_transactions_by_date, MergeStats,
};
