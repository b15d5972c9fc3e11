//! Core data types shared across the pipeline.

pub mod result_table;
pub mod transaction;

pub use result_table::{ColumnSchema, ColumnType, ResultTable, ScoredRow};
pub use transaction::TransactionRecord;
