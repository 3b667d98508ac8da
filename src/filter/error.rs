use thiserror::Error;
use crate::catalog::TableName;

/// Errors raised while parsing, expanding or rendering a filter tree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Invalid filter node: {0}")]
    InvalidShape(String),
    #[error("Invalid filter operator '{0}'")]
    InvalidOperator(String),
    #[error("Filter column '{column}' not found in table {table}")]
    UnknownColumn { column: String, table: TableName },
    #[error("Operand of the filter on '{0}' is empty")]
    EmptyOperand(String),
    #[error("Operand of the filter on '{0}' has not been expanded")]
    Unexpanded(String),
}
