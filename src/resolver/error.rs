use thiserror::Error;
use crate::catalog::TableName;
use crate::filter::FilterError;
use crate::source::{Direction, SpecError};

/// Errors that can occur while resolving a source path
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error(transparent)]
    Spec(#[from] SpecError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("Constraint '{schema}:{name}' not found")]
    UnknownConstraint { schema: String, name: String },
    #[error("No foreign key maps the given columns between {table} and {remote}")]
    NoMatchingConstraint { table: TableName, remote: TableName },
    #[error("Constraint '{constraint}' cannot be followed {direction} from {table}")]
    DirectionMismatch {
        constraint: String,
        direction: Direction,
        table: TableName,
    },
    #[error("Table {0} not found")]
    UnknownTable(TableName),
    #[error("Sourcekey '{0}' is not defined")]
    UnresolvedSourcekey(String),
    #[error("Sourcekey '{0}' does not describe a foreign key path")]
    NotAPath(String),
    #[error("Sourcekey '{0}' may only be used as the first step of a path")]
    MisplacedSourcekey(String),
    #[error("Column '{column}' not found in table {table}")]
    InvalidColumn { column: String, table: TableName },
}
