use thiserror::Error;

/// Errors raised while reading or encoding a facet constraint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("Invalid choices: {0}")]
    InvalidChoice(String),
    #[error("Invalid ranges: {0}")]
    InvalidRange(String),
    #[error("Invalid search: {0}")]
    InvalidSearch(String),
}
