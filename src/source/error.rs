use thiserror::Error;
use crate::filter::FilterError;

/// Errors raised when a source description has the wrong shape
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    #[error("Invalid source: {0}")]
    InvalidShape(String),
    #[error(transparent)]
    Filter(#[from] FilterError),
}
