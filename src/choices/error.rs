//! Choice resolution errors

use thiserror::Error;
use crate::constraint::ConstraintError;

/// Error type returned by a [`RowLookup`](super::RowLookup)
pub type LookupError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ChoiceError {
    #[error("cannot encode choices: {0}")]
    Constraint(#[from] ConstraintError),

    #[error("lookup for choice batch {batch} failed: {source}")]
    Lookup {
        batch: usize,
        #[source]
        source: LookupError,
    },
}
