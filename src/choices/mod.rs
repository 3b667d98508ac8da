//! Choice resolver (verb module)
//!
//! Resolves facet choice values against live rows through a caller-supplied
//! [`RowLookup`], with a cap on lookups in flight.

mod error;
mod resolve;

pub use error::{ChoiceError, LookupError};
pub use resolve::{resolve_choices, ChoiceResolverConfig, ResolvedChoice, RowLookup};
