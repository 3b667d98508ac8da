//! Constraint encoders (verb module)
//!
//! Facet constraints (choices, ranges, search terms and not-null) rendered
//! as path filters on a single column.

mod clause;
mod error;
mod search;

pub use clause::{Constraint, RangeBound};
pub use error::ConstraintError;
pub use search::{search_pattern, search_term_filter, tokenize};
