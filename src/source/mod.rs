//! Source specification types (nouns)
//!
//! A source names a column reached from a root table through foreign key
//! hops, filters and named path prefixes.

mod error;
mod spec;

pub use error::SpecError;
pub use spec::{Direction, HopStep, HopTarget, PathStep, SourceSpec, SEARCH_BOX};
