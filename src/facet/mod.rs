//! Facet compiler (verb module)
//!
//! Facet blobs → path text. A blob is a conjunction of terms, each naming a
//! column (directly, through a path, or through a sourcekey) and the values
//! it is constrained to. Terms that share a named prefix share one join.

mod compile;
mod error;
mod options;
mod reverse;
mod search_box;
mod term;

pub use compile::{CompiledFacets, FacetCompiler};
pub use error::{FacetCause, FacetError, FacetErrorKind};
pub use options::{CompileOptions, FastFilters};
pub use reverse::{raw_source, reverse_as_facet, reversed_steps};
pub use term::{FacetTerm, TermSource};
