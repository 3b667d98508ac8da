//! Source path parser (verb module)
//!
//! Resolves source specifications against the catalog into compiled node
//! lists, and builds the named source definitions of a table.

mod definitions;
mod error;
mod resolve;
mod types;

pub use definitions::{Definition, SourceDefinitions};
pub use error::SourceError;
pub use resolve::{resolve_source, SourceContext};
pub use types::{CompiledFilter, CompiledNode, ForeignKeyHop, NodeKind, ParsedSource};
