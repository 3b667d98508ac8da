//! Filter tree parser and canonical sorter (verb module)
//!
//! Parses `filter` / `and` / `or` path steps into [`FilterNode`] trees,
//! expands operand templates once, renders them as path filters and orders
//! them canonically for hashing.

mod error;
mod node;
mod render;
mod sort;
mod template;

pub use error::FilterError;
pub use node::{FilterLeaf, FilterNode, FilterOperator, Operand};
pub use template::{BraceTemplate, Row, TemplateEngine};
