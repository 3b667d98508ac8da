//! Catalog types (nouns)
//!
//! Tables, columns, keys and foreign keys, plus the lookup traits the
//! compiler consumes them through.

mod directory;
mod schema;
mod table;
mod types;

pub use directory::{Capabilities, Directory, Features};
pub use schema::{Catalog, Schema};
pub use table::{Column, ForeignKey, Key, KeyReference, Table, TableName, RID};
pub use types::{ColumnType, ParseColumnTypeError};
