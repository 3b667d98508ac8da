//! Lookup interfaces the compiler consumes

use serde::Deserialize;
use super::table::{Column, ForeignKey, Key, Table, TableName};

/// Metadata lookups over tables and constraints
///
/// The compiler never owns the catalog; everything it needs about tables,
/// columns and constraints comes through this trait.
pub trait Directory {
    /// Look up a table by its qualified name
    fn table(&self, name: &TableName) -> Option<&Table>;

    /// Look up a foreign key by constraint name
    fn constraint(&self, schema: &str, name: &str) -> Option<&ForeignKey>;

    /// Look up a foreign key declared on `table` whose `columns` reference
    /// `referenced_columns` of `referenced`
    fn constraint_by_colset(
        &self,
        table: &TableName,
        columns: &[String],
        referenced: &TableName,
        referenced_columns: &[String],
    ) -> Option<&ForeignKey> {
        self.table(table)?.foreign_keys.iter().find(|fk| {
            fk.referenced_table() == *referenced && fk.matches_colset(columns, referenced_columns)
        })
    }

    /// The shortest unique key of a table
    fn shortest_key(&self, table: &TableName) -> Option<&Key> {
        self.table(table)?.shortest_key()
    }
}

/// Whether quantified list syntax (`any(...)`, `all(...)`) may be used
pub trait Capabilities {
    fn supports_quantified(&self, column: &Column) -> bool;
}

/// Server feature flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Features {
    #[serde(default)]
    pub quantified_value_lists: bool,
    #[serde(default)]
    pub quantified_rid_lists: bool,
}

impl Capabilities for Features {
    fn supports_quantified(&self, column: &Column) -> bool {
        if column.is_rid() {
            self.quantified_rid_lists
        } else {
            self.quantified_value_lists
        }
    }
}
