//! Tables, columns, keys and foreign keys

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use super::types::ColumnType;

/// Name of the row identifier system column
pub const RID: &str = "RID";

/// Schema-qualified table identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableName {
    pub schema: String,
    pub table: String,
}

impl TableName {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.schema, self.table)
    }
}

/// A column with the metadata the compiler consults
#[derive(Debug, Clone, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    /// Whether the column accepts NULL
    #[serde(default = "default_nullok")]
    pub nullok: bool,
}

fn default_nullok() -> bool {
    true
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullok: true,
        }
    }

    pub fn is_rid(&self) -> bool {
        self.name == RID
    }
}

/// A unique key
#[derive(Debug, Clone, Deserialize)]
pub struct Key {
    pub columns: Vec<String>,
}

/// The key side of a foreign key declaration
#[derive(Debug, Clone, Deserialize)]
pub struct KeyReference {
    pub schema: String,
    pub table: String,
    pub columns: Vec<String>,
}

/// A foreign key constraint declared on a table
///
/// `columns[i]` references `references.columns[i]`.
#[derive(Debug, Clone, Deserialize)]
pub struct ForeignKey {
    /// Schema the constraint name lives in (defaults to the table's schema)
    #[serde(default)]
    pub schema: String,
    pub name: String,
    pub columns: Vec<String>,
    pub references: KeyReference,
    /// Table declaring the constraint, filled in when the catalog is loaded
    #[serde(skip)]
    pub table: TableName,
}

impl ForeignKey {
    /// The table holding the referenced key
    pub fn referenced_table(&self) -> TableName {
        TableName::new(&self.references.schema, &self.references.table)
    }

    /// `(local, remote)` column pairs in declaration order
    pub fn column_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.references.columns.iter().map(String::as_str))
    }

    /// Whether this constraint maps exactly the given column pairs, in any order
    pub fn matches_colset(&self, columns: &[String], referenced_columns: &[String]) -> bool {
        if columns.len() != self.columns.len() || referenced_columns.len() != columns.len() {
            return false;
        }
        columns.iter().zip(referenced_columns).all(|(local, remote)| {
            self.column_pairs().any(|(l, r)| l == local && r == remote)
        })
    }
}

/// A table with its columns, keys, foreign keys and named sources
#[derive(Debug, Clone, Deserialize)]
pub struct Table {
    /// Owning schema, filled in when the catalog is loaded
    #[serde(skip)]
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub keys: Vec<Key>,
    /// Outbound foreign keys declared on this table
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    /// Named, reusable source definitions keyed by sourcekey (declaration order)
    #[serde(default)]
    pub source_definitions: Map<String, Value>,
    /// Column sources the search box looks at
    #[serde(default)]
    pub search_columns: Vec<Value>,
}

impl Table {
    pub fn table_name(&self) -> TableName {
        TableName::new(&self.schema, &self.name)
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get a foreign key declared on this table by constraint name
    pub fn foreign_key(&self, schema: &str, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys
            .iter()
            .find(|fk| fk.schema == schema && fk.name == name)
    }

    /// The key with the fewest columns (first declared wins ties)
    pub fn shortest_key(&self) -> Option<&Key> {
        self.keys.iter().min_by_key(|k| k.columns.len())
    }
}
