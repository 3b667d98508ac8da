//! Root catalog definition

use serde::Deserialize;
use super::directory::{Capabilities, Directory, Features};
use super::table::{Column, ForeignKey, Table, TableName};
use crate::error::ParseError;

/// An in-memory catalog: schemas, their tables and the server features
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub features: Features,
    pub schemas: Vec<Schema>,
}

/// A named schema holding tables
#[derive(Debug, Clone, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Catalog {
    /// Fill in back-references and check that every foreign key points at
    /// existing columns
    pub(crate) fn finalize(mut self) -> Result<Self, ParseError> {
        for schema in &mut self.schemas {
            for table in &mut schema.tables {
                table.schema = schema.name.clone();
                let owner = TableName::new(&schema.name, &table.name);
                for fk in &mut table.foreign_keys {
                    if fk.schema.is_empty() {
                        fk.schema = schema.name.clone();
                    }
                    fk.table = owner.clone();
                }
            }
        }

        for table in self.tables() {
            for fk in &table.foreign_keys {
                self.check_foreign_key(table, fk)?;
            }
        }
        Ok(self)
    }

    fn check_foreign_key(&self, table: &Table, fk: &ForeignKey) -> Result<(), ParseError> {
        let invalid = |message: String| ParseError::Invalid { message };

        if fk.columns.is_empty() || fk.columns.len() != fk.references.columns.len() {
            return Err(invalid(format!(
                "Foreign key '{}:{}' must map the same non-zero number of columns on both sides",
                fk.schema, fk.name
            )));
        }
        if let Some(missing) = fk.columns.iter().find(|c| table.column(c).is_none()) {
            return Err(invalid(format!(
                "Foreign key '{}:{}' uses unknown column '{}' of {}",
                fk.schema, fk.name, missing, table.table_name()
            )));
        }
        let referenced = self.table(&fk.referenced_table()).ok_or_else(|| {
            invalid(format!(
                "Foreign key '{}:{}' references unknown table {}",
                fk.schema, fk.name, fk.referenced_table()
            ))
        })?;
        if let Some(missing) = fk.references.columns.iter().find(|c| referenced.column(c).is_none()) {
            return Err(invalid(format!(
                "Foreign key '{}:{}' references unknown column '{}' of {}",
                fk.schema, fk.name, missing, referenced.table_name()
            )));
        }
        Ok(())
    }

    /// Get a schema by name
    pub fn get_schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    /// Get a table by schema and table name
    pub fn get_table(&self, schema: &str, table: &str) -> Option<&Table> {
        self.get_schema(schema)?.tables.iter().find(|t| t.name == table)
    }

    /// All tables across all schemas
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.schemas.iter().flat_map(|s| s.tables.iter())
    }
}

impl Directory for Catalog {
    fn table(&self, name: &TableName) -> Option<&Table> {
        self.get_table(&name.schema, &name.table)
    }

    fn constraint(&self, schema: &str, name: &str) -> Option<&ForeignKey> {
        self.tables().find_map(|t| t.foreign_key(schema, name))
    }
}

impl Capabilities for Catalog {
    fn supports_quantified(&self, column: &Column) -> bool {
        self.features.supports_quantified(column)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_str;
    use crate::catalog::{Directory, TableName};

    const CATALOG: &str = r#"
features:
  quantified_value_lists: true
schemas:
  - name: s
    tables:
      - name: main
        columns:
          - { name: id, type: int4, nullok: false }
          - { name: fk_col, type: int4 }
        keys:
          - columns: [id]
        foreign_keys:
          - name: main_fk1
            columns: [fk_col]
            references: { schema: s, table: other, columns: [id] }
      - name: other
        columns:
          - { name: id, type: int4, nullok: false }
"#;

    #[test]
    fn test_finalize_fills_back_references() {
        let catalog = parse_str(CATALOG).unwrap();
        let fk = catalog.constraint("s", "main_fk1").unwrap();
        assert_eq!(fk.table, TableName::new("s", "main"));
        assert_eq!(fk.referenced_table(), TableName::new("s", "other"));
        assert_eq!(catalog.get_table("s", "other").unwrap().schema, "s");
    }

    #[test]
    fn test_unknown_referenced_column_is_rejected() {
        let broken = CATALOG.replace("columns: [id] }", "columns: [missing] }");
        let err = parse_str(&broken).unwrap_err();
        assert!(err.to_string().contains("unknown column 'missing'"), "{err}");
    }

    #[test]
    fn test_constraint_by_colset() {
        let catalog = parse_str(CATALOG).unwrap();
        let fk = catalog.constraint_by_colset(
            &TableName::new("s", "main"),
            &["fk_col".to_string()],
            &TableName::new("s", "other"),
            &["id".to_string()],
        );
        assert_eq!(fk.map(|fk| fk.name.as_str()), Some("main_fk1"));
    }
}
