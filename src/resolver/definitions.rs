//! Named source definitions of a table

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, info};
use crate::catalog::{Directory, Table};
use crate::filter::{Row, TemplateEngine};
use crate::hasher::source_hash;
use crate::source::{SourceSpec, SpecError, SEARCH_BOX};
use super::error::SourceError;
use super::resolve::{resolve_source, SourceContext};
use super::types::ParsedSource;

const SOURCE: &str = "source";

/// A resolved named definition
#[derive(Debug, Clone)]
pub struct Definition<'a> {
    pub key: String,
    /// The definition as declared, including display attributes
    pub object: &'a Map<String, Value>,
    pub source: Rc<ParsedSource<'a>>,
    /// This key plus every key its prefix chain depends on
    pub dependencies: Vec<String>,
}

/// The resolved named sources and search columns of one table
///
/// Built once per table and row context; every definition's filters are
/// expanded during the build and reused by every later compile.
#[derive(Debug, Clone)]
pub struct SourceDefinitions<'a> {
    table: &'a Table,
    definitions: HashMap<String, Definition<'a>>,
    order: Vec<String>,
    /// Source token to every sourcekey declared with that source
    by_hash: HashMap<String, Vec<String>>,
    search_columns: Vec<Rc<ParsedSource<'a>>>,
}

impl<'a> SourceDefinitions<'a> {
    /// Resolve the table's definitions in declaration order
    ///
    /// A definition may only use earlier definitions as its prefix. Invalid
    /// definitions are logged and left out.
    pub fn build(
        directory: &'a dyn Directory,
        table: &'a Table,
        engine: &dyn TemplateEngine,
        row: &Row,
    ) -> Self {
        let mut defs = Self {
            table,
            definitions: HashMap::new(),
            order: Vec::new(),
            by_hash: HashMap::new(),
            search_columns: Vec::new(),
        };

        for (key, value) in &table.source_definitions {
            match defs.resolve_definition(directory, key, value, engine, row) {
                Ok(definition) => {
                    debug!(table = %table.table_name(), sourcekey = %key, "resolved source definition");
                    defs.order.push(key.clone());
                    defs.by_hash
                        .entry(source_hash(&definition.source.spec))
                        .or_default()
                        .push(key.clone());
                    defs.definitions.insert(key.clone(), definition);
                }
                Err(err) => {
                    info!(table = %table.table_name(), sourcekey = %key, error = %err, "skipping invalid source definition");
                }
            }
        }

        for value in &table.search_columns {
            let spec = match value {
                Value::Object(obj) => obj.get(SOURCE).map(SourceSpec::from_value),
                other => Some(SourceSpec::from_value(other)),
            };
            let resolved = match spec {
                Some(Ok(spec)) => defs.resolve(directory, &spec, engine, row),
                Some(Err(err)) => Err(err.into()),
                None => continue,
            };
            match resolved {
                Ok(parsed) => defs.search_columns.push(Rc::new(parsed)),
                Err(err) => {
                    info!(table = %table.table_name(), error = %err, "skipping invalid search column");
                }
            }
        }

        defs
    }

    fn resolve_definition(
        &self,
        directory: &'a dyn Directory,
        key: &str,
        value: &'a Value,
        engine: &dyn TemplateEngine,
        row: &Row,
    ) -> Result<Definition<'a>, SourceError> {
        if key == SEARCH_BOX {
            return Err(SourceError::UnresolvedSourcekey(key.to_string()));
        }
        let object = value.as_object().ok_or_else(|| {
            SourceError::Spec(SpecError::InvalidShape(format!("definition '{key}' must be an object")))
        })?;
        let spec_value = object.get(SOURCE).ok_or_else(|| {
            SourceError::Spec(SpecError::InvalidShape(format!("definition '{key}' has no `source`")))
        })?;
        let spec = SourceSpec::from_value(spec_value)?;
        let source = self.resolve(directory, &spec, engine, row)?;

        let mut dependencies = vec![key.to_string()];
        if let Some(prefix) = spec.prefix() {
            dependencies.extend(self.dependencies(prefix).iter().cloned());
        }

        Ok(Definition {
            key: key.to_string(),
            object,
            source: Rc::new(source),
            dependencies,
        })
    }

    /// Resolve a source rooted at this table against the definitions so far
    pub fn resolve(
        &self,
        directory: &'a dyn Directory,
        spec: &SourceSpec,
        engine: &dyn TemplateEngine,
        row: &Row,
    ) -> Result<ParsedSource<'a>, SourceError> {
        let ctx = SourceContext {
            directory,
            root: self.table,
            definitions: Some(self),
            row,
            engine,
        };
        resolve_source(spec, &ctx)
    }

    /// Get a resolved definition by sourcekey
    pub fn definition(&self, key: &str) -> Option<&Definition<'a>> {
        self.definitions.get(key)
    }

    /// Get the parsed source of a definition
    pub fn get(&self, key: &str) -> Option<&Rc<ParsedSource<'a>>> {
        self.definitions.get(key).map(|d| &d.source)
    }

    /// Keys a definition depends on, itself included; empty when undefined
    pub fn dependencies(&self, key: &str) -> &[String] {
        self.definitions
            .get(key)
            .map(|d| d.dependencies.as_slice())
            .unwrap_or_default()
    }

    /// Sourcekeys whose source hashes to `hash`, in declaration order
    pub fn sourcekeys_for_hash(&self, hash: &str) -> &[String] {
        self.by_hash.get(hash).map(Vec::as_slice).unwrap_or_default()
    }

    /// Definition keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn search_columns(&self) -> &[Rc<ParsedSource<'a>>] {
        &self.search_columns
    }
}
