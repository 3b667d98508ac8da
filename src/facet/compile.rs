//! The facet compile pass

use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use tracing::{debug, trace};
use crate::catalog::{Capabilities, Directory};
use crate::constraint::Constraint;
use crate::emitter::{encode_table, render_path, render_reversed, AliasMapping};
use crate::filter::{Row, TemplateEngine};
use crate::hasher::source_hash;
use crate::resolver::{ParsedSource, SourceDefinitions};
use crate::source::{SourceSpec, SEARCH_BOX};
use super::error::{FacetError, FacetErrorKind};
use super::options::CompileOptions;
use super::term::{FacetTerm, TermSource, AND, OR, SOURCE, SOURCEKEY};

/// Output of a successful compile
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFacets {
    /// Path text to append after the root table
    pub path: String,
    /// The path starts from another table and right-joins back onto the
    /// root, so it replaces the root segment instead of following it
    pub right_join: bool,
    /// Aliases bound during the pass, for later compiles over the same query
    pub alias_mapping: AliasMapping,
}

/// Rendered output of one term
enum Fragment {
    Inner(String),
    Right(String),
}

/// Compiles facet blobs rooted at one table
///
/// Holds only borrowed metadata; each call to [`FacetCompiler::compile`]
/// runs an independent pass with its own alias mapping.
pub struct FacetCompiler<'a, 'c> {
    pub(super) directory: &'a dyn Directory,
    pub(super) capabilities: &'c dyn Capabilities,
    pub(super) definitions: &'c SourceDefinitions<'a>,
    pub(super) engine: &'c dyn TemplateEngine,
    pub(super) row: &'c Row,
    pub(super) options: CompileOptions<'a>,
}

impl<'a, 'c> FacetCompiler<'a, 'c> {
    pub fn new(
        directory: &'a dyn Directory,
        capabilities: &'c dyn Capabilities,
        definitions: &'c SourceDefinitions<'a>,
        engine: &'c dyn TemplateEngine,
        row: &'c Row,
    ) -> Self {
        Self {
            directory,
            capabilities,
            definitions,
            engine,
            row,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions<'a>) -> Self {
        self.options = options;
        self
    }

    /// Compile a `{"and": [term, ...]}` blob into path text
    ///
    /// Stops at the first failing term; the error carries its index.
    pub fn compile(&self, facets: &Value) -> Result<CompiledFacets, FacetError> {
        let terms = conjuncts(facets)?;

        let mut mapping = AliasMapping::new(self.options.root_alias.as_str())
            .with_forced(self.options.forced_aliases.clone())
            .with_reused(reused_keys(terms, self.definitions));

        let mut right_join: Option<String> = None;
        let mut inner = Vec::with_capacity(terms.len());

        for (index, term) in terms.iter().enumerate() {
            match self.compile_term(term, &mut mapping).map_err(|e| e.at(index))? {
                Fragment::Right(_) if right_join.is_some() => {
                    return Err(FacetError::new(FacetErrorKind::DuplicateRightJoin).at(index));
                }
                Fragment::Right(text) => right_join = Some(text),
                Fragment::Inner(text) => inner.push(text),
            }
        }

        let is_right_join = right_join.is_some();
        let path = right_join.into_iter().chain(inner).collect::<Vec<_>>().join("/");
        debug!(terms = terms.len(), right_join = is_right_join, aliases = mapping.aliases().len(), "compiled facets");

        Ok(CompiledFacets {
            path,
            right_join: is_right_join,
            alias_mapping: mapping,
        })
    }

    fn compile_term(&self, value: &Value, mapping: &mut AliasMapping) -> Result<Fragment, FacetError> {
        let term = FacetTerm::parse(value, self.definitions)?;
        if term.origin == TermSource::SearchBox {
            return self.search_box(&term, mapping).map(Fragment::Inner);
        }

        let spec = term.source()?;
        let (parsed, sourcekey) = self.parsed_source(&term, &spec)?;
        let constraints = term.constraints()?;
        let filter = constraint_text(&constraints, &parsed, self.capabilities)?;
        let root = format!("${}", mapping.root_alias());

        let fragment = if parsed.has_path() && constraints.iter().any(Constraint::has_null_choice) {
            let reversed = render_reversed(&parsed, mapping.root_alias());
            Fragment::Right(format!("{}/{filter}/{reversed}", encode_table(&parsed.table.table_name())))
        } else {
            let rendered = render_path(&parsed, sourcekey.as_deref(), mapping);
            let parts = [rendered.path, filter, root];
            Fragment::Inner(parts.iter().filter(|p| !p.is_empty()).cloned().collect::<Vec<_>>().join("/"))
        };

        match &fragment {
            Fragment::Right(text) => trace!(fragment = %text, "right join fragment"),
            Fragment::Inner(text) => trace!(fragment = %text, "inner join fragment"),
        }
        debug!(sourcekey = ?term.sourcekey(), column = %parsed.column.name, "compiled facet term");
        Ok(fragment)
    }

    /// The source a term filters on, with the sourcekey to share it under
    fn parsed_source(
        &self,
        term: &FacetTerm,
        spec: &SourceSpec,
    ) -> Result<(Rc<ParsedSource<'a>>, Option<String>), FacetError> {
        if let Some(fast) = self.options.fast_filters.get(spec) {
            debug!(column = %spec.column, "using fast filter source");
            return Ok((Rc::clone(fast), None));
        }

        if let Some(key) = term.sourcekey() {
            let parsed = self
                .definitions
                .get(key)
                .ok_or_else(|| FacetError::new(FacetErrorKind::InvalidSourcekey))?;
            return Ok((Rc::clone(parsed), Some(key.to_string())));
        }

        // A raw source declared under a name reuses that definition's resolution
        let hash = source_hash(spec);
        if let Some(parsed) = self
            .definitions
            .sourcekeys_for_hash(&hash)
            .first()
            .and_then(|key| self.definitions.get(key))
        {
            return Ok((Rc::clone(parsed), None));
        }

        let parsed = self.definitions.resolve(self.directory, spec, self.engine, self.row)?;
        Ok((Rc::new(parsed), None))
    }
}

/// The term list of a facet blob
fn conjuncts(facets: &Value) -> Result<&[Value], FacetError> {
    let obj = facets
        .as_object()
        .ok_or_else(|| FacetError::new(FacetErrorKind::InvalidFacet))?;
    match obj.get(AND) {
        Some(Value::Array(terms)) if !terms.is_empty() => Ok(terms),
        Some(_) => Err(FacetError::new(FacetErrorKind::InvalidFacet)),
        None if obj.contains_key(OR) => Err(FacetError::new(FacetErrorKind::InvalidBooleanOperator)),
        None => Err(FacetError::new(FacetErrorKind::InvalidFacet)),
    }
}

/// Sourcekeys that more than one path in the blob goes through
///
/// Search-box columns count once per column, since each is joined separately.
fn reused_keys(terms: &[Value], definitions: &SourceDefinitions<'_>) -> BTreeSet<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut count = |key: &str| {
        for dependency in definitions.dependencies(key) {
            *counts.entry(dependency.clone()).or_default() += 1;
        }
    };

    for term in terms.iter().filter_map(Value::as_object) {
        match term.get(SOURCEKEY).and_then(Value::as_str) {
            Some(SEARCH_BOX) => {
                for column in definitions.search_columns() {
                    if let Some(prefix) = column.spec.prefix() {
                        count(prefix);
                    }
                }
            }
            Some(key) => count(key),
            None => {
                let spec = term.get(SOURCE).and_then(|v| SourceSpec::from_value(v).ok());
                if let Some(prefix) = spec.as_ref().and_then(SourceSpec::prefix) {
                    count(prefix);
                }
            }
        }
    }

    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(key, _)| key)
        .collect()
}

/// Clauses of one term, disjoined
fn constraint_text(
    constraints: &[Constraint],
    parsed: &ParsedSource<'_>,
    capabilities: &dyn Capabilities,
) -> Result<String, FacetError> {
    let clauses = constraints
        .iter()
        .map(|c| c.encode(parsed.column, capabilities))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(clauses.join(";"))
}
