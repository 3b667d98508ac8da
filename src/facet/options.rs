//! Compile options and fast filters

use serde::Deserialize;
use std::collections::HashMap;
use std::rc::Rc;
use crate::hasher::source_hash;
use crate::resolver::ParsedSource;
use crate::source::SourceSpec;

fn default_root_alias() -> String {
    "M".to_string()
}

/// Per-compile settings
#[derive(Debug, Clone, Deserialize)]
pub struct CompileOptions<'a> {
    /// Alias of the root table the path is appended to
    #[serde(default = "default_root_alias")]
    pub root_alias: String,
    /// Sourcekey → alias bindings the caller needs to reference afterwards
    #[serde(default)]
    pub forced_aliases: HashMap<String, String>,
    #[serde(skip)]
    pub fast_filters: FastFilters<'a>,
}

impl Default for CompileOptions<'_> {
    fn default() -> Self {
        Self {
            root_alias: default_root_alias(),
            forced_aliases: HashMap::new(),
            fast_filters: FastFilters::default(),
        }
    }
}

impl<'a> CompileOptions<'a> {
    pub fn with_root_alias(mut self, alias: impl Into<String>) -> Self {
        self.root_alias = alias.into();
        self
    }

    pub fn with_forced_alias(mut self, sourcekey: impl Into<String>, alias: impl Into<String>) -> Self {
        self.forced_aliases.insert(sourcekey.into(), alias.into());
        self
    }

    pub fn with_fast_filters(mut self, fast_filters: FastFilters<'a>) -> Self {
        self.fast_filters = fast_filters;
        self
    }
}

/// Precomputed sources that replace a facet's own source
///
/// Keyed by the hash token of the facet source they stand in for.
#[derive(Debug, Clone, Default)]
pub struct FastFilters<'a> {
    by_hash: HashMap<String, Rc<ParsedSource<'a>>>,
}

impl<'a> FastFilters<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `fast` whenever a facet's source is `facet_source`
    pub fn insert(&mut self, facet_source: &SourceSpec, fast: Rc<ParsedSource<'a>>) {
        self.by_hash.insert(source_hash(facet_source), fast);
    }

    pub fn get(&self, facet_source: &SourceSpec) -> Option<&Rc<ParsedSource<'a>>> {
        if self.by_hash.is_empty() {
            return None;
        }
        self.by_hash.get(&source_hash(facet_source))
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }
}
