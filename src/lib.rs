//! facetpath - Compile facet and source-path specifications to REST query paths
//!
//! This library provides:
//! - Catalog metadata types (tables, columns, keys, foreign keys)
//! - Catalog parsing from YAML
//! - Source path resolution with shared named prefixes
//! - Facet compilation to path text, with join deduplication
//! - Stable hash tokens for source specifications
//! - Bounded-concurrency resolution of choice values
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `catalog/` - metadata (Catalog, Table, Column, ForeignKey) and the Directory trait
//! - `source/` - source specifications (SourceSpec, PathStep, HopStep)
//!
//! **Verb modules** (transformations):
//! - `parser/` - YAML → Catalog
//! - `filter/` - filter steps → FilterNode trees, canonical order, filter text
//! - `resolver/` - SourceSpec + Catalog → ParsedSource (node lists)
//! - `emitter/` - ParsedSource → path text, with an AliasMapping per pass
//! - `constraint/` - choices / ranges / search / not-null → filter text
//! - `hasher/` - SourceSpec → hash token
//! - `facet/` - facet blob → CompiledFacets
//! - `choices/` - choice values → rows, through a RowLookup
//!
//! # Example
//!
//! ```ignore
//! use facetpath::{parser, BraceTemplate, FacetCompiler, Row, SourceDefinitions};
//! use serde_json::json;
//!
//! let catalog = parser::parse_file("catalog.yaml")?;
//! let table = catalog.get_table("s", "main").unwrap();
//! let row = Row::new();
//! let defs = SourceDefinitions::build(&catalog, table, &BraceTemplate, &row);
//! let compiler = FacetCompiler::new(&catalog, &catalog, &defs, &BraceTemplate, &row);
//! let compiled = compiler.compile(&json!({"and": [{"source": "name", "choices": ["a"]}]}))?;
//! assert_eq!(compiled.path, "name=a/$M");
//! ```

pub mod catalog;
pub mod source;
pub mod parser;
pub mod filter;
pub mod resolver;
pub mod emitter;
pub mod constraint;
pub mod hasher;
pub mod facet;
pub mod choices;
pub mod error;

// Re-export commonly used types
pub use catalog::{Capabilities, Catalog, Column, ColumnType, Directory, Features, ForeignKey, Key, Table, TableName};
pub use source::{Direction, PathStep, SourceSpec, SpecError};
pub use filter::{BraceTemplate, FilterError, FilterNode, Row, TemplateEngine};
pub use resolver::{resolve_source, ParsedSource, SourceContext, SourceDefinitions, SourceError};
pub use emitter::{render_all_outbound, render_path, render_reversed, AliasMapping, RenderError};
pub use constraint::{Constraint, ConstraintError};
pub use hasher::{source_hash, source_object_hash};
pub use facet::{reverse_as_facet, CompileOptions, CompiledFacets, FacetCompiler, FacetError, FacetErrorKind, FastFilters};
pub use choices::{resolve_choices, ChoiceError, ChoiceResolverConfig, ResolvedChoice, RowLookup};
pub use error::ParseError;
