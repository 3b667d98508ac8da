//! Shared test utilities for integration tests

#![allow(dead_code)]

use facetpath::{
    parser, BraceTemplate, Catalog, CompileOptions, CompiledFacets, FacetCompiler, FacetError, Row,
    SourceDefinitions,
};
use serde_json::Value;

/// Load a test fixture from the tests/test_data directory
pub fn load_fixture(name: &str) -> Catalog {
    let path = format!("tests/test_data/{}", name);
    parser::parse_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

/// The default fixture
pub fn catalog() -> Catalog {
    load_fixture("catalog.yaml")
}

/// Compile a facet blob on `table` of schema `s` with default options
pub fn compile(catalog: &Catalog, table: &str, facets: Value) -> Result<CompiledFacets, FacetError> {
    compile_with(catalog, table, facets, CompileOptions::default())
}

/// Compile a facet blob on `table` of schema `s`
pub fn compile_with<'a>(
    catalog: &'a Catalog,
    table: &str,
    facets: Value,
    options: CompileOptions<'a>,
) -> Result<CompiledFacets, FacetError> {
    let root = catalog
        .get_table("s", table)
        .unwrap_or_else(|| panic!("No table s:{}", table));
    let row = Row::new();
    let defs = SourceDefinitions::build(catalog, root, &BraceTemplate, &row);
    FacetCompiler::new(catalog, catalog, &defs, &BraceTemplate, &row)
        .with_options(options)
        .compile(&facets)
}

/// Compile and return the path, panicking on failure
pub fn compile_path(catalog: &Catalog, table: &str, facets: Value) -> String {
    compile(catalog, table, facets)
        .unwrap_or_else(|e| panic!("Compile should succeed: {}", e))
        .path
}

/// Route library events to the test output; `RUST_LOG=facetpath=trace` shows
/// every rendered fragment
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
