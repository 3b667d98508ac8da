//! Integration tests for the table search box

mod common;

use common::{catalog, compile, compile_path};
use facetpath::FacetErrorKind;
use pretty_assertions::assert_eq;
use serde_json::json;

fn search(terms: serde_json::Value) -> serde_json::Value {
    json!({"and": [{"sourcekey": "search-box", "search": terms}]})
}

#[test]
fn test_whole_row_search_without_search_columns() {
    let catalog = catalog();
    assert_eq!(compile_path(&catalog, "main", search(json!(["abc"]))), "*::ciregexp::abc/$M");
    assert_eq!(compile_path(&catalog, "main", search(json!(["a b"]))), "*::ciregexp::all(a,b)/$M");
}

#[test]
fn test_numeric_tokens_are_anchored() {
    let catalog = catalog();
    assert_eq!(
        compile_path(&catalog, "main", search(json!(["11"]))),
        "*::ciregexp::%5E%28.%2A%5B%5E0-9.%5D%29%3F0%2A11%28%5B%5E0-9%5D.%2A%7C%24%29/$M"
    );
}

#[test]
fn test_single_local_search_column() {
    let catalog = catalog();
    assert_eq!(compile_path(&catalog, "o2", search(json!(["abc"]))), "name::ciregexp::abc/$M");
}

#[test]
fn test_search_columns_behind_a_path_are_left_joined() {
    let catalog = catalog();
    let compiled = compile(&catalog, "o1", search(json!(["abc"]))).unwrap();
    assert_eq!(
        compiled.path,
        "M_P1:=left(o2_id)=(s:o2:id)/$M/(name::ciregexp::abc;M_P1:name::ciregexp::abc)/$M"
    );
    assert_eq!(compiled.alias_mapping.get("o2_path"), Some("M_P1"));
}

#[test]
fn test_every_token_must_match_some_column() {
    let catalog = catalog();
    assert_eq!(
        compile_path(&catalog, "o1", search(json!(["a b"]))),
        "M_P1:=left(o2_id)=(s:o2:id)/$M/(name::ciregexp::a;M_P1:name::ciregexp::a)&(name::ciregexp::b;M_P1:name::ciregexp::b)/$M"
    );
}

#[test]
fn test_search_box_shares_its_join_with_later_terms() {
    let catalog = catalog();
    let path = compile_path(
        &catalog,
        "o1",
        json!({"and": [
            {"sourcekey": "search-box", "search": ["abc"]},
            {"sourcekey": "o2_path", "choices": [1]}
        ]}),
    );
    assert_eq!(
        path,
        "M_P1:=left(o2_id)=(s:o2:id)/$M/(name::ciregexp::abc;M_P1:name::ciregexp::abc)/$M/$M_P1/id=1/$M"
    );
}

#[test]
fn test_search_box_requires_search_terms() {
    let catalog = catalog();
    for facets in [
        json!({"and": [{"sourcekey": "search-box", "choices": ["a"]}]}),
        search(json!([])),
        search(json!(["   "])),
    ] {
        let err = compile(&catalog, "o1", facets).unwrap_err();
        assert_eq!(err.kind, FacetErrorKind::InvalidSearch);
        assert_eq!(err.index, Some(0));
    }
}

#[test]
fn test_search_column_filtered_on_the_root_is_rejected() {
    let catalog = catalog();
    let err = compile(&catalog, "f1", search(json!(["abc"]))).unwrap_err();
    assert_eq!(err.kind, FacetErrorKind::InvalidSearch);
    assert_eq!(err.index, Some(0));
}
