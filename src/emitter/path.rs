//! Path rendering
//!
//! Turns a compiled node list into path text. Forward rendering shares
//! prefixes through the [`AliasMapping`]; reversed rendering walks the path
//! from its far end and right-joins back onto the root.

use crate::resolver::{NodeKind, ParsedSource};
use super::alias::AliasMapping;
use super::error::RenderError;
use super::wire::JoinKind;

/// Rendered path text plus the alias bound to the end of the path
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedPath {
    pub path: String,
    pub alias: Option<String>,
}

/// Render a path from the root with inner joins
///
/// `sourcekey` is set when the whole path is a named definition, so it can
/// be shared with other paths through `mapping`.
pub fn render_path(
    source: &ParsedSource<'_>,
    sourcekey: Option<&str>,
    mapping: &mut AliasMapping,
) -> RenderedPath {
    render_keyed(source, sourcekey, mapping, JoinKind::Inner, None)
}

/// Render an all-outbound path with left joins, binding `out_alias` to its
/// end unless the end is shared under another alias
pub fn render_all_outbound(
    source: &ParsedSource<'_>,
    sourcekey: Option<&str>,
    mapping: &mut AliasMapping,
    out_alias: &str,
) -> Result<RenderedPath, RenderError> {
    if !source.is_all_outbound() {
        return Err(RenderError::NotAllOutbound(source.column.name.clone()));
    }
    Ok(render_keyed(source, sourcekey, mapping, JoinKind::Left, Some(out_alias.to_string())))
}

/// Render a path from its far end back to the root
///
/// The hop that reaches the root is right-joined and binds `out_alias`, so
/// rows of the root without related rows survive. Shared prefixes are
/// expanded in full.
pub fn render_reversed(source: &ParsedSource<'_>, out_alias: &str) -> String {
    let head = source.first_join_index();
    let mut parts = Vec::with_capacity(source.nodes.len());

    for (index, node) in source.nodes.iter().enumerate().rev() {
        let is_head = Some(index) == head;
        match &node.kind {
            NodeKind::Filter(filter) => parts.push(filter.text.clone()),
            NodeKind::Hop(hop) if is_head => {
                parts.push(format!("{out_alias}:={}", hop.wire(true, JoinKind::Right)));
            }
            NodeKind::Hop(hop) => parts.push(hop.wire(true, JoinKind::Inner)),
            NodeKind::Prefix { source: prefix, .. } => parts.push(render_reversed(prefix, out_alias)),
        }
    }

    parts.join("/")
}

fn render_keyed(
    source: &ParsedSource<'_>,
    sourcekey: Option<&str>,
    mapping: &mut AliasMapping,
    join: JoinKind,
    hint: Option<String>,
) -> RenderedPath {
    let key = sourcekey.filter(|_| source.has_path());

    if let Some(alias) = key.and_then(|k| mapping.get(k)) {
        let alias = alias.to_string();
        // the bound join already carries this source's filters
        return RenderedPath {
            path: format!("${alias}"),
            alias: Some(alias),
        };
    }

    // A path ending in a prefix shares the prefix's join, so the key takes
    // whatever alias that join ends up with
    let tail_is_prefix = source
        .last_join_index()
        .is_some_and(|i| source.nodes[i].is_prefix());
    let alias = match key {
        Some(k) if tail_is_prefix => mapping.forced_alias(k).or(hint),
        Some(k) if mapping.needs_alias(k) && (mapping.is_forced(k) || hint.is_none()) => {
            Some(mapping.allocate(k))
        }
        _ => hint,
    };
    let rendered = render_nodes(source, mapping, join, alias);

    if let (Some(key), Some(alias)) = (key, &rendered.alias) {
        mapping.bind(key, alias);
    }
    rendered
}

fn render_nodes(
    source: &ParsedSource<'_>,
    mapping: &mut AliasMapping,
    join: JoinKind,
    alias: Option<String>,
) -> RenderedPath {
    let tail = source.last_join_index();
    let mut parts = Vec::with_capacity(source.nodes.len());
    let mut bound = None;

    for (index, node) in source.nodes.iter().enumerate() {
        let is_tail = Some(index) == tail;
        match &node.kind {
            NodeKind::Filter(filter) => parts.push(filter.text.clone()),
            NodeKind::Hop(hop) => {
                let wire = hop.wire(false, join);
                match alias.as_deref().filter(|_| is_tail) {
                    Some(a) => {
                        parts.push(format!("{a}:={wire}"));
                        bound = Some(a.to_string());
                    }
                    None => parts.push(wire),
                }
            }
            NodeKind::Prefix { sourcekey, source: prefix } => {
                let hint = if is_tail { alias.clone() } else { None };
                let rendered = render_keyed(prefix, Some(sourcekey), mapping, join, hint);
                parts.push(rendered.path);
                if is_tail {
                    bound = rendered.alias;
                }
            }
        }
    }

    RenderedPath {
        path: parts.join("/"),
        alias: bound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::filter::{BraceTemplate, Row};
    use crate::parser::parse_str;
    use crate::resolver::SourceDefinitions;
    use crate::source::SourceSpec;
    use serde_json::{json, Value};

    const CATALOG: &str = r#"
schemas:
  - name: s
    tables:
      - name: main
        columns:
          - { name: id, type: int4, nullok: false }
          - { name: fk_col, type: int4 }
        foreign_keys:
          - { name: main_fk, columns: [fk_col], references: { schema: s, table: o1, columns: [id] } }
        source_definitions:
          to_o1:
            source: [{ outbound: [s, main_fk] }, { filter: id, operator: "::gt::", operand_pattern: "2" }, id]
          to_i1:
            source: [{ inbound: [s, i1_fk] }, id]
          o1_name:
            source: [{ sourcekey: to_o1 }, name]
      - name: o1
        columns:
          - { name: id, type: int4, nullok: false }
          - { name: name }
          - { name: fk_col, type: int4 }
        foreign_keys:
          - { name: o1_fk, columns: [fk_col], references: { schema: s, table: o2, columns: [id] } }
      - name: o2
        columns:
          - { name: id, type: int4, nullok: false }
      - name: i1
        columns:
          - { name: id, type: int4, nullok: false }
          - { name: main_id, type: int4 }
        foreign_keys:
          - { name: i1_fk, columns: [main_id], references: { schema: s, table: main, columns: [id] } }
"#;

    fn with_defs<F>(f: F)
    where
        F: for<'a> FnOnce(&SourceDefinitions<'a>, &'a Catalog),
    {
        let catalog = parse_str(CATALOG).unwrap();
        let table = catalog.get_table("s", "main").unwrap();
        let defs = SourceDefinitions::build(&catalog, table, &BraceTemplate, &Row::new());
        f(&defs, &catalog);
    }

    fn parse<'a>(defs: &SourceDefinitions<'a>, catalog: &'a Catalog, value: Value) -> crate::resolver::ParsedSource<'a> {
        let spec = SourceSpec::from_value(&value).unwrap();
        defs.resolve(catalog, &spec, &BraceTemplate, &Row::new()).unwrap()
    }

    fn parse_key<'a>(defs: &SourceDefinitions<'a>, key: &str) -> crate::resolver::ParsedSource<'a> {
        defs.get(key).map(|p| (**p).clone()).unwrap()
    }

    #[test]
    fn test_forward_path() {
        with_defs(|defs, catalog| {
            let parsed = parse(defs, catalog, json!([{"outbound": ["s", "main_fk"]}, {"outbound": ["s", "o1_fk"]}, "id"]));
            let mut mapping = AliasMapping::new("M");
            let rendered = render_path(&parsed, None, &mut mapping);
            assert_eq!(rendered.path, "(fk_col)=(s:o1:id)/(fk_col)=(s:o2:id)");
            assert_eq!(rendered.alias, None);
        });
    }

    #[test]
    fn test_reused_prefix_is_rendered_once() {
        with_defs(|defs, catalog| {
            let first = parse(defs, catalog, json!([{"sourcekey": "to_o1"}, {"outbound": ["s", "o1_fk"]}, "id"]));
            let second = parse(defs, catalog, json!([{"sourcekey": "to_o1"}, "name"]));
            let mut mapping = AliasMapping::new("M").with_reused(["to_o1"]);

            let a = render_path(&first, None, &mut mapping);
            assert_eq!(a.path, "M_P1:=(fk_col)=(s:o1:id)/id::gt::2/(fk_col)=(s:o2:id)");

            // the prefix filter is not repeated after the alias reference
            let b = render_path(&second, None, &mut mapping);
            assert_eq!(b.path, "$M_P1");
            assert_eq!(b.alias.as_deref(), Some("M_P1"));
        });
    }

    #[test]
    fn test_key_ending_in_shared_prefix_takes_its_alias() {
        with_defs(|defs, _catalog| {
            let parsed = parse_key(defs, "o1_name");
            let mut mapping = AliasMapping::new("M").with_reused(["o1_name", "to_o1"]);

            let first = render_path(&parsed, Some("o1_name"), &mut mapping);
            assert_eq!(first.path, "M_P1:=(fk_col)=(s:o1:id)/id::gt::2");
            assert_eq!(mapping.get("o1_name"), Some("M_P1"));

            // the filter already restricts the aliased join
            let second = render_path(&parsed, Some("o1_name"), &mut mapping);
            assert_eq!(second.path, "$M_P1");
        });
    }

    #[test]
    fn test_forced_alias_on_key_ending_in_prefix() {
        with_defs(|defs, _catalog| {
            let parsed = parse_key(defs, "o1_name");
            let forced = [("o1_name".to_string(), "T".to_string())].into_iter().collect();
            let mut mapping = AliasMapping::new("M").with_forced(forced).with_reused(["to_o1"]);

            let rendered = render_path(&parsed, Some("o1_name"), &mut mapping);
            assert_eq!(rendered.path, "T:=(fk_col)=(s:o1:id)/id::gt::2");
            assert_eq!(mapping.get("to_o1"), Some("T"));
            assert_eq!(mapping.get("o1_name"), Some("T"));
        });
    }

    #[test]
    fn test_unshared_prefix_is_inlined() {
        with_defs(|defs, catalog| {
            let parsed = parse(defs, catalog, json!([{"sourcekey": "to_o1"}, "name"]));
            let mut mapping = AliasMapping::new("M");
            let rendered = render_path(&parsed, None, &mut mapping);
            assert_eq!(rendered.path, "(fk_col)=(s:o1:id)/id::gt::2");
            assert!(mapping.aliases().is_empty());
        });
    }

    #[test]
    fn test_reversed_right_join() {
        with_defs(|defs, catalog| {
            let parsed = parse(
                defs,
                catalog,
                json!([{"filter": "id", "operand_pattern": "1"}, {"outbound": ["s", "main_fk"]}, {"outbound": ["s", "o1_fk"]}, "id"]),
            );
            assert_eq!(
                render_reversed(&parsed, "M"),
                "(id)=(s:o1:fk_col)/M:=right(id)=(s:main:fk_col)/id=1"
            );

            let inbound = parse(defs, catalog, json!([{"sourcekey": "to_i1"}, "id"]));
            assert_eq!(render_reversed(&inbound, "M"), "M:=right(main_id)=(s:main:id)");
        });
    }

    #[test]
    fn test_all_outbound() {
        with_defs(|defs, catalog| {
            let parsed = parse(defs, catalog, json!([{"outbound": ["s", "main_fk"]}, {"outbound": ["s", "o1_fk"]}, "id"]));
            let mut mapping = AliasMapping::new("M");
            let rendered = render_all_outbound(&parsed, None, &mut mapping, "F1").unwrap();
            assert_eq!(rendered.path, "left(fk_col)=(s:o1:id)/F1:=left(fk_col)=(s:o2:id)");
            assert_eq!(rendered.alias.as_deref(), Some("F1"));

            let inbound = parse(defs, catalog, json!([{"inbound": ["s", "i1_fk"]}, "id"]));
            assert_eq!(
                render_all_outbound(&inbound, None, &mut mapping, "F2"),
                Err(RenderError::NotAllOutbound("id".to_string()))
            );
        });
    }

    #[test]
    fn test_all_outbound_binds_hint_to_named_path() {
        with_defs(|defs, _catalog| {
            let parsed = defs.get("to_o1").unwrap();
            let mut mapping = AliasMapping::new("M");
            let rendered = render_all_outbound(parsed, Some("to_o1"), &mut mapping, "F1").unwrap();
            assert_eq!(rendered.path, "F1:=left(fk_col)=(s:o1:id)/id::gt::2");
            assert_eq!(mapping.get("to_o1"), Some("F1"));
        });
    }
}
