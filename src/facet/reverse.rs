//! Raw source paths and reverse facets

use serde_json::{json, Map, Value};
use crate::catalog::Directory;
use crate::filter::Row;
use crate::resolver::{NodeKind, ParsedSource};
use crate::source::{Direction, HopStep, HopTarget};
use super::term::{AND, SOURCE};

const CHOICES: &str = "choices";

/// The source array of a parsed source as it was declared
pub fn raw_source(source: &ParsedSource<'_>) -> Value {
    source.spec.to_value()
}

/// Path steps walking a parsed source from its end table back to its root
///
/// Prefixes are expanded and every hop flips direction, so the steps apply
/// to a source rooted at the end table.
pub fn reversed_steps(source: &ParsedSource<'_>) -> Vec<Value> {
    let mut steps = Vec::with_capacity(source.nodes.len());
    for node in source.nodes.iter().rev() {
        match &node.kind {
            NodeKind::Filter(filter) => steps.push(filter.node.to_value()),
            NodeKind::Hop(hop) => {
                let direction = match hop.direction {
                    Direction::Outbound => Direction::Inbound,
                    Direction::Inbound => Direction::Outbound,
                };
                let step = HopStep {
                    direction,
                    target: HopTarget::Constraint {
                        schema: hop.foreign_key.schema.clone(),
                        name: hop.foreign_key.name.clone(),
                    },
                    alias: None,
                };
                steps.push(step.to_value());
            }
            NodeKind::Prefix { source: prefix, .. } => steps.extend(reversed_steps(prefix)),
        }
    }
    steps
}

/// Facet blob on the end table of `source` selecting the rows related to
/// `row` of the root table
///
/// `None` when the source has no path, the root has no key, or `row` lacks
/// a value for a key column.
pub fn reverse_as_facet(source: &ParsedSource<'_>, directory: &dyn Directory, row: &Row) -> Option<Value> {
    if !source.has_path() {
        return None;
    }
    let key = directory.shortest_key(&source.root.table_name())?;
    let steps = reversed_steps(source);

    let terms = key
        .columns
        .iter()
        .map(|column| {
            let value = row.get(column).filter(|v| !v.is_null())?;
            let mut path = steps.clone();
            path.push(json!(column));
            let mut term = Map::new();
            term.insert(SOURCE.to_string(), Value::Array(path));
            term.insert(CHOICES.to_string(), json!([value]));
            Some(Value::Object(term))
        })
        .collect::<Option<Vec<_>>>()?;

    Some(json!({ AND: terms }))
}
