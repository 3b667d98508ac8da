use serde_json::{Map, Value};
use crate::source::{HopTarget, PathStep, SourceSpec, SpecError};

const SOURCE: &str = "source";
const ENTITY: &str = "entity";
const AGGREGATE: &str = "aggregate";
const SELF_LINK: &str = "self_link";

/// Canonical text of a source path
pub fn canonical_source(spec: &SourceSpec) -> String {
    let mut parts: Vec<String> = spec.steps.iter().map(canonical_step).collect();
    parts.push(quote(&spec.column));
    format!("[{}]", parts.join(","))
}

/// Canonical text of a source object
///
/// Only `source`, `entity: false`, `aggregate` and `self_link: true` take
/// part; display attributes do not change what is being pointed at.
pub fn canonical_object(object: &Map<String, Value>) -> Result<String, SpecError> {
    let source = object
        .get(SOURCE)
        .ok_or_else(|| SpecError::InvalidShape("missing `source`".to_string()))?;
    let mut out = format!("{{{}:{}", quote(SOURCE), canonical_source(&SourceSpec::from_value(source)?));

    if object.get(ENTITY) == Some(&Value::Bool(false)) {
        out.push_str(&format!(",{}:false", quote(ENTITY)));
    }
    if let Some(Value::String(aggregate)) = object.get(AGGREGATE) {
        out.push_str(&format!(",{}:{}", quote(AGGREGATE), quote(aggregate)));
    }
    if object.get(SELF_LINK) == Some(&Value::Bool(true)) {
        out.push_str(&format!(",{}:true", quote(SELF_LINK)));
    }
    out.push('}');
    Ok(out)
}

fn canonical_step(step: &PathStep) -> String {
    match step {
        PathStep::Prefix(key) => format!("{{\"sourcekey\":{}}}", quote(key)),
        PathStep::Filter(node) => format!("{{\"filter\":{}}}", quote(&node.canonical().canonical_text())),
        PathStep::Hop(hop) => {
            let target = match &hop.target {
                HopTarget::Constraint { schema, name } => format!("[{},{}]", quote(schema), quote(name)),
                HopTarget::Colset { remote, local_columns, remote_columns } => {
                    let mut pairs: Vec<(&String, &String)> = local_columns.iter().zip(remote_columns).collect();
                    pairs.sort();
                    let mapping: Vec<String> = pairs
                        .iter()
                        .map(|(l, r)| format!("{}:{}", quote(l), quote(r)))
                        .collect();
                    format!(
                        "{{\"remote_schema\":{},\"remote_table\":{},\"local_to_remote_columns\":{{{}}}}}",
                        quote(&remote.schema),
                        quote(&remote.table),
                        mapping.join(",")
                    )
                }
            };
            let alias = hop
                .alias
                .as_ref()
                .map(|a| format!(",\"alias\":{}", quote(a)))
                .unwrap_or_default();
            format!("{{{}:{}{}}}", quote(hop.direction.as_str()), target, alias)
        }
    }
}

/// JSON string literal
fn quote(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}
