//! Path steps and their JSON grammar

use serde_json::{json, Map, Value};
use std::fmt;
use super::error::SpecError;
use crate::catalog::TableName;
use crate::filter::FilterNode;

/// Reserved sourcekey for the table's search box
pub const SEARCH_BOX: &str = "search-box";

const SOURCEKEY: &str = "sourcekey";
const INBOUND: &str = "inbound";
const OUTBOUND: &str = "outbound";
const ALIAS: &str = "alias";
const REMOTE_SCHEMA: &str = "remote_schema";
const REMOTE_TABLE: &str = "remote_table";
const LOCAL_COLUMNS: &str = "local_columns";
const REMOTE_COLUMNS: &str = "remote_columns";
const LOCAL_TO_REMOTE_COLUMNS: &str = "local_to_remote_columns";

/// Direction a foreign key is traversed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From the referencing table to the referenced key
    Outbound,
    /// From the referenced key back to the referencing table
    Inbound,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outbound => OUTBOUND,
            Direction::Inbound => INBOUND,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a hop names its foreign key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HopTarget {
    /// `[schema, constraint_name]`
    Constraint { schema: String, name: String },
    /// Column mapping from the current table to `remote`
    Colset {
        remote: TableName,
        local_columns: Vec<String>,
        remote_columns: Vec<String>,
    },
}

/// One foreign key traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopStep {
    pub direction: Direction,
    pub target: HopTarget,
    pub alias: Option<String>,
}

/// A non-terminal step of a source path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Hop(HopStep),
    /// Reference to a named source definition
    Prefix(String),
    Filter(FilterNode),
}

/// Ordered path steps ending in a column name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub steps: Vec<PathStep>,
    pub column: String,
}

impl SourceSpec {
    /// A source that is just a column of the root table
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            steps: Vec::new(),
            column: name.into(),
        }
    }

    /// Parse a `source` attribute: a column name or an array of steps ending
    /// in a column name
    pub fn from_value(value: &Value) -> Result<Self, SpecError> {
        match value {
            Value::String(column) => Ok(Self::column(column.as_str())),
            Value::Array(items) => {
                let Some((last, steps)) = items.split_last() else {
                    return Err(SpecError::InvalidShape("source path is empty".to_string()));
                };
                let column = last.as_str().ok_or_else(|| {
                    SpecError::InvalidShape(format!("source path must end in a column name, got {last}"))
                })?;
                let steps = steps.iter().map(parse_step).collect::<Result<Vec<_>, _>>()?;
                Ok(Self {
                    steps,
                    column: column.to_string(),
                })
            }
            other => Err(SpecError::InvalidShape(format!(
                "source must be a column name or an array, got {other}"
            ))),
        }
    }

    /// Whether the source has any step besides the column
    pub fn has_path(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Sourcekey of the leading prefix step, if any
    pub fn prefix(&self) -> Option<&str> {
        match self.steps.first() {
            Some(PathStep::Prefix(key)) => Some(key),
            _ => None,
        }
    }

    /// JSON form accepted by [`SourceSpec::from_value`]
    pub fn to_value(&self) -> Value {
        if self.steps.is_empty() {
            return json!(self.column);
        }
        let mut items: Vec<Value> = self.steps.iter().map(PathStep::to_value).collect();
        items.push(json!(self.column));
        Value::Array(items)
    }
}

impl PathStep {
    pub fn to_value(&self) -> Value {
        match self {
            PathStep::Prefix(key) => json!({ SOURCEKEY: key }),
            PathStep::Filter(node) => node.to_value(),
            PathStep::Hop(hop) => hop.to_value(),
        }
    }
}

impl HopStep {
    pub fn to_value(&self) -> Value {
        let target = match &self.target {
            HopTarget::Constraint { schema, name } => json!([schema, name]),
            HopTarget::Colset { remote, local_columns, remote_columns } => {
                let mapping: Map<String, Value> = local_columns
                    .iter()
                    .zip(remote_columns)
                    .map(|(l, r)| (l.clone(), json!(r)))
                    .collect();
                json!({
                    REMOTE_SCHEMA: remote.schema,
                    REMOTE_TABLE: remote.table,
                    LOCAL_TO_REMOTE_COLUMNS: mapping,
                })
            }
        };
        let mut obj = Map::new();
        if let Some(alias) = &self.alias {
            obj.insert(ALIAS.to_string(), json!(alias));
        }
        obj.insert(self.direction.as_str().to_string(), target);
        Value::Object(obj)
    }
}

fn parse_step(value: &Value) -> Result<PathStep, SpecError> {
    let obj = value
        .as_object()
        .ok_or_else(|| SpecError::InvalidShape(format!("path step must be an object, got {value}")))?;

    if let Some(key) = obj.get(SOURCEKEY) {
        let key = key
            .as_str()
            .ok_or_else(|| SpecError::InvalidShape("`sourcekey` must be a string".to_string()))?;
        return Ok(PathStep::Prefix(key.to_string()));
    }

    if FilterNode::is_filter_object(obj) {
        return Ok(PathStep::Filter(FilterNode::from_value(value)?));
    }

    let (direction, target) = match (obj.get(OUTBOUND), obj.get(INBOUND)) {
        (Some(target), None) => (Direction::Outbound, target),
        (None, Some(target)) => (Direction::Inbound, target),
        _ => {
            return Err(SpecError::InvalidShape(format!(
                "path step must have exactly one of `inbound`, `outbound`, `sourcekey` or a filter: {value}"
            )));
        }
    };

    let alias = match obj.get(ALIAS) {
        None => None,
        Some(Value::String(a)) => Some(a.clone()),
        Some(other) => return Err(SpecError::InvalidShape(format!("`alias` must be a string, got {other}"))),
    };

    Ok(PathStep::Hop(HopStep {
        direction,
        target: parse_hop_target(target)?,
        alias,
    }))
}

fn parse_hop_target(value: &Value) -> Result<HopTarget, SpecError> {
    match value {
        Value::Array(pair) => match pair.as_slice() {
            [Value::String(schema), Value::String(name)] => Ok(HopTarget::Constraint {
                schema: schema.clone(),
                name: name.clone(),
            }),
            _ => Err(SpecError::InvalidShape(format!(
                "constraint name must be a [schema, name] pair, got {value}"
            ))),
        },
        Value::Object(obj) => parse_colset(obj),
        other => Err(SpecError::InvalidShape(format!("invalid foreign key reference {other}"))),
    }
}

fn parse_colset(obj: &Map<String, Value>) -> Result<HopTarget, SpecError> {
    let text = |key: &str| -> Result<String, SpecError> {
        obj.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SpecError::InvalidShape(format!("`{key}` is required")))
    };
    let remote = TableName::new(text(REMOTE_SCHEMA)?, text(REMOTE_TABLE)?);

    let (local_columns, remote_columns) = if let Some(mapping) = obj.get(LOCAL_TO_REMOTE_COLUMNS) {
        let mapping = mapping.as_object().ok_or_else(|| {
            SpecError::InvalidShape(format!("`{LOCAL_TO_REMOTE_COLUMNS}` must be an object"))
        })?;
        let mut locals = Vec::with_capacity(mapping.len());
        let mut remotes = Vec::with_capacity(mapping.len());
        for (local, remote) in mapping {
            let remote = remote.as_str().ok_or_else(|| {
                SpecError::InvalidShape(format!("`{LOCAL_TO_REMOTE_COLUMNS}` values must be column names"))
            })?;
            locals.push(local.clone());
            remotes.push(remote.to_string());
        }
        (locals, remotes)
    } else {
        (string_list(obj, LOCAL_COLUMNS)?, string_list(obj, REMOTE_COLUMNS)?)
    };

    if local_columns.is_empty() || local_columns.len() != remote_columns.len() {
        return Err(SpecError::InvalidShape(
            "column mapping must pair the same non-zero number of local and remote columns".to_string(),
        ));
    }

    Ok(HopTarget::Colset {
        remote,
        local_columns,
        remote_columns,
    })
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Result<Vec<String>, SpecError> {
    obj.get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| SpecError::InvalidShape(format!("`{key}` must be an array of column names")))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| SpecError::InvalidShape(format!("`{key}` must be an array of column names")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_name_source() {
        let spec = SourceSpec::from_value(&json!("name")).unwrap();
        assert_eq!(spec, SourceSpec::column("name"));
        assert!(!spec.has_path());
        assert_eq!(spec.to_value(), json!("name"));
    }

    #[test]
    fn test_parse_mixed_steps() {
        let value = json!([
            {"sourcekey": "path_to_o1"},
            {"filter": "id", "operator": "::gt::", "operand_pattern": "2"},
            {"inbound": ["s", "o1_i1_fk"], "alias": "A"},
            "name"
        ]);
        let spec = SourceSpec::from_value(&value).unwrap();
        assert_eq!(spec.prefix(), Some("path_to_o1"));
        assert_eq!(spec.column, "name");
        assert!(matches!(&spec.steps[1], PathStep::Filter(_)));
        assert_eq!(
            spec.steps[2],
            PathStep::Hop(HopStep {
                direction: Direction::Inbound,
                target: HopTarget::Constraint { schema: "s".into(), name: "o1_i1_fk".into() },
                alias: Some("A".into()),
            })
        );
    }

    #[test]
    fn test_parse_colset_forms() {
        let mapped = json!([{"outbound": {
            "remote_schema": "s", "remote_table": "o1",
            "local_to_remote_columns": {"fk_col": "id"}
        }}, "name"]);
        let listed = json!([{"outbound": {
            "remote_schema": "s", "remote_table": "o1",
            "local_columns": ["fk_col"], "remote_columns": ["id"]
        }}, "name"]);
        let a = SourceSpec::from_value(&mapped).unwrap();
        let b = SourceSpec::from_value(&listed).unwrap();
        assert_eq!(a, b);
        assert!(matches!(
            &a.steps[0],
            PathStep::Hop(HopStep { target: HopTarget::Colset { remote, .. }, .. }) if remote.table == "o1"
        ));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        for bad in [
            json!([]),
            json!(12),
            json!([{"outbound": ["s", "fk"]}]),
            json!([{"outbound": ["s"]}, "c"]),
            json!([{"outbound": ["s", "a"], "inbound": ["s", "b"]}, "c"]),
            json!([{"outbound": {"remote_schema": "s", "remote_table": "t", "local_columns": ["a"], "remote_columns": []}}, "c"]),
            json!(["a", "c"]),
        ] {
            assert!(
                matches!(SourceSpec::from_value(&bad), Err(SpecError::InvalidShape(_))),
                "should reject {bad}"
            );
        }
    }

    #[test]
    fn test_to_value_restores_steps() {
        let value = json!([
            {"outbound": ["s", "fk1"]},
            {"filter": "id", "operator": "::null::", "negate": true},
            "name"
        ]);
        let spec = SourceSpec::from_value(&value).unwrap();
        assert_eq!(spec.to_value(), value);
    }
}
