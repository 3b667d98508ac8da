//! Constraint clauses and their encodings

use serde_json::Value;
use crate::catalog::{Capabilities, Column};
use crate::emitter::encode;
use super::error::ConstraintError;
use super::search::search_term_filter;

/// One side-pair of a range constraint
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RangeBound {
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub min_exclusive: bool,
    pub max_exclusive: bool,
}

/// A constraint a facet term places on its column
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Choice(Vec<Value>),
    Range(Vec<RangeBound>),
    Search(Vec<Value>),
    NotNull,
}

impl Constraint {
    /// Read a `choices` attribute: an array of scalars or nulls
    pub fn choices(value: &Value) -> Result<Self, ConstraintError> {
        let items = non_empty_array(value).ok_or_else(|| {
            ConstraintError::InvalidChoice(format!("expected a non-empty array, got {value}"))
        })?;
        if let Some(bad) = items.iter().find(|v| v.is_array() || v.is_object()) {
            return Err(ConstraintError::InvalidChoice(format!("{bad} is not a scalar")));
        }
        Ok(Constraint::Choice(items.clone()))
    }

    /// Read a `ranges` attribute: an array of `{min, max, min_exclusive, max_exclusive}`
    pub fn ranges(value: &Value) -> Result<Self, ConstraintError> {
        let items = non_empty_array(value).ok_or_else(|| {
            ConstraintError::InvalidRange(format!("expected a non-empty array, got {value}"))
        })?;
        items.iter().map(range_bound).collect::<Result<Vec<_>, _>>().map(Constraint::Range)
    }

    /// Read a `search` attribute: an array of search terms
    pub fn search(value: &Value) -> Result<Self, ConstraintError> {
        let items = non_empty_array(value).ok_or_else(|| {
            ConstraintError::InvalidSearch(format!("expected a non-empty array, got {value}"))
        })?;
        if let Some(bad) = items.iter().find(|v| !(v.is_string() || v.is_number())) {
            return Err(ConstraintError::InvalidSearch(format!("{bad} is not a search term")));
        }
        Ok(Constraint::Search(items.clone()))
    }

    /// Whether the clause selects rows where the column is null
    pub fn has_null_choice(&self) -> bool {
        matches!(self, Constraint::Choice(values) if values.iter().any(Value::is_null))
    }

    /// Render the clause as a filter on `column`
    pub fn encode(&self, column: &Column, caps: &dyn Capabilities) -> Result<String, ConstraintError> {
        let col = encode(&column.name);
        match self {
            Constraint::Choice(values) => Ok(encode_choices(&col, values, caps.supports_quantified(column))),
            Constraint::Range(bounds) => encode_ranges(&col, bounds),
            Constraint::Search(terms) => {
                let clauses: Vec<String> = terms
                    .iter()
                    .filter_map(|t| search_term_filter(&value_text(t), &col, caps.supports_quantified(column)))
                    .collect();
                if clauses.is_empty() {
                    return Err(ConstraintError::InvalidSearch("no search tokens".to_string()));
                }
                Ok(clauses.join(";"))
            }
            Constraint::NotNull => {
                let mut clause = format!("!({col}::null::)");
                if column.column_type.has_null_literal() {
                    clause.push_str(&format!("&!({col}=null)"));
                }
                Ok(clause)
            }
        }
    }
}

fn non_empty_array(value: &Value) -> Option<&Vec<Value>> {
    value.as_array().filter(|items| !items.is_empty())
}

fn range_bound(value: &Value) -> Result<RangeBound, ConstraintError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ConstraintError::InvalidRange(format!("{value} is not an object")))?;

    let limit = |key: &str| -> Result<Option<Value>, ConstraintError> {
        match obj.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v @ (Value::Number(_) | Value::String(_))) => Ok(Some(v.clone())),
            Some(other) => Err(ConstraintError::InvalidRange(format!("`{key}` cannot be {other}"))),
        }
    };
    let flag = |key: &str| -> Result<bool, ConstraintError> {
        match obj.get(key) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(ConstraintError::InvalidRange(format!("`{key}` cannot be {other}"))),
        }
    };

    Ok(RangeBound {
        min: limit("min")?,
        max: limit("max")?,
        min_exclusive: flag("min_exclusive")?,
        max_exclusive: flag("max_exclusive")?,
    })
}

/// Strings are used as-is, other scalars in their JSON form
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn encode_choices(col: &str, values: &[Value], quantified: bool) -> String {
    let mut distinct: Vec<String> = Vec::with_capacity(values.len());
    for value in values.iter().filter(|v| !v.is_null()) {
        let text = encode(&value_text(value));
        if !distinct.contains(&text) {
            distinct.push(text);
        }
    }

    let mut clauses = if quantified && distinct.len() > 1 {
        vec![format!("{col}=any({})", distinct.join(","))]
    } else {
        distinct.iter().map(|v| format!("{col}={v}")).collect()
    };
    if values.iter().any(Value::is_null) {
        clauses.push(format!("{col}::null::"));
    }
    clauses.join(";")
}

fn encode_ranges(col: &str, bounds: &[RangeBound]) -> Result<String, ConstraintError> {
    let clauses: Vec<String> = bounds
        .iter()
        .filter_map(|bound| {
            let mut parts = Vec::with_capacity(2);
            if let Some(min) = &bound.min {
                let op = if bound.min_exclusive { ">" } else { ">=" };
                parts.push(format!("{col}{op}{}", encode(&value_text(min))));
            }
            if let Some(max) = &bound.max {
                let op = if bound.max_exclusive { "<" } else { "<=" };
                parts.push(format!("{col}{op}{}", encode(&value_text(max))));
            }
            (!parts.is_empty()).then(|| parts.join("&"))
        })
        .collect();

    if clauses.is_empty() {
        return Err(ConstraintError::InvalidRange("no range has a min or max".to_string()));
    }
    Ok(clauses.join(";"))
}
