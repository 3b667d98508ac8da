//! Filter tree types and JSON parsing

use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use super::error::FilterError;
use super::template::{Row, TemplateEngine};

/// Predicates a filter leaf may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Equal,
    Null,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Regexp,
    CiRegexp,
    TextSearch,
}

impl FilterOperator {
    /// Wire form of the predicate
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "=",
            FilterOperator::Null => "::null::",
            FilterOperator::LessThan => "::lt::",
            FilterOperator::LessOrEqual => "::leq::",
            FilterOperator::GreaterThan => "::gt::",
            FilterOperator::GreaterOrEqual => "::geq::",
            FilterOperator::Regexp => "::regexp::",
            FilterOperator::CiRegexp => "::ciregexp::",
            FilterOperator::TextSearch => "::ts::",
        }
    }

    /// `::null::` is the only operand-less predicate
    pub fn takes_operand(&self) -> bool {
        !matches!(self, FilterOperator::Null)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "=" => FilterOperator::Equal,
            "::null::" => FilterOperator::Null,
            "::lt::" => FilterOperator::LessThan,
            "::leq::" => FilterOperator::LessOrEqual,
            "::gt::" => FilterOperator::GreaterThan,
            "::geq::" => FilterOperator::GreaterOrEqual,
            "::regexp::" => FilterOperator::Regexp,
            "::ciregexp::" => FilterOperator::CiRegexp,
            "::ts::" => FilterOperator::TextSearch,
            other => return Err(FilterError::InvalidOperator(other.to_string())),
        })
    }
}

/// A leaf operand before and after template expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Unexpanded(String),
    Expanded(String),
}

impl Operand {
    /// The template or the expanded value, whichever this holds
    pub fn text(&self) -> &str {
        match self {
            Operand::Unexpanded(s) | Operand::Expanded(s) => s,
        }
    }

    /// Expand a template; an already expanded operand is returned unchanged
    pub fn expand(self, column: &str, engine: &dyn TemplateEngine, row: &Row) -> Result<Self, FilterError> {
        match self {
            Operand::Expanded(_) => Ok(self),
            Operand::Unexpanded(template) => {
                let value = engine.render(&template, row);
                if value.is_empty() {
                    return Err(FilterError::EmptyOperand(column.to_string()));
                }
                Ok(Operand::Expanded(value))
            }
        }
    }
}

/// `col <operator> operand`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterLeaf {
    pub column: String,
    pub operator: FilterOperator,
    /// Absent for operand-less predicates
    pub operand: Option<Operand>,
    pub negate: bool,
}

/// A boolean filter tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterNode {
    Leaf(FilterLeaf),
    And { children: Vec<FilterNode>, negate: bool },
    Or { children: Vec<FilterNode>, negate: bool },
}

const FILTER: &str = "filter";
const AND: &str = "and";
const OR: &str = "or";
const OPERATOR: &str = "operator";
const OPERAND_PATTERN: &str = "operand_pattern";
const NEGATE: &str = "negate";

impl FilterNode {
    /// Whether a path step object describes a filter
    pub fn is_filter_object(obj: &Map<String, Value>) -> bool {
        obj.contains_key(FILTER) || obj.contains_key(AND) || obj.contains_key(OR)
    }

    /// Parse a filter tree from its JSON description
    pub fn from_value(value: &Value) -> Result<Self, FilterError> {
        let obj = value
            .as_object()
            .ok_or_else(|| FilterError::InvalidShape(format!("expected an object, got {value}")))?;

        let negate = match obj.get(NEGATE) {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(FilterError::InvalidShape(format!("`negate` must be a boolean, got {other}")));
            }
        };

        let kinds = [FILTER, AND, OR].iter().filter(|k| obj.contains_key(**k)).count();
        if kinds != 1 {
            return Err(FilterError::InvalidShape(
                "exactly one of `filter`, `and` or `or` is required".to_string(),
            ));
        }

        if let Some(children) = obj.get(AND) {
            return Ok(FilterNode::And { children: parse_children(AND, children)?, negate });
        }
        if let Some(children) = obj.get(OR) {
            return Ok(FilterNode::Or { children: parse_children(OR, children)?, negate });
        }

        let column = obj
            .get(FILTER)
            .and_then(Value::as_str)
            .ok_or_else(|| FilterError::InvalidShape("`filter` must name a column".to_string()))?
            .to_string();

        let operator = match obj.get(OPERATOR) {
            None => FilterOperator::Equal,
            Some(Value::String(op)) => op.parse()?,
            Some(other) => return Err(FilterError::InvalidOperator(other.to_string())),
        };

        let operand = if operator.takes_operand() {
            let pattern = match obj.get(OPERAND_PATTERN) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
                Some(other) => {
                    return Err(FilterError::InvalidShape(format!(
                        "`operand_pattern` must be a string, got {other}"
                    )));
                }
            };
            Some(Operand::Unexpanded(pattern))
        } else {
            None
        };

        Ok(FilterNode::Leaf(FilterLeaf { column, operator, operand, negate }))
    }

    pub fn negate(&self) -> bool {
        match self {
            FilterNode::Leaf(leaf) => leaf.negate,
            FilterNode::And { negate, .. } | FilterNode::Or { negate, .. } => *negate,
        }
    }

    /// Whether every operand in the tree has been expanded
    pub fn is_expanded(&self) -> bool {
        match self {
            FilterNode::Leaf(leaf) => !matches!(leaf.operand, Some(Operand::Unexpanded(_))),
            FilterNode::And { children, .. } | FilterNode::Or { children, .. } => {
                children.iter().all(FilterNode::is_expanded)
            }
        }
    }

    /// Expand every operand template against `row`
    pub fn expand(self, engine: &dyn TemplateEngine, row: &Row) -> Result<Self, FilterError> {
        match self {
            FilterNode::Leaf(mut leaf) => {
                leaf.operand = match leaf.operand.take() {
                    Some(op) => Some(op.expand(&leaf.column, engine, row)?),
                    None => None,
                };
                Ok(FilterNode::Leaf(leaf))
            }
            FilterNode::And { children, negate } => Ok(FilterNode::And {
                children: expand_all(children, engine, row)?,
                negate,
            }),
            FilterNode::Or { children, negate } => Ok(FilterNode::Or {
                children: expand_all(children, engine, row)?,
                negate,
            }),
        }
    }

    /// JSON form, with expanded operands written back as patterns
    pub fn to_value(&self) -> Value {
        let mut obj = match self {
            FilterNode::Leaf(leaf) => {
                let mut obj = Map::new();
                obj.insert(FILTER.to_string(), json!(leaf.column));
                if leaf.operator != FilterOperator::Equal {
                    obj.insert(OPERATOR.to_string(), json!(leaf.operator.as_str()));
                }
                if let Some(operand) = &leaf.operand {
                    obj.insert(OPERAND_PATTERN.to_string(), json!(operand.text()));
                }
                obj
            }
            FilterNode::And { children, .. } => {
                let mut obj = Map::new();
                obj.insert(AND.to_string(), children.iter().map(FilterNode::to_value).collect());
                obj
            }
            FilterNode::Or { children, .. } => {
                let mut obj = Map::new();
                obj.insert(OR.to_string(), children.iter().map(FilterNode::to_value).collect());
                obj
            }
        };
        if self.negate() {
            obj.insert(NEGATE.to_string(), Value::Bool(true));
        }
        Value::Object(obj)
    }
}

fn parse_children(kind: &str, value: &Value) -> Result<Vec<FilterNode>, FilterError> {
    let items = value
        .as_array()
        .filter(|items| !items.is_empty())
        .ok_or_else(|| FilterError::InvalidShape(format!("`{kind}` must be a non-empty array")))?;
    items.iter().map(FilterNode::from_value).collect()
}

fn expand_all(
    children: Vec<FilterNode>,
    engine: &dyn TemplateEngine,
    row: &Row,
) -> Result<Vec<FilterNode>, FilterError> {
    children.into_iter().map(|c| c.expand(engine, row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::BraceTemplate;

    #[test]
    fn test_parse_leaf_defaults() {
        let node = FilterNode::from_value(&json!({"filter": "id", "operand_pattern": 5})).unwrap();
        let FilterNode::Leaf(leaf) = node else { panic!("expected leaf") };
        assert_eq!(leaf.operator, FilterOperator::Equal);
        assert_eq!(leaf.operand, Some(Operand::Unexpanded("5".to_string())));
        assert!(!leaf.negate);
    }

    #[test]
    fn test_null_operator_has_no_operand() {
        let node = FilterNode::from_value(&json!({"filter": "id", "operator": "::null::"})).unwrap();
        assert!(matches!(node, FilterNode::Leaf(FilterLeaf { operand: None, .. })));
    }

    #[test]
    fn test_parse_nested_tree() {
        let node = FilterNode::from_value(&json!({
            "or": [
                {"filter": "a", "operand_pattern": "1"},
                {"and": [{"filter": "b", "operator": "::gt::", "operand_pattern": "2"}], "negate": true}
            ]
        }))
        .unwrap();
        let FilterNode::Or { children, negate } = node else { panic!("expected or") };
        assert!(!negate);
        assert_eq!(children.len(), 2);
        assert!(children[1].negate());
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(matches!(
            FilterNode::from_value(&json!({"filter": "a", "operator": "~~"})),
            Err(FilterError::InvalidOperator(op)) if op == "~~"
        ));
        assert!(matches!(
            FilterNode::from_value(&json!({"and": []})),
            Err(FilterError::InvalidShape(_))
        ));
        assert!(matches!(
            FilterNode::from_value(&json!({"and": [], "or": []})),
            Err(FilterError::InvalidShape(_))
        ));
        assert!(matches!(
            FilterNode::from_value(&json!({"filter": "a", "negate": "yes"})),
            Err(FilterError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_expand_once() {
        let node = FilterNode::from_value(&json!({"filter": "id", "operand_pattern": "{{id}}"})).unwrap();
        assert!(!node.is_expanded());

        let row = json!({"id": 3}).as_object().cloned().unwrap();
        let expanded = node.expand(&BraceTemplate, &row).unwrap();
        assert!(expanded.is_expanded());

        // a second expansion against a different row keeps the first value
        let other = json!({"id": 4}).as_object().cloned().unwrap();
        let again = expanded.clone().expand(&BraceTemplate, &other).unwrap();
        assert_eq!(again, expanded);
    }

    #[test]
    fn test_empty_expansion_fails() {
        let node = FilterNode::from_value(&json!({"filter": "id", "operand_pattern": "{{id}}"})).unwrap();
        assert_eq!(
            node.expand(&BraceTemplate, &Row::new()),
            Err(FilterError::EmptyOperand("id".to_string()))
        );
    }
}
