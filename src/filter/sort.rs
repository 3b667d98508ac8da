//! Canonical ordering of filter trees
//!
//! Only identifiers depend on this order; rendered queries keep the order the
//! author wrote.

use std::cmp::Ordering;
use crate::emitter::encode;
use super::node::FilterNode;

impl FilterNode {
    /// A copy of the tree with every level in canonical order
    pub fn canonical(&self) -> FilterNode {
        match self {
            FilterNode::Leaf(_) => self.clone(),
            FilterNode::And { children, negate } => FilterNode::And {
                children: sorted(children),
                negate: *negate,
            },
            FilterNode::Or { children, negate } => FilterNode::Or {
                children: sorted(children),
                negate: *negate,
            },
        }
    }

    /// Text of the tree as it stands, used for comparisons and hashing
    ///
    /// Columns and operands are percent-encoded so neither can swallow the
    /// operator.
    pub fn canonical_text(&self) -> String {
        let text = match self {
            FilterNode::Leaf(leaf) => {
                let operand = leaf.operand.as_ref().map(|o| encode(o.text())).unwrap_or_default();
                format!("{}{}{}", encode(&leaf.column), leaf.operator.as_str(), operand)
            }
            FilterNode::And { children, .. } => join_text(children, "&"),
            FilterNode::Or { children, .. } => join_text(children, ";"),
        };
        if self.negate() { format!("!({text})") } else { text }
    }
}

fn join_text(children: &[FilterNode], separator: &str) -> String {
    let parts: Vec<String> = children.iter().map(FilterNode::canonical_text).collect();
    format!("({})", parts.join(separator))
}

fn sorted(children: &[FilterNode]) -> Vec<FilterNode> {
    let mut keyed: Vec<(FilterNode, String)> = children
        .iter()
        .map(|c| {
            let canonical = c.canonical();
            let text = canonical.canonical_text();
            (canonical, text)
        })
        .collect();
    keyed.sort_by(|(a, a_text), (b, b_text)| canonical_cmp(a, a_text, b, b_text));
    keyed.into_iter().map(|(node, _)| node).collect()
}

/// non-negated < negated, leaves < combinators, `and` < `or`, then child
/// count and text
fn canonical_cmp(a: &FilterNode, a_text: &str, b: &FilterNode, b_text: &str) -> Ordering {
    a.negate()
        .cmp(&b.negate())
        .then_with(|| rank(a).cmp(&rank(b)))
        .then_with(|| child_count(a).cmp(&child_count(b)))
        .then_with(|| a_text.cmp(b_text))
}

fn rank(node: &FilterNode) -> u8 {
    match node {
        FilterNode::Leaf(_) => 0,
        FilterNode::And { .. } => 1,
        FilterNode::Or { .. } => 2,
    }
}

fn child_count(node: &FilterNode) -> usize {
    match node {
        FilterNode::Leaf(_) => 0,
        FilterNode::And { children, .. } | FilterNode::Or { children, .. } => children.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: serde_json::Value) -> FilterNode {
        FilterNode::from_value(&value).unwrap()
    }

    #[test]
    fn test_reordered_children_share_canonical_text() {
        let a = node(json!({"and": [
            {"filter": "b", "operand_pattern": "2"},
            {"or": [{"filter": "x", "operand_pattern": "1"}, {"filter": "c", "operand_pattern": "1"}]},
            {"filter": "a", "operand_pattern": "1"}
        ]}));
        let b = node(json!({"and": [
            {"or": [{"filter": "c", "operand_pattern": "1"}, {"filter": "x", "operand_pattern": "1"}]},
            {"filter": "a", "operand_pattern": "1"},
            {"filter": "b", "operand_pattern": "2"}
        ]}));
        assert_eq!(a.canonical().canonical_text(), b.canonical().canonical_text());
        assert_ne!(a.canonical_text(), b.canonical_text());
    }

    #[test]
    fn test_operator_characters_stay_inside_their_piece() {
        let column_side = node(json!({"filter": "a=", "operand_pattern": "b"}));
        let operand_side = node(json!({"filter": "a", "operand_pattern": "=b"}));
        assert_eq!(column_side.canonical_text(), "a%3D=b");
        assert_eq!(operand_side.canonical_text(), "a=%3Db");
    }

    #[test]
    fn test_ordering_rules() {
        let tree = node(json!({"or": [
            {"or": [{"filter": "a"}, {"filter": "b"}, {"filter": "c"}]},
            {"filter": "z", "negate": true},
            {"and": [{"filter": "a"}]},
            {"or": [{"filter": "a"}]},
            {"filter": "y"}
        ]}));
        let FilterNode::Or { children, .. } = tree.canonical() else { panic!("expected or") };
        let texts: Vec<String> = children.iter().map(FilterNode::canonical_text).collect();
        assert_eq!(texts, vec!["y=", "(a=)", "(a=)", "(a=;b=;c=)", "!(z=)"]);
        assert!(matches!(children[1], FilterNode::And { .. }));
        assert!(matches!(children[2], FilterNode::Or { .. }));
    }
}
