//! Filter tree rendering

use crate::catalog::Table;
use crate::emitter::encode;
use super::error::FilterError;
use super::node::{FilterLeaf, FilterNode, Operand};

impl FilterNode {
    /// Render the tree against the table it filters, in author order
    ///
    /// Columns must exist on `table` and every operand must be expanded.
    pub fn render(&self, table: &Table) -> Result<String, FilterError> {
        match self {
            FilterNode::Leaf(leaf) => render_leaf(leaf, table),
            FilterNode::And { children, negate } => render_combinator(children, "&", *negate, table),
            FilterNode::Or { children, negate } => render_combinator(children, ";", *negate, table),
        }
    }
}

fn render_leaf(leaf: &FilterLeaf, table: &Table) -> Result<String, FilterError> {
    if table.column(&leaf.column).is_none() {
        return Err(FilterError::UnknownColumn {
            column: leaf.column.clone(),
            table: table.table_name(),
        });
    }

    let operand = match &leaf.operand {
        None => String::new(),
        Some(Operand::Expanded(value)) => encode(value),
        Some(Operand::Unexpanded(_)) => return Err(FilterError::Unexpanded(leaf.column.clone())),
    };
    let text = format!("{}{}{}", encode(&leaf.column), leaf.operator.as_str(), operand);

    Ok(if leaf.negate { format!("!({text})") } else { text })
}

fn render_combinator(
    children: &[FilterNode],
    separator: &str,
    negate: bool,
    table: &Table,
) -> Result<String, FilterError> {
    let rendered = children
        .iter()
        .map(|c| c.render(table))
        .collect::<Result<Vec<_>, _>>()?;
    let joined = rendered.join(separator);

    Ok(match (negate, children.len()) {
        (true, _) => format!("!({joined})"),
        (false, 1) => joined,
        (false, _) => format!("({joined})"),
    })
}
