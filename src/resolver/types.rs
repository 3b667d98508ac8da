//! Types for resolved source paths

use std::rc::Rc;
use crate::catalog::{Column, ForeignKey, Table, TableName};
use crate::emitter::{foreign_key_wire, JoinKind};
use crate::filter::FilterNode;
use crate::source::{Direction, SourceSpec};

/// A foreign key bound to the direction it is traversed in
#[derive(Debug, Clone)]
pub struct ForeignKeyHop<'a> {
    pub foreign_key: &'a ForeignKey,
    pub direction: Direction,
    pub alias: Option<String>,
    /// Resolved through a column mapping rather than a constraint name
    pub alternative: bool,
}

impl<'a> ForeignKeyHop<'a> {
    pub fn is_inbound(&self) -> bool {
        self.direction == Direction::Inbound
    }

    /// Table the hop arrives at
    pub fn to_table(&self) -> TableName {
        match self.direction {
            Direction::Outbound => self.foreign_key.referenced_table(),
            Direction::Inbound => self.foreign_key.table.clone(),
        }
    }

    /// Wire form of the hop; `reverse` walks it from its far end
    pub fn wire(&self, reverse: bool, join: JoinKind) -> String {
        let outbound = (self.direction == Direction::Outbound) != reverse;
        foreign_key_wire(self.foreign_key, outbound, join)
    }
}

/// A filter step with its rendered text
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    pub node: FilterNode,
    pub text: String,
}

/// What a compiled node does
#[derive(Debug, Clone)]
pub enum NodeKind<'a> {
    Filter(CompiledFilter),
    Hop(ForeignKeyHop<'a>),
    /// A named source definition used as the head of the path
    Prefix {
        sourcekey: String,
        source: Rc<ParsedSource<'a>>,
    },
}

/// A resolved path step bound to the table it applies to
#[derive(Debug, Clone)]
pub struct CompiledNode<'a> {
    pub kind: NodeKind<'a>,
    /// Table context the step starts from
    pub table: &'a Table,
    /// Number of foreign key hops up to and including this node
    pub hop_count: usize,
    /// Whether every hop up to here is outbound through non-null columns
    pub all_outbound_not_null: bool,
}

impl<'a> CompiledNode<'a> {
    pub fn is_filter(&self) -> bool {
        matches!(self.kind, NodeKind::Filter(_))
    }

    pub fn is_prefix(&self) -> bool {
        matches!(self.kind, NodeKind::Prefix { .. })
    }

    /// Hops and prefixes move the table context
    pub fn is_join(&self) -> bool {
        !self.is_filter()
    }
}

/// A source resolved against the catalog
#[derive(Debug, Clone)]
pub struct ParsedSource<'a> {
    pub spec: SourceSpec,
    pub nodes: Vec<CompiledNode<'a>>,
    /// Table the path starts from
    pub root: &'a Table,
    /// Table the path ends on
    pub table: &'a Table,
    pub column: &'a Column,
    pub hop_count: usize,
    /// First step is a filter on the root table
    pub has_root_filter: bool,
    /// A filter follows at least one hop
    pub has_filter_in_between: bool,
    pub has_inbound: bool,
    pub all_outbound_not_null: bool,
    pub first_hop: Option<ForeignKeyHop<'a>>,
    pub last_hop: Option<ForeignKeyHop<'a>>,
}

impl<'a> ParsedSource<'a> {
    pub fn has_path(&self) -> bool {
        self.hop_count > 0
    }

    pub fn has_prefix(&self) -> bool {
        self.nodes.first().is_some_and(CompiledNode::is_prefix)
    }

    pub fn is_filtered(&self) -> bool {
        self.nodes.iter().any(CompiledNode::is_filter)
            || self.nodes.iter().any(|n| match &n.kind {
                NodeKind::Prefix { source, .. } => source.is_filtered(),
                _ => false,
            })
    }

    /// Stable name: the column name for plain columns, otherwise the hash
    /// token of the source
    pub fn name(&self) -> String {
        if self.spec.has_path() {
            crate::hasher::source_hash(&self.spec)
        } else {
            self.column.name.clone()
        }
    }

    /// Whether the path only uses outbound hops
    pub fn is_all_outbound(&self) -> bool {
        self.has_path() && !self.has_inbound
    }

    /// Index of the last node that moves the table context
    pub fn last_join_index(&self) -> Option<usize> {
        self.nodes.iter().rposition(CompiledNode::is_join)
    }

    /// Index of the first node that moves the table context
    pub fn first_join_index(&self) -> Option<usize> {
        self.nodes.iter().position(CompiledNode::is_join)
    }

    /// Filters applied after the last join
    pub fn trailing_filters(&self) -> impl Iterator<Item = &CompiledFilter> {
        let start = self.last_join_index().map_or(0, |i| i + 1);
        self.nodes[start..].iter().filter_map(|n| match &n.kind {
            NodeKind::Filter(f) => Some(f),
            _ => None,
        })
    }
}
