use std::rc::Rc;
use crate::catalog::{Directory, ForeignKey, Table};
use crate::filter::{Row, TemplateEngine};
use crate::source::{Direction, HopStep, HopTarget, PathStep, SourceSpec};
use super::definitions::SourceDefinitions;
use super::error::SourceError;
use super::types::{CompiledFilter, CompiledNode, ForeignKeyHop, NodeKind, ParsedSource};

/// Everything a source path is resolved against
pub struct SourceContext<'a, 'c> {
    pub directory: &'a dyn Directory,
    /// Table the path starts from
    pub root: &'a Table,
    /// Named definitions prefix steps may refer to
    pub definitions: Option<&'c SourceDefinitions<'a>>,
    /// Operand templates are expanded against this row
    pub row: &'c Row,
    pub engine: &'c dyn TemplateEngine,
}

/// Resolve a source specification into a compiled node list
///
/// Walks the steps left to right, keeping track of the current table:
/// prefixes splice in a named definition, filters are expanded and rendered
/// against the current table, and hops move to the next table.
pub fn resolve_source<'a>(
    spec: &SourceSpec,
    ctx: &SourceContext<'a, '_>,
) -> Result<ParsedSource<'a>, SourceError> {
    let mut walk = Walk::new(ctx.root);

    for (index, step) in spec.steps.iter().enumerate() {
        match step {
            PathStep::Prefix(key) => {
                if index != 0 {
                    return Err(SourceError::MisplacedSourcekey(key.clone()));
                }
                let source = ctx
                    .definitions
                    .and_then(|defs| defs.get(key))
                    .ok_or_else(|| SourceError::UnresolvedSourcekey(key.clone()))?;
                walk.prefix(key, source)?;
            }
            PathStep::Filter(node) => {
                let node = node.clone().expand(ctx.engine, ctx.row)?;
                let text = node.render(walk.table)?;
                walk.filter(CompiledFilter { node, text });
            }
            PathStep::Hop(hop) => {
                let (foreign_key, alternative) = resolve_hop(hop, walk.table, ctx.directory)?;
                let fk_hop = ForeignKeyHop {
                    foreign_key,
                    direction: hop.direction,
                    alias: hop.alias.clone(),
                    alternative,
                };
                let next = ctx
                    .directory
                    .table(&fk_hop.to_table())
                    .ok_or_else(|| SourceError::UnknownTable(fk_hop.to_table()))?;
                walk.hop(fk_hop, next);
            }
        }
    }

    let column = walk.table.column(&spec.column).ok_or_else(|| SourceError::InvalidColumn {
        column: spec.column.clone(),
        table: walk.table.table_name(),
    })?;

    Ok(walk.finish(spec.clone(), column))
}

/// Find the foreign key a hop names and check it leaves `table`
fn resolve_hop<'a>(
    hop: &HopStep,
    table: &'a Table,
    directory: &'a dyn Directory,
) -> Result<(&'a ForeignKey, bool), SourceError> {
    let current = table.table_name();
    match &hop.target {
        HopTarget::Constraint { schema, name } => {
            let fk = directory.constraint(schema, name).ok_or_else(|| SourceError::UnknownConstraint {
                schema: schema.clone(),
                name: name.clone(),
            })?;
            let starts_here = match hop.direction {
                Direction::Outbound => fk.table == current,
                Direction::Inbound => fk.referenced_table() == current,
            };
            if !starts_here {
                return Err(SourceError::DirectionMismatch {
                    constraint: format!("{schema}:{name}"),
                    direction: hop.direction,
                    table: current,
                });
            }
            Ok((fk, false))
        }
        HopTarget::Colset { remote, local_columns, remote_columns } => {
            let fk = match hop.direction {
                Direction::Outbound => {
                    directory.constraint_by_colset(&current, local_columns, remote, remote_columns)
                }
                Direction::Inbound => {
                    directory.constraint_by_colset(remote, remote_columns, &current, local_columns)
                }
            };
            let fk = fk.ok_or_else(|| SourceError::NoMatchingConstraint {
                table: current.clone(),
                remote: remote.clone(),
            })?;
            Ok((fk, true))
        }
    }
}

/// Running state of a path walk
struct Walk<'a> {
    root: &'a Table,
    table: &'a Table,
    nodes: Vec<CompiledNode<'a>>,
    hop_count: usize,
    has_root_filter: bool,
    has_filter_in_between: bool,
    has_inbound: bool,
    all_outbound_not_null: bool,
    first_hop: Option<ForeignKeyHop<'a>>,
    last_hop: Option<ForeignKeyHop<'a>>,
}

impl<'a> Walk<'a> {
    fn new(root: &'a Table) -> Self {
        Self {
            root,
            table: root,
            nodes: Vec::new(),
            hop_count: 0,
            has_root_filter: false,
            has_filter_in_between: false,
            has_inbound: false,
            all_outbound_not_null: true,
            first_hop: None,
            last_hop: None,
        }
    }

    fn push(&mut self, kind: NodeKind<'a>, table: &'a Table) {
        self.nodes.push(CompiledNode {
            kind,
            table,
            hop_count: self.hop_count,
            all_outbound_not_null: self.all_outbound_not_null,
        });
    }

    fn prefix(&mut self, key: &str, source: &Rc<ParsedSource<'a>>) -> Result<(), SourceError> {
        if !source.has_path() {
            return Err(SourceError::NotAPath(key.to_string()));
        }
        self.hop_count = source.hop_count;
        self.has_root_filter = source.has_root_filter;
        self.has_filter_in_between = source.has_filter_in_between;
        self.has_inbound = source.has_inbound;
        self.all_outbound_not_null = source.all_outbound_not_null;
        self.first_hop = source.first_hop.clone();
        self.last_hop = source.last_hop.clone();

        let from = self.table;
        self.table = source.table;
        self.push(
            NodeKind::Prefix {
                sourcekey: key.to_string(),
                source: Rc::clone(source),
            },
            from,
        );
        Ok(())
    }

    fn filter(&mut self, filter: CompiledFilter) {
        if self.nodes.is_empty() {
            self.has_root_filter = true;
        }
        if self.hop_count > 0 {
            self.has_filter_in_between = true;
        }
        // a filtered join may drop rows
        self.all_outbound_not_null = false;
        self.push(NodeKind::Filter(filter), self.table);
    }

    fn hop(&mut self, hop: ForeignKeyHop<'a>, next: &'a Table) {
        self.hop_count += 1;
        if hop.is_inbound() {
            self.has_inbound = true;
            self.all_outbound_not_null = false;
        } else if !local_columns_not_null(self.table, hop.foreign_key) {
            self.all_outbound_not_null = false;
        }
        if self.first_hop.is_none() {
            self.first_hop = Some(hop.clone());
        }
        self.last_hop = Some(hop.clone());

        let from = self.table;
        self.table = next;
        self.push(NodeKind::Hop(hop), from);
    }

    fn finish(self, spec: SourceSpec, column: &'a crate::catalog::Column) -> ParsedSource<'a> {
        ParsedSource {
            spec,
            nodes: self.nodes,
            root: self.root,
            table: self.table,
            column,
            hop_count: self.hop_count,
            has_root_filter: self.has_root_filter,
            has_filter_in_between: self.has_filter_in_between,
            has_inbound: self.has_inbound,
            all_outbound_not_null: self.all_outbound_not_null && self.hop_count > 0,
            first_hop: self.first_hop,
            last_hop: self.last_hop,
        }
    }
}

/// Only the referencing side is checked; the referenced key columns are
/// assumed to be present for every referencing row.
fn local_columns_not_null(table: &Table, fk: &ForeignKey) -> bool {
    fk.columns
        .iter()
        .all(|c| table.column(c).is_some_and(|col| !col.nullok))
}
