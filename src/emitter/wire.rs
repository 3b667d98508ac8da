//! Wire-level encoding of identifiers, values and joins

use crate::catalog::{ForeignKey, TableName};

/// Percent-encode an identifier or value
///
/// Everything except `A-Z a-z 0-9 - _ . ~` is encoded, including the
/// characters `!'()*` that carry meaning in path filters.
pub fn encode(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// `schema:table`
pub fn encode_table(name: &TableName) -> String {
    format!("{}:{}", encode(&name.schema), encode(&name.table))
}

/// Join flavour of a rendered hop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "",
            JoinKind::Left => "left",
            JoinKind::Right => "right",
        }
    }
}

/// Render a foreign key join
///
/// Outbound: `(fk_cols)=(schema:key_table:key_cols)`.
/// Inbound: `(key_cols)=(schema:fk_table:fk_cols)`.
pub fn foreign_key_wire(fk: &ForeignKey, outbound: bool, join: JoinKind) -> String {
    let (from_cols, to_table, to_cols) = if outbound {
        (&fk.columns, fk.referenced_table(), &fk.references.columns)
    } else {
        (&fk.references.columns, fk.table.clone(), &fk.columns)
    };
    format!(
        "{}({})=({}:{})",
        join.as_str(),
        encode_list(from_cols),
        encode_table(&to_table),
        encode_list(to_cols)
    )
}

fn encode_list(columns: &[String]) -> String {
    columns.iter().map(|c| encode(c)).collect::<Vec<_>>().join(",")
}
