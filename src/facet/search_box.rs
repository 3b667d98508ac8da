//! The table search box

use serde_json::Value;
use crate::catalog::{Column, ColumnType};
use crate::constraint::{search_pattern, search_term_filter, tokenize, Constraint};
use crate::emitter::{encode, render_all_outbound, AliasMapping};
use super::compile::FacetCompiler;
use super::error::{FacetError, FacetErrorKind};
use super::term::FacetTerm;

const WHOLE_ROW: &str = "*";

impl<'a, 'c> FacetCompiler<'a, 'c> {
    /// Search clause over the table's declared search columns
    ///
    /// Without declared columns the whole row is searched. Columns behind
    /// outbound paths are left-joined and addressed through their alias.
    /// A column filtered on the root table without any hop is rejected.
    pub(super) fn search_box(&self, term: &FacetTerm, mapping: &mut AliasMapping) -> Result<String, FacetError> {
        let Some(Constraint::Search(values)) = term.search()? else {
            return Err(FacetError::new(FacetErrorKind::InvalidSearch));
        };
        let root = format!("${}", mapping.root_alias());
        let columns = self.definitions.search_columns();
        // A filter on the root row cannot be scoped to one search alternative
        if columns.iter().any(|c| !c.has_path() && c.is_filtered()) {
            return Err(FacetError::new(FacetErrorKind::InvalidSearch));
        }

        match columns {
            [] => {
                let everything = Column::new(WHOLE_ROW, ColumnType::Text);
                let quantified = self.capabilities.supports_quantified(&everything);
                let clauses: Vec<String> = values
                    .iter()
                    .filter_map(|v| search_term_filter(&term_text(v), WHOLE_ROW, quantified))
                    .collect();
                if clauses.is_empty() {
                    return Err(FacetError::new(FacetErrorKind::InvalidSearch));
                }
                Ok(format!("{}/{root}", clauses.join(";")))
            }
            [single] if !single.has_path() => {
                let filter = Constraint::Search(values).encode(single.column, self.capabilities)?;
                Ok(format!("{filter}/{root}"))
            }
            many => {
                let mut parts = Vec::new();
                let mut refs = Vec::with_capacity(many.len());
                for column in many {
                    let name = encode(&column.column.name);
                    if !column.has_path() {
                        refs.push(name);
                        continue;
                    }
                    let hint = mapping.allocate_anonymous();
                    let rendered = render_all_outbound(column, None, mapping, &hint)?;
                    let alias = rendered.alias.unwrap_or(hint);
                    parts.push(rendered.path);
                    parts.push(root.clone());
                    refs.push(format!("{alias}:{name}"));
                }

                let clauses: Vec<String> = values
                    .iter()
                    .filter_map(|v| column_disjunction(&term_text(v), &refs))
                    .collect();
                let filter = match clauses.as_slice() {
                    [] => return Err(FacetError::new(FacetErrorKind::InvalidSearch)),
                    [one] => one.clone(),
                    several => several.iter().map(|c| format!("({c})")).collect::<Vec<_>>().join(";"),
                };
                parts.push(filter);
                parts.push(root);
                Ok(parts.join("/"))
            }
        }
    }
}

fn term_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Every token must match at least one of the columns
fn column_disjunction(term: &str, refs: &[String]) -> Option<String> {
    let tokens = tokenize(term);
    if tokens.is_empty() {
        return None;
    }
    let conjuncts: Vec<String> = tokens
        .iter()
        .map(|token| {
            let pattern = encode(&search_pattern(token));
            let alternatives: Vec<String> = refs.iter().map(|r| format!("{r}::ciregexp::{pattern}")).collect();
            format!("({})", alternatives.join(";"))
        })
        .collect();
    Some(conjuncts.join("&"))
}
