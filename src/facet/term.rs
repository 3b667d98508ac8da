//! Facet terms and sourcekey inheritance

use serde_json::{Map, Value};
use crate::constraint::Constraint;
use crate::resolver::SourceDefinitions;
use crate::source::{SourceSpec, SEARCH_BOX};
use super::error::{FacetError, FacetErrorKind};

pub(crate) const AND: &str = "and";
pub(crate) const OR: &str = "or";
pub(crate) const SOURCE: &str = "source";
pub(crate) const SOURCEKEY: &str = "sourcekey";
const CHOICES: &str = "choices";
const RANGES: &str = "ranges";
const SEARCH: &str = "search";
const NOT_NULL: &str = "not_null";

/// Where a term's column comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermSource {
    /// The reserved search box of the table
    SearchBox,
    /// A named source definition
    Sourcekey(String),
    /// The term's own `source` attribute
    Inline,
}

/// One conjunct of a facet blob, with inherited attributes merged in
#[derive(Debug, Clone)]
pub struct FacetTerm {
    pub origin: TermSource,
    pub object: Map<String, Value>,
}

impl FacetTerm {
    pub fn parse(value: &Value, definitions: &SourceDefinitions<'_>) -> Result<Self, FacetError> {
        let obj = value
            .as_object()
            .ok_or_else(|| FacetError::new(FacetErrorKind::InvalidFacet))?;

        let origin = match obj.get(SOURCEKEY) {
            None => TermSource::Inline,
            Some(Value::String(key)) if key == SEARCH_BOX => TermSource::SearchBox,
            Some(Value::String(key)) => TermSource::Sourcekey(key.clone()),
            Some(_) => return Err(FacetError::new(FacetErrorKind::InvalidSourcekey)),
        };

        let mut object = obj.clone();
        if let TermSource::Sourcekey(key) = &origin {
            let definition = definitions
                .definition(key)
                .ok_or_else(|| FacetError::new(FacetErrorKind::InvalidSourcekey))?;
            inherit(&mut object, definition.object);
        }

        Ok(Self { origin, object })
    }

    pub fn sourcekey(&self) -> Option<&str> {
        match &self.origin {
            TermSource::Sourcekey(key) => Some(key),
            _ => None,
        }
    }

    /// The `source` attribute after inheritance
    pub fn source(&self) -> Result<SourceSpec, FacetError> {
        let value = self
            .object
            .get(SOURCE)
            .ok_or_else(|| FacetError::new(FacetErrorKind::InvalidSource))?;
        Ok(SourceSpec::from_value(value)?)
    }

    /// The `search` constraint, if the term has one
    pub fn search(&self) -> Result<Option<Constraint>, FacetError> {
        self.object.get(SEARCH).map(Constraint::search).transpose().map_err(Into::into)
    }

    /// Every constraint the term declares, in a fixed order
    pub fn constraints(&self) -> Result<Vec<Constraint>, FacetError> {
        let mut constraints = Vec::new();
        if let Some(value) = self.object.get(CHOICES) {
            constraints.push(Constraint::choices(value)?);
        }
        if let Some(value) = self.object.get(RANGES) {
            constraints.push(Constraint::ranges(value)?);
        }
        if let Some(search) = self.search()? {
            constraints.push(search);
        }
        if self.object.get(NOT_NULL) == Some(&Value::Bool(true)) {
            constraints.push(Constraint::NotNull);
        }
        if constraints.is_empty() {
            return Err(FacetError::new(FacetErrorKind::MissingConstraints));
        }
        Ok(constraints)
    }
}

/// Copy a definition's attributes into a term; the definition's `source`
/// always wins, everything else only fills gaps
fn inherit(term: &mut Map<String, Value>, definition: &Map<String, Value>) {
    for (key, value) in definition {
        if key == SOURCE || !term.contains_key(key) {
            term.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inherit_source_wins_other_attributes_fill_gaps() {
        let mut term = json!({"sourcekey": "k", "source": "own", "markdown_name": "Mine", "choices": [1]})
            .as_object()
            .cloned()
            .unwrap();
        let definition = json!({"source": "defined", "markdown_name": "Theirs", "ux_mode": "choices"})
            .as_object()
            .cloned()
            .unwrap();
        inherit(&mut term, &definition);

        assert_eq!(term["source"], json!("defined"));
        assert_eq!(term["markdown_name"], json!("Mine"));
        assert_eq!(term["ux_mode"], json!("choices"));
        assert_eq!(term["choices"], json!([1]));
    }
}
