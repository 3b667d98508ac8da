//! Facet compile errors

use std::fmt;
use thiserror::Error;
use crate::constraint::ConstraintError;
use crate::emitter::RenderError;
use crate::resolver::SourceError;
use crate::source::SpecError;

/// The fixed set of user-facing facet failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetErrorKind {
    InvalidFacet,
    InvalidBooleanOperator,
    InvalidSource,
    InvalidSourcekey,
    InvalidChoice,
    InvalidRange,
    InvalidSearch,
    MissingConstraints,
    InvalidColumnInPath,
    DuplicateRightJoin,
}

impl FacetErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            FacetErrorKind::InvalidFacet => "Facet description is invalid.",
            FacetErrorKind::InvalidBooleanOperator => "Only conjunction of facets is supported currently.",
            FacetErrorKind::InvalidSource => "Missing or invalid `source` attribute.",
            FacetErrorKind::InvalidSourcekey => "Given sourcekey string is not valid",
            FacetErrorKind::InvalidChoice => "invalid choices value.",
            FacetErrorKind::InvalidRange => "invalid ranges value.",
            FacetErrorKind::InvalidSearch => "invalid search value.",
            FacetErrorKind::MissingConstraints => "No constraints are defined for the facet.",
            FacetErrorKind::InvalidColumnInPath => {
                "end column in the path is not valid (not available in the end table)"
            }
            FacetErrorKind::DuplicateRightJoin => "Only one null filter is allowed in the facets",
        }
    }
}

/// Lower-level error a facet failure was raised from
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FacetCause {
    #[error(transparent)]
    Spec(#[from] SpecError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Constraint(#[from] ConstraintError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A failed compile: what went wrong and, when known, which term caused it
///
/// Displays as the kind's message, suffixed with `(index=<i>)` when the
/// failing term is known.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct FacetError {
    pub kind: FacetErrorKind,
    pub index: Option<usize>,
    #[source]
    pub cause: Option<FacetCause>,
}

impl fmt::Display for FacetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.message())?;
        if let Some(index) = self.index {
            write!(f, "(index={index})")?;
        }
        Ok(())
    }
}

impl FacetError {
    pub fn new(kind: FacetErrorKind) -> Self {
        Self {
            kind,
            index: None,
            cause: None,
        }
    }

    /// Attach the index of the offending term
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn caused_by(mut self, cause: impl Into<FacetCause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn message(&self) -> &'static str {
        self.kind.message()
    }
}

impl From<SpecError> for FacetError {
    fn from(err: SpecError) -> Self {
        FacetError::new(FacetErrorKind::InvalidSource).caused_by(err)
    }
}

impl From<SourceError> for FacetError {
    fn from(err: SourceError) -> Self {
        let kind = match &err {
            SourceError::InvalidColumn { .. } => FacetErrorKind::InvalidColumnInPath,
            SourceError::UnresolvedSourcekey(_)
            | SourceError::NotAPath(_)
            | SourceError::MisplacedSourcekey(_) => FacetErrorKind::InvalidSourcekey,
            _ => FacetErrorKind::InvalidSource,
        };
        FacetError::new(kind).caused_by(err)
    }
}

impl From<ConstraintError> for FacetError {
    fn from(err: ConstraintError) -> Self {
        let kind = match &err {
            ConstraintError::InvalidChoice(_) => FacetErrorKind::InvalidChoice,
            ConstraintError::InvalidRange(_) => FacetErrorKind::InvalidRange,
            ConstraintError::InvalidSearch(_) => FacetErrorKind::InvalidSearch,
        };
        FacetError::new(kind).caused_by(err)
    }
}

impl From<RenderError> for FacetError {
    fn from(err: RenderError) -> Self {
        FacetError::new(FacetErrorKind::InvalidSearch).caused_by(err)
    }
}
