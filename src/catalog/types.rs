//! Column type definitions for the catalog

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Column types understood by the path compiler
///
/// Only the distinctions the compiler acts on are modelled: numeric columns
/// get anchored search patterns and JSON columns carry a `null` literal that
/// is distinct from an absent value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnType {
    #[default]
    Text,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Numeric,
    Boolean,
    Date,
    Timestamp,
    Timestamptz,
    Json,
    Jsonb,
    /// Serial columns are integers that the server fills in
    Serial4,
    Serial8,
    /// Array of an element type (e.g. `text[]`)
    Array(Box<ColumnType>),
    /// Any domain or type the compiler does not need to distinguish
    Other(String),
}

impl ColumnType {
    /// Whether values of this type compare numerically
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Int2
                | ColumnType::Int4
                | ColumnType::Int8
                | ColumnType::Float4
                | ColumnType::Float8
                | ColumnType::Numeric
                | ColumnType::Serial4
                | ColumnType::Serial8
        )
    }

    /// Whether the type stores a `null` literal distinct from SQL NULL
    pub fn has_null_literal(&self) -> bool {
        matches!(self, ColumnType::Json | ColumnType::Jsonb)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Text => write!(f, "text"),
            ColumnType::Int2 => write!(f, "int2"),
            ColumnType::Int4 => write!(f, "int4"),
            ColumnType::Int8 => write!(f, "int8"),
            ColumnType::Float4 => write!(f, "float4"),
            ColumnType::Float8 => write!(f, "float8"),
            ColumnType::Numeric => write!(f, "numeric"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Date => write!(f, "date"),
            ColumnType::Timestamp => write!(f, "timestamp"),
            ColumnType::Timestamptz => write!(f, "timestamptz"),
            ColumnType::Json => write!(f, "json"),
            ColumnType::Jsonb => write!(f, "jsonb"),
            ColumnType::Serial4 => write!(f, "serial4"),
            ColumnType::Serial8 => write!(f, "serial8"),
            ColumnType::Array(inner) => write!(f, "{inner}[]"),
            ColumnType::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Error when parsing a column type string
#[derive(Debug, Clone, thiserror::Error)]
#[error("Invalid column type '{input}'")]
pub struct ParseColumnTypeError {
    pub input: String,
}

impl FromStr for ColumnType {
    type Err = ParseColumnTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseColumnTypeError { input: s.to_string() });
        }

        if let Some(inner) = trimmed.strip_suffix("[]") {
            return Ok(ColumnType::Array(Box::new(inner.parse()?)));
        }

        let lower = trimmed.to_lowercase();
        Ok(match lower.as_str() {
            "text" | "markdown" | "longtext" | "ermrest_curie" | "ermrest_uri" => ColumnType::Text,
            "int2" | "smallint" => ColumnType::Int2,
            "int4" | "integer" | "int" => ColumnType::Int4,
            "int8" | "bigint" => ColumnType::Int8,
            "float4" | "real" => ColumnType::Float4,
            "float8" | "double precision" => ColumnType::Float8,
            "numeric" => ColumnType::Numeric,
            "boolean" | "bool" => ColumnType::Boolean,
            "date" => ColumnType::Date,
            "timestamp" => ColumnType::Timestamp,
            "timestamptz" | "ermrest_rct" | "ermrest_rmt" => ColumnType::Timestamptz,
            "json" => ColumnType::Json,
            "jsonb" => ColumnType::Jsonb,
            "serial4" | "serial" => ColumnType::Serial4,
            "serial8" | "bigserial" => ColumnType::Serial8,
            // ERMrest system column domains
            "ermrest_rid" | "ermrest_rcb" | "ermrest_rmb" => ColumnType::Text,
            _ => ColumnType::Other(trimmed.to_string()),
        })
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ColumnType::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ColumnType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
