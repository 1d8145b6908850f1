//! Module: value
//! Responsibility: typed literals parsed from client JSON against a field model.
//! Does not own: null-marker handling for Json columns (see `null`).

mod literal;

#[cfg(test)]
mod tests;

pub(crate) use literal::{parse_list, parse_literal, parse_nullable};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value as JsonValue;

///
/// Value
///
/// A literal already checked against its column type.
/// Enum variants are resolved to the registry's static spelling.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Enum(&'static str),
    Json(JsonValue),
    List(Vec<Self>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Render back to the client wire form.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Boolean(v) => JsonValue::Bool(*v),
            Self::Int(v) => JsonValue::from(*v),
            Self::Float(v) => JsonValue::from(*v),
            Self::String(v) => JsonValue::String(v.clone()),
            Self::DateTime(v) => {
                JsonValue::String(v.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Self::Enum(v) => JsonValue::String((*v).to_string()),
            Self::Json(v) => v.clone(),
            Self::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}
