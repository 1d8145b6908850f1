//! Module: null
//! Responsibility: the three-way null model of Json columns.
//! Does not own: nullability of ordinary scalar columns (see `value`).
//!
//! A Json column distinguishes a database NULL from a stored JSON `null`.
//! Clients name which one they mean with a marker envelope
//! `{"$type": "Enum", "value": "DbNull" | "JsonNull" | "AnyNull"}`.
//! A bare JSON `null` on a Json column is rejected as ambiguous.

use crate::query::ValidateError;
use derive_more::Display;
use serde_json::{Map, Value as JsonValue};
use tutordb_schema::prelude::FieldModel;

pub const MARKER_TYPE_KEY: &str = "$type";
pub const MARKER_VALUE_KEY: &str = "value";
pub const MARKER_TYPE: &str = "Enum";

///
/// NullMarker
///
/// Null kinds a write may store.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum NullMarker {
    DbNull,
    JsonNull,
}

///
/// FilterNullMarker
///
/// Null kinds a filter may match. `AnyNull` matches either and has no write form.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum FilterNullMarker {
    DbNull,
    JsonNull,
    AnyNull,
}

impl FilterNullMarker {
    #[must_use]
    pub const fn matches_db_null(self) -> bool {
        matches!(self, Self::DbNull | Self::AnyNull)
    }

    #[must_use]
    pub const fn matches_json_null(self) -> bool {
        matches!(self, Self::JsonNull | Self::AnyNull)
    }
}

impl From<NullMarker> for FilterNullMarker {
    fn from(marker: NullMarker) -> Self {
        match marker {
            NullMarker::DbNull => Self::DbNull,
            NullMarker::JsonNull => Self::JsonNull,
        }
    }
}

///
/// JsonWrite
///
/// Resolved value for a Json column write.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum JsonWrite {
    Null(NullMarker),
    Value(JsonValue),
}

impl JsonWrite {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null(marker) => marker_envelope(&marker.to_string()),
            Self::Value(value) => value.clone(),
        }
    }
}

///
/// JsonMatch
///
/// Resolved operand for a Json column comparison.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum JsonMatch {
    Null(FilterNullMarker),
    Value(JsonValue),
}

impl JsonMatch {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null(marker) => marker_envelope(&marker.to_string()),
            Self::Value(value) => value.clone(),
        }
    }
}

/// Build a marker envelope for `token`.
#[must_use]
pub fn marker_envelope(token: &str) -> JsonValue {
    let mut map = Map::new();
    map.insert(MARKER_TYPE_KEY.into(), JsonValue::String(MARKER_TYPE.into()));
    map.insert(MARKER_VALUE_KEY.into(), JsonValue::String(token.into()));

    JsonValue::Object(map)
}

/// Return the marker token when `input` is exactly a marker envelope.
#[must_use]
pub fn marker_token(input: &JsonValue) -> Option<&str> {
    let JsonValue::Object(map) = input else {
        return None;
    };
    if map.len() != 2 || map.get(MARKER_TYPE_KEY)?.as_str()? != MARKER_TYPE {
        return None;
    }

    map.get(MARKER_VALUE_KEY)?.as_str()
}

/// Resolve a Json column write.
///
/// An absent value resolves to `DbNull`, so a nullable Json column omitted
/// from a create stores a database NULL.
pub fn resolve_write(
    entity: &'static str,
    field: &'static FieldModel,
    input: Option<&JsonValue>,
) -> Result<JsonWrite, ValidateError> {
    let resolved = match input {
        None => JsonWrite::Null(NullMarker::DbNull),
        Some(JsonValue::Null) => {
            return Err(ambiguous(
                entity,
                field,
                "use DbNull or JsonNull instead of a bare null",
            ));
        }
        Some(value) => match marker_token(value) {
            Some("DbNull") => JsonWrite::Null(NullMarker::DbNull),
            Some("JsonNull") => JsonWrite::Null(NullMarker::JsonNull),
            Some("AnyNull") => {
                return Err(ambiguous(
                    entity,
                    field,
                    "AnyNull is a filter marker and cannot be written",
                ));
            }
            Some(other) => return Err(unknown_marker(entity, field, other)),
            None => JsonWrite::Value(value.clone()),
        },
    };

    if resolved == JsonWrite::Null(NullMarker::DbNull) && !field.nullable {
        return Err(ValidateError::InvalidValue {
            entity,
            field: field.name,
            expected: "JsonNull or a JSON value".into(),
            found: "DbNull".into(),
        });
    }

    Ok(resolved)
}

/// Resolve a Json column comparison operand.
pub fn resolve_filter(
    entity: &'static str,
    field: &'static FieldModel,
    input: &JsonValue,
) -> Result<JsonMatch, ValidateError> {
    let marker = match input {
        JsonValue::Null => {
            return Err(ambiguous(
                entity,
                field,
                "use DbNull, JsonNull, or AnyNull instead of a bare null",
            ));
        }
        value => match marker_token(value) {
            Some("DbNull") => FilterNullMarker::DbNull,
            Some("JsonNull") => FilterNullMarker::JsonNull,
            Some("AnyNull") => FilterNullMarker::AnyNull,
            Some(other) => return Err(unknown_marker(entity, field, other)),
            None => return Ok(JsonMatch::Value(value.clone())),
        },
    };

    // a required column never holds a database NULL; AnyNull still matches JsonNull there
    if marker == FilterNullMarker::DbNull && !field.nullable {
        return Err(ValidateError::InvalidValue {
            entity,
            field: field.name,
            expected: "JsonNull or a JSON value".into(),
            found: marker.to_string(),
        });
    }

    Ok(JsonMatch::Null(marker))
}

fn ambiguous(
    entity: &'static str,
    field: &'static FieldModel,
    reason: &'static str,
) -> ValidateError {
    ValidateError::AmbiguousNull {
        entity,
        field: field.name,
        reason,
    }
}

fn unknown_marker(entity: &'static str, field: &'static FieldModel, token: &str) -> ValidateError {
    ValidateError::InvalidValue {
        entity,
        field: field.name,
        expected: "DbNull, JsonNull, or AnyNull".into(),
        found: format!("'{token}'"),
    }
}

///
/// TESTS
///
