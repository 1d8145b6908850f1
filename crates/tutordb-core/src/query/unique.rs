//! Module: query::unique
//! Responsibility: by-identity selectors that name exactly one unique constraint.
//! Does not own: row existence; a well-formed selector may still match nothing.

use crate::{
    query::ValidateError,
    value::{self, Value},
};
use serde_json::{Map, Value as JsonValue};
use tutordb_schema::prelude::{EntityModel, UniqueModel};

///
/// UniqueSelector
///
/// Complete key for one unique constraint.
/// `values` follow the constraint's declared field order.
///

#[derive(Clone, Debug, PartialEq)]
pub struct UniqueSelector {
    pub entity: &'static str,
    pub constraint: &'static UniqueModel,
    pub values: Vec<(&'static str, Value)>,
}

impl UniqueSelector {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .iter()
            .find_map(|(name, value)| (*name == field).then_some(value))
    }

    /// Render in the flat `{field: value}` form.
    #[must_use]
    pub fn to_document(&self) -> JsonValue {
        let map: Map<String, JsonValue> = self
            .values
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.to_json()))
            .collect();

        JsonValue::Object(map)
    }
}

/// Parse a selector in either flat form (`{courseId, order}`) or compound
/// alias form (`{courseId_order: {courseId, order}}`).
pub(crate) fn parse_unique(
    entity: &'static EntityModel,
    input: &JsonValue,
) -> Result<UniqueSelector, ValidateError> {
    let JsonValue::Object(map) = input else {
        return Err(ValidateError::invalid_shape("unique selector object", input));
    };
    if map.is_empty() {
        return Err(ValidateError::malformed_key(
            entity.name,
            format!("selector names no unique field; expected {}", expected(entity)),
        ));
    }

    if let Some((alias, parts, constraint)) = map
        .iter()
        .find_map(|(key, value)| entity.unique_by_alias(key).map(|c| (key, value, c)))
    {
        if map.len() != 1 {
            return Err(ValidateError::malformed_key(
                entity.name,
                format!("compound key '{alias}' cannot be combined with other fields"),
            ));
        }
        let JsonValue::Object(parts) = parts else {
            return Err(ValidateError::invalid_shape("compound key object", parts).with_field(alias));
        };

        return build(entity, constraint, parts).map_err(|err| err.with_field(alias));
    }

    for key in map.keys() {
        if entity.is_unique_member(key) {
            continue;
        }
        if entity.field(key).is_some() {
            return Err(ValidateError::malformed_key(
                entity.name,
                format!("'{key}' is not part of any unique constraint"),
            ));
        }
        return Err(ValidateError::unknown_field(entity.name, key));
    }

    let constraint = entity
        .uniques
        .iter()
        .find(|u| u.matches_exactly(map.keys().map(String::as_str)))
        .ok_or_else(|| {
            let named = map.keys().map(String::as_str).collect::<Vec<_>>().join(", ");
            ValidateError::malformed_key(
                entity.name,
                format!(
                    "({named}) is not a complete unique key; expected {}",
                    expected(entity)
                ),
            )
        })?;

    build(entity, constraint, map)
}

fn build(
    entity: &'static EntityModel,
    constraint: &'static UniqueModel,
    parts: &Map<String, JsonValue>,
) -> Result<UniqueSelector, ValidateError> {
    if let Some(extra) = parts.keys().find(|k| !constraint.contains(k)) {
        return Err(ValidateError::malformed_key(
            entity.name,
            format!("'{extra}' is not part of {constraint}"),
        ));
    }

    let mut values = Vec::with_capacity(constraint.fields.len());
    for name in constraint.fields {
        let Some(raw) = parts.get(*name) else {
            return Err(ValidateError::malformed_key(
                entity.name,
                format!("missing '{name}' from {constraint}"),
            ));
        };
        let field = entity
            .field(name)
            .ok_or_else(|| ValidateError::unknown_field(entity.name, *name))?;
        let value = value::parse_literal(entity.name, field, raw).map_err(|err| err.with_field(name))?;
        values.push((field.name, value));
    }

    Ok(UniqueSelector {
        entity: entity.name,
        constraint,
        values,
    })
}

fn expected(entity: &EntityModel) -> String {
    entity
        .uniques
        .iter()
        .map(|u| match u.name {
            Some(alias) => format!("{alias}({})", u.fields.join(", ")),
            None => u.fields.join(", "),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

///
/// TESTS
///
