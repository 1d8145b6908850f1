use crate::{query::ValidateError, value::Value};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tutordb_schema::prelude::{FieldModel, ScalarKind};

/// Parse one non-null element literal for `field`.
/// List fields are parsed element-wise; the list flag is ignored here.
pub(crate) fn parse_literal(
    entity: &'static str,
    field: &'static FieldModel,
    input: &JsonValue,
) -> Result<Value, ValidateError> {
    let mismatch = || ValidateError::invalid_value(entity, field.name, field.kind.label(), input);

    let value = match (field.kind, input) {
        (_, JsonValue::Null) => return Err(mismatch()),
        (ScalarKind::Boolean, JsonValue::Bool(v)) => Value::Boolean(*v),
        (ScalarKind::Int, JsonValue::Number(n)) => Value::Int(n.as_i64().ok_or_else(mismatch)?),
        (ScalarKind::Float, JsonValue::Number(n)) => {
            Value::Float(n.as_f64().ok_or_else(mismatch)?)
        }
        (ScalarKind::String, JsonValue::String(s)) => Value::String(s.clone()),
        (ScalarKind::DateTime, JsonValue::String(s)) => {
            let parsed = DateTime::parse_from_rfc3339(s).map_err(|_| {
                ValidateError::InvalidValue {
                    entity,
                    field: field.name,
                    expected: "RFC 3339 DateTime".into(),
                    found: format!("'{s}'"),
                }
            })?;
            Value::DateTime(parsed.with_timezone(&Utc))
        }
        (ScalarKind::Enum(model), JsonValue::String(s)) => {
            let variant = model.variant(s).ok_or_else(|| ValidateError::InvalidValue {
                entity,
                field: field.name,
                expected: format!("one of {}", model.variants.join(", ")),
                found: format!("'{s}'"),
            })?;
            Value::Enum(variant)
        }
        (ScalarKind::Json, other) => Value::Json(other.clone()),
        _ => return Err(mismatch()),
    };

    Ok(value)
}

/// Parse a literal that may be null when the column is nullable.
pub(crate) fn parse_nullable(
    entity: &'static str,
    field: &'static FieldModel,
    input: &JsonValue,
) -> Result<Value, ValidateError> {
    if input.is_null() {
        if field.nullable {
            return Ok(Value::Null);
        }
        return Err(ValidateError::invalid_value(
            entity,
            field.name,
            format!("non-null {}", field.kind),
            input,
        ));
    }

    parse_literal(entity, field, input)
}

/// Parse a JSON array of non-null element literals.
pub(crate) fn parse_list(
    entity: &'static str,
    field: &'static FieldModel,
    input: &JsonValue,
    limit: usize,
) -> Result<Vec<Value>, ValidateError> {
    let JsonValue::Array(items) = input else {
        return Err(ValidateError::invalid_value(
            entity,
            field.name,
            format!("list of {}", field.kind),
            input,
        ));
    };
    if items.len() > limit {
        return Err(ValidateError::ListTooLong {
            len: items.len(),
            limit,
        });
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_literal(entity, field, item).map_err(|err| err.with_index(i)))
        .collect()
}
