use crate::{
    null::{self, JsonWrite},
    query::{Ctx, ValidateError, keyword::operations, mutation::WriteMode},
    value::{self, Value},
};
use serde_json::{Map, Value as JsonValue};
use tutordb_schema::prelude::{EntityModel, FieldModel};

///
/// ScalarWrite
///
/// Resolved write for one scalar column.
/// Numeric operators and `Push` only appear in update inputs.
///

#[derive(Clone, Debug, PartialEq)]
pub enum ScalarWrite {
    /// Replace the column; `Value::List` for list columns.
    Set(Value),
    SetJson(JsonWrite),
    Increment(Value),
    Decrement(Value),
    Multiply(Value),
    Divide(Value),
    /// Append to a list column.
    Push(Vec<Value>),
}

///
/// ScalarAssignment
///

#[derive(Clone, Debug, PartialEq)]
pub struct ScalarAssignment {
    pub field: &'static str,
    pub write: ScalarWrite,
}

pub(crate) fn parse_scalar_write(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    field: &'static FieldModel,
    input: &JsonValue,
    mode: WriteMode,
) -> Result<ScalarWrite, ValidateError> {
    if field.list {
        return parse_list_write(ctx, entity, field, input, mode);
    }
    if field.kind.is_json() {
        return null::resolve_write(entity.name, field, Some(input)).map(ScalarWrite::SetJson);
    }

    let JsonValue::Object(map) = input else {
        return value::parse_nullable(entity.name, field, input).map(ScalarWrite::Set);
    };
    let (key, operand) = single_entry(map)?;

    let write = match key {
        operations::SET => {
            return value::parse_nullable(entity.name, field, operand)
                .map(ScalarWrite::Set)
                .map_err(|err| err.with_field(key));
        }
        operations::INCREMENT => ScalarWrite::Increment,
        operations::DECREMENT => ScalarWrite::Decrement,
        operations::MULTIPLY => ScalarWrite::Multiply,
        operations::DIVIDE => ScalarWrite::Divide,
        other => return Err(not_supported(entity, field, other, field.kind.to_string())),
    };

    if !field.kind.is_numeric() {
        return Err(not_supported(entity, field, key, field.kind.to_string()));
    }
    if mode == WriteMode::Create {
        return Err(not_supported(entity, field, key, format!("{mode} input")));
    }

    let amount = value::parse_literal(entity.name, field, operand).map_err(|err| err.with_field(key))?;

    Ok(write(amount))
}

fn parse_list_write(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    field: &'static FieldModel,
    input: &JsonValue,
    mode: WriteMode,
) -> Result<ScalarWrite, ValidateError> {
    let limit = ctx.config.max_list_len;
    let map = match input {
        JsonValue::Array(_) => {
            return value::parse_list(entity.name, field, input, limit)
                .map(|items| ScalarWrite::Set(Value::List(items)));
        }
        JsonValue::Object(map) => map,
        other => {
            return Err(ValidateError::invalid_value(
                entity.name,
                field.name,
                format!("list of {}", field.kind),
                other,
            ));
        }
    };

    if map.contains_key(operations::SET) && map.contains_key(operations::PUSH) {
        return Err(ValidateError::InvalidShape {
            expected: "either set or push",
            found: "both".into(),
        });
    }
    let (key, operand) = single_entry(map)?;

    match key {
        operations::SET => value::parse_list(entity.name, field, operand, limit)
            .map(|items| ScalarWrite::Set(Value::List(items)))
            .map_err(|err| err.with_field(key)),
        operations::PUSH if mode == WriteMode::Create => {
            Err(not_supported(entity, field, key, format!("{mode} input")))
        }
        operations::PUSH => {
            let items = match operand {
                JsonValue::Array(_) => value::parse_list(entity.name, field, operand, limit),
                single => value::parse_literal(entity.name, field, single).map(|v| vec![v]),
            };

            items.map(ScalarWrite::Push).map_err(|err| err.with_field(key))
        }
        other => Err(not_supported(entity, field, other, format!("list of {}", field.kind))),
    }
}

fn single_entry(map: &Map<String, JsonValue>) -> Result<(&str, &JsonValue), ValidateError> {
    let mut entries = map.iter();
    match (entries.next(), entries.next()) {
        (Some((key, value)), None) => Ok((key.as_str(), value)),
        _ => Err(ValidateError::InvalidShape {
            expected: "object with exactly one write operation",
            found: format!("{} keys", map.len()),
        }),
    }
}

fn not_supported(
    entity: &'static EntityModel,
    field: &'static FieldModel,
    operator: &str,
    kind: String,
) -> ValidateError {
    ValidateError::OperatorNotSupported {
        entity: entity.name,
        field: field.name,
        operator: operator.to_string(),
        kind,
    }
}
