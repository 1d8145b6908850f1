use crate::{
    null::{self, JsonMatch},
    query::{
        Ctx, ValidateError,
        filter::ops::{self, FilterOp, OperandShape},
        keyword::filters,
    },
    value::{self, Value},
};
use serde_json::{Map, Value as JsonValue};
use tutordb_schema::prelude::{EntityModel, FieldModel};

///
/// QueryMode
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum QueryMode {
    #[default]
    Default,
    Insensitive,
}

///
/// Operand
///

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Value(Value),
    /// Json-column equality operand; may be a null marker.
    Json(JsonMatch),
}

impl Operand {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Value(value) => value.to_json(),
            Self::Json(matcher) => matcher.to_json(),
        }
    }
}

///
/// Condition
///

#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    Compare { op: FilterOp, operand: Operand },
    Not(Box<ScalarFilter>),
}

///
/// ScalarFilter
///
/// Conjunction of conditions on one scalar column.
/// An empty filter places no constraint on the column.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScalarFilter {
    pub conditions: Vec<Condition>,
    pub mode: QueryMode,
    /// Json path the conditions apply to.
    pub path: Option<Vec<String>>,
}

impl ScalarFilter {
    fn equals(operand: Operand) -> Self {
        Self {
            conditions: vec![Condition::Compare {
                op: FilterOp::Equals,
                operand,
            }],
            ..Self::default()
        }
    }

    /// Render to the canonical filter-object form.
    #[must_use]
    pub fn to_document(&self, field: &FieldModel) -> JsonValue {
        let mut map = Map::new();

        if let Some(path) = &self.path {
            map.insert(
                filters::PATH.into(),
                JsonValue::Array(path.iter().cloned().map(JsonValue::String).collect()),
            );
        }
        if self.mode == QueryMode::Insensitive {
            map.insert(
                filters::MODE.into(),
                JsonValue::String(filters::INSENSITIVE.into()),
            );
        }

        for condition in &self.conditions {
            match condition {
                Condition::Compare { op, operand } => {
                    map.insert(op.to_string(), operand.to_json());
                }
                Condition::Not(inner) => {
                    map.insert(filters::NOT_FIELD.into(), inner.not_document(field));
                }
            }
        }

        JsonValue::Object(map)
    }

    // Json columns negate a bare operand rather than a nested filter.
    fn not_document(&self, field: &FieldModel) -> JsonValue {
        if field.kind.is_json()
            && let [Condition::Compare { op: FilterOp::Equals, operand }] = self.conditions.as_slice()
        {
            return operand.to_json();
        }

        self.to_document(field)
    }
}

/// Parse the filter for one scalar column.
pub(crate) fn parse_scalar_filter(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    field: &'static FieldModel,
    input: &JsonValue,
) -> Result<ScalarFilter, ValidateError> {
    let JsonValue::Object(map) = input else {
        return parse_shorthand(entity, field, input);
    };

    let mut filter = ScalarFilter::default();
    for (key, value) in map {
        parse_entry(ctx, entity, field, key, value, &mut filter)
            .map_err(|err| err.with_field(key))?;
    }

    Ok(filter)
}

fn parse_shorthand(
    entity: &'static EntityModel,
    field: &'static FieldModel,
    input: &JsonValue,
) -> Result<ScalarFilter, ValidateError> {
    if ops::supports_shorthand(field) {
        let value = value::parse_nullable(entity.name, field, input)?;
        return Ok(ScalarFilter::equals(Operand::Value(value)));
    }

    if field.kind.is_json() && !field.list {
        // surfaces bare nulls as ambiguous
        null::resolve_filter(entity.name, field, input)?;
        return Err(ValidateError::invalid_value(
            entity.name,
            field.name,
            "Json filter object",
            input,
        ));
    }

    Err(ValidateError::invalid_value(
        entity.name,
        field.name,
        "scalar list filter object",
        input,
    ))
}

fn parse_entry(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    field: &'static FieldModel,
    key: &str,
    value: &JsonValue,
    filter: &mut ScalarFilter,
) -> Result<(), ValidateError> {
    match key {
        filters::NOT_FIELD if ops::supports_not(field) => {
            let inner = parse_not(ctx, entity, field, value)?;
            filter.conditions.push(Condition::Not(Box::new(inner)));
        }
        filters::MODE if ops::supports_mode(field) => {
            filter.mode = match value.as_str() {
                Some(filters::DEFAULT) => QueryMode::Default,
                Some(filters::INSENSITIVE) => QueryMode::Insensitive,
                _ => {
                    return Err(ValidateError::invalid_value(
                        entity.name,
                        field.name,
                        "\"default\" or \"insensitive\"",
                        value,
                    ));
                }
            };
        }
        filters::PATH if ops::supports_path(field) => {
            filter.path = Some(parse_path(entity, field, value)?);
        }
        _ => {
            let op = FilterOp::from_keyword(key)
                .filter(|op| op.supports(field))
                .ok_or_else(|| unsupported(entity, field, key))?;
            let operand = parse_operand(ctx, entity, field, op, value)?;
            filter.conditions.push(Condition::Compare { op, operand });
        }
    }

    Ok(())
}

fn parse_not(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    field: &'static FieldModel,
    value: &JsonValue,
) -> Result<ScalarFilter, ValidateError> {
    if field.kind.is_json() {
        let operand = null::resolve_filter(entity.name, field, value)?;
        return Ok(ScalarFilter::equals(Operand::Json(operand)));
    }

    if value.is_object() {
        parse_scalar_filter(ctx.descend()?, entity, field, value)
    } else {
        parse_shorthand(entity, field, value)
    }
}

fn parse_operand(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    field: &'static FieldModel,
    op: FilterOp,
    value: &JsonValue,
) -> Result<Operand, ValidateError> {
    let name = entity.name;

    let operand = match op.operand() {
        OperandShape::Literal if field.kind.is_json() && !field.list => {
            Operand::Json(null::resolve_filter(name, field, value)?)
        }
        OperandShape::Literal if field.list => Operand::Value(Value::List(value::parse_list(
            name,
            field,
            value,
            ctx.config.max_list_len,
        )?)),
        OperandShape::Literal => Operand::Value(value::parse_nullable(name, field, value)?),
        OperandShape::NonNull => Operand::Value(value::parse_literal(name, field, value)?),
        OperandShape::LiteralList => Operand::Value(Value::List(value::parse_list(
            name,
            field,
            value,
            ctx.config.max_list_len,
        )?)),
        OperandShape::Text => {
            let text = value.as_str().ok_or_else(|| {
                ValidateError::invalid_value(name, field.name, "string", value)
            })?;
            Operand::Value(Value::String(text.to_string()))
        }
        OperandShape::Flag => {
            let flag = value.as_bool().ok_or_else(|| {
                ValidateError::invalid_value(name, field.name, "boolean", value)
            })?;
            Operand::Value(Value::Boolean(flag))
        }
        OperandShape::Json => Operand::Value(Value::Json(value.clone())),
    };

    Ok(operand)
}

fn parse_path(
    entity: &'static EntityModel,
    field: &'static FieldModel,
    value: &JsonValue,
) -> Result<Vec<String>, ValidateError> {
    let invalid = || ValidateError::invalid_value(entity.name, field.name, "array of strings", value);

    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|segment| segment.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

fn unsupported(entity: &'static EntityModel, field: &'static FieldModel, key: &str) -> ValidateError {
    ValidateError::OperatorNotSupported {
        entity: entity.name,
        field: field.name,
        operator: key.to_string(),
        kind: ops::kind_label(field),
    }
}
