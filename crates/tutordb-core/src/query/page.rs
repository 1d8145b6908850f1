use crate::query::{
    Ctx, ValidateError,
    unique::{UniqueSelector, parse_unique},
};
use serde_json::Value as JsonValue;
use tutordb_schema::prelude::{EntityModel, FieldModel};

///
/// Pagination
///
/// Cursor-by-unique-key plus signed take / non-negative skip.
/// A negative `take` pages backwards from the cursor.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pagination {
    pub cursor: Option<UniqueSelector>,
    pub take: Option<i64>,
    pub skip: Option<u64>,
}

impl Pagination {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cursor.is_none() && self.take.is_none() && self.skip.is_none()
    }
}

pub(crate) fn parse_cursor(
    entity: &'static EntityModel,
    input: &JsonValue,
) -> Result<UniqueSelector, ValidateError> {
    parse_unique(entity, input)
}

pub(crate) fn parse_take(input: &JsonValue) -> Result<i64, ValidateError> {
    input
        .as_i64()
        .ok_or_else(|| ValidateError::invalid_shape("signed 64-bit integer", input))
}

pub(crate) fn parse_skip(input: &JsonValue) -> Result<u64, ValidateError> {
    input
        .as_u64()
        .ok_or_else(|| ValidateError::invalid_shape("non-negative integer", input))
}

/// Parse `distinct`: one scalar field name or an array of them.
pub(crate) fn parse_distinct(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    input: &JsonValue,
) -> Result<Vec<&'static str>, ValidateError> {
    let names: Vec<&JsonValue> = match input {
        JsonValue::Array(items) => {
            ctx.check_len(items.len())?;
            items.iter().collect()
        }
        other => vec![other],
    };

    let mut out: Vec<&'static str> = Vec::with_capacity(names.len());
    for name in names {
        let field = scalar_field_name(entity, name)?;
        if field.kind.is_json() {
            return Err(ValidateError::OperatorNotSupported {
                entity: entity.name,
                field: field.name,
                operator: "distinct".into(),
                kind: field.kind.to_string(),
            });
        }
        if !out.contains(&field.name) {
            out.push(field.name);
        }
    }

    Ok(out)
}

/// Resolve a JSON string naming a scalar field of `entity`.
pub(crate) fn scalar_field_name(
    entity: &'static EntityModel,
    name: &JsonValue,
) -> Result<&'static FieldModel, ValidateError> {
    let text = name
        .as_str()
        .ok_or_else(|| ValidateError::invalid_shape("field name", name))?;

    entity
        .field(text)
        .ok_or_else(|| ValidateError::unknown_field(entity.name, text))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, error::ErrorKind};
    use serde_json::json;
    use tutordb_schema::prelude::registry;

    fn distinct(entity: &str, input: JsonValue) -> Result<Vec<&'static str>, ValidateError> {
        let registry = registry().expect("catalog registry should build");
        let config = Config::default();
        let ctx = Ctx::new(registry, &config);

        parse_distinct(ctx, ctx.entity(entity)?, &input)
    }

    #[test]
    fn take_is_signed_and_skip_is_not() {
        assert_eq!(parse_take(&json!(-5)).expect("negative take"), -5);
        assert!(parse_skip(&json!(-5)).is_err());
        assert_eq!(parse_skip(&json!(10)).expect("skip"), 10);
    }

    #[test]
    fn distinct_accepts_one_or_many() {
        assert_eq!(distinct("Chapter", json!("status")).expect("single"), vec!["status"]);
        assert_eq!(
            distinct("Chapter", json!(["status", "courseId", "status"])).expect("list"),
            vec!["status", "courseId"]
        );
    }

    #[test]
    fn distinct_rejects_json_and_unknown_fields() {
        assert_eq!(
            distinct("Chapter", json!("content")).expect_err("json").kind(),
            ErrorKind::OperatorNotSupported
        );
        assert_eq!(
            distinct("Chapter", json!("course")).expect_err("relation").kind(),
            ErrorKind::UnknownField
        );
    }
}
