use super::*;
use crate::{error::ErrorKind, query::ValidateError};
use serde_json::json;
use tutordb_schema::{
    catalog,
    prelude::{EntityModel, FieldModel},
};

fn field(entity: &EntityModel, name: &str) -> &'static FieldModel {
    entity.field(name).expect("catalog field should exist")
}

#[test]
fn int_rejects_fractional_numbers() {
    let order = field(&catalog::CHAPTER, "order");

    assert_eq!(
        parse_literal("Chapter", order, &json!(3)).expect("int should parse"),
        Value::Int(3)
    );
    let err = parse_literal("Chapter", order, &json!(3.5)).expect_err("fraction should fail");
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[test]
fn enum_literal_resolves_to_declared_variant() {
    let status = field(&catalog::CHAPTER, "status");

    assert_eq!(
        parse_literal("Chapter", status, &json!("FINISHED")).expect("variant should parse"),
        Value::Enum("FINISHED")
    );
    let err = parse_literal("Chapter", status, &json!("completed"))
        .expect_err("wrong case should fail");
    assert!(matches!(err, ValidateError::InvalidValue { .. }));
}

#[test]
fn datetime_normalizes_to_utc() {
    let created = field(&catalog::CHAPTER, "createdAt");
    let value = parse_literal("Chapter", created, &json!("2024-03-01T10:00:00+02:00"))
        .expect("offset datetime should parse");

    assert_eq!(value.to_json(), json!("2024-03-01T08:00:00Z"));
}

#[test]
fn null_only_passes_nullable_columns() {
    let description = field(&catalog::COURSE, "description");
    let title = field(&catalog::CHAPTER, "title");

    assert_eq!(
        parse_nullable("Course", description, &json!(null)).expect("nullable should accept null"),
        Value::Null
    );
    assert!(parse_nullable("Chapter", title, &json!(null)).is_err());
}

#[test]
fn list_errors_carry_element_index() {
    let objectives = field(&catalog::CHAPTER, "objectives");
    let err = parse_list("Chapter", objectives, &json!(["a", 2]), 10)
        .expect_err("mixed list should fail");

    assert_eq!(err.path(), Some("[1]"));
}

#[test]
fn list_limit_is_enforced() {
    let objectives = field(&catalog::CHAPTER, "objectives");
    let err = parse_list("Chapter", objectives, &json!(["a", "b", "c"]), 2)
        .expect_err("over-long list should fail");

    assert_eq!(err.kind(), ErrorKind::LimitExceeded);
}
