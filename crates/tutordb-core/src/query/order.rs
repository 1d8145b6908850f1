//! Module: query::order
//! Responsibility: caller-declared ordering over scalar fields and relation counts.
//! Does not own: tie-breaking; storage appends its own stable key if it needs one.

use crate::query::{
    Ctx, ValidateError,
    keyword::{aggregations, ordering},
    map_indexed,
};
use derive_more::Display;
use serde_json::{Map, Value as JsonValue};
use tutordb_schema::prelude::{EntityModel, FieldModel};

///
/// SortOrder
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum SortOrder {
    #[default]
    #[display("asc")]
    Asc,
    #[display("desc")]
    Desc,
}

///
/// NullsOrder
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum NullsOrder {
    #[display("first")]
    First,
    #[display("last")]
    Last,
}

///
/// OrderTarget
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OrderTarget {
    Field(&'static str),
    /// Number of rows linked through a to-many relation.
    RelationCount(&'static str),
}

///
/// OrderTerm
///
/// One ordering key. `path` lists the to-one relations walked to reach the
/// target, outermost first.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderTerm {
    pub path: Vec<&'static str>,
    pub target: OrderTarget,
    pub sort: SortOrder,
    /// `None` leaves null placement to storage.
    pub nulls: Option<NullsOrder>,
}

impl OrderTerm {
    fn to_document(&self) -> JsonValue {
        let leaf = match &self.target {
            OrderTarget::Field(field) => {
                let sort = JsonValue::String(self.sort.to_string());
                let value = match self.nulls {
                    None => sort,
                    Some(nulls) => {
                        let mut map = Map::new();
                        map.insert(ordering::SORT.into(), sort);
                        map.insert(ordering::NULLS.into(), JsonValue::String(nulls.to_string()));
                        JsonValue::Object(map)
                    }
                };
                single((*field).to_string(), value)
            }
            OrderTarget::RelationCount(relation) => single(
                (*relation).to_string(),
                single(
                    aggregations::COUNT.into(),
                    JsonValue::String(self.sort.to_string()),
                ),
            ),
        };

        self.path
            .iter()
            .rev()
            .fold(leaf, |inner, relation| single((*relation).to_string(), inner))
    }
}

fn single(key: String, value: JsonValue) -> JsonValue {
    let mut map = Map::new();
    map.insert(key, value);

    JsonValue::Object(map)
}

///
/// OrderSpec
///
/// Ordered list of terms; earlier terms take precedence.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OrderSpec {
    pub terms: Vec<OrderTerm>,
}

impl OrderSpec {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Top-level scalar fields ordered on, in order.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.terms.iter().filter_map(|term| match term.target {
            OrderTarget::Field(field) if term.path.is_empty() => Some(field),
            _ => None,
        })
    }

    /// Render as an array of single-key objects.
    #[must_use]
    pub fn to_document(&self) -> JsonValue {
        JsonValue::Array(self.terms.iter().map(OrderTerm::to_document).collect())
    }
}

/// Parse `orderBy`: a single-key object or an array of them.
pub(crate) fn parse_order(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    input: &JsonValue,
) -> Result<OrderSpec, ValidateError> {
    let terms = match input {
        JsonValue::Array(items) => {
            ctx.check_len(items.len())?;
            map_indexed(items, |item| parse_term(ctx, entity, item, Vec::new()))?
        }
        other => vec![parse_term(ctx, entity, other, Vec::new())?],
    };

    Ok(OrderSpec { terms })
}

fn parse_term(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    input: &JsonValue,
    path: Vec<&'static str>,
) -> Result<OrderTerm, ValidateError> {
    let map = match input {
        JsonValue::Object(map) if map.len() == 1 => map,
        other => {
            return Err(ValidateError::invalid_shape(
                "orderBy object with exactly one key",
                other,
            ));
        }
    };
    let Some((key, value)) = map.iter().next() else {
        return Err(ValidateError::invalid_shape(
            "orderBy object with exactly one key",
            input,
        ));
    };

    parse_entry(ctx, entity, key, value, path).map_err(|err| err.with_field(key))
}

fn parse_entry(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    key: &str,
    value: &JsonValue,
    mut path: Vec<&'static str>,
) -> Result<OrderTerm, ValidateError> {
    if let Some(field) = entity.field(key) {
        if !field.is_orderable() {
            return Err(ValidateError::OperatorNotSupported {
                entity: entity.name,
                field: field.name,
                operator: "orderBy".into(),
                kind: field.kind.to_string(),
            });
        }
        let (sort, nulls) = parse_field_sort(entity, field, value)?;

        return Ok(OrderTerm {
            path,
            target: OrderTarget::Field(field.name),
            sort,
            nulls,
        });
    }

    let relation = entity
        .relation(key)
        .ok_or_else(|| ValidateError::unknown_field(entity.name, key))?;

    if relation.cardinality.is_to_many() {
        let sort = match value {
            JsonValue::Object(map) if map.len() == 1 => match map.get(aggregations::COUNT) {
                Some(sort) => parse_sort(sort).map_err(|err| err.with_field(aggregations::COUNT))?,
                None => return Err(count_only(value)),
            },
            other => return Err(count_only(other)),
        };

        return Ok(OrderTerm {
            path,
            target: OrderTarget::RelationCount(relation.name),
            sort,
            nulls: None,
        });
    }

    let ctx = ctx.descend()?;
    let target = ctx.target(relation)?;
    path.push(relation.name);

    parse_term(ctx, target, value, path)
}

fn count_only(found: &JsonValue) -> ValidateError {
    ValidateError::invalid_shape("{\"_count\": \"asc\" | \"desc\"}", found)
}

fn parse_field_sort(
    entity: &'static EntityModel,
    field: &'static FieldModel,
    value: &JsonValue,
) -> Result<(SortOrder, Option<NullsOrder>), ValidateError> {
    let JsonValue::Object(map) = value else {
        return Ok((parse_sort(value)?, None));
    };

    if let Some(extra) = map
        .keys()
        .find(|k| *k != ordering::SORT && *k != ordering::NULLS)
    {
        return Err(ValidateError::unknown_field(entity.name, extra));
    }

    let sort = map
        .get(ordering::SORT)
        .ok_or(ValidateError::MissingArgument {
            action: "orderBy",
            argument: ordering::SORT,
        })
        .and_then(parse_sort)?;

    let nulls = match map.get(ordering::NULLS) {
        None => None,
        Some(_) if !field.nullable => {
            return Err(ValidateError::OperatorNotSupported {
                entity: entity.name,
                field: field.name,
                operator: ordering::NULLS.into(),
                kind: format!("non-null {}", field.kind),
            });
        }
        Some(raw) => Some(match raw.as_str() {
            Some(ordering::FIRST) => NullsOrder::First,
            Some(ordering::LAST) => NullsOrder::Last,
            _ => {
                return Err(
                    ValidateError::invalid_shape("\"first\" or \"last\"", raw)
                        .with_field(ordering::NULLS),
                );
            }
        }),
    };

    Ok((sort, nulls))
}

fn parse_sort(value: &JsonValue) -> Result<SortOrder, ValidateError> {
    match value.as_str() {
        Some(ordering::ASC) => Ok(SortOrder::Asc),
        Some(ordering::DESC) => Ok(SortOrder::Desc),
        _ => Err(ValidateError::invalid_shape("\"asc\" or \"desc\"", value)),
    }
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

    fn parse(entity: &str, input: JsonValue) -> Result<OrderSpec, ValidateError> {
        let registry = registry().expect("catalog registry should build");
        let config = Config::default();
        let ctx = Ctx::new(registry, &config);

        parse_order(ctx, ctx.entity(entity)?, &input)
    }

    #[test]
    fn single_field_uses_default_nulls() {
        let spec = parse("Chapter", json!({ "order": "asc" })).expect("order asc should parse");

        assert_eq!(
            spec.terms,
            vec![OrderTerm {
                path: vec![],
                target: OrderTarget::Field("order"),
                sort: SortOrder::Asc,
                nulls: None,
            }]
        );
    }

    #[test]
    fn list_order_is_preserved() {
        let spec = parse("Chapter", json!([{ "title": "desc" }, { "order": "asc" }]))
            .expect("list should parse");

        assert_eq!(spec.fields().collect::<Vec<_>>(), vec!["title", "order"]);
    }

    #[test]
    fn multi_key_objects_are_rejected() {
        let err = parse("Chapter", json!({ "title": "desc", "order": "asc" }))
            .expect_err("two keys in one object");

        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn nulls_placement_needs_nullable_field() {
        let spec = parse(
            "QuizAttempt",
            json!({ "score": { "sort": "desc", "nulls": "last" } }),
        )
        .expect("nullable field may place nulls");
        assert_eq!(spec.terms[0].nulls, Some(NullsOrder::Last));

        let err = parse(
            "Chapter",
            json!({ "order": { "sort": "desc", "nulls": "last" } }),
        )
        .expect_err("required field cannot place nulls");
        assert_eq!(err.kind(), ErrorKind::OperatorNotSupported);
    }

    #[test]
    fn json_and_list_fields_are_not_orderable() {
        for doc in [json!({ "content": "asc" }), json!({ "objectives": "asc" })] {
            let err = parse("Chapter", doc).expect_err("unorderable field");
            assert_eq!(err.kind(), ErrorKind::OperatorNotSupported);
        }
    }

    #[test]
    fn boolean_fields_are_orderable() {
        let spec = parse("Message", json!({ "isUserMessage": "desc" }))
            .expect("boolean columns sort");

        assert_eq!(spec.terms[0].target, OrderTarget::Field("isUserMessage"));
        assert_eq!(spec.terms[0].sort, SortOrder::Desc);
    }

    #[test]
    fn relation_terms_resolve() {
        let spec = parse(
            "Chapter",
            json!([{ "quizzes": { "_count": "desc" } }, { "course": { "title": "asc" } }]),
        )
        .expect("relation ordering should parse");

        assert_eq!(spec.terms[0].target, OrderTarget::RelationCount("quizzes"));
        assert_eq!(spec.terms[1].path, vec!["course"]);
        assert_eq!(spec.terms[1].target, OrderTarget::Field("title"));
        assert_eq!(
            spec.to_document(),
            json!([{ "quizzes": { "_count": "desc" } }, { "course": { "title": "asc" } }])
        );
    }

    #[test]
    fn unknown_field_carries_path() {
        let err = parse("Chapter", json!({ "course": { "rank": "asc" } }))
            .expect_err("unknown nested field");

        assert_eq!(err.kind(), ErrorKind::UnknownField);
        assert_eq!(err.path(), Some("course.rank"));
    }
}
