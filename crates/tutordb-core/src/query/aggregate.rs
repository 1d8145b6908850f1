//! Module: query::aggregate
//! Responsibility: shape of count / aggregate / groupBy requests.
//! Does not own: arithmetic; storage computes every aggregate.

use crate::query::{
    Ctx, ValidateError, expect_bool, expect_object,
    filter::{WhereFilter, parse_where, restrict_fields},
    keyword::{aggregations, args},
    order::{OrderSpec, OrderTarget, parse_order},
    page::{self, scalar_field_name},
};
use derive_more::Display;
use serde_json::{Map, Value as JsonValue};
use tutordb_schema::prelude::{EntityModel, FieldModel};

///
/// AggregateOp
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum AggregateOp {
    #[display("_count")]
    Count,
    #[display("_avg")]
    Avg,
    #[display("_sum")]
    Sum,
    #[display("_min")]
    Min,
    #[display("_max")]
    Max,
}

impl AggregateOp {
    pub const ALL: [Self; 5] = [Self::Count, Self::Avg, Self::Sum, Self::Min, Self::Max];

    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.keyword() == keyword)
    }

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Count => aggregations::COUNT,
            Self::Avg => aggregations::AVG,
            Self::Sum => aggregations::SUM,
            Self::Min => aggregations::MIN,
            Self::Max => aggregations::MAX,
        }
    }

    /// Whether this aggregate can be computed over `field`.
    #[must_use]
    pub const fn supports(self, field: &FieldModel) -> bool {
        match self {
            Self::Count => true,
            Self::Avg | Self::Sum => !field.list && field.kind.is_numeric(),
            Self::Min | Self::Max => !field.list && !field.kind.is_json(),
        }
    }
}

///
/// CountAggregate
///
/// `all` counts rows; `fields` count non-null values per field.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CountAggregate {
    pub all: bool,
    pub fields: Vec<&'static str>,
}

///
/// AggregateSpec
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AggregateSpec {
    pub count: Option<CountAggregate>,
    pub avg: Vec<&'static str>,
    pub sum: Vec<&'static str>,
    pub min: Vec<&'static str>,
    pub max: Vec<&'static str>,
}

impl AggregateSpec {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count.is_none()
            && self.avg.is_empty()
            && self.sum.is_empty()
            && self.min.is_empty()
            && self.max.is_empty()
    }
}

///
/// GroupBySpec
///

#[derive(Clone, Debug, PartialEq)]
pub struct GroupBySpec {
    pub by: Vec<&'static str>,
    pub filter: Option<WhereFilter>,
    pub having: Option<WhereFilter>,
    pub order: Option<OrderSpec>,
    pub take: Option<i64>,
    pub skip: Option<u64>,
    pub aggregates: AggregateSpec,
}

/// Collect every `_count` / `_avg` / `_sum` / `_min` / `_max` key in `map`.
pub(crate) fn parse_aggregates(
    entity: &'static EntityModel,
    map: &Map<String, JsonValue>,
) -> Result<AggregateSpec, ValidateError> {
    let mut spec = AggregateSpec::default();

    for (key, value) in map {
        let Some(op) = AggregateOp::from_keyword(key) else {
            continue;
        };
        let at = |err: ValidateError| err.with_field(key);

        match op {
            AggregateOp::Count => spec.count = parse_count_aggregate(entity, value).map_err(at)?,
            AggregateOp::Avg => spec.avg = parse_field_map(entity, op, value).map_err(at)?,
            AggregateOp::Sum => spec.sum = parse_field_map(entity, op, value).map_err(at)?,
            AggregateOp::Min => spec.min = parse_field_map(entity, op, value).map_err(at)?,
            AggregateOp::Max => spec.max = parse_field_map(entity, op, value).map_err(at)?,
        }
    }

    Ok(spec)
}

/// Parse `_count: true` or `_count: {_all?, <field>: bool}`.
pub(crate) fn parse_count_aggregate(
    entity: &'static EntityModel,
    value: &JsonValue,
) -> Result<Option<CountAggregate>, ValidateError> {
    match value {
        JsonValue::Bool(true) => Ok(Some(CountAggregate {
            all: true,
            fields: Vec::new(),
        })),
        JsonValue::Bool(false) => Ok(None),
        JsonValue::Object(map) => {
            let mut count = CountAggregate::default();
            for (key, flag) in map {
                let on = expect_bool(flag, "true or false").map_err(|err| err.with_field(key))?;
                if key == aggregations::ALL {
                    count.all = on;
                    continue;
                }
                let field = entity
                    .field(key)
                    .ok_or_else(|| ValidateError::unknown_field(entity.name, key))?;
                if on {
                    count.fields.push(field.name);
                }
            }

            Ok((count.all || !count.fields.is_empty()).then_some(count))
        }
        other => Err(ValidateError::invalid_shape("true or field map", other)),
    }
}

fn parse_field_map(
    entity: &'static EntityModel,
    op: AggregateOp,
    value: &JsonValue,
) -> Result<Vec<&'static str>, ValidateError> {
    let map = expect_object(value, "field map")?;

    let mut fields = Vec::with_capacity(map.len());
    for (key, flag) in map {
        let field = entity
            .field(key)
            .ok_or_else(|| ValidateError::unknown_field(entity.name, key))?;
        if !op.supports(field) {
            return Err(ValidateError::OperatorNotSupported {
                entity: entity.name,
                field: field.name,
                operator: op.to_string(),
                kind: field.kind.to_string(),
            }
            .with_field(key));
        }
        if expect_bool(flag, "true or false").map_err(|err| err.with_field(key))? {
            fields.push(field.name);
        }
    }

    Ok(fields)
}

/// Parse a groupBy argument map (unknown keys are rejected by the caller).
pub(crate) fn parse_group_by(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    map: &Map<String, JsonValue>,
) -> Result<GroupBySpec, ValidateError> {
    let by_input = map.get(args::BY).ok_or(ValidateError::MissingArgument {
        action: "groupBy",
        argument: args::BY,
    })?;
    let by = parse_by(ctx, entity, by_input).map_err(|err| err.with_field(args::BY))?;

    let filter = map
        .get(args::WHERE)
        .map(|input| parse_where(ctx, entity, input))
        .transpose()
        .map_err(|err| err.with_field(args::WHERE))?;

    let having = map
        .get(args::HAVING)
        .map(|input| -> Result<WhereFilter, ValidateError> {
            let having = parse_where(ctx, entity, input)?;
            restrict_fields(&having, &by, args::HAVING)?;
            Ok(having)
        })
        .transpose()
        .map_err(|err| err.with_field(args::HAVING))?;

    let order = map
        .get(args::ORDER_BY)
        .map(|input| -> Result<OrderSpec, ValidateError> {
            let order = parse_order(ctx, entity, input)?;
            restrict_order(entity, &order, &by)?;
            Ok(order)
        })
        .transpose()
        .map_err(|err| err.with_field(args::ORDER_BY))?;

    let take = map
        .get(args::TAKE)
        .map(page::parse_take)
        .transpose()
        .map_err(|err| err.with_field(args::TAKE))?;
    let skip = map
        .get(args::SKIP)
        .map(page::parse_skip)
        .transpose()
        .map_err(|err| err.with_field(args::SKIP))?;

    if order.is_none() && (take.is_some() || skip.is_some()) {
        return Err(ValidateError::MissingArgument {
            action: "groupBy",
            argument: args::ORDER_BY,
        });
    }

    Ok(GroupBySpec {
        by,
        filter,
        having,
        order,
        take,
        skip,
        aggregates: parse_aggregates(entity, map)?,
    })
}

fn parse_by(
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
    if names.is_empty() {
        return Err(ValidateError::invalid_shape("non-empty list of fields", input));
    }

    let mut by: Vec<&'static str> = Vec::with_capacity(names.len());
    for name in names {
        let field = scalar_field_name(entity, name)?;
        if field.list || field.kind.is_json() {
            return Err(ValidateError::OperatorNotSupported {
                entity: entity.name,
                field: field.name,
                operator: args::BY.into(),
                kind: field.kind.to_string(),
            });
        }
        if !by.contains(&field.name) {
            by.push(field.name);
        }
    }

    Ok(by)
}

fn restrict_order(
    entity: &'static EntityModel,
    order: &OrderSpec,
    by: &[&'static str],
) -> Result<(), ValidateError> {
    for (i, term) in order.terms.iter().enumerate() {
        let name = match (&term.target, term.path.first()) {
            (OrderTarget::Field(field), None) if by.contains(field) => continue,
            (_, Some(relation)) => *relation,
            (OrderTarget::Field(name) | OrderTarget::RelationCount(name), None) => *name,
        };

        return Err(ValidateError::NotGrouped {
            entity: entity.name,
            field: name.to_string(),
            usage: args::ORDER_BY,
        }
        .with_index(i));
    }

    Ok(())
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

    fn model(entity: &str) -> &'static EntityModel {
        registry()
            .expect("catalog registry should build")
            .entity(entity)
            .expect("catalog entity")
    }

    fn object(input: JsonValue) -> Map<String, JsonValue> {
        match input {
            JsonValue::Object(map) => map,
            _ => panic!("test input must be an object"),
        }
    }

    fn group_by(entity: &str, input: JsonValue) -> Result<GroupBySpec, ValidateError> {
        let registry = registry().expect("catalog registry should build");
        let config = Config::default();
        let ctx = Ctx::new(registry, &config);

        parse_group_by(ctx, model(entity), &object(input))
    }

    #[test]
    fn numeric_aggregates_need_numeric_fields() {
        let spec = parse_aggregates(
            model("QuizAttempt"),
            &object(json!({ "_avg": { "score": true }, "_max": { "completedAt": true } })),
        )
        .expect("score is a Float");
        assert_eq!(spec.avg, vec!["score"]);
        assert_eq!(spec.max, vec!["completedAt"]);

        let err = parse_aggregates(model("Chapter"), &object(json!({ "_avg": { "title": true } })))
            .expect_err("title is a String");
        assert_eq!(err.kind(), ErrorKind::OperatorNotSupported);
        assert_eq!(err.path(), Some("_avg.title"));
    }

    #[test]
    fn min_max_reject_json_and_lists() {
        for field in ["content", "objectives"] {
            let err = parse_aggregates(model("Chapter"), &object(json!({ "_min": { field: true } })))
                .expect_err("json and list fields have no minimum");
            assert_eq!(err.kind(), ErrorKind::OperatorNotSupported);
        }
    }

    #[test]
    fn count_accepts_flag_or_field_map() {
        assert_eq!(
            parse_count_aggregate(model("Chapter"), &json!(true)).expect("count all"),
            Some(CountAggregate {
                all: true,
                fields: vec![],
            })
        );
        assert_eq!(
            parse_count_aggregate(model("Chapter"), &json!({ "content": true, "_all": false }))
                .expect("count field"),
            Some(CountAggregate {
                all: false,
                fields: vec!["content"],
            })
        );
        assert_eq!(
            parse_count_aggregate(model("Chapter"), &json!({ "ghost": true }))
                .expect_err("unknown field")
                .kind(),
            ErrorKind::UnknownField
        );
    }

    #[test]
    fn group_by_restricts_having_and_order_to_by_fields() {
        let spec = group_by(
            "Chapter",
            json!({
                "by": ["courseId", "status"],
                "having": { "status": "FINISHED" },
                "orderBy": { "courseId": "asc" },
                "take": 10,
                "_count": { "_all": true },
            }),
        )
        .expect("grouped query should parse");
        assert_eq!(spec.by, vec!["courseId", "status"]);
        assert!(spec.aggregates.count.is_some());

        let err = group_by("Chapter", json!({ "by": "courseId", "having": { "order": { "gt": 1 } } }))
            .expect_err("having on ungrouped field");
        assert!(matches!(err.leaf(), ValidateError::NotGrouped { usage: "having", .. }));
        assert_eq!(err.path(), Some("having.order"));

        let err = group_by("Chapter", json!({ "by": ["courseId"], "orderBy": [{ "title": "asc" }] }))
            .expect_err("order on ungrouped field");
        assert_eq!(err.path(), Some("orderBy[0]"));
    }

    #[test]
    fn group_by_orders_on_boolean_key() {
        let spec = group_by(
            "Message",
            json!({ "by": ["isUserMessage"], "orderBy": { "isUserMessage": "desc" }, "take": 2 }),
        )
        .expect("boolean group key may be ordered");

        assert_eq!(spec.by, vec!["isUserMessage"]);
        assert_eq!(
            spec.order.expect("order").fields().collect::<Vec<_>>(),
            vec!["isUserMessage"]
        );
    }

    #[test]
    fn group_by_pagination_requires_order() {
        let err = group_by("Chapter", json!({ "by": ["courseId"], "take": 5 }))
            .expect_err("take without orderBy");

        assert!(matches!(
            err,
            ValidateError::MissingArgument {
                argument: "orderBy",
                ..
            }
        ));
    }

    #[test]
    fn group_by_needs_scalar_by_fields() {
        assert_eq!(
            group_by("Chapter", json!({})).expect_err("missing by").kind(),
            ErrorKind::MissingField
        );
        assert_eq!(
            group_by("Chapter", json!({ "by": [] })).expect_err("empty by").kind(),
            ErrorKind::InvalidValue
        );
        assert_eq!(
            group_by("Chapter", json!({ "by": ["content"] })).expect_err("json by").kind(),
            ErrorKind::OperatorNotSupported
        );
    }
}
