//! Module: query::projection
//! Responsibility: select / include trees, checked for field and relation existence.

use crate::query::{
    Ctx, ValidateError,
    filter::{WhereFilter, parse_where},
    keyword::{aggregations, args},
    read::{ReadArgs, check_arguments, parse_read_args},
};
use serde_json::{Map, Value as JsonValue};
use tutordb_schema::prelude::{EntityModel, RelationModel};

const TO_ONE_ARGS: &[&str] = &[args::SELECT, args::INCLUDE];
const TO_MANY_ARGS: &[&str] = &[
    args::SELECT,
    args::INCLUDE,
    args::WHERE,
    args::ORDER_BY,
    args::CURSOR,
    args::TAKE,
    args::SKIP,
    args::DISTINCT,
];

///
/// Projection
///
/// `Default` returns every scalar field and no relations.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Projection {
    #[default]
    Default,
    Select(Vec<Selection>),
    Include(Vec<Selection>),
}

///
/// Selection
///

#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Field(&'static str),
    Relation {
        relation: &'static str,
        args: Box<ReadArgs>,
    },
    Count(Vec<CountSelection>),
}

///
/// CountSelection
/// Count of rows linked through one to-many relation, optionally filtered.
///

#[derive(Clone, Debug, PartialEq)]
pub struct CountSelection {
    pub relation: &'static str,
    pub filter: Option<WhereFilter>,
}

pub(crate) fn parse_projection(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    select: Option<&JsonValue>,
    include: Option<&JsonValue>,
) -> Result<Projection, ValidateError> {
    match (select, include) {
        (None, None) => Ok(Projection::Default),
        (Some(_), Some(_)) => Err(ValidateError::InvalidShape {
            expected: "either select or include",
            found: "both".into(),
        }),
        (Some(select), None) => parse_selections(ctx, entity, select, true)
            .map(Projection::Select)
            .map_err(|err| err.with_field(args::SELECT)),
        (None, Some(include)) => parse_selections(ctx, entity, include, false)
            .map(Projection::Include)
            .map_err(|err| err.with_field(args::INCLUDE)),
    }
}

fn parse_selections(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    input: &JsonValue,
    scalars_allowed: bool,
) -> Result<Vec<Selection>, ValidateError> {
    let ctx = ctx.descend()?;
    let JsonValue::Object(map) = input else {
        return Err(ValidateError::invalid_shape("selection object", input));
    };

    let mut out = Vec::with_capacity(map.len());
    for (key, value) in map {
        if let Some(selection) =
            parse_selection(ctx, entity, key, value, scalars_allowed).map_err(|err| err.with_field(key))?
        {
            out.push(selection);
        }
    }

    Ok(out)
}

fn parse_selection(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    key: &str,
    value: &JsonValue,
    scalars_allowed: bool,
) -> Result<Option<Selection>, ValidateError> {
    if key == aggregations::COUNT {
        return parse_count(ctx, entity, value).map(|c| c.map(Selection::Count));
    }

    if let Some(field) = entity.field(key).filter(|_| scalars_allowed) {
        return match value {
            JsonValue::Bool(true) => Ok(Some(Selection::Field(field.name))),
            JsonValue::Bool(false) => Ok(None),
            other => Err(ValidateError::invalid_shape("true or false", other)),
        };
    }

    let relation = entity
        .relation(key)
        .ok_or_else(|| ValidateError::unknown_field(entity.name, key))?;

    let args = match value {
        JsonValue::Bool(false) => return Ok(None),
        JsonValue::Bool(true) => ReadArgs::default(),
        JsonValue::Object(map) => parse_relation_args(ctx, relation, map)?,
        other => return Err(ValidateError::invalid_shape("true, false, or object", other)),
    };

    Ok(Some(Selection::Relation {
        relation: relation.name,
        args: Box::new(args),
    }))
}

fn parse_relation_args(
    ctx: Ctx<'_>,
    relation: &'static RelationModel,
    map: &Map<String, JsonValue>,
) -> Result<ReadArgs, ValidateError> {
    let allowed = if relation.cardinality.is_to_many() {
        TO_MANY_ARGS
    } else {
        TO_ONE_ARGS
    };
    check_arguments(map, relation.name, allowed)?;

    parse_read_args(ctx, ctx.target(relation)?, map)
}

fn parse_count(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    value: &JsonValue,
) -> Result<Option<Vec<CountSelection>>, ValidateError> {
    let select = match value {
        JsonValue::Bool(false) => return Ok(None),
        JsonValue::Bool(true) => {
            let all = entity
                .to_many_relations()
                .map(|relation| CountSelection {
                    relation: relation.name,
                    filter: None,
                })
                .collect();
            return Ok(Some(all));
        }
        JsonValue::Object(map) => {
            check_arguments(map, aggregations::COUNT, &[args::SELECT])?;
            map.get(args::SELECT).ok_or(ValidateError::MissingArgument {
                action: aggregations::COUNT,
                argument: args::SELECT,
            })?
        }
        other => return Err(ValidateError::invalid_shape("true or {select}", other)),
    };

    let JsonValue::Object(relations) = select else {
        return Err(ValidateError::invalid_shape("relation count selection", select)
            .with_field(args::SELECT));
    };

    let mut out = Vec::with_capacity(relations.len());
    for (key, value) in relations {
        let count = parse_count_entry(ctx, entity, key, value)
            .map_err(|err| err.with_field(key).with_field(args::SELECT))?;
        out.extend(count);
    }

    Ok(Some(out))
}

fn parse_count_entry(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    key: &str,
    value: &JsonValue,
) -> Result<Option<CountSelection>, ValidateError> {
    let relation = entity
        .relation(key)
        .ok_or_else(|| ValidateError::unknown_field(entity.name, key))?;
    if !relation.cardinality.is_to_many() {
        return Err(ValidateError::OperatorNotSupported {
            entity: entity.name,
            field: relation.name,
            operator: aggregations::COUNT.into(),
            kind: "to-one relation".into(),
        });
    }

    let filter = match value {
        JsonValue::Bool(false) => return Ok(None),
        JsonValue::Bool(true) => None,
        JsonValue::Object(map) => {
            check_arguments(map, relation.name, &[args::WHERE])?;
            match map.get(args::WHERE) {
                Some(filter) => Some(
                    parse_where(ctx, ctx.target(relation)?, filter)
                        .map_err(|err| err.with_field(args::WHERE))?,
                ),
                None => None,
            }
        }
        other => return Err(ValidateError::invalid_shape("true, false, or {where}", other)),
    };

    Ok(Some(CountSelection {
        relation: relation.name,
        filter,
    }))
}

///
/// TESTS
///
