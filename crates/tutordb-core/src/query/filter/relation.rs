use crate::query::{
    Ctx, ValidateError,
    filter::{WhereFilter, parse_where},
    keyword::filters,
};
use serde_json::{Map, Value as JsonValue};
use tutordb_schema::prelude::{EntityModel, RelationModel};

///
/// RelationFilter
///
/// Predicate over the rows linked through one relation.
/// `Is(None)` / `IsNot(None)` test for the absence / presence of an optional link.
///

#[derive(Clone, Debug, PartialEq)]
pub enum RelationFilter {
    Every(WhereFilter),
    Some(WhereFilter),
    None(WhereFilter),
    Is(Option<WhereFilter>),
    IsNot(Option<WhereFilter>),
}

impl RelationFilter {
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Every(_) => filters::EVERY,
            Self::Some(_) => filters::SOME,
            Self::None(_) => filters::NONE,
            Self::Is(_) => filters::IS,
            Self::IsNot(_) => filters::IS_NOT,
        }
    }

    fn operand_document(&self) -> JsonValue {
        match self {
            Self::Every(filter) | Self::Some(filter) | Self::None(filter) => filter.to_document(),
            Self::Is(filter) | Self::IsNot(filter) => filter
                .as_ref()
                .map_or(JsonValue::Null, WhereFilter::to_document),
        }
    }
}

/// Render relation predicates in their explicit keyword form.
pub(crate) fn render(filters: &[RelationFilter]) -> JsonValue {
    let mut map = Map::new();
    for filter in filters {
        map.insert(filter.keyword().into(), filter.operand_document());
    }

    JsonValue::Object(map)
}

/// Parse the predicate for one relation of `entity`.
pub(crate) fn parse_relation_filter(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    relation: &'static RelationModel,
    input: &JsonValue,
) -> Result<Vec<RelationFilter>, ValidateError> {
    let ctx = ctx.descend()?;
    let target = ctx.target(relation)?;

    if relation.cardinality.is_to_many() {
        parse_to_many(ctx, entity, relation, target, input)
    } else {
        parse_to_one(ctx, entity, relation, target, input)
    }
}

fn parse_to_many(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    relation: &'static RelationModel,
    target: &'static EntityModel,
    input: &JsonValue,
) -> Result<Vec<RelationFilter>, ValidateError> {
    let JsonValue::Object(map) = input else {
        return Err(ValidateError::invalid_shape(
            "object with every, some, or none",
            input,
        ));
    };

    let mut out = Vec::with_capacity(map.len());
    for (key, value) in map {
        let parse = || parse_where(ctx, target, value).map_err(|err| err.with_field(key));
        let filter = match key.as_str() {
            filters::EVERY => RelationFilter::Every(parse()?),
            filters::SOME => RelationFilter::Some(parse()?),
            filters::NONE => RelationFilter::None(parse()?),
            other => return Err(unsupported(entity, relation, other)),
        };
        out.push(filter);
    }

    Ok(out)
}

fn parse_to_one(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    relation: &'static RelationModel,
    target: &'static EntityModel,
    input: &JsonValue,
) -> Result<Vec<RelationFilter>, ValidateError> {
    let map = match input {
        JsonValue::Null => {
            check_nullable(entity, relation, filters::IS)?;
            return Ok(vec![RelationFilter::Is(None)]);
        }
        JsonValue::Object(map) => map,
        other => {
            return Err(ValidateError::invalid_shape(
                "object with is or isNot",
                other,
            ));
        }
    };

    let explicit = map
        .keys()
        .any(|k| k == filters::IS || k == filters::IS_NOT);
    if !explicit {
        if let Some(key) = map
            .keys()
            .find(|k| matches!(k.as_str(), filters::EVERY | filters::SOME | filters::NONE))
        {
            return Err(unsupported(entity, relation, key));
        }

        // shorthand: the object is the related entity's filter
        return Ok(vec![RelationFilter::Is(Some(parse_where(ctx, target, input)?))]);
    }

    let mut out = Vec::with_capacity(map.len());
    for (key, value) in map {
        let operand = match key.as_str() {
            filters::IS | filters::IS_NOT if value.is_null() => {
                check_nullable(entity, relation, key)?;
                None
            }
            filters::IS | filters::IS_NOT => {
                Some(parse_where(ctx, target, value).map_err(|err| err.with_field(key))?)
            }
            other => {
                return Err(ValidateError::InvalidShape {
                    expected: "only is and isNot alongside is or isNot",
                    found: format!("'{other}'"),
                });
            }
        };

        out.push(if key == filters::IS {
            RelationFilter::Is(operand)
        } else {
            RelationFilter::IsNot(operand)
        });
    }

    Ok(out)
}

fn check_nullable(
    entity: &'static EntityModel,
    relation: &'static RelationModel,
    keyword: &str,
) -> Result<(), ValidateError> {
    if relation.is_required() {
        return Err(ValidateError::cardinality(
            entity.name,
            relation.name,
            format!("'{keyword}: null' is not allowed on a required relation"),
        ));
    }

    Ok(())
}

fn unsupported(
    entity: &'static EntityModel,
    relation: &'static RelationModel,
    key: &str,
) -> ValidateError {
    let kind = if relation.cardinality.is_to_many() {
        "to-many relation"
    } else {
        "to-one relation"
    };

    ValidateError::OperatorNotSupported {
        entity: entity.name,
        field: relation.name,
        operator: key.to_string(),
        kind: kind.to_string(),
    }
}
