use crate::query::{
    Ctx, ValidateError,
    filter::{WhereFilter, parse_where},
    keyword::args,
    order::{OrderSpec, parse_order},
    page::{self, Pagination},
    projection::{Projection, parse_projection},
};
use serde_json::{Map, Value as JsonValue};
use tutordb_schema::prelude::EntityModel;

///
/// ReadArgs
///
/// Filter, ordering, pagination, and projection of a multi-row read.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadArgs {
    pub filter: Option<WhereFilter>,
    pub order: Option<OrderSpec>,
    pub pagination: Pagination,
    pub distinct: Vec<&'static str>,
    pub projection: Projection,
}

/// Reject any argument not in `allowed`.
pub(crate) fn check_arguments(
    map: &Map<String, JsonValue>,
    action: &'static str,
    allowed: &[&str],
) -> Result<(), ValidateError> {
    match map.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(argument) => Err(ValidateError::UnknownArgument {
            action,
            argument: argument.clone(),
        }),
        None => Ok(()),
    }
}

/// Parse the read arguments present in `map`, projection included.
pub(crate) fn parse_read_args(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    map: &Map<String, JsonValue>,
) -> Result<ReadArgs, ValidateError> {
    let mut read = parse_window_args(ctx, entity, map)?;
    read.projection = parse_projection(
        ctx,
        entity,
        map.get(args::SELECT),
        map.get(args::INCLUDE),
    )?;

    Ok(read)
}

/// Parse filter, ordering, pagination, and distinct; every other key is ignored.
pub(crate) fn parse_window_args(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    map: &Map<String, JsonValue>,
) -> Result<ReadArgs, ValidateError> {
    let mut read = ReadArgs::default();

    for (key, value) in map {
        let at = |err: ValidateError| err.with_field(key);
        match key.as_str() {
            args::WHERE => read.filter = Some(parse_where(ctx, entity, value).map_err(at)?),
            args::ORDER_BY => read.order = Some(parse_order(ctx, entity, value).map_err(at)?),
            args::CURSOR => {
                read.pagination.cursor = Some(page::parse_cursor(entity, value).map_err(at)?);
            }
            args::TAKE => read.pagination.take = Some(page::parse_take(value).map_err(at)?),
            args::SKIP => read.pagination.skip = Some(page::parse_skip(value).map_err(at)?),
            args::DISTINCT => read.distinct = page::parse_distinct(ctx, entity, value).map_err(at)?,
            _ => {}
        }
    }

    Ok(read)
}
