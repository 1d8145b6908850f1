//! Module: filter
//! Responsibility: recursive boolean filter trees over one entity.
//! Does not own: evaluation; storage interprets the validated tree.

pub mod ops;
mod relation;
mod scalar;

#[cfg(test)]
mod tests;

pub use ops::FilterOp;
pub use relation::RelationFilter;
pub use scalar::{Condition, Operand, QueryMode, ScalarFilter};

use crate::query::{Ctx, ValidateError, keyword::filters, map_indexed};
use serde_json::{Map, Value as JsonValue};
use tutordb_schema::prelude::{EntityModel, FieldModel};

///
/// WhereFilter
///
/// Conjunction of nodes scoped to one entity.
/// An empty filter matches every row.
///

#[derive(Clone, Debug, PartialEq)]
pub struct WhereFilter {
    pub entity: &'static str,
    pub nodes: Vec<FilterNode>,
}

///
/// FilterNode
///

#[derive(Clone, Debug, PartialEq)]
pub enum FilterNode {
    Field {
        field: &'static FieldModel,
        filter: ScalarFilter,
    },
    Relation {
        relation: &'static str,
        filters: Vec<RelationFilter>,
    },
    And(Vec<WhereFilter>),
    Or(Vec<WhereFilter>),
    /// Children are conjoined, then negated.
    Not(Vec<WhereFilter>),
}

impl WhereFilter {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Field and relation names referenced at this level (not recursive).
    pub fn referenced_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            FilterNode::Field { field, .. } => Some(field.name),
            FilterNode::Relation { relation, .. } => Some(*relation),
            _ => None,
        })
    }

    /// Render to the canonical, fully explicit document form.
    #[must_use]
    pub fn to_document(&self) -> JsonValue {
        let mut map = Map::new();

        for node in &self.nodes {
            match node {
                FilterNode::Field { field, filter } => {
                    map.insert(field.name.to_string(), filter.to_document(field));
                }
                FilterNode::Relation { relation, filters } => {
                    map.insert((*relation).to_string(), relation::render(filters));
                }
                FilterNode::And(children) => {
                    map.insert(filters::AND.into(), render_list(children));
                }
                FilterNode::Or(children) => {
                    map.insert(filters::OR.into(), render_list(children));
                }
                FilterNode::Not(children) => {
                    map.insert(filters::NOT.into(), render_list(children));
                }
            }
        }

        JsonValue::Object(map)
    }
}

fn render_list(children: &[WhereFilter]) -> JsonValue {
    JsonValue::Array(children.iter().map(WhereFilter::to_document).collect())
}

/// Parse a `where` document against `entity`.
pub(crate) fn parse_where(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    input: &JsonValue,
) -> Result<WhereFilter, ValidateError> {
    let ctx = ctx.descend()?;
    let JsonValue::Object(map) = input else {
        return Err(ValidateError::invalid_shape("filter object", input));
    };

    let mut nodes = Vec::with_capacity(map.len());
    for (key, value) in map {
        let node = parse_node(ctx, entity, key, value).map_err(|err| err.with_field(key))?;
        nodes.push(node);
    }

    Ok(WhereFilter {
        entity: entity.name,
        nodes,
    })
}

fn parse_node(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    key: &str,
    value: &JsonValue,
) -> Result<FilterNode, ValidateError> {
    match key {
        filters::AND => Ok(FilterNode::And(parse_children(ctx, entity, value)?)),
        filters::OR => Ok(FilterNode::Or(parse_children(ctx, entity, value)?)),
        filters::NOT => Ok(FilterNode::Not(parse_children(ctx, entity, value)?)),
        _ => {
            if let Some(field) = entity.field(key) {
                let filter = scalar::parse_scalar_filter(ctx, entity, field, value)?;
                return Ok(FilterNode::Field { field, filter });
            }
            if let Some(relation) = entity.relation(key) {
                let filters = relation::parse_relation_filter(ctx, entity, relation, value)?;
                return Ok(FilterNode::Relation {
                    relation: relation.name,
                    filters,
                });
            }

            Err(ValidateError::unknown_field(entity.name, key))
        }
    }
}

// a single object or an array of objects
fn parse_children(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    value: &JsonValue,
) -> Result<Vec<WhereFilter>, ValidateError> {
    match value {
        JsonValue::Array(items) => {
            ctx.check_len(items.len())?;
            map_indexed(items, |item| parse_where(ctx, entity, item))
        }
        JsonValue::Object(_) => Ok(vec![parse_where(ctx, entity, value)?]),
        other => Err(ValidateError::invalid_shape(
            "filter object or array of filter objects",
            other,
        )),
    }
}

/// Check that a filter only references `allowed` scalar fields, recursively
/// through boolean combinators.
pub(crate) fn restrict_fields(
    filter: &WhereFilter,
    allowed: &[&'static str],
    usage: &'static str,
) -> Result<(), ValidateError> {
    for node in &filter.nodes {
        let name = match node {
            FilterNode::Field { field, .. } if allowed.contains(&field.name) => continue,
            FilterNode::Field { field, .. } => field.name,
            FilterNode::Relation { relation, .. } => *relation,
            FilterNode::And(children) | FilterNode::Or(children) | FilterNode::Not(children) => {
                for child in children {
                    restrict_fields(child, allowed, usage)?;
                }
                continue;
            }
        };

        return Err(ValidateError::NotGrouped {
            entity: filter.entity,
            field: name.to_string(),
            usage,
        }
        .with_field(name));
    }

    Ok(())
}
