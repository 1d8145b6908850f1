//! Module: query
//! Responsibility: turn client request documents into validated, typed request trees.
//! Does not own: execution, which belongs to the storage engine behind `Session`.

pub mod aggregate;
mod error;
pub mod filter;
pub mod keyword;
pub mod mutation;
pub mod order;
pub mod page;
pub mod projection;
pub mod read;
pub mod request;
pub mod unique;

pub use error::{ValidateError, json_kind};
pub use request::{Action, Operation, Request, validate_request};

use crate::config::Config;
use serde_json::{Map, Value as JsonValue};
use tutordb_schema::prelude::{EntityModel, Registry, RelationModel};

///
/// Ctx
///
/// Shared state threaded through one validation walk.
/// `depth` counts nested filters, relation writes, and selections.
///

#[derive(Clone, Copy)]
pub(crate) struct Ctx<'a> {
    pub(crate) registry: &'a Registry,
    pub(crate) config: &'a Config,
    depth: usize,
}

impl<'a> Ctx<'a> {
    pub(crate) const fn new(registry: &'a Registry, config: &'a Config) -> Self {
        Self {
            registry,
            config,
            depth: 0,
        }
    }

    /// Enter one nesting level, failing once the configured depth is exceeded.
    pub(crate) const fn descend(self) -> Result<Self, ValidateError> {
        if self.depth >= self.config.max_depth {
            return Err(ValidateError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }

        Ok(Self {
            depth: self.depth + 1,
            ..self
        })
    }

    pub(crate) const fn check_len(self, len: usize) -> Result<(), ValidateError> {
        if len > self.config.max_list_len {
            return Err(ValidateError::ListTooLong {
                len,
                limit: self.config.max_list_len,
            });
        }

        Ok(())
    }

    pub(crate) fn entity(self, name: &str) -> Result<&'static EntityModel, ValidateError> {
        self.registry
            .entity(name)
            .ok_or_else(|| ValidateError::UnknownEntity {
                entity: name.to_string(),
            })
    }

    pub(crate) fn target(
        self,
        relation: &RelationModel,
    ) -> Result<&'static EntityModel, ValidateError> {
        self.entity(relation.target)
    }

    pub(crate) fn inverse(
        self,
        relation: &RelationModel,
    ) -> Result<&'static RelationModel, ValidateError> {
        let target = self.target(relation)?;

        target
            .relation(relation.inverse)
            .ok_or_else(|| ValidateError::unknown_field(target.name, relation.inverse))
    }
}

/// Borrow `input` as an object or fail with `InvalidShape`.
pub(crate) fn expect_object<'v>(
    input: &'v JsonValue,
    expected: &'static str,
) -> Result<&'v Map<String, JsonValue>, ValidateError> {
    input
        .as_object()
        .ok_or_else(|| ValidateError::invalid_shape(expected, input))
}

/// Map a single item or each item of an array; only array items get an index segment.
pub(crate) fn map_one_or_many<'v, T>(
    ctx: Ctx<'_>,
    input: &'v JsonValue,
    mut f: impl FnMut(&'v JsonValue) -> Result<T, ValidateError>,
) -> Result<Vec<T>, ValidateError> {
    match input {
        JsonValue::Array(items) => {
            ctx.check_len(items.len())?;
            map_indexed(items, f)
        }
        other => Ok(vec![f(other)?]),
    }
}

/// Parse a required boolean flag.
pub(crate) fn expect_bool(input: &JsonValue, expected: &'static str) -> Result<bool, ValidateError> {
    input
        .as_bool()
        .ok_or_else(|| ValidateError::invalid_shape(expected, input))
}

/// Map each item with its index attached to any error.
pub(crate) fn map_indexed<'v, T>(
    items: impl IntoIterator<Item = &'v JsonValue>,
    mut f: impl FnMut(&'v JsonValue) -> Result<T, ValidateError>,
) -> Result<Vec<T>, ValidateError> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| f(item).map_err(|err| err.with_index(i)))
        .collect()
}
