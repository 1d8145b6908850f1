//! Module: query::mutation
//! Responsibility: nested create / update payloads checked against relation cardinality.
//! Does not own: referential existence; `connect` to a missing row fails in storage.

mod input;
mod nested;
mod scalar;


pub use input::{CreateInput, UpdateInput};
pub use nested::{
    ConnectOrCreate, NestedOp, NestedOpKind, NestedUpdate, NestedUpdateMany, NestedUpsert,
    RelationWrite, Target,
};
pub use scalar::{ScalarAssignment, ScalarWrite};

pub(crate) use input::{parse_create, parse_update};

use derive_more::Display;

///
/// WriteMode
///
/// Whether the owning row is being created or already exists.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum WriteMode {
    #[display("create")]
    Create,
    #[display("update")]
    Update,
}
