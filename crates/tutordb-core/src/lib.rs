//! Validation engine for TutorDB: filter grammar, relation filters, nested
//! mutation shapes, unique selectors, and JSON-null resolution, applied before
//! any request reaches storage.
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod null;
pub mod obs;
pub mod query;
pub mod session;
pub mod value;

pub use config::Config;
pub use error::{Error, ErrorKind, StorageError};
pub use query::{Action, Operation, Request, ValidateError, validate_request};
pub use session::{Session, Storage};

///
/// Prelude
///
/// Domain vocabulary only; no sinks or configuration helpers.
///

pub mod prelude {
    pub use crate::{
        null::{FilterNullMarker, JsonMatch, JsonWrite, NullMarker},
        query::{
            Action, Operation, Request,
            filter::{FilterNode, FilterOp, RelationFilter, ScalarFilter, WhereFilter},
            mutation::{CreateInput, NestedOp, ScalarWrite, UpdateInput},
            order::{OrderSpec, SortOrder},
            unique::UniqueSelector,
        },
        value::Value,
    };
    pub use tutordb_schema::prelude::{Cardinality, EntityModel, Registry, ScalarKind};
}
