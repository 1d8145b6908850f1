//! Static entity schema registry for TutorDB.
//!
//! Every other layer resolves field, relation, and uniqueness legality through
//! the models defined here. Nothing outside this crate hard-codes per-entity
//! knowledge.

pub mod build;
pub mod catalog;
pub mod error;
pub mod node;
pub mod types;
pub mod validate;

use crate::build::BuildError;
use thiserror::Error as ThisError;

/// Maximum length for entity schema identifiers.
pub const MAX_ENTITY_NAME_LEN: usize = 64;

/// Maximum length for field and relation identifiers.
pub const MAX_FIELD_NAME_LEN: usize = 64;

/// Maximum number of fields allowed in one unique constraint.
pub const MAX_UNIQUE_FIELDS: usize = 4;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        build::{Registry, registry},
        error::ErrorTree,
        node::*,
        types::{Cardinality, DefaultKind, ScalarKind},
    };
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    BuildError(#[from] BuildError),
}
