use crate::node::EnumModel;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Cardinality
///
/// Relation arity as seen from the declaring entity.
/// `One` is a required to-one link, `Opt` an optional to-one link.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum Cardinality {
    #[default]
    One,
    Opt,
    Many,
}

impl Cardinality {
    #[must_use]
    pub const fn is_to_one(self) -> bool {
        matches!(self, Self::One | Self::Opt)
    }

    #[must_use]
    pub const fn is_to_many(self) -> bool {
        matches!(self, Self::Many)
    }

    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::One)
    }
}

///
/// ScalarKind
///
/// Primitive column types understood by the filter grammar.
/// Enum-valued fields carry their declared variant set.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ScalarKind {
    Boolean,
    DateTime,
    Enum(&'static EnumModel),
    Float,
    Int,
    Json,
    String,
}

impl ScalarKind {
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }

    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::String)
    }

    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Whether values of this kind can be sorted. Json is the only kind without an order.
    #[must_use]
    pub const fn supports_ordering(self) -> bool {
        !self.is_json()
    }

    /// Short type label used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::DateTime => "DateTime",
            Self::Enum(model) => model.name,
            Self::Float => "Float",
            Self::Int => "Int",
            Self::Json => "Json",
            Self::String => "String",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// DefaultKind
///
/// Value source applied by storage when a create omits the field.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum DefaultKind {
    Cuid,
    Now,
    UpdatedAt,
    #[display("{_0}")]
    Literal(&'static str),
}
