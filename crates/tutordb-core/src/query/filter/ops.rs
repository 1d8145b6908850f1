use derive_more::Display;
use tutordb_schema::prelude::{FieldModel, ScalarKind};

///
/// FilterOp
///
/// Comparison operators of the scalar filter grammar.
/// `not`, `mode`, and `path` are modifiers and are handled by the parser.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FilterOp {
    #[display("equals")]
    Equals,
    #[display("in")]
    In,
    #[display("notIn")]
    NotIn,
    #[display("lt")]
    Lt,
    #[display("lte")]
    Lte,
    #[display("gt")]
    Gt,
    #[display("gte")]
    Gte,
    #[display("contains")]
    Contains,
    #[display("startsWith")]
    StartsWith,
    #[display("endsWith")]
    EndsWith,
    #[display("has")]
    Has,
    #[display("hasEvery")]
    HasEvery,
    #[display("hasSome")]
    HasSome,
    #[display("isEmpty")]
    IsEmpty,
    #[display("string_contains")]
    StringContains,
    #[display("string_starts_with")]
    StringStartsWith,
    #[display("string_ends_with")]
    StringEndsWith,
    #[display("array_contains")]
    ArrayContains,
    #[display("array_starts_with")]
    ArrayStartsWith,
    #[display("array_ends_with")]
    ArrayEndsWith,
}

///
/// OperandShape
/// What the operator's right-hand side must look like.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperandShape {
    /// A literal of the field's type (null allowed only on nullable fields).
    Literal,
    /// A non-null literal of the field's element type.
    NonNull,
    /// An array of non-null literals.
    LiteralList,
    /// A string needle.
    Text,
    /// A boolean flag.
    Flag,
    /// Any JSON value.
    Json,
}

impl FilterOp {
    pub const ALL: [Self; 20] = [
        Self::Equals,
        Self::In,
        Self::NotIn,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::Contains,
        Self::StartsWith,
        Self::EndsWith,
        Self::Has,
        Self::HasEvery,
        Self::HasSome,
        Self::IsEmpty,
        Self::StringContains,
        Self::StringStartsWith,
        Self::StringEndsWith,
        Self::ArrayContains,
        Self::ArrayStartsWith,
        Self::ArrayEndsWith,
    ];

    /// Parse an operator from its protocol keyword.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.to_string() == keyword)
    }

    #[must_use]
    pub const fn operand(self) -> OperandShape {
        match self {
            Self::Equals => OperandShape::Literal,
            Self::Lt | Self::Lte | Self::Gt | Self::Gte | Self::Has => OperandShape::NonNull,
            Self::In | Self::NotIn | Self::HasEvery | Self::HasSome => OperandShape::LiteralList,
            Self::Contains
            | Self::StartsWith
            | Self::EndsWith
            | Self::StringContains
            | Self::StringStartsWith
            | Self::StringEndsWith => OperandShape::Text,
            Self::IsEmpty => OperandShape::Flag,
            Self::ArrayContains | Self::ArrayStartsWith | Self::ArrayEndsWith => OperandShape::Json,
        }
    }

    /// Whether this operator is defined for `field`.
    #[must_use]
    pub const fn supports(self, field: &FieldModel) -> bool {
        if field.list {
            return matches!(
                self,
                Self::Equals | Self::Has | Self::HasEvery | Self::HasSome | Self::IsEmpty
            );
        }

        match field.kind {
            ScalarKind::String => matches!(
                self,
                Self::Equals
                    | Self::In
                    | Self::NotIn
                    | Self::Lt
                    | Self::Lte
                    | Self::Gt
                    | Self::Gte
                    | Self::Contains
                    | Self::StartsWith
                    | Self::EndsWith
            ),
            ScalarKind::Int | ScalarKind::Float | ScalarKind::DateTime => matches!(
                self,
                Self::Equals
                    | Self::In
                    | Self::NotIn
                    | Self::Lt
                    | Self::Lte
                    | Self::Gt
                    | Self::Gte
            ),
            ScalarKind::Boolean => matches!(self, Self::Equals),
            ScalarKind::Enum(_) => matches!(self, Self::Equals | Self::In | Self::NotIn),
            ScalarKind::Json => matches!(
                self,
                Self::Equals
                    | Self::StringContains
                    | Self::StringStartsWith
                    | Self::StringEndsWith
                    | Self::ArrayContains
                    | Self::ArrayStartsWith
                    | Self::ArrayEndsWith
            ),
        }
    }
}

/// Whether the `not` modifier applies to `field`.
#[must_use]
pub const fn supports_not(field: &FieldModel) -> bool {
    !field.list
}

/// Whether the `mode` modifier applies to `field`.
#[must_use]
pub const fn supports_mode(field: &FieldModel) -> bool {
    !field.list && field.kind.is_text()
}

/// Whether the `path` modifier applies to `field`.
#[must_use]
pub const fn supports_path(field: &FieldModel) -> bool {
    !field.list && field.kind.is_json()
}

/// Whether a bare literal is accepted as `{equals: literal}`.
#[must_use]
pub const fn supports_shorthand(field: &FieldModel) -> bool {
    !field.list && !field.kind.is_json()
}

/// Type label used in operator diagnostics.
#[must_use]
pub fn kind_label(field: &FieldModel) -> String {
    if field.list {
        format!("{}[]", field.kind)
    } else {
        field.kind.to_string()
    }
}
