use crate::types::{DefaultKind, ScalarKind};
use serde::Serialize;

///
/// FieldModel
/// Scalar column metadata used by filter, ordering, and write validation.
///

#[derive(Debug, Eq, PartialEq, Serialize)]
pub struct FieldModel {
    /// Field name as used in filters and write payloads.
    pub name: &'static str,
    /// Element kind (for list fields, the kind of each element).
    pub kind: ScalarKind,
    pub nullable: bool,
    /// Scalar list column; uses set/push write semantics.
    pub list: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultKind>,
}

impl FieldModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: ScalarKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            list: false,
            default: None,
        }
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub const fn list(mut self) -> Self {
        self.list = true;
        self
    }

    #[must_use]
    pub const fn with_default(mut self, default: DefaultKind) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Whether a create must supply this field explicitly.
    #[must_use]
    pub const fn is_required_on_create(&self) -> bool {
        !self.nullable && !self.list && self.default.is_none()
    }

    /// Whether ORDER BY may target this field.
    #[must_use]
    pub const fn is_orderable(&self) -> bool {
        !self.list && self.kind.supports_ordering()
    }
}
