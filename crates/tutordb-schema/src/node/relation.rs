use crate::types::Cardinality;
use serde::Serialize;

///
/// RelationModel
///
/// Typed link from the declaring entity to a target entity.
/// Targets are referenced by entity name and resolved through the registry,
/// so the static catalog never needs an acyclic construction order.
///

#[derive(Debug, Eq, PartialEq, Serialize)]
pub struct RelationModel {
    pub name: &'static str,
    /// Target entity name (registry key).
    pub target: &'static str,
    pub cardinality: Cardinality,
    /// Relation name on the target entity that points back here.
    pub inverse: &'static str,
    /// Local foreign-key fields; empty on the non-owning side.
    pub fields: &'static [&'static str],
    /// Target fields referenced by `fields`, position for position.
    pub references: &'static [&'static str],
}

impl RelationModel {
    /// Owning side of a to-many relation's inverse, or a to-one link without keys.
    #[must_use]
    pub const fn back(
        name: &'static str,
        target: &'static str,
        cardinality: Cardinality,
        inverse: &'static str,
    ) -> Self {
        Self {
            name,
            target,
            cardinality,
            inverse,
            fields: &[],
            references: &[],
        }
    }

    /// To-one link that stores foreign-key scalars on the declaring entity.
    #[must_use]
    pub const fn owning(
        name: &'static str,
        target: &'static str,
        cardinality: Cardinality,
        inverse: &'static str,
        fields: &'static [&'static str],
        references: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            target,
            cardinality,
            inverse,
            fields,
            references,
        }
    }

    #[must_use]
    pub const fn owns_foreign_key(&self) -> bool {
        !self.fields.is_empty()
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.cardinality.is_required()
    }

    #[must_use]
    pub fn is_foreign_key(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }
}
