use crate::node::{FieldModel, RelationModel, UniqueModel};
use serde::Serialize;

///
/// EntityModel
/// Static model for one entity: scalars, relations, and uniqueness constraints.
///

#[derive(Debug, Eq, PartialEq, Serialize)]
pub struct EntityModel {
    /// Stable external name used in requests and routing.
    pub name: &'static str,
    /// Primary key fields (must also appear in `uniques`).
    pub primary_key: &'static [&'static str],
    /// Ordered scalar field list (declaration order is authoritative).
    pub fields: &'static [FieldModel],
    pub relations: &'static [RelationModel],
    /// Unique constraints, single-field ones included.
    pub uniques: &'static [UniqueModel],
}

impl EntityModel {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&'static RelationModel> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Resolve a compound-unique alias such as `courseId_order`.
    #[must_use]
    pub fn unique_by_alias(&self, alias: &str) -> Option<&'static UniqueModel> {
        self.uniques.iter().find(|u| u.name == Some(alias))
    }

    /// Whether `field` participates in any unique constraint.
    #[must_use]
    pub fn is_unique_member(&self, field: &str) -> bool {
        self.uniques.iter().any(|u| u.contains(field))
    }

    /// The owning relation whose foreign key includes `field`, if any.
    #[must_use]
    pub fn relation_for_foreign_key(&self, field: &str) -> Option<&'static RelationModel> {
        self.relations.iter().find(|r| r.is_foreign_key(field))
    }

    #[must_use]
    pub fn to_many_relations(&self) -> impl Iterator<Item = &'static RelationModel> {
        self.relations.iter().filter(|r| r.cardinality.is_to_many())
    }
}
