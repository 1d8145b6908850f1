use crate::{
    Error, catalog, error::ErrorTree, node::EntityModel, node::RelationModel,
    validate::validate_registry,
};
use std::{collections::BTreeMap, sync::LazyLock};
use thiserror::Error as ThisError;

///
/// BuildError
///

#[derive(Clone, Debug, ThisError)]
pub enum BuildError {
    #[error("validation failed: {0}")]
    Validation(ErrorTree),
}

///
/// REGISTRY
/// the static catalog, indexed and validated exactly once per process
///

static REGISTRY: LazyLock<Result<Registry, ErrorTree>> =
    LazyLock::new(|| Registry::from_models(catalog::ENTITIES));

/// Read the process-wide registry built from the static catalog.
pub fn registry() -> Result<&'static Registry, Error> {
    REGISTRY
        .as_ref()
        .map_err(|errs| BuildError::Validation(errs.clone()).into())
}

///
/// EntityId
/// Arena index of an entity inside one registry.
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct EntityId(usize);

impl EntityId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

///
/// Registry
///
/// Immutable entity arena keyed by name. Relation targets stay names in the
/// models; the registry is the only place they are resolved.
///

#[derive(Debug)]
pub struct Registry {
    entities: Vec<&'static EntityModel>,
    by_name: BTreeMap<&'static str, EntityId>,
}

impl Registry {
    /// Index and validate a set of entity models.
    pub fn from_models(models: &[&'static EntityModel]) -> Result<Self, ErrorTree> {
        let mut errs = ErrorTree::new();
        let mut by_name = BTreeMap::new();

        for (index, model) in models.iter().enumerate() {
            if by_name.insert(model.name, EntityId(index)).is_some() {
                errs.add(format!("duplicate entity name '{}'", model.name));
            }
        }

        let registry = Self {
            entities: models.to_vec(),
            by_name,
        };

        validate_registry(&registry, &mut errs);

        errs.result().map(|()| registry)
    }

    #[must_use]
    pub fn id(&self, name: &str) -> Option<EntityId> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> &'static EntityModel {
        self.entities[id.0]
    }

    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&'static EntityModel> {
        self.id(name).map(|id| self.get(id))
    }

    /// Resolve a relation's target entity.
    #[must_use]
    pub fn target(&self, relation: &RelationModel) -> Option<&'static EntityModel> {
        self.entity(relation.target)
    }

    /// Resolve the relation on the target entity that points back at `relation`.
    #[must_use]
    pub fn inverse(&self, relation: &RelationModel) -> Option<&'static RelationModel> {
        self.target(relation)
            .and_then(|target| target.relation(relation.inverse))
    }

    pub fn entities(&self) -> impl Iterator<Item = &'static EntityModel> + '_ {
        self.entities.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cardinality;

    #[test]
    fn static_catalog_builds() {
        let registry = registry().expect("static catalog should validate");

        assert_eq!(registry.len(), catalog::ENTITIES.len());
        assert!(registry.entity("Chapter").is_some());
        assert!(registry.entity("Lesson").is_none());
    }

    #[test]
    fn relation_targets_resolve_lazily_by_name() {
        let registry = registry().expect("static catalog should validate");
        let chapter = registry.entity("Chapter").expect("chapter entity");
        let course = chapter.relation("course").expect("chapter.course");

        let target = registry.target(course).expect("course target");
        assert_eq!(target.name, "Course");

        let inverse = registry.inverse(course).expect("course.chapters");
        assert_eq!(inverse.name, "chapters");
        assert_eq!(inverse.cardinality, Cardinality::Many);
    }

    #[test]
    fn cyclic_graph_round_trips_through_names() {
        let registry = registry().expect("static catalog should validate");

        // User -> courses -> chapters -> quizzes -> attempts -> user
        let mut entity = registry.entity("User").expect("user");
        for hop in ["courses", "chapters", "quizzes", "attempts", "user"] {
            let relation = entity.relation(hop).expect("relation hop should exist");
            entity = registry.target(relation).expect("hop target");
        }

        assert_eq!(entity.name, "User");
    }
}
