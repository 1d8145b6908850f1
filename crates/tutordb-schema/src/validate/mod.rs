//! Registry validation orchestration.
//!
//! Runs once when the registry is built. Every problem is collected into one
//! `ErrorTree` so a broken catalog reports all of its faults together.

pub mod naming;
pub mod relation;
pub mod unique;

#[cfg(test)]
mod tests;

use crate::{build::Registry, error::ErrorTree};

/// Run full registry validation in a staged, deterministic order.
pub(crate) fn validate_registry(registry: &Registry, errs: &mut ErrorTree) {
    // Phase 1: per-entity structure.
    for entity in registry.entities() {
        let mut local = ErrorTree::new();
        naming::validate_entity_naming(entity, &mut local);
        unique::validate_uniques(entity, &mut local);
        errs.merge_for(entity.name, local);
    }

    // Phase 2: cross-entity relation graph.
    relation::validate_relations(registry, errs);
}
