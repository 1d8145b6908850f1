use crate::{
    MAX_ENTITY_NAME_LEN, MAX_FIELD_NAME_LEN, err, error::ErrorTree, node::EntityModel,
    types::ScalarKind,
};
use std::collections::BTreeSet;

// Validate identifier lengths, field/relation name collisions, and enum shapes.
pub fn validate_entity_naming(entity: &EntityModel, errs: &mut ErrorTree) {
    if entity.name.is_empty() || entity.name.len() > MAX_ENTITY_NAME_LEN {
        err!(
            errs,
            "entity name must be 1..={MAX_ENTITY_NAME_LEN} bytes, found {}",
            entity.name.len()
        );
    }

    let mut seen = BTreeSet::new();
    let names = entity
        .fields
        .iter()
        .map(|f| f.name)
        .chain(entity.relations.iter().map(|r| r.name));

    for name in names {
        if name.is_empty() || name.len() > MAX_FIELD_NAME_LEN {
            err!(
                errs,
                "field name '{name}' must be 1..={MAX_FIELD_NAME_LEN} bytes"
            );
        }
        if name.starts_with('_') || matches!(name, "AND" | "OR" | "NOT") {
            err!(errs, "field name '{name}' is reserved");
        }
        if !seen.insert(name) {
            err!(errs, "duplicate field or relation name '{name}'");
        }
    }

    for field in entity.fields {
        if let ScalarKind::Enum(model) = field.kind
            && model.variants.is_empty()
        {
            err!(
                errs,
                "enum field '{}' uses '{}' which declares no variants",
                field.name,
                model.name
            );
        }
    }
}
