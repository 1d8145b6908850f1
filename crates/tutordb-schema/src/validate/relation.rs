use crate::{build::Registry, err, error::ErrorTree, node::EntityModel, node::RelationModel};

// Validate relation targets, inverse pairing, and foreign-key shapes.
pub fn validate_relations(registry: &Registry, errs: &mut ErrorTree) {
    for entity in registry.entities() {
        let mut local = ErrorTree::new();
        for relation in entity.relations {
            validate_relation(registry, entity, relation, &mut local);
        }
        errs.merge_for(entity.name, local);
    }
}

fn validate_relation(
    registry: &Registry,
    entity: &EntityModel,
    relation: &RelationModel,
    errs: &mut ErrorTree,
) {
    let name = relation.name;

    let Some(target) = registry.target(relation) else {
        err!(
            errs,
            "relation '{name}' targets unknown entity '{}'",
            relation.target
        );
        return;
    };

    let Some(inverse) = target.relation(relation.inverse) else {
        err!(
            errs,
            "relation '{name}' names inverse '{}.{}' which does not exist",
            target.name,
            relation.inverse
        );
        return;
    };

    if inverse.target != entity.name || inverse.inverse != name {
        err!(
            errs,
            "relation '{name}' and '{}.{}' do not point at each other",
            target.name,
            inverse.name
        );
    }

    // exactly one side of each pair stores the foreign key
    match (relation.owns_foreign_key(), inverse.owns_foreign_key()) {
        (true, true) => err!(errs, "relation '{name}' and its inverse both own a foreign key"),
        (false, false) => err!(errs, "relation '{name}' and its inverse both lack a foreign key"),
        _ => {}
    }

    if relation.cardinality.is_to_many() {
        if relation.owns_foreign_key() {
            err!(errs, "to-many relation '{name}' cannot own a foreign key");
        }
        if inverse.cardinality.is_to_many() {
            err!(errs, "relation '{name}' pairs two to-many sides");
        }
    }

    if relation.owns_foreign_key() {
        validate_foreign_key(entity, target, relation, errs);
    } else if relation.is_required() {
        err!(
            errs,
            "required relation '{name}' must own its foreign key"
        );
    }
}

fn validate_foreign_key(
    entity: &EntityModel,
    target: &EntityModel,
    relation: &RelationModel,
    errs: &mut ErrorTree,
) {
    let name = relation.name;

    if relation.fields.len() != relation.references.len() {
        err!(
            errs,
            "relation '{name}' has {} key fields but {} references",
            relation.fields.len(),
            relation.references.len()
        );
        return;
    }

    for (local, remote) in relation.fields.iter().zip(relation.references) {
        let Some(local_field) = entity.field(local) else {
            err!(errs, "relation '{name}' key field '{local}' is not declared");
            continue;
        };
        let Some(remote_field) = target.field(remote) else {
            err!(
                errs,
                "relation '{name}' references unknown field '{}.{remote}'",
                target.name
            );
            continue;
        };

        if local_field.kind != remote_field.kind || local_field.list || remote_field.list {
            err!(
                errs,
                "relation '{name}' key '{local}' ({}) does not match '{}.{remote}' ({})",
                local_field.kind,
                target.name,
                remote_field.kind
            );
        }

        // requiredness of the link follows the nullability of its key
        if local_field.nullable == relation.is_required() {
            err!(
                errs,
                "relation '{name}' is {} but key field '{local}' is {}",
                relation.cardinality,
                if local_field.nullable { "nullable" } else { "required" }
            );
        }
    }

    let Some(inverse) = target.relation(relation.inverse) else {
        return;
    };
    if inverse.cardinality.is_to_one()
        && !entity
            .uniques
            .iter()
            .any(|u| u.matches_exactly(relation.fields.iter().copied()))
    {
        err!(
            errs,
            "one-to-one relation '{name}' needs a unique key on ({})",
            relation.fields.join(", ")
        );
    }

    let referenced_unique = target
        .uniques
        .iter()
        .any(|u| u.matches_exactly(relation.references.iter().copied()));
    if !referenced_unique {
        err!(
            errs,
            "relation '{name}' references ({}) which is not unique on '{}'",
            relation.references.join(", "),
            target.name
        );
    }
}
