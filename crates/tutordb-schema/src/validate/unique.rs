use crate::{MAX_UNIQUE_FIELDS, err, error::ErrorTree, node::EntityModel};
use std::collections::BTreeSet;

// Validate unique constraints and the primary key against declared fields.
pub fn validate_uniques(entity: &EntityModel, errs: &mut ErrorTree) {
    let mut aliases = BTreeSet::new();

    for unique in entity.uniques {
        if unique.fields.is_empty() {
            err!(errs, "unique constraint must name at least one field");
            continue;
        }
        if unique.fields.len() > MAX_UNIQUE_FIELDS {
            err!(
                errs,
                "{unique} exceeds {MAX_UNIQUE_FIELDS} fields"
            );
        }

        let mut seen = BTreeSet::new();
        for field in unique.fields {
            if !seen.insert(*field) {
                err!(errs, "{unique} repeats field '{field}'");
            }

            match entity.field(field) {
                None => err!(errs, "{unique} references unknown field '{field}'"),
                Some(model) if model.list || model.kind.is_json() => {
                    err!(errs, "{unique} references non-keyable field '{field}'");
                }
                Some(_) => {}
            }
        }

        match unique.name {
            Some(alias) => {
                if entity.field(alias).is_some() || entity.relation(alias).is_some() {
                    err!(errs, "{unique} alias '{alias}' collides with a field");
                }
                if !aliases.insert(alias) {
                    err!(errs, "duplicate unique alias '{alias}'");
                }
            }
            None if unique.is_compound() => {
                err!(errs, "{unique} is compound and needs an alias");
            }
            None => {}
        }
    }

    let pk_declared = entity
        .uniques
        .iter()
        .any(|u| u.matches_exactly(entity.primary_key.iter().copied()));
    if !pk_declared {
        err!(
            errs,
            "primary key ({}) is not a declared unique constraint",
            entity.primary_key.join(", ")
        );
    }
}
