use crate::{
    build::Registry,
    node::{EntityModel, FieldModel, RelationModel, UniqueModel},
    types::{Cardinality, ScalarKind},
};

static AUTHOR: EntityModel = EntityModel {
    name: "Author",
    primary_key: &["id"],
    fields: &[FieldModel::new("id", ScalarKind::String)],
    relations: &[RelationModel::back("posts", "Post", Cardinality::Many, "author")],
    uniques: &[UniqueModel::single(&["id"])],
};

// key field is nullable while the relation is required
static POST_NULLABLE_KEY: EntityModel = EntityModel {
    name: "Post",
    primary_key: &["id"],
    fields: &[
        FieldModel::new("id", ScalarKind::String),
        FieldModel::new("authorId", ScalarKind::String).nullable(),
    ],
    relations: &[RelationModel::owning(
        "author",
        "Author",
        Cardinality::One,
        "posts",
        &["authorId"],
        &["id"],
    )],
    uniques: &[UniqueModel::single(&["id"])],
};

static POST_BAD_TARGET: EntityModel = EntityModel {
    name: "Post",
    primary_key: &["id"],
    fields: &[
        FieldModel::new("id", ScalarKind::String),
        FieldModel::new("authorId", ScalarKind::String),
    ],
    relations: &[RelationModel::owning(
        "author",
        "Writer",
        Cardinality::One,
        "posts",
        &["authorId"],
        &["id"],
    )],
    uniques: &[UniqueModel::single(&["id"])],
};

static POST_BAD_UNIQUES: EntityModel = EntityModel {
    name: "Post",
    primary_key: &["id"],
    fields: &[
        FieldModel::new("id", ScalarKind::String),
        FieldModel::new("authorId", ScalarKind::String),
        FieldModel::new("slot", ScalarKind::Int),
    ],
    relations: &[RelationModel::owning(
        "author",
        "Author",
        Cardinality::One,
        "posts",
        &["authorId"],
        &["id"],
    )],
    uniques: &[
        UniqueModel::single(&["id"]),
        UniqueModel::single(&["authorId", "slot"]),
        UniqueModel::compound("authorId_missing", &["authorId", "missing"]),
    ],
};

static POST_OK: EntityModel = EntityModel {
    name: "Post",
    primary_key: &["id"],
    fields: &[
        FieldModel::new("id", ScalarKind::String),
        FieldModel::new("authorId", ScalarKind::String),
    ],
    relations: &[RelationModel::owning(
        "author",
        "Author",
        Cardinality::One,
        "posts",
        &["authorId"],
        &["id"],
    )],
    uniques: &[UniqueModel::single(&["id"])],
};

fn build_err(models: &[&'static EntityModel]) -> Vec<String> {
    Registry::from_models(models)
        .expect_err("registry should fail validation")
        .flatten()
}

#[test]
fn valid_pair_builds() {
    let registry = Registry::from_models(&[&AUTHOR, &POST_OK]).expect("valid pair should build");

    assert_eq!(registry.len(), 2);
}

#[test]
fn required_relation_with_nullable_key_is_rejected() {
    let errs = build_err(&[&AUTHOR, &POST_NULLABLE_KEY]);

    assert!(
        errs.iter()
            .any(|e| e.starts_with("Post:") && e.contains("key field 'authorId' is nullable")),
        "unexpected errors: {errs:?}"
    );
}

#[test]
fn unknown_target_is_rejected() {
    let errs = build_err(&[&AUTHOR, &POST_BAD_TARGET]);

    assert!(
        errs.iter().any(|e| e.contains("unknown entity 'Writer'")),
        "unexpected errors: {errs:?}"
    );
}

#[test]
fn duplicate_entity_is_rejected() {
    let errs = build_err(&[&AUTHOR, &POST_OK, &POST_OK]);

    assert!(errs.iter().any(|e| e.contains("duplicate entity name 'Post'")));
}

#[test]
fn unique_shapes_are_checked() {
    let errs = build_err(&[&AUTHOR, &POST_BAD_UNIQUES]);

    assert!(errs.iter().any(|e| e.contains("is compound and needs an alias")));
    assert!(errs.iter().any(|e| e.contains("references unknown field 'missing'")));
}
