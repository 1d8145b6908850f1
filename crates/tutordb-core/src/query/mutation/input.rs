use crate::{
    null::{JsonWrite, NullMarker},
    query::{
        Ctx, ValidateError, expect_object,
        mutation::{
            WriteMode,
            nested::{RelationWrite, parse_relation_write},
            scalar::{ScalarAssignment, ScalarWrite, parse_scalar_write},
        },
    },
};
use serde_json::Value as JsonValue;
use tutordb_schema::prelude::{EntityModel, RelationModel};

///
/// CreateInput
///
/// Data for one new row. Every required scalar is present, either directly
/// or through the relation that owns it.
///

#[derive(Clone, Debug, PartialEq)]
pub struct CreateInput {
    pub entity: &'static str,
    pub scalars: Vec<ScalarAssignment>,
    pub relations: Vec<RelationWrite>,
}

impl CreateInput {
    #[must_use]
    pub fn scalar(&self, field: &str) -> Option<&ScalarWrite> {
        find_scalar(&self.scalars, field)
    }

    #[must_use]
    pub fn relation(&self, relation: &str) -> Option<&RelationWrite> {
        self.relations.iter().find(|r| r.relation == relation)
    }
}

///
/// UpdateInput
///

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateInput {
    pub entity: &'static str,
    pub scalars: Vec<ScalarAssignment>,
    pub relations: Vec<RelationWrite>,
}

impl UpdateInput {
    #[must_use]
    pub fn scalar(&self, field: &str) -> Option<&ScalarWrite> {
        find_scalar(&self.scalars, field)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.relations.is_empty()
    }
}

fn find_scalar<'a>(scalars: &'a [ScalarAssignment], field: &str) -> Option<&'a ScalarWrite> {
    scalars
        .iter()
        .find_map(|a| (a.field == field).then_some(&a.write))
}

/// Parse create data for `entity`.
///
/// `back` is the relation on `entity` pointing at the parent of a nested
/// create; it and its foreign keys are implied and may not be named.
/// `scalars_only` rejects relation writes (createMany payloads).
pub(crate) fn parse_create(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    input: &JsonValue,
    back: Option<&'static RelationModel>,
    scalars_only: bool,
) -> Result<CreateInput, ValidateError> {
    let (mut scalars, relations) =
        parse_fields(ctx, entity, input, back, scalars_only, WriteMode::Create)?;

    if !scalars_only {
        check_required_relations(entity, &scalars, &relations, back)?;
    }

    for field in entity.fields {
        let present = scalars.iter().any(|a| a.field == field.name);
        if present || back.is_some_and(|b| b.is_foreign_key(field.name)) {
            continue;
        }

        if field.kind.is_json() && field.nullable && !field.list {
            scalars.push(ScalarAssignment {
                field: field.name,
                write: ScalarWrite::SetJson(JsonWrite::Null(NullMarker::DbNull)),
            });
            continue;
        }

        let via_relation = entity
            .relation_for_foreign_key(field.name)
            .is_some_and(|r| relations.iter().any(|w| w.relation == r.name));
        if field.is_required_on_create() && !via_relation {
            return Err(ValidateError::MissingField {
                entity: entity.name,
                field: field.name,
            });
        }
    }

    Ok(CreateInput {
        entity: entity.name,
        scalars,
        relations,
    })
}

/// Parse update data for `entity`; every field is optional.
pub(crate) fn parse_update(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    input: &JsonValue,
    back: Option<&'static RelationModel>,
    scalars_only: bool,
) -> Result<UpdateInput, ValidateError> {
    let (scalars, relations) =
        parse_fields(ctx, entity, input, back, scalars_only, WriteMode::Update)?;

    Ok(UpdateInput {
        entity: entity.name,
        scalars,
        relations,
    })
}

fn parse_fields(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    input: &JsonValue,
    back: Option<&'static RelationModel>,
    scalars_only: bool,
    mode: WriteMode,
) -> Result<(Vec<ScalarAssignment>, Vec<RelationWrite>), ValidateError> {
    let ctx = ctx.descend()?;
    let map = expect_object(input, "data object")?;

    let mut scalars = Vec::new();
    let mut relations = Vec::new();
    for (key, value) in map {
        let at = |err: ValidateError| err.with_field(key);
        let implied = back.is_some_and(|b| b.name == key || b.is_foreign_key(key));

        if let Some(field) = entity.field(key).filter(|_| !implied) {
            let write = parse_scalar_write(ctx, entity, field, value, mode).map_err(at)?;
            scalars.push(ScalarAssignment {
                field: field.name,
                write,
            });
            continue;
        }
        if let Some(relation) = entity.relation(key).filter(|_| !implied && !scalars_only) {
            relations.push(parse_relation_write(ctx, entity, relation, value, mode).map_err(at)?);
            continue;
        }

        return Err(at(ValidateError::unknown_field(entity.name, key)));
    }

    // foreign keys and a nested write must not both address one relation
    for write in &relations {
        let Some(relation) = entity.relation(write.relation) else {
            continue;
        };
        if let Some(fk) = relation
            .fields
            .iter()
            .find(|fk| scalars.iter().any(|a| a.field == **fk))
        {
            return Err(ValidateError::cardinality(
                entity.name,
                relation.name,
                format!("foreign key '{fk}' cannot be combined with a nested write"),
            )
            .with_field(relation.name));
        }
    }

    Ok((scalars, relations))
}

fn check_required_relations(
    entity: &'static EntityModel,
    scalars: &[ScalarAssignment],
    relations: &[RelationWrite],
    back: Option<&'static RelationModel>,
) -> Result<(), ValidateError> {
    let required = entity
        .relations
        .iter()
        .filter(|r| r.is_required() && r.owns_foreign_key())
        .filter(|r| back.is_none_or(|b| b.name != r.name));

    for relation in required {
        let nested = relations
            .iter()
            .any(|w| w.relation == relation.name && !w.ops.is_empty());
        let keyed = relation
            .fields
            .iter()
            .all(|fk| scalars.iter().any(|a| a.field == *fk));

        if !nested && !keyed {
            return Err(ValidateError::RequiredRelationMissing {
                entity: entity.name,
                relation: relation.name,
            });
        }
    }

    Ok(())
}
