use crate::query::{
    Ctx, ValidateError, expect_bool, expect_object,
    filter::{WhereFilter, parse_where},
    keyword::{args, nested},
    map_one_or_many,
    mutation::{
        WriteMode,
        input::{CreateInput, UpdateInput, parse_create, parse_update},
    },
    read::check_arguments,
    unique::{UniqueSelector, parse_unique},
};
use derive_more::Display;
use serde_json::{Map, Value as JsonValue};
use tutordb_schema::prelude::{EntityModel, RelationModel};

///
/// NestedOpKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum NestedOpKind {
    #[display("connect")]
    Connect,
    #[display("connectOrCreate")]
    ConnectOrCreate,
    #[display("create")]
    Create,
    #[display("createMany")]
    CreateMany,
    #[display("delete")]
    Delete,
    #[display("deleteMany")]
    DeleteMany,
    #[display("disconnect")]
    Disconnect,
    #[display("set")]
    Set,
    #[display("update")]
    Update,
    #[display("updateMany")]
    UpdateMany,
    #[display("upsert")]
    Upsert,
}

impl NestedOpKind {
    pub const ALL: [Self; 11] = [
        Self::Connect,
        Self::ConnectOrCreate,
        Self::Create,
        Self::CreateMany,
        Self::Delete,
        Self::DeleteMany,
        Self::Disconnect,
        Self::Set,
        Self::Update,
        Self::UpdateMany,
        Self::Upsert,
    ];

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Connect => nested::CONNECT,
            Self::ConnectOrCreate => nested::CONNECT_OR_CREATE,
            Self::Create => nested::CREATE,
            Self::CreateMany => nested::CREATE_MANY,
            Self::Delete => nested::DELETE,
            Self::DeleteMany => nested::DELETE_MANY,
            Self::Disconnect => nested::DISCONNECT,
            Self::Set => nested::SET,
            Self::Update => nested::UPDATE,
            Self::UpdateMany => nested::UPDATE_MANY,
            Self::Upsert => nested::UPSERT,
        }
    }

    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == keyword)
    }

    /// Whether this operation may appear on `relation` during `mode`.
    ///
    /// `inverse` is the relation on the target pointing back; detaching rows
    /// from a to-many relation needs that side to be optional.
    #[must_use]
    pub const fn permitted(
        self,
        relation: &RelationModel,
        inverse: &RelationModel,
        mode: WriteMode,
    ) -> bool {
        let to_many = relation.cardinality.is_to_many();
        match (self, mode) {
            (Self::Create | Self::Connect | Self::ConnectOrCreate, _) => true,
            (Self::CreateMany, _) => to_many,
            (_, WriteMode::Create) => false,
            (Self::Update | Self::Upsert, WriteMode::Update) => true,
            (Self::Disconnect, WriteMode::Update) => {
                if to_many {
                    !inverse.is_required()
                } else {
                    !relation.is_required()
                }
            }
            (Self::Delete, WriteMode::Update) => to_many || !relation.is_required(),
            (Self::Set, WriteMode::Update) => to_many && !inverse.is_required(),
            (Self::UpdateMany | Self::DeleteMany, WriteMode::Update) => to_many,
        }
    }
}

///
/// Target
///
/// Which related row(s) an update / delete / disconnect addresses.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    /// The single row currently linked through a to-one relation.
    Linked,
    /// The linked to-one row, if it also matches the filter.
    Matching(WhereFilter),
    Selected(UniqueSelector),
}

///
/// ConnectOrCreate
///

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectOrCreate {
    pub selector: UniqueSelector,
    pub create: CreateInput,
}

///
/// NestedUpdate
///

#[derive(Clone, Debug, PartialEq)]
pub struct NestedUpdate {
    pub target: Target,
    pub data: UpdateInput,
}

///
/// NestedUpdateMany
///

#[derive(Clone, Debug, PartialEq)]
pub struct NestedUpdateMany {
    pub filter: WhereFilter,
    pub data: UpdateInput,
}

///
/// NestedUpsert
///

#[derive(Clone, Debug, PartialEq)]
pub struct NestedUpsert {
    pub target: Target,
    pub create: CreateInput,
    pub update: UpdateInput,
}

///
/// NestedOp
///

#[derive(Clone, Debug, PartialEq)]
pub enum NestedOp {
    Create(Vec<CreateInput>),
    CreateMany {
        data: Vec<CreateInput>,
        skip_duplicates: bool,
    },
    Connect(Vec<UniqueSelector>),
    ConnectOrCreate(Vec<ConnectOrCreate>),
    /// Replace the full membership of a to-many relation.
    Set(Vec<UniqueSelector>),
    Disconnect(Vec<Target>),
    Delete(Vec<Target>),
    Update(Vec<NestedUpdate>),
    UpdateMany(Vec<NestedUpdateMany>),
    Upsert(Vec<NestedUpsert>),
    DeleteMany(Vec<WhereFilter>),
}

impl NestedOp {
    #[must_use]
    pub const fn kind(&self) -> NestedOpKind {
        match self {
            Self::Create(_) => NestedOpKind::Create,
            Self::CreateMany { .. } => NestedOpKind::CreateMany,
            Self::Connect(_) => NestedOpKind::Connect,
            Self::ConnectOrCreate(_) => NestedOpKind::ConnectOrCreate,
            Self::Set(_) => NestedOpKind::Set,
            Self::Disconnect(_) => NestedOpKind::Disconnect,
            Self::Delete(_) => NestedOpKind::Delete,
            Self::Update(_) => NestedOpKind::Update,
            Self::UpdateMany(_) => NestedOpKind::UpdateMany,
            Self::Upsert(_) => NestedOpKind::Upsert,
            Self::DeleteMany(_) => NestedOpKind::DeleteMany,
        }
    }
}

///
/// RelationWrite
///

#[derive(Clone, Debug, PartialEq)]
pub struct RelationWrite {
    pub relation: &'static str,
    pub ops: Vec<NestedOp>,
}

impl RelationWrite {
    pub fn kinds(&self) -> impl Iterator<Item = NestedOpKind> + '_ {
        self.ops.iter().map(NestedOp::kind)
    }
}

///
/// Walk
///
/// Resolved models for one nested relation write.
///

#[derive(Clone, Copy)]
struct Walk<'a> {
    ctx: Ctx<'a>,
    owner: &'static EntityModel,
    relation: &'static RelationModel,
    target: &'static EntityModel,
    inverse: &'static RelationModel,
}

impl Walk<'_> {
    const fn to_many(self) -> bool {
        self.relation.cardinality.is_to_many()
    }

    // to-one relations take a single item; to-many take one or an array
    fn items<T>(
        self,
        input: &JsonValue,
        mut f: impl FnMut(&JsonValue) -> Result<T, ValidateError>,
    ) -> Result<Vec<T>, ValidateError> {
        if self.to_many() {
            return map_one_or_many(self.ctx, input, f);
        }
        if input.is_array() {
            return Err(ValidateError::cardinality(
                self.owner.name,
                self.relation.name,
                "to-one relation takes a single object, not a list",
            ));
        }

        Ok(vec![f(input)?])
    }

    fn create(self, input: &JsonValue) -> Result<CreateInput, ValidateError> {
        parse_create(self.ctx, self.target, input, Some(self.inverse), false)
    }

    fn update(self, input: &JsonValue, scalars_only: bool) -> Result<UpdateInput, ValidateError> {
        parse_update(self.ctx, self.target, input, Some(self.inverse), scalars_only)
    }

    fn unique(self, input: &JsonValue) -> Result<UniqueSelector, ValidateError> {
        parse_unique(self.target, input)
    }

    fn filter(self, input: &JsonValue) -> Result<WhereFilter, ValidateError> {
        parse_where(self.ctx, self.target, input)
    }
}

/// Parse the nested operations on one relation field of a write payload.
pub(crate) fn parse_relation_write(
    ctx: Ctx<'_>,
    owner: &'static EntityModel,
    relation: &'static RelationModel,
    input: &JsonValue,
    mode: WriteMode,
) -> Result<RelationWrite, ValidateError> {
    let ctx = ctx.descend()?;
    let map = expect_object(input, "nested write object")?;
    let walk = Walk {
        ctx,
        owner,
        relation,
        target: ctx.target(relation)?,
        inverse: ctx.inverse(relation)?,
    };

    if !walk.to_many() && map.len() > 1 {
        return Err(ValidateError::cardinality(
            owner.name,
            relation.name,
            format!(
                "to-one relation accepts one nested operation, found {}",
                map.len()
            ),
        ));
    }

    let mut ops = Vec::with_capacity(map.len());
    for (key, value) in map {
        let at = |err: ValidateError| err.with_field(key);
        let kind = NestedOpKind::from_keyword(key).ok_or_else(|| {
            at(ValidateError::UnknownNestedOperation {
                entity: owner.name,
                relation: relation.name,
                operation: key.clone(),
            })
        })?;

        if !kind.permitted(relation, walk.inverse, mode) {
            return Err(at(ValidateError::cardinality(
                owner.name,
                relation.name,
                denial(kind, walk, mode),
            )));
        }

        if let Some(op) = parse_op(walk, kind, value).map_err(at)? {
            ops.push(op);
        }
    }

    Ok(RelationWrite {
        relation: relation.name,
        ops,
    })
}

fn denial(kind: NestedOpKind, walk: Walk<'_>, mode: WriteMode) -> String {
    let side = match (walk.to_many(), kind) {
        (true, NestedOpKind::Set | NestedOpKind::Disconnect) => {
            format!("rows whose '{}' relation is required", walk.inverse.name)
        }
        (true, _) => "to-many relation".to_string(),
        (false, _) if walk.relation.is_required() => "required to-one relation".to_string(),
        (false, _) => "optional to-one relation".to_string(),
    };

    format!("'{kind}' is not permitted on {side} during {mode}")
}

fn parse_op(
    walk: Walk<'_>,
    kind: NestedOpKind,
    value: &JsonValue,
) -> Result<Option<NestedOp>, ValidateError> {
    let op = match kind {
        NestedOpKind::Create => NestedOp::Create(walk.items(value, |item| walk.create(item))?),
        NestedOpKind::CreateMany => parse_create_many(walk, value)?,
        NestedOpKind::Connect => NestedOp::Connect(walk.items(value, |item| walk.unique(item))?),
        NestedOpKind::ConnectOrCreate => {
            NestedOp::ConnectOrCreate(walk.items(value, |item| parse_connect_or_create(walk, item))?)
        }
        NestedOpKind::Set => NestedOp::Set(walk.items(value, |item| walk.unique(item))?),
        NestedOpKind::Disconnect => match parse_targets(walk, value)? {
            Some(targets) => NestedOp::Disconnect(targets),
            None => return Ok(None),
        },
        NestedOpKind::Delete => match parse_targets(walk, value)? {
            Some(targets) => NestedOp::Delete(targets),
            None => return Ok(None),
        },
        NestedOpKind::Update => NestedOp::Update(walk.items(value, |item| parse_update_op(walk, item))?),
        NestedOpKind::UpdateMany => {
            NestedOp::UpdateMany(walk.items(value, |item| parse_update_many(walk, item))?)
        }
        NestedOpKind::Upsert => NestedOp::Upsert(walk.items(value, |item| parse_upsert(walk, item))?),
        NestedOpKind::DeleteMany => {
            NestedOp::DeleteMany(walk.items(value, |item| walk.filter(item))?)
        }
    };

    Ok(Some(op))
}

fn parse_create_many(walk: Walk<'_>, value: &JsonValue) -> Result<NestedOp, ValidateError> {
    let map = expect_object(value, "{data, skipDuplicates?}")?;
    check_arguments(map, nested::CREATE_MANY, &[args::DATA, args::SKIP_DUPLICATES])?;

    let data = required(map, nested::CREATE_MANY, args::DATA)?;
    let data = map_one_or_many(walk.ctx, data, |item| {
        parse_create(walk.ctx, walk.target, item, Some(walk.inverse), true)
    })
    .map_err(|err| err.with_field(args::DATA))?;

    let skip_duplicates = match map.get(args::SKIP_DUPLICATES) {
        Some(flag) => expect_bool(flag, "true or false")
            .map_err(|err| err.with_field(args::SKIP_DUPLICATES))?,
        None => false,
    };

    Ok(NestedOp::CreateMany {
        data,
        skip_duplicates,
    })
}

fn parse_connect_or_create(
    walk: Walk<'_>,
    item: &JsonValue,
) -> Result<ConnectOrCreate, ValidateError> {
    let map = expect_object(item, "{where, create}")?;
    check_arguments(map, nested::CONNECT_OR_CREATE, &[args::WHERE, args::CREATE])?;

    let selector = walk
        .unique(required(map, nested::CONNECT_OR_CREATE, args::WHERE)?)
        .map_err(|err| err.with_field(args::WHERE))?;
    let create = walk
        .create(required(map, nested::CONNECT_OR_CREATE, args::CREATE)?)
        .map_err(|err| err.with_field(args::CREATE))?;

    Ok(ConnectOrCreate { selector, create })
}

// to-one: `true` (linked row) or a filter; to-many: unique selectors
fn parse_targets(walk: Walk<'_>, value: &JsonValue) -> Result<Option<Vec<Target>>, ValidateError> {
    if walk.to_many() {
        let targets = walk.items(value, |item| walk.unique(item).map(Target::Selected))?;
        return Ok(Some(targets));
    }

    match value {
        JsonValue::Bool(true) => Ok(Some(vec![Target::Linked])),
        JsonValue::Bool(false) => Ok(None),
        JsonValue::Object(_) => Ok(Some(vec![Target::Matching(walk.filter(value)?)])),
        other => Err(ValidateError::invalid_shape("true, false, or filter object", other)),
    }
}

fn parse_update_op(walk: Walk<'_>, item: &JsonValue) -> Result<NestedUpdate, ValidateError> {
    let map = expect_object(item, "update object")?;

    if walk.to_many() {
        check_arguments(map, nested::UPDATE, &[args::WHERE, args::DATA])?;
        let target = walk
            .unique(required(map, nested::UPDATE, args::WHERE)?)
            .map(Target::Selected)
            .map_err(|err| err.with_field(args::WHERE))?;
        let data = walk
            .update(required(map, nested::UPDATE, args::DATA)?, false)
            .map_err(|err| err.with_field(args::DATA))?;

        return Ok(NestedUpdate { target, data });
    }

    // to-one: plain data, or {where?, data}
    if !is_wrapped(map) {
        return Ok(NestedUpdate {
            target: Target::Linked,
            data: walk.update(item, false)?,
        });
    }

    let target = optional_filter(walk, map)?;
    let data = walk
        .update(required(map, nested::UPDATE, args::DATA)?, false)
        .map_err(|err| err.with_field(args::DATA))?;

    Ok(NestedUpdate { target, data })
}

fn is_wrapped(map: &Map<String, JsonValue>) -> bool {
    map.contains_key(args::DATA) && map.keys().all(|k| k == args::DATA || k == args::WHERE)
}

fn parse_update_many(walk: Walk<'_>, item: &JsonValue) -> Result<NestedUpdateMany, ValidateError> {
    let map = expect_object(item, "{where, data}")?;
    check_arguments(map, nested::UPDATE_MANY, &[args::WHERE, args::DATA])?;

    let filter = walk
        .filter(required(map, nested::UPDATE_MANY, args::WHERE)?)
        .map_err(|err| err.with_field(args::WHERE))?;
    let data = walk
        .update(required(map, nested::UPDATE_MANY, args::DATA)?, true)
        .map_err(|err| err.with_field(args::DATA))?;

    Ok(NestedUpdateMany { filter, data })
}

fn parse_upsert(walk: Walk<'_>, item: &JsonValue) -> Result<NestedUpsert, ValidateError> {
    let map = expect_object(item, "{where, create, update}")?;
    check_arguments(map, nested::UPSERT, &[args::WHERE, args::CREATE, args::UPDATE])?;

    let target = if walk.to_many() {
        walk.unique(required(map, nested::UPSERT, args::WHERE)?)
            .map(Target::Selected)
            .map_err(|err| err.with_field(args::WHERE))?
    } else {
        optional_filter(walk, map)?
    };
    let create = walk
        .create(required(map, nested::UPSERT, args::CREATE)?)
        .map_err(|err| err.with_field(args::CREATE))?;
    let update = walk
        .update(required(map, nested::UPSERT, args::UPDATE)?, false)
        .map_err(|err| err.with_field(args::UPDATE))?;

    Ok(NestedUpsert {
        target,
        create,
        update,
    })
}

fn optional_filter(walk: Walk<'_>, map: &Map<String, JsonValue>) -> Result<Target, ValidateError> {
    match map.get(args::WHERE) {
        Some(filter) => walk
            .filter(filter)
            .map(Target::Matching)
            .map_err(|err| err.with_field(args::WHERE)),
        None => Ok(Target::Linked),
    }
}

fn required<'v>(
    map: &'v Map<String, JsonValue>,
    action: &'static str,
    argument: &'static str,
) -> Result<&'v JsonValue, ValidateError> {
    map.get(argument)
        .ok_or(ValidateError::MissingArgument { action, argument })
}
