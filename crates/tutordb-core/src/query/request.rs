//! Module: query::request
//! Responsibility: per-action argument sets and the top-level validation entry point.
//! Does not own: execution; a validated `Request` is handed to storage by value.

use crate::{
    config::Config,
    query::{
        Ctx, ValidateError,
        aggregate::{
            AggregateSpec, CountAggregate, GroupBySpec, parse_aggregates, parse_count_aggregate,
            parse_group_by,
        },
        expect_bool, expect_object,
        filter::{WhereFilter, parse_where},
        keyword::{aggregations, args},
        map_one_or_many,
        mutation::{CreateInput, UpdateInput, parse_create, parse_update},
        projection::{Projection, parse_projection},
        read::{ReadArgs, check_arguments, parse_read_args, parse_window_args},
        unique::{UniqueSelector, parse_unique},
    },
};
use derive_more::Display;
use serde_json::{Map, Value as JsonValue};
use std::str::FromStr;
use tutordb_schema::prelude::{EntityModel, Registry};

const PROJECTION: &[&str] = &[args::SELECT, args::INCLUDE];
const AGGREGATES: &[&str] = &[
    aggregations::COUNT,
    aggregations::AVG,
    aggregations::SUM,
    aggregations::MIN,
    aggregations::MAX,
];

///
/// Action
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Action {
    #[display("findUnique")]
    FindUnique,
    #[display("findUniqueOrThrow")]
    FindUniqueOrThrow,
    #[display("findFirst")]
    FindFirst,
    #[display("findFirstOrThrow")]
    FindFirstOrThrow,
    #[display("findMany")]
    FindMany,
    #[display("create")]
    Create,
    #[display("createMany")]
    CreateMany,
    #[display("update")]
    Update,
    #[display("updateMany")]
    UpdateMany,
    #[display("upsert")]
    Upsert,
    #[display("delete")]
    Delete,
    #[display("deleteMany")]
    DeleteMany,
    #[display("count")]
    Count,
    #[display("aggregate")]
    Aggregate,
    #[display("groupBy")]
    GroupBy,
}

impl Action {
    pub const ALL: [Self; 15] = [
        Self::FindUnique,
        Self::FindUniqueOrThrow,
        Self::FindFirst,
        Self::FindFirstOrThrow,
        Self::FindMany,
        Self::Create,
        Self::CreateMany,
        Self::Update,
        Self::UpdateMany,
        Self::Upsert,
        Self::Delete,
        Self::DeleteMany,
        Self::Count,
        Self::Aggregate,
        Self::GroupBy,
    ];

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::FindUnique => "findUnique",
            Self::FindUniqueOrThrow => "findUniqueOrThrow",
            Self::FindFirst => "findFirst",
            Self::FindFirstOrThrow => "findFirstOrThrow",
            Self::FindMany => "findMany",
            Self::Create => "create",
            Self::CreateMany => "createMany",
            Self::Update => "update",
            Self::UpdateMany => "updateMany",
            Self::Upsert => "upsert",
            Self::Delete => "delete",
            Self::DeleteMany => "deleteMany",
            Self::Count => "count",
            Self::Aggregate => "aggregate",
            Self::GroupBy => "groupBy",
        }
    }

    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.keyword() == keyword)
    }

    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(
            self,
            Self::Create
                | Self::CreateMany
                | Self::Update
                | Self::UpdateMany
                | Self::Upsert
                | Self::Delete
                | Self::DeleteMany
        )
    }

    /// Top-level arguments this action accepts.
    #[must_use]
    pub fn arguments(self) -> Vec<&'static str> {
        let window = [
            args::WHERE,
            args::ORDER_BY,
            args::CURSOR,
            args::TAKE,
            args::SKIP,
        ];

        match self {
            Self::FindUnique | Self::FindUniqueOrThrow | Self::Delete => {
                [&[args::WHERE][..], PROJECTION].concat()
            }
            Self::FindFirst | Self::FindFirstOrThrow | Self::FindMany => {
                [&window[..], &[args::DISTINCT][..], PROJECTION].concat()
            }
            Self::Create => [&[args::DATA][..], PROJECTION].concat(),
            Self::CreateMany => vec![args::DATA, args::SKIP_DUPLICATES],
            Self::Update => [&[args::WHERE, args::DATA][..], PROJECTION].concat(),
            Self::UpdateMany => vec![args::WHERE, args::DATA],
            Self::Upsert => [&[args::WHERE, args::CREATE, args::UPDATE][..], PROJECTION].concat(),
            Self::DeleteMany => vec![args::WHERE],
            Self::Count => [&window[..], &[args::DISTINCT, args::SELECT][..]].concat(),
            Self::Aggregate => [&window[..], AGGREGATES].concat(),
            Self::GroupBy => [
                &[args::WHERE, args::BY, args::HAVING, args::ORDER_BY, args::TAKE, args::SKIP][..],
                AGGREGATES,
            ]
            .concat(),
        }
    }
}

impl FromStr for Action {
    type Err = ValidateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_keyword(s).ok_or_else(|| ValidateError::UnknownArgument {
            action: "request",
            argument: s.to_string(),
        })
    }
}

///
/// Operation
///
/// Validated payload of one action. The `...OrThrow` variants share the
/// shape of their plain counterparts; `Request::action` tells them apart.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    FindUnique {
        selector: UniqueSelector,
        projection: Projection,
    },
    FindMany(ReadArgs),
    Create {
        data: CreateInput,
        projection: Projection,
    },
    CreateMany {
        data: Vec<CreateInput>,
        skip_duplicates: bool,
    },
    Update {
        selector: UniqueSelector,
        data: UpdateInput,
        projection: Projection,
    },
    UpdateMany {
        filter: Option<WhereFilter>,
        data: UpdateInput,
    },
    Upsert {
        selector: UniqueSelector,
        create: CreateInput,
        update: UpdateInput,
        projection: Projection,
    },
    Delete {
        selector: UniqueSelector,
        projection: Projection,
    },
    DeleteMany {
        filter: Option<WhereFilter>,
    },
    Count {
        args: ReadArgs,
        select: Option<CountAggregate>,
    },
    Aggregate {
        args: ReadArgs,
        aggregates: AggregateSpec,
    },
    GroupBy(GroupBySpec),
}

///
/// Request
///

#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub entity: &'static str,
    pub action: Action,
    pub operation: Operation,
}

impl Request {
    /// Row filter of the operation, when it has one.
    #[must_use]
    pub const fn filter(&self) -> Option<&WhereFilter> {
        match &self.operation {
            Operation::FindMany(args)
            | Operation::Count { args, .. }
            | Operation::Aggregate { args, .. } => args.filter.as_ref(),
            Operation::UpdateMany { filter, .. } | Operation::DeleteMany { filter } => {
                filter.as_ref()
            }
            Operation::GroupBy(spec) => spec.filter.as_ref(),
            _ => None,
        }
    }

    /// Unique selector of the operation, when it addresses a single row.
    #[must_use]
    pub const fn selector(&self) -> Option<&UniqueSelector> {
        match &self.operation {
            Operation::FindUnique { selector, .. }
            | Operation::Update { selector, .. }
            | Operation::Upsert { selector, .. }
            | Operation::Delete { selector, .. } => Some(selector),
            _ => None,
        }
    }
}

/// Validate `args` for `action` on `entity` and build the typed request.
///
/// Validation is all-or-nothing: the first problem found is returned with the
/// path of the offending argument.
pub fn validate_request(
    registry: &Registry,
    config: &Config,
    entity: &str,
    action: Action,
    args: &JsonValue,
) -> Result<Request, ValidateError> {
    let ctx = Ctx::new(registry, config);
    let model = ctx.entity(entity)?;

    let empty = Map::new();
    let map = match args {
        JsonValue::Null => &empty,
        other => expect_object(other, "arguments object")?,
    };
    check_arguments(map, action.keyword(), &action.arguments())?;

    let operation = parse_operation(ctx, model, action, map)?;

    Ok(Request {
        entity: model.name,
        action,
        operation,
    })
}

fn parse_operation(
    ctx: Ctx<'_>,
    entity: &'static EntityModel,
    action: Action,
    map: &Map<String, JsonValue>,
) -> Result<Operation, ValidateError> {
    let required = move |argument: &'static str| {
        map.get(argument).ok_or(ValidateError::MissingArgument {
            action: action.keyword(),
            argument,
        })
    };
    let selector = || {
        parse_unique(entity, required(args::WHERE)?).map_err(|err| err.with_field(args::WHERE))
    };
    let projection = || parse_projection(ctx, entity, map.get(args::SELECT), map.get(args::INCLUDE));
    let filter = || {
        map.get(args::WHERE)
            .map(|input| parse_where(ctx, entity, input))
            .transpose()
            .map_err(|err| err.with_field(args::WHERE))
    };

    let operation = match action {
        Action::FindUnique | Action::FindUniqueOrThrow => Operation::FindUnique {
            selector: selector()?,
            projection: projection()?,
        },
        Action::FindFirst | Action::FindFirstOrThrow | Action::FindMany => {
            Operation::FindMany(parse_read_args(ctx, entity, map)?)
        }
        Action::Create => Operation::Create {
            data: parse_create(ctx, entity, required(args::DATA)?, None, false)
                .map_err(|err| err.with_field(args::DATA))?,
            projection: projection()?,
        },
        Action::CreateMany => {
            let data = map_one_or_many(ctx, required(args::DATA)?, |item| {
                parse_create(ctx, entity, item, None, true)
            })
            .map_err(|err| err.with_field(args::DATA))?;
            let skip_duplicates = match map.get(args::SKIP_DUPLICATES) {
                Some(flag) => expect_bool(flag, "true or false")
                    .map_err(|err| err.with_field(args::SKIP_DUPLICATES))?,
                None => false,
            };

            Operation::CreateMany {
                data,
                skip_duplicates,
            }
        }
        Action::Update => Operation::Update {
            selector: selector()?,
            data: parse_update(ctx, entity, required(args::DATA)?, None, false)
                .map_err(|err| err.with_field(args::DATA))?,
            projection: projection()?,
        },
        Action::UpdateMany => Operation::UpdateMany {
            filter: filter()?,
            data: parse_update(ctx, entity, required(args::DATA)?, None, true)
                .map_err(|err| err.with_field(args::DATA))?,
        },
        Action::Upsert => Operation::Upsert {
            selector: selector()?,
            create: parse_create(ctx, entity, required(args::CREATE)?, None, false)
                .map_err(|err| err.with_field(args::CREATE))?,
            update: parse_update(ctx, entity, required(args::UPDATE)?, None, false)
                .map_err(|err| err.with_field(args::UPDATE))?,
            projection: projection()?,
        },
        Action::Delete => Operation::Delete {
            selector: selector()?,
            projection: projection()?,
        },
        Action::DeleteMany => Operation::DeleteMany { filter: filter()? },
        Action::Count => Operation::Count {
            args: parse_window_args(ctx, entity, map)?,
            select: map
                .get(args::SELECT)
                .map(|select| parse_count_aggregate(entity, select))
                .transpose()
                .map_err(|err| err.with_field(args::SELECT))?
                .flatten(),
        },
        Action::Aggregate => {
            let aggregates = parse_aggregates(entity, map)?;
            if aggregates.is_empty() {
                return Err(ValidateError::MissingArgument {
                    action: action.keyword(),
                    argument: "_count | _avg | _sum | _min | _max",
                });
            }

            Operation::Aggregate {
                args: parse_window_args(ctx, entity, map)?,
                aggregates,
            }
        }
        Action::GroupBy => Operation::GroupBy(parse_group_by(ctx, entity, map)?),
    };

    Ok(operation)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, query::order::SortOrder};
    use serde_json::json;
    use tutordb_schema::prelude::registry;

    fn validate(entity: &str, action: Action, args: JsonValue) -> Result<Request, ValidateError> {
        let registry = registry().expect("catalog registry should build");

        validate_request(registry, &Config::default(), entity, action, &args)
    }

    #[test]
    fn find_many_normalizes_filter_and_order() {
        let request = validate(
            "Chapter",
            Action::FindMany,
            json!({ "where": { "courseId": "c1" }, "orderBy": { "order": "asc" } }),
        )
        .expect("chapter listing");

        let filter = request.filter().expect("filter");
        assert_eq!(filter.to_document(), json!({ "courseId": { "equals": "c1" } }));

        let Operation::FindMany(args) = &request.operation else {
            panic!("expected findMany");
        };
        let order = args.order.as_ref().expect("order");
        assert_eq!(order.fields().collect::<Vec<_>>(), ["order"]);
        assert_eq!(order.terms[0].sort, SortOrder::Asc);
        assert_eq!(order.terms[0].nulls, None);
    }

    #[test]
    fn null_arguments_are_empty() {
        let request = validate("Course", Action::FindMany, JsonValue::Null).expect("no arguments");

        assert_eq!(request.operation, Operation::FindMany(ReadArgs::default()));
        assert!(request.filter().is_none());
    }

    #[test]
    fn arguments_are_checked_per_action() {
        let err = validate(
            "Chapter",
            Action::FindUnique,
            json!({ "where": { "id": "a" }, "orderBy": { "order": "asc" } }),
        )
        .expect_err("findUnique takes no orderBy");

        assert_eq!(err.kind(), ErrorKind::UnknownField);
        assert!(matches!(
            err,
            ValidateError::UnknownArgument {
                action: "findUnique",
                ..
            }
        ));
    }

    #[test]
    fn unknown_entity_is_rejected() {
        let err = validate("Chapters", Action::FindMany, json!({})).expect_err("typo");

        assert_eq!(err.kind(), ErrorKind::UnknownField);
    }

    #[test]
    fn single_row_actions_need_a_unique_where() {
        let err = validate("Chapter", Action::Delete, json!({})).expect_err("missing where");
        assert_eq!(err.kind(), ErrorKind::MissingField);

        let err = validate("Chapter", Action::Delete, json!({ "where": { "title": "a" } }))
            .expect_err("title is not unique");
        assert_eq!(err.kind(), ErrorKind::MalformedCompoundKey);
        assert_eq!(err.path(), Some("where"));

        let request = validate(
            "Chapter",
            Action::FindUniqueOrThrow,
            json!({ "where": { "courseId_order": { "courseId": "c1", "order": 3 } } }),
        )
        .expect("compound selector");
        assert_eq!(request.action, Action::FindUniqueOrThrow);
        assert!(request.selector().is_some());
    }

    #[test]
    fn bulk_writes_take_scalars_only() {
        let err = validate(
            "Chapter",
            Action::CreateMany,
            json!({ "data": [{ "order": 1, "title": "a", "course": { "connect": { "id": "c" } } }] }),
        )
        .expect_err("no nested writes in createMany");
        assert_eq!(err.kind(), ErrorKind::UnknownField);
        assert_eq!(err.path(), Some("data[0].course"));

        let request = validate(
            "Chapter",
            Action::CreateMany,
            json!({ "data": [{ "order": 1, "title": "a", "courseId": "c" }], "skipDuplicates": true }),
        )
        .expect("scalar createMany");
        assert!(matches!(
            request.operation,
            Operation::CreateMany {
                skip_duplicates: true,
                ..
            }
        ));

        let err = validate(
            "Chapter",
            Action::UpdateMany,
            json!({ "data": { "quizzes": { "deleteMany": {} } } }),
        )
        .expect_err("no nested writes in updateMany");
        assert_eq!(err.path(), Some("data.quizzes"));
    }

    #[test]
    fn upsert_needs_both_branches() {
        let err = validate(
            "User",
            Action::Upsert,
            json!({ "where": { "email": "a@b.c" }, "create": { "email": "a@b.c" } }),
        )
        .expect_err("missing update");

        assert!(matches!(
            err,
            ValidateError::MissingArgument {
                argument: "update",
                ..
            }
        ));
    }

    #[test]
    fn aggregate_needs_at_least_one_aggregation() {
        let err = validate("QuizAttempt", Action::Aggregate, json!({ "where": {} }))
            .expect_err("nothing to aggregate");
        assert_eq!(err.kind(), ErrorKind::MissingField);

        let request = validate(
            "QuizAttempt",
            Action::Aggregate,
            json!({ "_avg": { "score": true }, "where": { "status": "COMPLETED" } }),
        )
        .expect("average score");
        let Operation::Aggregate { aggregates, .. } = &request.operation else {
            panic!("expected aggregate");
        };
        assert_eq!(aggregates.avg, ["score"]);
    }

    #[test]
    fn action_keywords_parse() {
        for action in Action::ALL {
            assert_eq!(action.keyword().parse::<Action>(), Ok(action));
            assert_eq!(action.to_string(), action.keyword());
        }

        let err = "findAll".parse::<Action>().expect_err("not an action");
        assert_eq!(err.kind(), ErrorKind::UnknownField);
    }
}
