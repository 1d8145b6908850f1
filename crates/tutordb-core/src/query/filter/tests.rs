use super::*;
use crate::{
    config::Config,
    error::ErrorKind,
    null::{FilterNullMarker, JsonMatch, marker_envelope},
    value::Value,
};
use proptest::prelude::*;
use serde_json::json;
use tutordb_schema::prelude::registry;

fn parse_with(config: &Config, entity: &str, input: &JsonValue) -> Result<WhereFilter, ValidateError> {
    let registry = registry().expect("catalog registry should build");
    let ctx = Ctx::new(registry, config);

    parse_where(ctx, ctx.entity(entity)?, input)
}

fn parse(entity: &str, input: JsonValue) -> Result<WhereFilter, ValidateError> {
    parse_with(&Config::default(), entity, &input)
}

fn kind_of(entity: &str, input: JsonValue) -> ErrorKind {
    parse(entity, input).expect_err("filter should be rejected").kind()
}

#[test]
fn shorthand_normalizes_to_equals() {
    let filter = parse("Chapter", json!({ "courseId": "c1" })).expect("shorthand should parse");

    assert_eq!(
        filter.to_document(),
        json!({ "courseId": { "equals": "c1" } })
    );
}

#[test]
fn text_operator_on_int_is_rejected_with_path() {
    let err = parse("Chapter", json!({ "order": { "contains": "1" } }))
        .expect_err("contains on Int should fail");

    assert_eq!(err.kind(), ErrorKind::OperatorNotSupported);
    assert_eq!(err.path(), Some("order.contains"));
}

#[test]
fn mode_is_text_only() {
    assert_eq!(
        kind_of("Chapter", json!({ "order": { "mode": "insensitive" } })),
        ErrorKind::OperatorNotSupported
    );

    let filter = parse(
        "Chapter",
        json!({ "title": { "contains": "intro", "mode": "insensitive" } }),
    )
    .expect("insensitive text filter should parse");
    let FilterNode::Field { filter, .. } = &filter.nodes[0] else {
        panic!("expected a field node");
    };
    assert_eq!(filter.mode, QueryMode::Insensitive);
}

#[test]
fn unknown_field_is_rejected() {
    assert_eq!(
        kind_of("Chapter", json!({ "chapterTitle": "x" })),
        ErrorKind::UnknownField
    );
}

#[test]
fn null_equality_requires_nullable_column() {
    assert_eq!(
        kind_of("Chapter", json!({ "title": null })),
        ErrorKind::InvalidValue
    );

    parse("Quiz", json!({ "type": { "equals": null } })).expect("nullable enum should accept null");
    parse("Quiz", json!({ "type": { "not": null } })).expect("not null should parse");
}

#[test]
fn enum_rejects_ordering_and_unknown_variants() {
    assert_eq!(
        kind_of("Chapter", json!({ "status": { "gt": "NOT_STARTED" } })),
        ErrorKind::OperatorNotSupported
    );
    assert_eq!(
        kind_of("Chapter", json!({ "status": "DONE" })),
        ErrorKind::InvalidValue
    );
}

#[test]
fn membership_lists_reject_null_elements() {
    assert_eq!(
        kind_of("Chapter", json!({ "order": { "in": [1, null] } })),
        ErrorKind::InvalidValue
    );
}

#[test]
fn json_bare_null_is_ambiguous() {
    assert_eq!(
        kind_of("Chapter", json!({ "content": null })),
        ErrorKind::AmbiguousNull
    );
    assert_eq!(
        kind_of("Chapter", json!({ "content": { "equals": null } })),
        ErrorKind::AmbiguousNull
    );
}

#[test]
fn json_markers_resolve_in_filters() {
    let filter = parse(
        "Chapter",
        json!({ "content": { "equals": marker_envelope("AnyNull") } }),
    )
    .expect("AnyNull filter should parse");
    let FilterNode::Field { filter, .. } = &filter.nodes[0] else {
        panic!("expected a field node");
    };

    assert_eq!(
        filter.conditions,
        vec![Condition::Compare {
            op: FilterOp::Equals,
            operand: Operand::Json(JsonMatch::Null(FilterNullMarker::AnyNull)),
        }]
    );
}

#[test]
fn scalar_list_uses_list_operators() {
    parse("Chapter", json!({ "objectives": { "has": "read", "isEmpty": false } }))
        .expect("list operators should parse");

    assert_eq!(
        kind_of("Chapter", json!({ "objectives": "read" })),
        ErrorKind::InvalidValue
    );
    assert_eq!(
        kind_of("Chapter", json!({ "objectives": { "contains": "read" } })),
        ErrorKind::OperatorNotSupported
    );
}

#[test]
fn to_many_some_with_empty_filter_is_existence() {
    let filter = parse("Chapter", json!({ "quizzes": { "some": {} } })).expect("some should parse");

    let FilterNode::Relation { relation, filters } = &filter.nodes[0] else {
        panic!("expected a relation node");
    };
    assert_eq!(*relation, "quizzes");
    assert!(matches!(&filters[0], RelationFilter::Some(inner) if inner.is_empty()));
}

#[test]
fn to_one_keywords_are_rejected_on_to_many() {
    assert_eq!(
        kind_of("Chapter", json!({ "quizzes": { "is": {} } })),
        ErrorKind::OperatorNotSupported
    );
    assert_eq!(
        kind_of("Chapter", json!({ "course": { "some": {} } })),
        ErrorKind::OperatorNotSupported
    );
}

#[test]
fn is_null_requires_optional_relation() {
    assert_eq!(
        kind_of("Chapter", json!({ "course": { "is": null } })),
        ErrorKind::CardinalityViolation
    );
    assert_eq!(
        kind_of("Chapter", json!({ "course": null })),
        ErrorKind::CardinalityViolation
    );

    let filter = parse("Conversation", json!({ "course": { "isNot": null } }))
        .expect("optional relation should accept isNot null");
    let FilterNode::Relation { filters, .. } = &filter.nodes[0] else {
        panic!("expected a relation node");
    };
    assert_eq!(filters, &vec![RelationFilter::IsNot(None)]);
}

#[test]
fn to_one_shorthand_filters_the_related_entity() {
    let filter = parse("Chapter", json!({ "course": { "title": "Rust" } }))
        .expect("to-one shorthand should parse");

    assert_eq!(
        filter.to_document(),
        json!({ "course": { "is": { "title": { "equals": "Rust" } } } })
    );

    let err = parse("Chapter", json!({ "course": { "is": { "order": 1 } } }))
        .expect_err("Course has no order field");
    assert_eq!(err.kind(), ErrorKind::UnknownField);
    assert_eq!(err.path(), Some("course.is.order"));
}

#[test]
fn not_accepts_object_or_array() {
    let single = parse("Chapter", json!({ "NOT": { "order": 1 } })).expect("object NOT should parse");
    let list = parse("Chapter", json!({ "NOT": [{ "order": 1 }] })).expect("array NOT should parse");

    assert_eq!(single, list);
}

#[test]
fn combinator_errors_carry_index() {
    let err = parse("Chapter", json!({ "OR": [{ "order": 1 }, { "bogus": 1 }] }))
        .expect_err("unknown field in OR should fail");

    assert_eq!(err.path(), Some("OR[1].bogus"));
}

#[test]
fn nesting_beyond_max_depth_is_rejected() {
    let mut doc = json!({ "title": "x" });
    for _ in 0..40 {
        doc = json!({ "NOT": doc });
    }

    assert_eq!(kind_of("Chapter", doc), ErrorKind::LimitExceeded);
}

#[test]
fn list_operands_respect_max_list_len() {
    let config = Config {
        max_list_len: 2,
        ..Config::default()
    };
    let err = parse_with(&config, "Chapter", &json!({ "order": { "in": [1, 2, 3] } }))
        .expect_err("long in-list should fail");

    assert_eq!(err.kind(), ErrorKind::LimitExceeded);
}

#[test]
fn datetime_ranges_parse() {
    let filter = parse(
        "QuizAttempt",
        json!({ "startedAt": { "gte": "2024-01-01T00:00:00Z" }, "score": { "gt": 0.5 } }),
    )
    .expect("range filters should parse");

    assert_eq!(filter.nodes.len(), 2);
    let score = filter
        .nodes
        .iter()
        .find_map(|node| match node {
            FilterNode::Field { field, filter } if field.name == "score" => Some(filter),
            _ => None,
        })
        .expect("score node should be present");
    assert_eq!(
        score.conditions[0],
        Condition::Compare {
            op: FilterOp::Gt,
            operand: Operand::Value(Value::Float(0.5)),
        }
    );
}

///
/// PROPERTIES
///

fn arb_text() -> impl Strategy<Value = String> {
    "[a-z0-9]{0,6}"
}

type Entry = (String, JsonValue);

fn entry(field: &str, doc: JsonValue) -> Entry {
    (field.to_string(), doc)
}

fn keyed(key: &str, value: JsonValue) -> JsonValue {
    JsonValue::Object(std::iter::once((key.to_string(), value)).collect())
}

// a relation operand: scalar entries of the related entity only
fn leaf(entries: BoxedStrategy<Entry>) -> impl Strategy<Value = JsonValue> {
    prop::collection::vec(entries, 0..3)
        .prop_map(|entries| JsonValue::Object(entries.into_iter().collect()))
}

fn arb_datetime() -> impl Strategy<Value = String> {
    (1u32..=12, 1u32..=28, 0u32..24, prop::sample::select(vec!["Z", "+02:00", "-05:30"]))
        .prop_map(|(month, day, hour, offset)| format!("2024-{month:02}-{day:02}T{hour:02}:15:00{offset}"))
}

fn arb_nullable(field: &'static str) -> impl Strategy<Value = Entry> {
    prop::sample::select(vec![
        JsonValue::Null,
        json!({ "equals": null }),
        json!({ "not": null }),
    ])
    .prop_map(move |doc| entry(field, doc))
}

fn arb_to_one(relation: &'static str, target: BoxedStrategy<Entry>) -> impl Strategy<Value = Entry> {
    prop_oneof![
        leaf(target.clone()).prop_map(move |f| entry(relation, f)),
        (prop::sample::select(vec!["is", "isNot"]), leaf(target))
            .prop_map(move |(keyword, f)| entry(relation, keyed(keyword, f))),
    ]
}

fn arb_to_many(relation: &'static str, target: BoxedStrategy<Entry>) -> impl Strategy<Value = Entry> {
    (prop::sample::select(vec!["every", "some", "none"]), leaf(target))
        .prop_map(move |(keyword, f)| entry(relation, keyed(keyword, f)))
}

fn chapter_scalars() -> BoxedStrategy<Entry> {
    prop_oneof![
        arb_text().prop_map(|s| entry("courseId", json!(s))),
        (arb_text(), any::<bool>()).prop_map(|(s, ci)| {
            let doc = if ci {
                json!({ "contains": s, "mode": "insensitive" })
            } else {
                json!({ "startsWith": s })
            };
            entry("title", doc)
        }),
        any::<i64>().prop_map(|n| entry("order", json!(n))),
        (any::<i64>(), any::<i64>()).prop_map(|(a, b)| entry("order", json!({ "gt": a, "lte": b }))),
        prop::collection::vec(any::<i32>(), 0..4)
            .prop_map(|v| entry("order", json!({ "notIn": v }))),
        prop::sample::select(vec!["NOT_STARTED", "IN_PROGRESS", "FINISHED"])
            .prop_map(|v| entry("status", json!({ "not": v }))),
        arb_text().prop_map(|s| entry("objectives", json!({ "has": s }))),
        any::<bool>().prop_map(|b| entry("objectives", json!({ "isEmpty": b }))),
        prop::sample::select(vec!["DbNull", "JsonNull", "AnyNull"])
            .prop_map(|m| entry("content", json!({ "equals": marker_envelope(m) }))),
        prop::sample::select(vec!["DbNull", "JsonNull", "AnyNull"])
            .prop_map(|m| entry("content", json!({ "not": marker_envelope(m) }))),
        arb_text()
            .prop_map(|s| entry("content", json!({ "path": ["a", "b"], "string_contains": s }))),
    ]
    .boxed()
}

fn course_scalars() -> BoxedStrategy<Entry> {
    prop_oneof![
        arb_text().prop_map(|s| entry("title", json!({ "startsWith": s, "mode": "insensitive" }))),
        arb_text().prop_map(|s| entry("description", json!(s))),
        arb_nullable("description"),
    ]
    .boxed()
}

fn user_scalars() -> BoxedStrategy<Entry> {
    prop_oneof![
        arb_text().prop_map(|s| entry("name", json!({ "endsWith": s }))),
        arb_nullable("name"),
        arb_datetime().prop_map(|t| entry("lastSignInAt", json!({ "gt": t }))),
        arb_nullable("lastSignInAt"),
    ]
    .boxed()
}

fn attempt_scalars() -> BoxedStrategy<Entry> {
    prop_oneof![
        (-100.0f64..100.0).prop_map(|f| entry("score", json!(f))),
        (-100.0f64..100.0, -100.0f64..100.0)
            .prop_map(|(a, b)| entry("score", json!({ "gte": a, "not": { "gt": b } }))),
        arb_nullable("score"),
        arb_datetime().prop_map(|t| entry("startedAt", json!({ "gte": t }))),
        prop::collection::vec(arb_datetime(), 0..3)
            .prop_map(|v| entry("startedAt", json!({ "in": v }))),
        arb_datetime().prop_map(|t| entry("completedAt", json!({ "lt": t }))),
        arb_nullable("completedAt"),
        prop::sample::select(vec!["IN_PROGRESS", "COMPLETED", "ABANDONED"])
            .prop_map(|v| entry("status", json!(v))),
    ]
    .boxed()
}

fn message_scalars() -> BoxedStrategy<Entry> {
    prop_oneof![
        any::<bool>().prop_map(|b| entry("isUserMessage", json!(b))),
        any::<bool>().prop_map(|b| entry("isUserMessage", json!({ "equals": b }))),
        any::<bool>().prop_map(|b| entry("isUserMessage", json!({ "not": b }))),
        arb_text().prop_map(|s| entry("conversationId", json!(s))),
    ]
    .boxed()
}

fn conversation_scalars() -> BoxedStrategy<Entry> {
    prop_oneof![
        arb_text().prop_map(|s| entry("title", json!({ "contains": s }))),
        arb_nullable("title"),
        arb_nullable("courseId"),
    ]
    .boxed()
}

fn chapter_entries() -> BoxedStrategy<Entry> {
    prop_oneof![chapter_scalars(), arb_to_one("course", course_scalars())].boxed()
}

fn course_entries() -> BoxedStrategy<Entry> {
    prop_oneof![course_scalars(), arb_to_many("chapters", chapter_scalars())].boxed()
}

fn user_entries() -> BoxedStrategy<Entry> {
    prop_oneof![user_scalars(), arb_to_many("quizAttempts", attempt_scalars())].boxed()
}

fn attempt_entries() -> BoxedStrategy<Entry> {
    prop_oneof![attempt_scalars(), arb_to_one("user", user_scalars())].boxed()
}

fn message_entries() -> BoxedStrategy<Entry> {
    prop_oneof![message_scalars(), arb_to_one("conversation", conversation_scalars())].boxed()
}

fn conversation_entries() -> BoxedStrategy<Entry> {
    prop_oneof![
        conversation_scalars(),
        arb_to_one("course", course_scalars()),
        // optional link: absence and presence tests
        prop::sample::select(vec![
            JsonValue::Null,
            json!({ "is": null }),
            json!({ "isNot": null }),
        ])
        .prop_map(|doc| entry("course", doc)),
        arb_to_many("messages", message_scalars()),
    ]
    .boxed()
}

fn arb_filter(entries: BoxedStrategy<Entry>) -> impl Strategy<Value = JsonValue> {
    let leaf = prop::collection::vec(entries, 0..4)
        .prop_map(|entries| JsonValue::Object(entries.into_iter().collect()));

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(|v| json!({ "AND": v })),
            prop::collection::vec(inner.clone(), 1..3).prop_map(|v| json!({ "OR": v })),
            inner.prop_map(|f| json!({ "NOT": f })),
        ]
    })
}

fn arb_entity_filter() -> impl Strategy<Value = (&'static str, JsonValue)> {
    prop_oneof![
        arb_filter(chapter_entries()).prop_map(|doc| ("Chapter", doc)),
        arb_filter(course_entries()).prop_map(|doc| ("Course", doc)),
        arb_filter(user_entries()).prop_map(|doc| ("User", doc)),
        arb_filter(attempt_entries()).prop_map(|doc| ("QuizAttempt", doc)),
        arb_filter(message_entries()).prop_map(|doc| ("Message", doc)),
        arb_filter(conversation_entries()).prop_map(|doc| ("Conversation", doc)),
    ]
}

proptest! {
    #[test]
    fn rendered_filters_reparse_to_the_same_tree((entity, doc) in arb_entity_filter()) {
        let first = parse(entity, doc).expect("generated filter should parse");
        let rendered = first.to_document();
        let second = parse(entity, rendered.clone()).expect("rendered filter should parse");

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(second.to_document(), rendered);
    }
}
