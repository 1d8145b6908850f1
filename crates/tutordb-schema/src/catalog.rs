//! Static catalog for the course-tutoring data model.
//!
//! Relation targets are entity names, resolved by the registry on first use.

use crate::{
    node::{EntityModel, EnumModel, FieldModel, RelationModel, UniqueModel},
    types::{Cardinality, DefaultKind, ScalarKind},
};

///
/// ENUMS
///

pub static LLM_PROVIDER: EnumModel = EnumModel::new(
    "LLMProvider",
    &["OPENAI", "ANTHROPIC", "GOOGLE", "MISTRAL", "OLLAMA"],
);

pub static CHAPTER_STATUS: EnumModel =
    EnumModel::new("ChapterStatus", &["NOT_STARTED", "IN_PROGRESS", "FINISHED"]);

pub static QUIZ_TYPE: EnumModel = EnumModel::new("QuizType", &["PRACTICE", "ASSESSMENT", "REVIEW"]);

pub static QUESTION_TYPE: EnumModel = EnumModel::new(
    "QuestionType",
    &["MULTIPLE_CHOICE", "TRUE_FALSE", "SHORT_ANSWER"],
);

pub static QUIZ_ATTEMPT_STATUS: EnumModel = EnumModel::new(
    "QuizAttemptStatus",
    &["IN_PROGRESS", "COMPLETED", "ABANDONED"],
);

// shared column shapes
const fn id() -> FieldModel {
    FieldModel::new("id", ScalarKind::String).with_default(DefaultKind::Cuid)
}

const fn created_at() -> FieldModel {
    FieldModel::new("createdAt", ScalarKind::DateTime).with_default(DefaultKind::Now)
}

const fn updated_at() -> FieldModel {
    FieldModel::new("updatedAt", ScalarKind::DateTime).with_default(DefaultKind::UpdatedAt)
}

const ID_UNIQUE: UniqueModel = UniqueModel::single(&["id"]);

///
/// ENTITIES
///

pub static USER: EntityModel = EntityModel {
    name: "User",
    primary_key: &["id"],
    fields: &[
        id(),
        FieldModel::new("email", ScalarKind::String),
        FieldModel::new("name", ScalarKind::String).nullable(),
        FieldModel::new("image", ScalarKind::String).nullable(),
        created_at(),
        updated_at(),
        FieldModel::new("lastSignInAt", ScalarKind::DateTime).nullable(),
    ],
    relations: &[
        RelationModel::back("courses", "Course", Cardinality::Many, "creator"),
        RelationModel::back("quizAttempts", "QuizAttempt", Cardinality::Many, "user"),
        RelationModel::back("conversations", "Conversation", Cardinality::Many, "user"),
    ],
    uniques: &[ID_UNIQUE, UniqueModel::single(&["email"])],
};

pub static CONVERSATION: EntityModel = EntityModel {
    name: "Conversation",
    primary_key: &["id"],
    fields: &[
        id(),
        FieldModel::new("title", ScalarKind::String).nullable(),
        FieldModel::new("userId", ScalarKind::String).nullable(),
        FieldModel::new("courseId", ScalarKind::String).nullable(),
        FieldModel::new("llModelId", ScalarKind::String).nullable(),
        created_at(),
        updated_at(),
    ],
    relations: &[
        RelationModel::owning(
            "user",
            "User",
            Cardinality::Opt,
            "conversations",
            &["userId"],
            &["id"],
        ),
        RelationModel::owning(
            "course",
            "Course",
            Cardinality::Opt,
            "conversation",
            &["courseId"],
            &["id"],
        ),
        RelationModel::owning(
            "llModel",
            "LLModel",
            Cardinality::Opt,
            "conversations",
            &["llModelId"],
            &["id"],
        ),
        RelationModel::back("messages", "Message", Cardinality::Many, "conversation"),
    ],
    uniques: &[ID_UNIQUE, UniqueModel::single(&["courseId"])],
};

pub static LL_MODEL: EntityModel = EntityModel {
    name: "LLModel",
    primary_key: &["id"],
    fields: &[
        id(),
        FieldModel::new("provider", ScalarKind::Enum(&LLM_PROVIDER)),
        FieldModel::new("name", ScalarKind::String),
        FieldModel::new("displayName", ScalarKind::String).nullable(),
        FieldModel::new("contextWindow", ScalarKind::Int).nullable(),
        created_at(),
    ],
    relations: &[RelationModel::back(
        "conversations",
        "Conversation",
        Cardinality::Many,
        "llModel",
    )],
    uniques: &[ID_UNIQUE, UniqueModel::single(&["name"])],
};

pub static MESSAGE: EntityModel = EntityModel {
    name: "Message",
    primary_key: &["id"],
    fields: &[
        id(),
        FieldModel::new("conversationId", ScalarKind::String),
        FieldModel::new("isUserMessage", ScalarKind::Boolean),
        FieldModel::new("content", ScalarKind::Json),
        created_at(),
    ],
    relations: &[RelationModel::owning(
        "conversation",
        "Conversation",
        Cardinality::One,
        "messages",
        &["conversationId"],
        &["id"],
    )],
    uniques: &[ID_UNIQUE],
};

pub static COURSE: EntityModel = EntityModel {
    name: "Course",
    primary_key: &["id"],
    fields: &[
        id(),
        FieldModel::new("title", ScalarKind::String),
        FieldModel::new("description", ScalarKind::String).nullable(),
        FieldModel::new("creatorId", ScalarKind::String),
        created_at(),
        updated_at(),
    ],
    relations: &[
        RelationModel::owning(
            "creator",
            "User",
            Cardinality::One,
            "courses",
            &["creatorId"],
            &["id"],
        ),
        RelationModel::back("conversation", "Conversation", Cardinality::Opt, "course"),
        RelationModel::back("chapters", "Chapter", Cardinality::Many, "course"),
    ],
    uniques: &[ID_UNIQUE],
};

pub static CHAPTER: EntityModel = EntityModel {
    name: "Chapter",
    primary_key: &["id"],
    fields: &[
        id(),
        FieldModel::new("courseId", ScalarKind::String),
        FieldModel::new("order", ScalarKind::Int),
        FieldModel::new("title", ScalarKind::String),
        FieldModel::new("status", ScalarKind::Enum(&CHAPTER_STATUS))
            .with_default(DefaultKind::Literal("NOT_STARTED")),
        FieldModel::new("objectives", ScalarKind::String).list(),
        FieldModel::new("content", ScalarKind::Json).nullable(),
        created_at(),
        updated_at(),
    ],
    relations: &[
        RelationModel::owning(
            "course",
            "Course",
            Cardinality::One,
            "chapters",
            &["courseId"],
            &["id"],
        ),
        RelationModel::back("quizzes", "Quiz", Cardinality::Many, "chapter"),
    ],
    uniques: &[
        ID_UNIQUE,
        UniqueModel::compound("courseId_order", &["courseId", "order"]),
    ],
};

pub static QUIZ: EntityModel = EntityModel {
    name: "Quiz",
    primary_key: &["id"],
    fields: &[
        id(),
        FieldModel::new("chapterId", ScalarKind::String),
        FieldModel::new("title", ScalarKind::String),
        FieldModel::new("type", ScalarKind::Enum(&QUIZ_TYPE)).nullable(),
        created_at(),
        updated_at(),
    ],
    relations: &[
        RelationModel::owning(
            "chapter",
            "Chapter",
            Cardinality::One,
            "quizzes",
            &["chapterId"],
            &["id"],
        ),
        RelationModel::back("questions", "Question", Cardinality::Many, "quiz"),
        RelationModel::back("attempts", "QuizAttempt", Cardinality::Many, "quiz"),
    ],
    uniques: &[ID_UNIQUE],
};

pub static QUESTION: EntityModel = EntityModel {
    name: "Question",
    primary_key: &["id"],
    fields: &[
        id(),
        FieldModel::new("quizId", ScalarKind::String),
        FieldModel::new("order", ScalarKind::Int),
        FieldModel::new("type", ScalarKind::Enum(&QUESTION_TYPE)),
        FieldModel::new("text", ScalarKind::String),
        FieldModel::new("options", ScalarKind::Json).nullable(),
        FieldModel::new("explanation", ScalarKind::String).nullable(),
        created_at(),
    ],
    relations: &[
        RelationModel::owning(
            "quiz",
            "Quiz",
            Cardinality::One,
            "questions",
            &["quizId"],
            &["id"],
        ),
        RelationModel::back(
            "responses",
            "UserQuizResponse",
            Cardinality::Many,
            "question",
        ),
    ],
    uniques: &[
        ID_UNIQUE,
        UniqueModel::compound("quizId_order", &["quizId", "order"]),
    ],
};

pub static QUIZ_ATTEMPT: EntityModel = EntityModel {
    name: "QuizAttempt",
    primary_key: &["id"],
    fields: &[
        id(),
        FieldModel::new("userId", ScalarKind::String),
        FieldModel::new("quizId", ScalarKind::String),
        FieldModel::new("score", ScalarKind::Float).nullable(),
        FieldModel::new("status", ScalarKind::Enum(&QUIZ_ATTEMPT_STATUS))
            .with_default(DefaultKind::Literal("IN_PROGRESS")),
        FieldModel::new("startedAt", ScalarKind::DateTime).with_default(DefaultKind::Now),
        FieldModel::new("completedAt", ScalarKind::DateTime).nullable(),
    ],
    relations: &[
        RelationModel::owning(
            "user",
            "User",
            Cardinality::One,
            "quizAttempts",
            &["userId"],
            &["id"],
        ),
        RelationModel::owning(
            "quiz",
            "Quiz",
            Cardinality::One,
            "attempts",
            &["quizId"],
            &["id"],
        ),
        RelationModel::back(
            "responses",
            "UserQuizResponse",
            Cardinality::Many,
            "quizAttempt",
        ),
    ],
    uniques: &[ID_UNIQUE],
};

pub static USER_QUIZ_RESPONSE: EntityModel = EntityModel {
    name: "UserQuizResponse",
    primary_key: &["id"],
    fields: &[
        id(),
        FieldModel::new("quizAttemptId", ScalarKind::String),
        FieldModel::new("questionId", ScalarKind::String),
        FieldModel::new("answer", ScalarKind::Json),
        FieldModel::new("isCorrect", ScalarKind::Boolean).nullable(),
        created_at(),
    ],
    relations: &[
        RelationModel::owning(
            "quizAttempt",
            "QuizAttempt",
            Cardinality::One,
            "responses",
            &["quizAttemptId"],
            &["id"],
        ),
        RelationModel::owning(
            "question",
            "Question",
            Cardinality::One,
            "responses",
            &["questionId"],
            &["id"],
        ),
    ],
    uniques: &[
        ID_UNIQUE,
        UniqueModel::compound("quizAttemptId_questionId", &["quizAttemptId", "questionId"]),
    ],
};

/// Every entity in declaration order.
pub static ENTITIES: &[&EntityModel] = &[
    &USER,
    &CONVERSATION,
    &LL_MODEL,
    &MESSAGE,
    &COURSE,
    &CHAPTER,
    &QUIZ,
    &QUESTION,
    &QUIZ_ATTEMPT,
    &USER_QUIZ_RESPONSE,
];
