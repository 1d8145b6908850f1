use crate::error::ErrorKind;
use serde_json::Value as JsonValue;
use thiserror::Error as ThisError;

///
/// ValidateError
///
/// Structured rejection of a client request.
/// Nested failures are wrapped in `Context` carrying the dotted input path.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValidateError {
    #[error("unknown entity '{entity}'")]
    UnknownEntity { entity: String },

    #[error("unknown field '{field}' on '{entity}'")]
    UnknownField { entity: &'static str, field: String },

    #[error("unknown argument '{argument}' for {action}")]
    UnknownArgument {
        action: &'static str,
        argument: String,
    },

    #[error("unknown nested operation '{operation}' on relation '{entity}.{relation}'")]
    UnknownNestedOperation {
        entity: &'static str,
        relation: &'static str,
        operation: String,
    },

    #[error("missing argument '{argument}' for {action}")]
    MissingArgument {
        action: &'static str,
        argument: &'static str,
    },

    #[error("operator '{operator}' is not supported on '{entity}.{field}' ({kind})")]
    OperatorNotSupported {
        entity: &'static str,
        field: &'static str,
        operator: String,
        kind: String,
    },

    #[error("relation '{entity}.{relation}': {reason}")]
    CardinalityViolation {
        entity: &'static str,
        relation: &'static str,
        reason: String,
    },

    #[error(
        "required relation '{entity}.{relation}' needs one of create, connect, or connectOrCreate"
    )]
    RequiredRelationMissing {
        entity: &'static str,
        relation: &'static str,
    },

    #[error("malformed unique selector for '{entity}': {reason}")]
    MalformedCompoundKey { entity: &'static str, reason: String },

    #[error("ambiguous null for '{entity}.{field}': {reason}")]
    AmbiguousNull {
        entity: &'static str,
        field: &'static str,
        reason: &'static str,
    },

    #[error("invalid value for '{entity}.{field}': expected {expected}, found {found}")]
    InvalidValue {
        entity: &'static str,
        field: &'static str,
        expected: String,
        found: String,
    },

    #[error("invalid shape: expected {expected}, found {found}")]
    InvalidShape {
        expected: &'static str,
        found: String,
    },

    #[error("'{entity}.{field}' must be listed in 'by' to be used in {usage}")]
    NotGrouped {
        entity: &'static str,
        field: String,
        usage: &'static str,
    },

    #[error("missing required field '{entity}.{field}'")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("nesting depth exceeds limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error("list of {len} items exceeds limit of {limit}")]
    ListTooLong { len: usize, limit: usize },

    #[error("validation failed at {path}: {source}")]
    Context {
        path: String,
        #[source]
        source: Box<Self>,
    },
}

impl ValidateError {
    pub(crate) fn invalid_value(
        entity: &'static str,
        field: &'static str,
        expected: impl Into<String>,
        found: &JsonValue,
    ) -> Self {
        Self::InvalidValue {
            entity,
            field,
            expected: expected.into(),
            found: json_kind(found).to_string(),
        }
    }

    pub(crate) fn invalid_shape(expected: &'static str, found: &JsonValue) -> Self {
        Self::InvalidShape {
            expected,
            found: json_kind(found).to_string(),
        }
    }

    pub(crate) fn unknown_field(entity: &'static str, field: impl Into<String>) -> Self {
        Self::UnknownField {
            entity,
            field: field.into(),
        }
    }

    pub(crate) fn cardinality(
        entity: &'static str,
        relation: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::CardinalityViolation {
            entity,
            relation,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_key(entity: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedCompoundKey {
            entity,
            reason: reason.into(),
        }
    }

    /// Classify the innermost failure.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownEntity { .. }
            | Self::UnknownField { .. }
            | Self::UnknownArgument { .. }
            | Self::UnknownNestedOperation { .. } => ErrorKind::UnknownField,
            Self::OperatorNotSupported { .. } => ErrorKind::OperatorNotSupported,
            Self::CardinalityViolation { .. } | Self::RequiredRelationMissing { .. } => {
                ErrorKind::CardinalityViolation
            }
            Self::MalformedCompoundKey { .. } => ErrorKind::MalformedCompoundKey,
            Self::AmbiguousNull { .. } => ErrorKind::AmbiguousNull,
            Self::InvalidValue { .. } | Self::InvalidShape { .. } | Self::NotGrouped { .. } => {
                ErrorKind::InvalidValue
            }
            Self::MissingField { .. } | Self::MissingArgument { .. } => ErrorKind::MissingField,
            Self::DepthExceeded { .. } | Self::ListTooLong { .. } => ErrorKind::LimitExceeded,
            Self::Context { source, .. } => source.kind(),
        }
    }

    /// Prepend a field segment to the error path.
    #[must_use]
    pub fn with_field(self, field: impl AsRef<str>) -> Self {
        self.with_path_segment(field.as_ref())
    }

    /// Prepend an index segment to the error path.
    #[must_use]
    pub fn with_index(self, index: usize) -> Self {
        self.with_path_segment(format!("[{index}]"))
    }

    /// Return the full contextual path, if available.
    #[must_use]
    pub const fn path(&self) -> Option<&str> {
        match self {
            Self::Context { path, .. } => Some(path.as_str()),
            _ => None,
        }
    }

    /// Return the innermost, non-context variant.
    #[must_use]
    pub fn leaf(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.leaf(),
            _ => self,
        }
    }

    fn with_path_segment(self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        match self {
            Self::Context { path, source } => Self::Context {
                path: Self::join_segments(segment.as_str(), path.as_str()),
                source,
            },
            source => Self::Context {
                path: segment,
                source: Box::new(source),
            },
        }
    }

    fn join_segments(prefix: &str, suffix: &str) -> String {
        if suffix.starts_with('[') {
            format!("{prefix}{suffix}")
        } else {
            format!("{prefix}.{suffix}")
        }
    }
}

/// Short label for the JSON type of an input value.
#[must_use]
pub const fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
