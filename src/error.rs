use thiserror::Error;

/// Result type for OpenAPI operations
pub type OpenApiResult<T> = Result<T, OpenApiError>;

/// Errors that can occur while compiling schemas or assembling a document.
///
/// Every variant aborts the compilation of the current top-level schema;
/// recoverable conditions (unsupported node kinds, unannotated suspended
/// schemas) degrade to the permissive empty fragment instead and only emit a
/// warning.
#[derive(Debug, Error)]
pub enum OpenApiError {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Index signature with a non-string key type
    #[error("cannot encode `{key_kind}` index signature key to an OpenAPI schema, only string keys are supported")]
    UnsupportedIndexSignature { key_kind: &'static str },

    /// Enum with mixed or unsupported value types
    #[error("enum values must be either all strings or all numbers")]
    MixedEnumValues,

    /// Enum without any values
    #[error("cannot compile an empty enum")]
    EmptyEnum,

    /// Union without any members
    #[error("cannot compile an empty union")]
    EmptyUnion,

    /// Custom declaration without an explicit schema annotation
    #[error("cannot encode a custom declaration to an OpenAPI schema, annotate it with an explicit schema fragment")]
    MissingDeclarationSchema,

    /// Generic schema compilation error
    #[error("schema compilation error: {0}")]
    Schema(String),
}

impl OpenApiError {
    /// Create a generic schema compilation error
    pub fn schema_error<T: ToString>(msg: T) -> Self {
        Self::Schema(msg.to_string())
    }
}

/// Errors produced by the example generator.
///
/// Unlike the compiler, the generator never falls back silently: a schema it
/// cannot produce a conforming value for is reported as one of these, and the
/// caller decides whether to skip the field or fail outright.
#[derive(Debug, Error)]
pub enum ExampleError {
    /// Node kind with no value-level representation
    #[error("cannot generate an example for `{0}` schemas")]
    UnsupportedKind(&'static str),

    /// Refinement whose constraint cannot be satisfied by construction
    #[error("cannot generate an example for `{0}` refinements, annotate the schema with explicit examples")]
    UnsupportedRefinement(&'static str),

    /// Custom declaration without examples or a recognized identity
    #[error("cannot generate an example for a custom declaration, annotate it with explicit examples")]
    UnresolvedDeclaration,

    /// Index signature with a non-string key type
    #[error("cannot generate an example for `{0}` index signature keys, only string keys are supported")]
    UnsupportedIndexSignature(&'static str),

    /// Uniform choice over an empty candidate set
    #[error("cannot choose an example from an empty set")]
    EmptyChoice,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_offending_kind() {
        let err = OpenApiError::UnsupportedIndexSignature { key_kind: "number" };
        assert!(err.to_string().contains("number"));

        let err = ExampleError::UnsupportedKind("never");
        assert!(err.to_string().contains("never"));
    }
}
