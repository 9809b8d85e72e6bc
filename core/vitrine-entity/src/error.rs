//! Error types for rule compilation and projection.

use thiserror::Error;

/// Result type for rule compilation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for projection.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Errors raised while compiling rule declarations.
///
/// Every variant is a programmer error in the declarations and is raised
/// before any record is projected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A declaration was neither a boolean, a computation, nor an option bag.
    #[error("unknown options type for property `{field}`")]
    UnknownOptionsType { field: String },

    /// The `if` option was present but is not a predicate.
    #[error("if must be a function (property `{field}`)")]
    IfNotCallable { field: String },

    /// The `using` option was present but is not a compiled entity.
    #[error("using must be an Entity (property `{field}`)")]
    UsingNotEntity { field: String },

    /// A recognized option carried a value of the wrong JSON type.
    #[error("option `{option}` for property `{field}` must be {expected}")]
    InvalidOption {
        field: String,
        option: &'static str,
        expected: &'static str,
    },
}

/// Errors raised while projecting a record.
///
/// A projection error aborts the whole `represent` call; the partially
/// built output is dropped.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// A merging rule produced an array but the output slot holds a non-array.
    #[error("attempting to merge array with non-array for property `{field}`")]
    MergeArrayWithNonArray { field: String },

    /// A weak `using` link outlived the entity it pointed to.
    #[error("entity referenced by property `{field}` has been dropped")]
    DanglingEntity { field: String },

    /// Converting a typed value to or from JSON failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A user-supplied predicate or computation failed. Carried unmodified.
    #[error(transparent)]
    Callback(#[from] anyhow::Error),
}
