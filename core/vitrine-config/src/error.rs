//! Error types for loading definitions.

use thiserror::Error;
use vitrine_entity::{ConfigError, ProjectionError};

/// Result type for registry operations.
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Errors that can occur while loading definitions or projecting by name.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The document is not valid JSON, or an entity definition is malformed.
    #[error("invalid definitions document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document root is not an object of entity definitions.
    #[error("definitions document must be an object keyed by entity name")]
    NotAnObject,

    /// A rule declaration failed to compile.
    #[error("entity `{entity}`: {source}")]
    Config {
        entity: String,
        #[source]
        source: ConfigError,
    },

    /// `compute` does not name a registered computation.
    #[error("entity `{entity}`: property `{field}` computes with unknown computation {name}")]
    UnknownComputation {
        entity: String,
        field: String,
        name: String,
    },

    /// `extends` does not name a known entity.
    #[error("entity `{entity}` extends unknown entity `{parent}`")]
    UnknownParent { entity: String, parent: String },

    /// An entity with this name is already registered.
    #[error("entity `{0}` is already registered")]
    Duplicate(String),

    /// A predicate with this name is already registered.
    #[error("predicate `{0}` is already registered")]
    DuplicatePredicate(String),

    /// A computation with this name is already registered.
    #[error("computation `{0}` is already registered")]
    DuplicateComputation(String),

    /// The name is reserved for self-reference and cannot name an entity.
    #[error("`{0}` is reserved for self-reference and cannot name an entity")]
    ReservedName(String),

    /// No entity is registered under this name.
    #[error("no entity named `{0}`")]
    UnknownEntity(String),

    /// Projection through a named entity failed.
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}
