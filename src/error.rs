//! Error types for vertex and schema operations

use crate::graph::types::{RelationId, VertexId};
use crate::schema::{DataType, SchemaKind};
use thiserror::Error;

/// Errors returned by schema resolution and vertex mutation
///
/// A failed call leaves the transaction unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Name does not resolve and auto-creation is disabled
    #[error("Unknown {kind}: {name}")]
    UnknownType { kind: SchemaKind, name: String },

    /// Value type is incompatible with the key's declared data type
    #[error("Value of type {found} does not match data type {expected} of property key {key}")]
    SchemaMismatch {
        key: String,
        expected: DataType,
        found: &'static str,
    },

    /// Explicit definition of a name that already exists in its kind
    #[error("{kind} already exists: {name}")]
    TypeAlreadyExists { kind: SchemaKind, name: String },

    #[error("Vertex {0} not found")]
    VertexNotFound(VertexId),

    #[error("Relation {0} not found")]
    RelationNotFound(RelationId),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
