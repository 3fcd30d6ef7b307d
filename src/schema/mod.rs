//! Schema layer
//!
//! Descriptors for property keys, edge labels and vertex labels, and the
//! registry that resolves names to them.

pub mod registry;
pub mod types;

pub use registry::{SchemaElement, SchemaRegistry, SchemaSnapshot, SchemaType, DEFAULT_VERTEX_LABEL};
pub use types::{
    Cardinality, DataType, EdgeLabel, PropertyKey, SchemaId, SchemaKind, SchemaPolicy, VertexLabel,
};
