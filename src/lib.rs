//! Vertexgraph
//!
//! The vertex layer of a property graph: vertices that own their incident
//! edges and properties, schema-governed mutation, and direction- and
//! label-filtered access to a vertex's neighbourhood.
//!
//! # Architecture
//!
//! - [`schema`]: interned descriptors for property keys, edge labels and
//!   vertex labels, with optional automatic creation on first use
//! - [`graph`]: relations, the per-vertex incidence index, vertex handles,
//!   vertex queries and the in-memory transactional scope that owns them
//! - [`config`]: settings such as the auto-schema toggle, loadable from YAML
//!   or JSON
//!
//! ## Example Usage
//!
//! ```rust
//! use vertexgraph::{Direction, GraphConfig, GraphTransaction, SchemaRegistry};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(SchemaRegistry::new());
//! let mut tx = GraphTransaction::new(registry, GraphConfig::default()).unwrap();
//!
//! let alice = tx.add_vertex_with_label("person").unwrap();
//! let bob = tx.add_vertex_with_label("person").unwrap();
//!
//! {
//!     let mut v = tx.vertex_mut(alice).unwrap();
//!     v.property("name", "Alice").unwrap();
//!     v.add_edge("knows", bob).unwrap();
//! }
//!
//! let alice = tx.vertex(alice).unwrap();
//! assert_eq!(alice.edge_count(), 1);
//! assert_eq!(alice.get_vertices(Direction::Out, &["knows"]).collect::<Vec<_>>(), vec![bob]);
//! assert!(alice.is_modified());
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod graph;
pub mod schema;

// Re-export main types for convenience
pub use config::GraphConfig;
pub use error::{GraphError, GraphResult};
pub use graph::{
    Direction, Edge, GraphTransaction, PropertyValue, Relation, RelationId, Vertex, VertexId,
    VertexMut, VertexProperty, VertexQuery,
};
pub use schema::{
    Cardinality, DataType, EdgeLabel, PropertyKey, SchemaKind, SchemaPolicy, SchemaRegistry,
    VertexLabel,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
