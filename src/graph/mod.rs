//! Vertex-centric property graph core
//!
//! This module implements the vertex model:
//! - Vertices owning an incidence index of edges and properties
//! - Directed, labeled edges indexed under both endpoints (self-loops allowed)
//! - Schema-typed properties with cardinality
//! - Direction and label filtered vertex queries
//! - An in-memory transactional scope tracking modified vertices

pub mod incidence;
pub mod property;
pub mod query;
pub mod relation;
pub mod transaction;
pub mod types;
pub mod vertex;

// Re-export main types
pub use incidence::{Incidence, IncidenceIndex, TypeFilter};
pub use property::PropertyValue;
pub use query::VertexQuery;
pub use relation::{Edge, Relation, VertexProperty};
pub use transaction::GraphTransaction;
pub use types::{Direction, RelationId, VertexId};
pub use vertex::{Vertex, VertexMut};
