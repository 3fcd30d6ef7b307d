//! Relations: edges and vertex properties
//!
//! A relation is either an [`Edge`] between two vertices or a
//! [`VertexProperty`] attached to one vertex. Endpoints are held as ids,
//! never as owning references.

use super::property::PropertyValue;
use super::types::{Direction, RelationId, VertexId};
use crate::schema::{EdgeLabel, PropertyKey, SchemaId};
use std::sync::Arc;

/// A directed edge typed by an edge label
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: RelationId,

    /// Edge label descriptor
    pub label: Arc<EdgeLabel>,

    /// Vertex the edge points away from
    pub out_vertex: VertexId,

    /// Vertex the edge points to
    pub in_vertex: VertexId,
}

impl Edge {
    pub fn new(
        id: RelationId,
        label: Arc<EdgeLabel>,
        out_vertex: VertexId,
        in_vertex: VertexId,
    ) -> Self {
        Edge {
            id,
            label,
            out_vertex,
            in_vertex,
        }
    }

    pub fn label(&self) -> &str {
        &self.label.name
    }

    /// Whether out and in vertex coincide
    pub fn is_loop(&self) -> bool {
        self.out_vertex == self.in_vertex
    }

    /// Endpoint on the given side
    ///
    /// `Both` is not a side; it yields the out-vertex.
    pub fn vertex(&self, side: Direction) -> VertexId {
        match side {
            Direction::In => self.in_vertex,
            Direction::Out | Direction::Both => self.out_vertex,
        }
    }

    /// The endpoint opposite to `vertex`; for loops this is `vertex` itself
    pub fn other_vertex(&self, vertex: VertexId) -> Option<VertexId> {
        if self.out_vertex == vertex {
            Some(self.in_vertex)
        } else if self.in_vertex == vertex {
            Some(self.out_vertex)
        } else {
            None
        }
    }

    /// Check if this edge goes FROM a specific vertex
    pub fn starts_from(&self, vertex: VertexId) -> bool {
        self.out_vertex == vertex
    }

    /// Check if this edge goes TO a specific vertex
    pub fn ends_at(&self, vertex: VertexId) -> bool {
        self.in_vertex == vertex
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A key-value attribute of one vertex
#[derive(Debug, Clone)]
pub struct VertexProperty {
    pub id: RelationId,

    /// Property key descriptor
    pub key: Arc<PropertyKey>,

    /// Owning vertex
    pub vertex: VertexId,

    pub value: PropertyValue,
}

impl VertexProperty {
    pub fn new(
        id: RelationId,
        key: Arc<PropertyKey>,
        vertex: VertexId,
        value: PropertyValue,
    ) -> Self {
        VertexProperty {
            id,
            key,
            vertex,
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key.name
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }
}

impl PartialEq for VertexProperty {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for VertexProperty {}

/// Either kind of relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    Edge(Edge),
    Property(VertexProperty),
}

impl Relation {
    pub fn id(&self) -> RelationId {
        match self {
            Relation::Edge(e) => e.id,
            Relation::Property(p) => p.id,
        }
    }

    /// Id of the edge label or property key
    pub fn type_id(&self) -> SchemaId {
        match self {
            Relation::Edge(e) => e.label.id,
            Relation::Property(p) => p.key.id,
        }
    }

    /// Name of the edge label or property key
    pub fn type_name(&self) -> &str {
        match self {
            Relation::Edge(e) => e.label(),
            Relation::Property(p) => p.key(),
        }
    }

    pub fn is_edge(&self) -> bool {
        matches!(self, Relation::Edge(_))
    }

    pub fn is_property(&self) -> bool {
        matches!(self, Relation::Property(_))
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            Relation::Edge(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&VertexProperty> {
        match self {
            Relation::Property(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_incident_on(&self, vertex: VertexId) -> bool {
        match self {
            Relation::Edge(e) => e.out_vertex == vertex || e.in_vertex == vertex,
            Relation::Property(p) => p.vertex == vertex,
        }
    }

    /// Vertices whose incidence index holds this relation
    pub fn endpoints(&self) -> Vec<VertexId> {
        match self {
            Relation::Edge(e) if e.is_loop() => vec![e.out_vertex],
            Relation::Edge(e) => vec![e.out_vertex, e.in_vertex],
            Relation::Property(p) => vec![p.vertex],
        }
    }
}
