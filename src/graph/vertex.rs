//! Vertex entity
//!
//! A vertex owns an incidence index, a vertex label and a modification flag.
//! Records live inside a [`GraphTransaction`]; callers work through two
//! handles:
//! - [`Vertex`]: shared view for reads and queries
//! - [`VertexMut`]: exclusive view for adding edges and properties
//!
//! Sequences returned here are lazy and may be requested again at any time.
//! Their order is unspecified.

use super::incidence::IncidenceIndex;
use super::property::PropertyValue;
use super::query::VertexQuery;
use super::relation::{Edge, Relation, VertexProperty};
use super::transaction::GraphTransaction;
use super::types::{Direction, VertexId};
use crate::error::GraphResult;
use crate::schema::{EdgeLabel, PropertyKey, VertexLabel};
use indexmap::IndexSet;
use std::sync::Arc;

/// Storage form of a vertex inside a transaction
#[derive(Debug, Clone)]
pub(crate) struct VertexRecord {
    pub id: VertexId,
    pub label: Arc<VertexLabel>,
    pub incidence: IncidenceIndex,
    /// Set by the first successful mutation, cleared at scope teardown
    pub modified: bool,
}

impl VertexRecord {
    pub fn new(id: VertexId, label: Arc<VertexLabel>) -> Self {
        Self {
            id,
            label,
            incidence: IncidenceIndex::new(),
            modified: false,
        }
    }
}

/// Read view of a vertex
#[derive(Debug, Clone, Copy)]
pub struct Vertex<'tx> {
    tx: &'tx GraphTransaction,
    record: &'tx VertexRecord,
}

impl<'tx> Vertex<'tx> {
    pub(crate) fn new(tx: &'tx GraphTransaction, record: &'tx VertexRecord) -> Self {
        Self { tx, record }
    }

    pub fn id(&self) -> VertexId {
        self.record.id
    }

    /// Name of the vertex label
    pub fn label(&self) -> &'tx str {
        &self.record.label.name
    }

    pub fn vertex_label(&self) -> &'tx Arc<VertexLabel> {
        &self.record.label
    }

    pub fn is_modified(&self) -> bool {
        self.record.modified
    }

    /// Number of incident edges; a loop counts twice
    pub fn edge_count(&self) -> usize {
        self.record.incidence.edge_count()
    }

    pub fn property_count(&self) -> usize {
        self.record.incidence.property_count()
    }

    pub fn is_connected(&self) -> bool {
        self.record.incidence.has_edges()
    }

    /// Start a query over this vertex's relations
    pub fn query(&self) -> VertexQuery {
        VertexQuery::new(self.record.id)
    }

    pub fn get_properties(&self) -> impl Iterator<Item = &'tx VertexProperty> + 'tx {
        self.query().properties(self.tx)
    }

    pub fn get_properties_by_key(
        &self,
        key: &PropertyKey,
    ) -> impl Iterator<Item = &'tx VertexProperty> + 'tx {
        self.query().property_keys([key]).properties(self.tx)
    }

    /// Properties under a named key; an unknown name yields nothing
    pub fn get_properties_named(&self, key: &str) -> impl Iterator<Item = &'tx VertexProperty> + 'tx {
        self.query().keys([key]).properties(self.tx)
    }

    /// Edges in `direction` carrying any of `labels`; no labels means all
    ///
    /// Unknown label names match nothing.
    pub fn get_edges(&self, direction: Direction, labels: &[&str]) -> impl Iterator<Item = &'tx Edge> + 'tx {
        self.query()
            .direction(direction)
            .labels(labels)
            .edges(self.tx)
    }

    pub fn get_edges_by_label(
        &self,
        direction: Direction,
        labels: &[&EdgeLabel],
    ) -> impl Iterator<Item = &'tx Edge> + 'tx {
        self.query()
            .direction(direction)
            .edge_labels(labels.iter().copied())
            .edges(self.tx)
    }

    pub fn get_all_edges(&self) -> impl Iterator<Item = &'tx Edge> + 'tx {
        self.query().edges(self.tx)
    }

    /// Every incident edge and property
    pub fn get_relations(&self) -> impl Iterator<Item = &'tx Relation> + 'tx {
        self.query().relations(self.tx)
    }

    /// Adjacent vertices over edges in `direction` carrying any of `labels`
    pub fn get_vertices(&self, direction: Direction, labels: &[&str]) -> impl Iterator<Item = VertexId> + 'tx {
        self.query()
            .direction(direction)
            .labels(labels)
            .vertices(self.tx)
    }

    /// Names of the keys this vertex has properties for, in first-seen order
    pub fn property_keys(&self) -> IndexSet<String> {
        self.get_properties().map(|p| p.key().to_string()).collect()
    }

    /// First value stored under `key`
    pub fn value(&self, key: &str) -> Option<&'tx PropertyValue> {
        self.get_properties_named(key).next().map(|p| p.value())
    }
}

/// Mutable view of a vertex
#[derive(Debug)]
pub struct VertexMut<'tx> {
    tx: &'tx mut GraphTransaction,
    id: VertexId,
}

impl<'tx> VertexMut<'tx> {
    pub(crate) fn new(tx: &'tx mut GraphTransaction, id: VertexId) -> Self {
        Self { tx, id }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn as_vertex(&self) -> Vertex<'_> {
        self.tx.view(self.id)
    }

    pub fn is_modified(&self) -> bool {
        self.as_vertex().is_modified()
    }

    pub fn label(&self) -> &str {
        self.as_vertex().label()
    }

    /// Add an edge from this vertex to `target`, resolving the label by name
    pub fn add_edge(&mut self, label: &str, target: VertexId) -> GraphResult<Edge> {
        self.tx.add_edge(self.id, label, target)
    }

    pub fn add_edge_with_label(&mut self, label: &EdgeLabel, target: VertexId) -> GraphResult<Edge> {
        self.tx.add_edge_with_label(self.id, label, target)
    }

    /// Add a property, resolving the key by name
    pub fn add_property(&mut self, key: &str, value: impl Into<PropertyValue>) -> GraphResult<VertexProperty> {
        self.tx.add_property(self.id, key, value)
    }

    pub fn add_property_with_key(
        &mut self,
        key: &PropertyKey,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<VertexProperty> {
        self.tx.add_property_with_key(self.id, key, value)
    }

    /// Shorthand for [`VertexMut::add_property`]
    pub fn property(&mut self, key: &str, value: impl Into<PropertyValue>) -> GraphResult<VertexProperty> {
        self.add_property(key, value)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GraphConfig;
    use crate::graph::{Direction, GraphTransaction};
    use crate::schema::SchemaRegistry;
    use std::sync::Arc;

    fn open() -> GraphTransaction {
        GraphTransaction::new(Arc::new(SchemaRegistry::new()), GraphConfig::default()).unwrap()
    }

    #[test]
    fn test_fresh_vertex() {
        let mut tx = open();
        let v = tx.add_vertex();
        let vertex = tx.vertex(v).unwrap();
        assert_eq!(vertex.id(), v);
        assert_eq!(vertex.edge_count(), 0);
        assert_eq!(vertex.property_count(), 0);
        assert!(!vertex.is_connected());
        assert!(vertex.property_keys().is_empty());
        assert_eq!(vertex.get_relations().count(), 0);
    }

    #[test]
    fn test_handle_mutations_visible_through_view() {
        let mut tx = open();
        let v = tx.add_vertex();
        let w = tx.add_vertex();
        {
            let mut handle = tx.vertex_mut(v).unwrap();
            assert_eq!(handle.id(), v);
            assert!(!handle.is_modified());
            let edge = handle.add_edge("knows", w).unwrap();
            assert!(edge.starts_from(v));
            assert_eq!(handle.as_vertex().edge_count(), 1);
            handle.property("name", "v").unwrap();
            assert!(handle.is_modified());
        }
        let vertex = tx.vertex(v).unwrap();
        assert_eq!(vertex.value("name").unwrap().as_string(), Some("v"));
        assert_eq!(vertex.get_vertices(Direction::Out, &[]).collect::<Vec<_>>(), vec![w]);
        assert_eq!(vertex.get_vertices(Direction::In, &[]).count(), 0);
    }

    #[test]
    fn test_typed_edge_label() {
        let mut tx = open();
        let knows = tx.registry().define_edge_label("knows").unwrap();
        let v = tx.add_vertex();
        let w = tx.add_vertex();
        tx.vertex_mut(v).unwrap().add_edge_with_label(&knows, w).unwrap();

        let vertex = tx.vertex(w).unwrap();
        assert_eq!(vertex.get_edges_by_label(Direction::In, &[&*knows]).count(), 1);
        assert_eq!(vertex.get_edges(Direction::In, &["knows"]).count(), 1);
    }

    #[test]
    fn test_missing_vertex_has_no_handle() {
        let mut tx = open();
        assert!(tx.vertex(crate::graph::VertexId::new(9)).is_none());
        assert!(tx.vertex_mut(crate::graph::VertexId::new(9)).is_none());
    }
}
