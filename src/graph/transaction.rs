//! In-memory transactional scope
//!
//! Owns the vertices and relations created within it and a shared handle to
//! the schema registry. Vertex and relation ids index into arenas (slot 0 is
//! never used). Relations are referenced from the incidence index of every
//! endpoint; the arena holds the relation itself.
//!
//! `commit` and `rollback` end the current scope: both clear every
//! modification flag, and rollback restores the state of the last commit.

use super::incidence::{Incidence, IncidenceIndex, TypeFilter};
use super::property::PropertyValue;
use super::relation::{Edge, Relation, VertexProperty};
use super::types::{Direction, RelationId, VertexId};
use super::vertex::{Vertex, VertexMut, VertexRecord};
use crate::config::GraphConfig;
use crate::error::{GraphError, GraphResult};
use crate::schema::{
    Cardinality, EdgeLabel, PropertyKey, SchemaKind, SchemaPolicy, SchemaRegistry, VertexLabel,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct Arena {
    vertices: Vec<Option<VertexRecord>>,
    relations: Vec<Option<Relation>>,
    vertex_count: usize,
    relation_count: usize,
}

impl Arena {
    fn new() -> Self {
        Self {
            vertices: vec![None],
            relations: vec![None],
            vertex_count: 0,
            relation_count: 0,
        }
    }
}

/// A single-writer graph scope
#[derive(Debug)]
pub struct GraphTransaction {
    registry: Arc<SchemaRegistry>,
    config: GraphConfig,
    policy: SchemaPolicy,
    default_label: Arc<VertexLabel>,
    arena: Arena,
    /// State as of the last commit
    checkpoint: Option<Arena>,
}

impl GraphTransaction {
    /// Open a scope over `registry`
    ///
    /// The configured default vertex label is created if missing, regardless
    /// of the auto-schema setting.
    pub fn new(registry: Arc<SchemaRegistry>, config: GraphConfig) -> GraphResult<Self> {
        let policy = config.schema_policy();
        let default_label = registry.vertex_label(
            &config.default_vertex_label,
            &SchemaPolicy {
                auto_create: true,
                ..policy
            },
        )?;
        Ok(Self {
            registry,
            config,
            policy,
            default_label,
            arena: Arena::new(),
            checkpoint: None,
        })
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn registry_handle(&self) -> Arc<SchemaRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Create a vertex with the default label
    pub fn add_vertex(&mut self) -> VertexId {
        let label = Arc::clone(&self.default_label);
        self.insert_vertex(label)
    }

    /// Create a vertex with the named label
    pub fn add_vertex_with_label(&mut self, label: &str) -> GraphResult<VertexId> {
        let label = self.registry.vertex_label(label, &self.policy)?;
        Ok(self.insert_vertex(label))
    }

    fn insert_vertex(&mut self, label: Arc<VertexLabel>) -> VertexId {
        let id = VertexId::new(self.arena.vertices.len() as u64);
        debug!(vertex = %id, label = %label.name, "created vertex");
        self.arena.vertices.push(Some(VertexRecord::new(id, label)));
        self.arena.vertex_count += 1;
        id
    }

    fn record(&self, id: VertexId) -> Option<&VertexRecord> {
        self.arena
            .vertices
            .get(id.as_u64() as usize)
            .and_then(Option::as_ref)
    }

    /// Record of a vertex already known to exist
    fn record_mut(&mut self, id: VertexId) -> &mut VertexRecord {
        match self
            .arena
            .vertices
            .get_mut(id.as_u64() as usize)
            .and_then(Option::as_mut)
        {
            Some(record) => record,
            None => panic!("invariant violation: vertex {} vanished during mutation", id),
        }
    }

    fn require_vertex(&self, id: VertexId) -> GraphResult<()> {
        if self.contains_vertex(id) {
            Ok(())
        } else {
            Err(GraphError::VertexNotFound(id))
        }
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.record(id).is_some()
    }

    pub fn vertex(&self, id: VertexId) -> Option<Vertex<'_>> {
        self.record(id).map(|record| Vertex::new(self, record))
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> Option<VertexMut<'_>> {
        if self.contains_vertex(id) {
            Some(VertexMut::new(self, id))
        } else {
            None
        }
    }

    /// Read view of a vertex already known to exist
    pub(crate) fn view(&self, id: VertexId) -> Vertex<'_> {
        match self.vertex(id) {
            Some(vertex) => vertex,
            None => panic!("invariant violation: handle to missing vertex {}", id),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.arena.vertex_count
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.arena.vertices.iter().flatten().map(|r| r.id)
    }

    /// Vertices mutated in the current scope
    pub fn modified_vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.arena
            .vertices
            .iter()
            .flatten()
            .filter(|r| r.modified)
            .map(|r| r.id)
    }

    pub fn relation_count(&self) -> usize {
        self.arena.relation_count
    }

    pub fn relation(&self, id: RelationId) -> Option<&Relation> {
        self.arena
            .relations
            .get(id.as_u64() as usize)
            .and_then(Option::as_ref)
    }

    pub fn edge(&self, id: RelationId) -> Option<&Edge> {
        self.relation(id).and_then(Relation::as_edge)
    }

    pub fn property(&self, id: RelationId) -> Option<&VertexProperty> {
        self.relation(id).and_then(Relation::as_property)
    }

    pub(crate) fn incidence(&self, id: VertexId) -> Option<&IncidenceIndex> {
        self.record(id).map(|r| &r.incidence)
    }

    /// Relation behind an index entry of `vertex`
    ///
    /// Panics when the entry does not point at a live relation incident on
    /// `vertex`: the index and the arena disagree.
    pub(crate) fn incident_relation(&self, vertex: VertexId, entry: Incidence) -> &Relation {
        match self.relation(entry.relation) {
            Some(relation) if relation.is_incident_on(vertex) => relation,
            _ => panic!(
                "invariant violation: index of vertex {} references foreign relation {}",
                vertex, entry.relation
            ),
        }
    }

    /// Add an edge `out -> in_vertex`, resolving the label by name
    pub fn add_edge(&mut self, out: VertexId, label: &str, in_vertex: VertexId) -> GraphResult<Edge> {
        self.require_vertex(out)?;
        self.require_vertex(in_vertex)?;
        let label = self.registry.edge_label(label, &self.policy)?;
        Ok(self.insert_edge(out, label, in_vertex))
    }

    /// Add an edge with a label descriptor obtained from this scope's registry
    pub fn add_edge_with_label(
        &mut self,
        out: VertexId,
        label: &EdgeLabel,
        in_vertex: VertexId,
    ) -> GraphResult<Edge> {
        self.require_vertex(out)?;
        self.require_vertex(in_vertex)?;
        let label = match self.registry.edge_label_by_id(label.id) {
            Some(registered) if registered.name == label.name => registered,
            _ => {
                return Err(GraphError::UnknownType {
                    kind: SchemaKind::EdgeLabel,
                    name: label.name.clone(),
                })
            }
        };
        Ok(self.insert_edge(out, label, in_vertex))
    }

    fn insert_edge(&mut self, out: VertexId, label: Arc<EdgeLabel>, in_vertex: VertexId) -> Edge {
        let id = RelationId::new(self.arena.relations.len() as u64);
        let edge = Edge::new(id, label, out, in_vertex);
        let entry = Incidence {
            relation: id,
            type_id: edge.label.id,
            self_loop: edge.is_loop(),
        };

        let source = self.record_mut(out);
        source.incidence.insert_edge(Direction::Out, entry);
        source.modified = true;
        let target = self.record_mut(in_vertex);
        target.incidence.insert_edge(Direction::In, entry);
        target.modified = true;

        self.arena.relations.push(Some(Relation::Edge(edge.clone())));
        self.arena.relation_count += 1;
        debug!(edge = %id, label = edge.label(), out = %out, in_vertex = %in_vertex, "added edge");
        edge
    }

    /// Add a property to `vertex`, resolving the key by name
    pub fn add_property(
        &mut self,
        vertex: VertexId,
        key: &str,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<VertexProperty> {
        self.require_vertex(vertex)?;
        let key = self.registry.property_key(key, &self.policy)?;
        self.insert_property(vertex, key, value.into())
    }

    /// Add a property with a key descriptor obtained from this scope's registry
    pub fn add_property_with_key(
        &mut self,
        vertex: VertexId,
        key: &PropertyKey,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<VertexProperty> {
        self.require_vertex(vertex)?;
        let key = match self.registry.property_key_by_id(key.id) {
            Some(registered) if registered.name == key.name => registered,
            _ => {
                return Err(GraphError::UnknownType {
                    kind: SchemaKind::PropertyKey,
                    name: key.name.clone(),
                })
            }
        };
        self.insert_property(vertex, key, value.into())
    }

    fn insert_property(
        &mut self,
        vertex: VertexId,
        key: Arc<PropertyKey>,
        value: PropertyValue,
    ) -> GraphResult<VertexProperty> {
        if !key.data_type.accepts(&value) {
            warn!(vertex = %vertex, key = %key.name, expected = %key.data_type, found = value.type_name(), "rejected property value");
            return Err(GraphError::SchemaMismatch {
                key: key.name.clone(),
                expected: key.data_type,
                found: value.type_name(),
            });
        }
        let value = key.data_type.coerce(value);

        let existing: Vec<RelationId> = self
            .incidence(vertex)
            .map(|index| {
                index
                    .properties(TypeFilter::Only(vec![key.id]))
                    .map(|e| e.relation)
                    .collect()
            })
            .unwrap_or_default();

        match key.cardinality {
            Cardinality::Single => {
                for id in existing {
                    self.detach(id);
                }
            }
            Cardinality::Set => {
                let duplicate = existing
                    .iter()
                    .filter_map(|id| self.property(*id))
                    .find(|p| p.value == value);
                if let Some(found) = duplicate {
                    return Ok(found.clone());
                }
            }
            Cardinality::List => {}
        }

        let id = RelationId::new(self.arena.relations.len() as u64);
        let property = VertexProperty::new(id, key, vertex, value);
        let record = self.record_mut(vertex);
        record.incidence.insert_property(Incidence {
            relation: id,
            type_id: property.key.id,
            self_loop: false,
        });
        record.modified = true;

        self.arena
            .relations
            .push(Some(Relation::Property(property.clone())));
        self.arena.relation_count += 1;
        debug!(property = %id, key = property.key(), vertex = %vertex, "added property");
        Ok(property)
    }

    /// Remove a relation from the arena and from every endpoint's index
    pub fn remove_relation(&mut self, id: RelationId) -> GraphResult<Relation> {
        self.detach(id).ok_or(GraphError::RelationNotFound(id))
    }

    fn detach(&mut self, id: RelationId) -> Option<Relation> {
        let relation = self
            .arena
            .relations
            .get_mut(id.as_u64() as usize)
            .and_then(Option::take)?;
        self.arena.relation_count -= 1;

        for endpoint in relation.endpoints() {
            let record = self.record_mut(endpoint);
            let removed = record.incidence.remove(id);
            assert!(
                removed > 0,
                "invariant violation: relation {} missing from index of vertex {}",
                id,
                endpoint
            );
            record.modified = true;
        }
        debug!(relation = %id, kind = relation.type_name(), "removed relation");
        Some(relation)
    }

    fn clear_flags(arena: &mut Arena) -> usize {
        let mut cleared = 0;
        for record in arena.vertices.iter_mut().flatten() {
            if record.modified {
                record.modified = false;
                cleared += 1;
            }
        }
        cleared
    }

    /// Close the scope keeping its changes; returns how many vertices were modified
    pub fn commit(&mut self) -> usize {
        let modified = Self::clear_flags(&mut self.arena);
        self.checkpoint = Some(self.arena.clone());
        info!(modified, vertices = self.arena.vertex_count, relations = self.arena.relation_count, "committed scope");
        modified
    }

    /// Close the scope discarding changes since the last commit
    ///
    /// Ids handed out in the discarded scope stay retired: the restored
    /// arenas keep empty slots up to the previous high-water mark.
    pub fn rollback(&mut self) -> usize {
        let modified = self.modified_vertices().count();
        let vertex_slots = self.arena.vertices.len();
        let relation_slots = self.arena.relations.len();
        self.arena = self.checkpoint.clone().unwrap_or_else(Arena::new);
        self.arena.vertices.resize_with(vertex_slots, || None);
        self.arena.relations.resize_with(relation_slots, || None);
        Self::clear_flags(&mut self.arena);
        info!(modified, "rolled back scope");
        modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DataType;

    fn open(config: GraphConfig) -> GraphTransaction {
        GraphTransaction::new(Arc::new(SchemaRegistry::new()), config).unwrap()
    }

    #[test]
    fn test_add_vertex_defaults() {
        let mut tx = open(GraphConfig::default());
        let v = tx.add_vertex();
        let vertex = tx.vertex(v).unwrap();
        assert_eq!(vertex.label(), "vertex");
        assert!(!vertex.is_modified());
        assert!(!vertex.is_connected());
        assert_eq!(tx.vertex_count(), 1);
        assert!(tx.vertex(VertexId::new(0)).is_none());
    }

    #[test]
    fn test_custom_default_label_created_even_when_strict() {
        let config = GraphConfig {
            default_vertex_label: "thing".to_string(),
            ..GraphConfig::strict()
        };
        let mut tx = open(config);
        let v = tx.add_vertex();
        assert_eq!(tx.vertex(v).unwrap().label(), "thing");
        assert!(tx.add_vertex_with_label("person").is_err());
    }

    #[test]
    fn test_add_edge_updates_both_indexes() {
        let mut tx = open(GraphConfig::default());
        let a = tx.add_vertex();
        let b = tx.add_vertex();
        let edge = tx.add_edge(a, "knows", b).unwrap();

        assert_eq!(tx.edge(edge.id).unwrap().out_vertex, a);
        assert!(tx.incidence(a).unwrap().contains(edge.id));
        assert!(tx.incidence(b).unwrap().contains(edge.id));
        assert_eq!(tx.relation_count(), 1);
        assert_eq!(tx.modified_vertices().count(), 2);
    }

    #[test]
    fn test_add_edge_to_missing_vertex() {
        let mut tx = open(GraphConfig::default());
        let a = tx.add_vertex();
        let missing = VertexId::new(42);
        assert_eq!(
            tx.add_edge(a, "knows", missing).unwrap_err(),
            GraphError::VertexNotFound(missing)
        );
        assert!(!tx.vertex(a).unwrap().is_modified());
        assert!(!tx.registry().contains("knows", SchemaKind::EdgeLabel));
    }

    #[test]
    fn test_foreign_descriptor_rejected() {
        let mut tx = open(GraphConfig::default());
        let a = tx.add_vertex();
        let other = SchemaRegistry::new();
        let foreign = other.define_edge_label("likes").unwrap();
        let err = tx.add_edge_with_label(a, &foreign, a).unwrap_err();
        assert!(matches!(err, GraphError::UnknownType { .. }));
    }

    #[test]
    fn test_single_cardinality_replaces() {
        let mut tx = open(GraphConfig::default());
        let v = tx.add_vertex();
        tx.add_property(v, "name", "a").unwrap();
        tx.add_property(v, "name", "b").unwrap();

        let vertex = tx.vertex(v).unwrap();
        assert_eq!(vertex.property_count(), 1);
        assert_eq!(vertex.value("name").unwrap().as_string(), Some("b"));
        assert_eq!(tx.relation_count(), 1);
    }

    #[test]
    fn test_list_and_set_cardinality() {
        let mut tx = open(GraphConfig::default());
        tx.registry()
            .define_property_key("tag", DataType::String, Cardinality::List)
            .unwrap();
        tx.registry()
            .define_property_key("alias", DataType::String, Cardinality::Set)
            .unwrap();
        let v = tx.add_vertex();

        tx.add_property(v, "tag", "x").unwrap();
        tx.add_property(v, "tag", "x").unwrap();
        let first = tx.add_property(v, "alias", "y").unwrap();
        tx.commit();
        let again = tx.add_property(v, "alias", "y").unwrap();

        assert_eq!(first.id, again.id);
        let vertex = tx.vertex(v).unwrap();
        assert!(!vertex.is_modified());
        assert_eq!(vertex.get_properties_named("tag").count(), 2);
        assert_eq!(vertex.get_properties_named("alias").count(), 1);
    }

    #[test]
    fn test_float_key_widens_integers() {
        let mut tx = open(GraphConfig::default());
        tx.registry()
            .define_property_key("weight", DataType::Float, Cardinality::Single)
            .unwrap();
        let v = tx.add_vertex();
        let p = tx.add_property(v, "weight", 3i64).unwrap();
        assert_eq!(p.value, PropertyValue::Float(3.0));
    }

    #[test]
    fn test_null_rejected() {
        let mut tx = open(GraphConfig::default());
        let v = tx.add_vertex();
        let err = tx.add_property(v, "x", PropertyValue::Null).unwrap_err();
        assert!(matches!(err, GraphError::SchemaMismatch { .. }));
        assert_eq!(tx.relation_count(), 0);
    }

    #[test]
    fn test_remove_relation() {
        let mut tx = open(GraphConfig::default());
        let v = tx.add_vertex();
        let edge = tx.add_edge(v, "self", v).unwrap();
        assert_eq!(tx.vertex(v).unwrap().edge_count(), 2);

        let removed = tx.remove_relation(edge.id).unwrap();
        assert!(removed.is_edge());
        assert_eq!(tx.vertex(v).unwrap().edge_count(), 0);
        assert_eq!(
            tx.remove_relation(edge.id).unwrap_err(),
            GraphError::RelationNotFound(edge.id)
        );
    }

    #[test]
    fn test_commit_and_rollback() {
        let mut tx = open(GraphConfig::default());
        let a = tx.add_vertex();
        let b = tx.add_vertex();
        tx.add_edge(a, "knows", b).unwrap();
        assert_eq!(tx.commit(), 2);
        assert!(!tx.vertex(a).unwrap().is_modified());

        tx.add_property(a, "name", "alice").unwrap();
        let c = tx.add_vertex();
        assert_eq!(tx.rollback(), 1);

        let vertex = tx.vertex(a).unwrap();
        assert!(!vertex.is_modified());
        assert_eq!(vertex.property_count(), 0);
        assert_eq!(vertex.edge_count(), 1);
        assert!(!tx.contains_vertex(c));
    }

    #[test]
    fn test_rollback_retires_discarded_ids() {
        let mut tx = open(GraphConfig::default());
        let a = tx.add_vertex();
        let b = tx.add_vertex();
        tx.commit();

        let stale_edge = tx.add_edge(a, "knows", b).unwrap();
        let stale_vertex = tx.add_vertex();
        tx.rollback();

        let edge = tx.add_edge(b, "likes", a).unwrap();
        let vertex = tx.add_vertex();
        assert_ne!(edge.id, stale_edge.id);
        assert_ne!(vertex, stale_vertex);

        assert!(tx.edge(stale_edge.id).is_none());
        assert!(!tx.contains_vertex(stale_vertex));
        assert_eq!(
            tx.remove_relation(stale_edge.id).unwrap_err(),
            GraphError::RelationNotFound(stale_edge.id)
        );
        assert_eq!(tx.vertex(a).unwrap().edge_count(), 1);
        assert_eq!(tx.relation_count(), 1);
    }

    #[test]
    fn test_rollback_without_commit_clears_scope() {
        let mut tx = open(GraphConfig::default());
        tx.add_vertex();
        tx.rollback();
        assert_eq!(tx.vertex_count(), 0);
        assert_eq!(tx.vertex_ids().count(), 0);
    }
}
