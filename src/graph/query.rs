//! Vertex-centric query filter
//!
//! A [`VertexQuery`] collects a direction, label and key constraints and an
//! optional limit. It owns only its configuration, so one query can be
//! evaluated any number of times, including after the vertex has been
//! mutated; every terminal call reads the current incidence index.
//!
//! Constraints compose conjunctively. Repeated `labels` (or `keys`) calls
//! intersect. Names that do not resolve in the registry match nothing.
//! Properties are treated as outgoing relations: a query restricted to
//! `Direction::In` yields no properties.

use super::relation::{Edge, Relation, VertexProperty};
use super::transaction::GraphTransaction;
use super::incidence::TypeFilter;
use super::types::{Direction, VertexId};
use crate::schema::{EdgeLabel, PropertyKey, SchemaId, SchemaRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
enum TypeRef {
    Name(String),
    /// A descriptor, valid only if the registry holds the same id under the same name
    Descriptor(SchemaId, String),
}

#[derive(Debug, Clone)]
pub struct VertexQuery {
    vertex: VertexId,
    direction: Direction,
    labels: Vec<Vec<TypeRef>>,
    keys: Vec<Vec<TypeRef>>,
    limit: Option<usize>,
}

fn resolve(groups: &[Vec<TypeRef>], lookup: impl Fn(&TypeRef) -> Option<SchemaId>) -> TypeFilter {
    groups.iter().fold(TypeFilter::Any, |acc, group| {
        let ids = group.iter().filter_map(&lookup).collect();
        acc.and(&TypeFilter::Only(ids))
    })
}

impl VertexQuery {
    /// Unconstrained query over `vertex`
    pub fn new(vertex: VertexId) -> Self {
        Self {
            vertex,
            direction: Direction::Both,
            labels: Vec::new(),
            keys: Vec::new(),
            limit: None,
        }
    }

    pub fn vertex(&self) -> VertexId {
        self.vertex
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Restrict edges to any of the named labels; an empty list adds nothing
    pub fn labels<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let group: Vec<TypeRef> = names
            .into_iter()
            .map(|n| TypeRef::Name(n.as_ref().to_string()))
            .collect();
        if !group.is_empty() {
            self.labels.push(group);
        }
        self
    }

    pub fn edge_labels<'a, I>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = &'a EdgeLabel>,
    {
        let group: Vec<TypeRef> = labels
            .into_iter()
            .map(|l| TypeRef::Descriptor(l.id, l.name.clone()))
            .collect();
        if !group.is_empty() {
            self.labels.push(group);
        }
        self
    }

    /// Restrict properties to any of the named keys; an empty list adds nothing
    pub fn keys<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let group: Vec<TypeRef> = names
            .into_iter()
            .map(|n| TypeRef::Name(n.as_ref().to_string()))
            .collect();
        if !group.is_empty() {
            self.keys.push(group);
        }
        self
    }

    pub fn property_keys<'a, I>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = &'a PropertyKey>,
    {
        let group: Vec<TypeRef> = keys
            .into_iter()
            .map(|k| TypeRef::Descriptor(k.id, k.name.clone()))
            .collect();
        if !group.is_empty() {
            self.keys.push(group);
        }
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn label_filter(&self, registry: &SchemaRegistry) -> TypeFilter {
        resolve(&self.labels, |t| match t {
            TypeRef::Name(name) => registry.get_edge_label(name).map(|l| l.id),
            TypeRef::Descriptor(id, name) => registry
                .edge_label_by_id(*id)
                .filter(|l| &l.name == name)
                .map(|l| l.id),
        })
    }

    fn key_filter(&self, registry: &SchemaRegistry) -> TypeFilter {
        resolve(&self.keys, |t| match t {
            TypeRef::Name(name) => registry.get_property_key(name).map(|k| k.id),
            TypeRef::Descriptor(id, name) => registry
                .property_key_by_id(*id)
                .filter(|k| &k.name == name)
                .map(|k| k.id),
        })
    }

    fn cap(&self) -> usize {
        self.limit.unwrap_or(usize::MAX)
    }

    fn edge_relations<'tx>(&self, tx: &'tx GraphTransaction) -> impl Iterator<Item = &'tx Relation> + 'tx {
        let vertex = self.vertex;
        let direction = self.direction;
        let filter = self.label_filter(tx.registry());
        tx.incidence(vertex)
            .into_iter()
            .flat_map(move |index| index.edges(direction, filter.clone()))
            .map(move |(_, entry)| tx.incident_relation(vertex, entry))
    }

    fn property_relations<'tx>(
        &self,
        tx: &'tx GraphTransaction,
    ) -> impl Iterator<Item = &'tx Relation> + 'tx {
        let vertex = self.vertex;
        let filter = self.key_filter(tx.registry());
        tx.incidence(vertex)
            .filter(|_| self.direction.admits(Direction::Out))
            .into_iter()
            .flat_map(move |index| index.properties(filter.clone()))
            .map(move |entry| tx.incident_relation(vertex, entry))
    }

    /// Matching edges
    pub fn edges<'tx>(&self, tx: &'tx GraphTransaction) -> impl Iterator<Item = &'tx Edge> + 'tx {
        self.edge_relations(tx)
            .filter_map(Relation::as_edge)
            .take(self.cap())
    }

    /// Matching properties
    pub fn properties<'tx>(
        &self,
        tx: &'tx GraphTransaction,
    ) -> impl Iterator<Item = &'tx VertexProperty> + 'tx {
        self.property_relations(tx)
            .filter_map(Relation::as_property)
            .take(self.cap())
    }

    /// Matching edges and properties
    ///
    /// A label constraint alone excludes properties; a key constraint alone
    /// excludes edges.
    pub fn relations<'tx>(&self, tx: &'tx GraphTransaction) -> impl Iterator<Item = &'tx Relation> + 'tx {
        let include_edges = !(self.labels.is_empty() && !self.keys.is_empty());
        let include_properties = !(self.keys.is_empty() && !self.labels.is_empty());
        let edges = include_edges.then(|| self.edge_relations(tx));
        let properties = include_properties.then(|| self.property_relations(tx));
        edges
            .into_iter()
            .flatten()
            .chain(properties.into_iter().flatten())
            .take(self.cap())
    }

    /// Vertices at the other end of matching edges
    ///
    /// A loop edge yields the queried vertex itself.
    pub fn vertices<'tx>(&self, tx: &'tx GraphTransaction) -> impl Iterator<Item = VertexId> + 'tx {
        let vertex = self.vertex;
        self.edges(tx).filter_map(move |e| e.other_vertex(vertex))
    }

    /// Number of relations [`VertexQuery::relations`] would yield
    pub fn count(&self, tx: &GraphTransaction) -> usize {
        self.relations(tx).count()
    }

    /// Degree under this query's direction and labels; loops count twice
    /// under `Direction::Both`
    pub fn edge_count(&self, tx: &GraphTransaction) -> usize {
        let filter = self.label_filter(tx.registry());
        tx.incidence(self.vertex)
            .map(|index| index.count_edges(self.direction, &filter))
            .unwrap_or(0)
            .min(self.cap())
    }

    pub fn property_count(&self, tx: &GraphTransaction) -> usize {
        self.properties(tx).count()
    }
}
