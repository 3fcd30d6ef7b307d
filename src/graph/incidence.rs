//! Per-vertex incidence index
//!
//! Holds one entry per incidence of a relation on the owning vertex:
//! outgoing edges, incoming edges and properties are kept apart so counts
//! are O(1) and direction filtering never touches the relation arena. A
//! loop edge has one outgoing and one incoming entry on the same vertex.
//!
//! Iterators borrow the index; mutation while one is alive is rejected at
//! compile time. Callers that need a stable view across mutations collect
//! first.

use super::types::{Direction, RelationId};
use crate::schema::SchemaId;

/// One incidence of a relation on the owning vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Incidence {
    pub relation: RelationId,
    /// Edge label or property key id
    pub type_id: SchemaId,
    /// Edge whose out and in vertex are both the owner
    pub self_loop: bool,
}

/// Restriction on edge label or property key ids
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeFilter {
    /// No restriction
    #[default]
    Any,
    /// Only these ids; an empty list matches nothing
    Only(Vec<SchemaId>),
}

impl TypeFilter {
    pub fn matches(&self, type_id: SchemaId) -> bool {
        match self {
            TypeFilter::Any => true,
            TypeFilter::Only(ids) => ids.contains(&type_id),
        }
    }

    /// Conjunction of two filters
    pub fn and(&self, other: &TypeFilter) -> TypeFilter {
        match (self, other) {
            (TypeFilter::Any, f) | (f, TypeFilter::Any) => f.clone(),
            (TypeFilter::Only(a), TypeFilter::Only(b)) => {
                TypeFilter::Only(a.iter().copied().filter(|id| b.contains(id)).collect())
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IncidenceIndex {
    outgoing: Vec<Incidence>,
    incoming: Vec<Incidence>,
    properties: Vec<Incidence>,
}

impl IncidenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edge incidence on `side` (Out or In)
    pub fn insert_edge(&mut self, side: Direction, entry: Incidence) {
        match side {
            Direction::Out => self.outgoing.push(entry),
            Direction::In => self.incoming.push(entry),
            Direction::Both => panic!(
                "invariant violation: edge {} indexed without a concrete side",
                entry.relation
            ),
        }
    }

    pub fn insert_property(&mut self, entry: Incidence) {
        assert!(
            !entry.self_loop,
            "invariant violation: property {} flagged as loop",
            entry.relation
        );
        self.properties.push(entry);
    }

    /// Drop every entry for `relation`, returning how many were removed
    pub fn remove(&mut self, relation: RelationId) -> usize {
        let before = self.outgoing.len() + self.incoming.len() + self.properties.len();
        self.outgoing.retain(|e| e.relation != relation);
        self.incoming.retain(|e| e.relation != relation);
        self.properties.retain(|e| e.relation != relation);
        before - (self.outgoing.len() + self.incoming.len() + self.properties.len())
    }

    pub fn contains(&self, relation: RelationId) -> bool {
        self.outgoing
            .iter()
            .chain(&self.incoming)
            .chain(&self.properties)
            .any(|e| e.relation == relation)
    }

    /// Incident edge entries; a loop counts once per side
    pub fn edge_count(&self) -> usize {
        self.outgoing.len() + self.incoming.len()
    }

    pub fn edge_count_in(&self, direction: Direction) -> usize {
        match direction {
            Direction::Out => self.outgoing.len(),
            Direction::In => self.incoming.len(),
            Direction::Both => self.edge_count(),
        }
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    pub fn has_edges(&self) -> bool {
        !self.outgoing.is_empty() || !self.incoming.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_edges() && self.properties.is_empty()
    }

    /// Edge entries matching `direction` and `types`, tagged with their side
    ///
    /// With `Both`, a loop edge is yielded once (from its outgoing entry).
    pub fn edges(
        &self,
        direction: Direction,
        types: TypeFilter,
    ) -> impl Iterator<Item = (Direction, Incidence)> + '_ {
        let out = direction
            .admits(Direction::Out)
            .then(|| self.outgoing.iter().map(|e| (Direction::Out, *e)));
        let inc = direction.admits(Direction::In).then(|| {
            self.incoming
                .iter()
                .filter(move |e| direction != Direction::Both || !e.self_loop)
                .map(|e| (Direction::In, *e))
        });
        out.into_iter()
            .flatten()
            .chain(inc.into_iter().flatten())
            .filter(move |(_, e)| types.matches(e.type_id))
    }

    /// Number of edge entries matching `direction` and `types`
    ///
    /// Unlike [`IncidenceIndex::edges`], loops count once per side.
    pub fn count_edges(&self, direction: Direction, types: &TypeFilter) -> usize {
        if *types == TypeFilter::Any {
            return self.edge_count_in(direction);
        }
        let side = |entries: &[Incidence]| entries.iter().filter(|e| types.matches(e.type_id)).count();
        let mut total = 0;
        if direction.admits(Direction::Out) {
            total += side(&self.outgoing);
        }
        if direction.admits(Direction::In) {
            total += side(&self.incoming);
        }
        total
    }

    pub fn properties(&self, keys: TypeFilter) -> impl Iterator<Item = Incidence> + '_ {
        self.properties
            .iter()
            .copied()
            .filter(move |e| keys.matches(e.type_id))
    }
}
