//! Core identifier and direction types for the vertex model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a vertex, assigned by the owning transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct VertexId(pub u64);

impl VertexId {
    pub fn new(id: u64) -> Self {
        VertexId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VertexId({})", self.0)
    }
}

impl From<u64> for VertexId {
    fn from(id: u64) -> Self {
        VertexId(id)
    }
}

/// Identity of a relation (edge or property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct RelationId(pub u64);

impl RelationId {
    pub fn new(id: u64) -> Self {
        RelationId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RelationId({})", self.0)
    }
}

impl From<u64> for RelationId {
    fn from(id: u64) -> Self {
        RelationId(id)
    }
}

/// Direction of an edge relative to one of its endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Direction {
    /// The vertex is the edge's out-vertex
    Out,
    /// The vertex is the edge's in-vertex
    In,
    /// Either endpoint
    #[default]
    Both,
}

impl Direction {
    /// Whether an incidence in `side` (Out or In) satisfies this direction
    pub fn admits(&self, side: Direction) -> bool {
        match self {
            Direction::Both => true,
            d => *d == side,
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Out => Direction::In,
            Direction::In => Direction::Out,
            Direction::Both => Direction::Both,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Out => write!(f, "OUT"),
            Direction::In => write!(f, "IN"),
            Direction::Both => write!(f, "BOTH"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id() {
        let id = VertexId::new(42);
        assert_eq!(id.as_u64(), 42);
        assert_eq!(format!("{}", id), "VertexId(42)");

        let id2: VertexId = 100.into();
        assert_eq!(id2.as_u64(), 100);
    }

    #[test]
    fn test_relation_id() {
        let id = RelationId::new(99);
        assert_eq!(id.as_u64(), 99);
        assert_eq!(format!("{}", id), "RelationId(99)");
    }

    #[test]
    fn test_direction_admits() {
        assert!(Direction::Both.admits(Direction::Out));
        assert!(Direction::Both.admits(Direction::In));
        assert!(Direction::Out.admits(Direction::Out));
        assert!(!Direction::Out.admits(Direction::In));
        assert!(!Direction::In.admits(Direction::Out));
    }

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::Out.opposite(), Direction::In);
        assert_eq!(Direction::In.opposite(), Direction::Out);
        assert_eq!(Direction::Both.opposite(), Direction::Both);
        assert_eq!(format!("{}", Direction::Out), "OUT");
    }

    #[test]
    fn test_id_ordering() {
        assert!(VertexId::new(1) < VertexId::new(2));
    }
}
