//! Schema descriptors: property keys, edge labels and vertex labels

use crate::graph::property::PropertyValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identity of a schema descriptor, unique within its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct SchemaId(pub u64);

impl SchemaId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaId({})", self.0)
    }
}

/// Kind tag distinguishing descriptor namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaKind {
    PropertyKey,
    EdgeLabel,
    VertexLabel,
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaKind::PropertyKey => write!(f, "property key"),
            SchemaKind::EdgeLabel => write!(f, "edge label"),
            SchemaKind::VertexLabel => write!(f, "vertex label"),
        }
    }
}

/// Declared value type of a property key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DataType {
    /// Accepts any non-null value
    #[default]
    Object,
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    Array,
    Map,
}

impl DataType {
    /// Check whether `value` may be stored under a key of this type
    ///
    /// Null is never accepted. Float keys also accept integers, which
    /// [`DataType::coerce`] widens on insertion.
    pub fn accepts(&self, value: &PropertyValue) -> bool {
        match (self, value) {
            (_, PropertyValue::Null) => false,
            (DataType::Object, _) => true,
            (DataType::String, PropertyValue::String(_)) => true,
            (DataType::Integer, PropertyValue::Integer(_)) => true,
            (DataType::Float, v) => v.is_numeric(),
            (DataType::Boolean, PropertyValue::Boolean(_)) => true,
            (DataType::DateTime, PropertyValue::DateTime(_)) => true,
            (DataType::Array, PropertyValue::Array(_)) => true,
            (DataType::Map, PropertyValue::Map(_)) => true,
            _ => false,
        }
    }

    /// Convert an accepted value into its stored representation
    pub fn coerce(&self, value: PropertyValue) -> PropertyValue {
        match (self, value) {
            (DataType::Float, PropertyValue::Integer(i)) => PropertyValue::Float(i as f64),
            (_, v) => v,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::Object => "Object",
            DataType::String => "String",
            DataType::Integer => "Integer",
            DataType::Float => "Float",
            DataType::Boolean => "Boolean",
            DataType::DateTime => "DateTime",
            DataType::Array => "Array",
            DataType::Map => "Map",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How many values a vertex may hold for one property key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Cardinality {
    /// At most one value; adding replaces the previous one
    #[default]
    Single,
    /// Any number of values, duplicates allowed
    List,
    /// Any number of distinct values
    Set,
}

/// Property key descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyKey {
    pub id: SchemaId,
    pub name: String,
    pub data_type: DataType,
    pub cardinality: Cardinality,
}

impl PropertyKey {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Edge label descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeLabel {
    pub id: SchemaId,
    pub name: String,
}

impl EdgeLabel {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Vertex label descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexLabel {
    pub id: SchemaId,
    pub name: String,
}

impl VertexLabel {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Resolution policy handed to the registry by the caller's configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaPolicy {
    /// Create descriptors for unknown names instead of failing
    pub auto_create: bool,
    /// Data type of auto-created property keys
    pub default_data_type: DataType,
    /// Cardinality of auto-created property keys
    pub default_cardinality: Cardinality,
}

impl SchemaPolicy {
    /// Policy that never creates descriptors
    pub fn strict() -> Self {
        Self {
            auto_create: false,
            ..Self::default()
        }
    }
}

impl Default for SchemaPolicy {
    fn default() -> Self {
        Self {
            auto_create: true,
            default_data_type: DataType::Object,
            default_cardinality: Cardinality::Single,
        }
    }
}
