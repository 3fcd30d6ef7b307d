//! Graph configuration
//!
//! Loaded from YAML or JSON; every field has a default so partial documents
//! are accepted.

use crate::error::{GraphError, GraphResult};
use crate::schema::{Cardinality, DataType, SchemaPolicy, DEFAULT_VERTEX_LABEL};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for a graph transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Create schema types on first use of an unknown name
    pub auto_schema: bool,
    /// Label given to vertices created without one
    pub default_vertex_label: String,
    /// Data type of auto-created property keys
    pub default_data_type: DataType,
    /// Cardinality of auto-created property keys
    pub default_cardinality: Cardinality,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            auto_schema: true,
            default_vertex_label: DEFAULT_VERTEX_LABEL.to_string(),
            default_data_type: DataType::Object,
            default_cardinality: Cardinality::Single,
        }
    }
}

impl GraphConfig {
    /// Configuration with automatic schema creation turned off
    pub fn strict() -> Self {
        Self {
            auto_schema: false,
            ..Self::default()
        }
    }

    /// Resolution policy handed to the schema registry
    pub fn schema_policy(&self) -> SchemaPolicy {
        SchemaPolicy {
            auto_create: self.auto_schema,
            default_data_type: self.default_data_type,
            default_cardinality: self.default_cardinality,
        }
    }

    pub fn from_yaml_str(input: &str) -> GraphResult<Self> {
        serde_yaml::from_str(input).map_err(|e| GraphError::Config(e.to_string()))
    }

    pub fn from_json_str(input: &str) -> GraphResult<Self> {
        serde_json::from_str(input).map_err(|e| GraphError::Config(e.to_string()))
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GraphError::Config(format!("{}: {}", path.display(), e)))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            other => Err(GraphError::Config(format!(
                "unsupported config format: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }
}
