//! In-process schema registry
//!
//! Resolves names to interned descriptors. Each kind keeps its own
//! namespace behind a `RwLock`; creation re-checks under the write lock so
//! concurrent first use of a name yields exactly one descriptor.

use super::types::{
    Cardinality, DataType, EdgeLabel, PropertyKey, SchemaId, SchemaKind, SchemaPolicy, VertexLabel,
};
use crate::error::{GraphError, GraphResult};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Name of the vertex label assigned when none is given
pub const DEFAULT_VERTEX_LABEL: &str = "vertex";

/// Common view over the three descriptor types
pub trait SchemaElement {
    const KIND: SchemaKind;

    fn schema_id(&self) -> SchemaId;
    fn schema_name(&self) -> &str;
}

impl SchemaElement for PropertyKey {
    const KIND: SchemaKind = SchemaKind::PropertyKey;

    fn schema_id(&self) -> SchemaId {
        self.id
    }

    fn schema_name(&self) -> &str {
        &self.name
    }
}

impl SchemaElement for EdgeLabel {
    const KIND: SchemaKind = SchemaKind::EdgeLabel;

    fn schema_id(&self) -> SchemaId {
        self.id
    }

    fn schema_name(&self) -> &str {
        &self.name
    }
}

impl SchemaElement for VertexLabel {
    const KIND: SchemaKind = SchemaKind::VertexLabel;

    fn schema_id(&self) -> SchemaId {
        self.id
    }

    fn schema_name(&self) -> &str {
        &self.name
    }
}

/// A resolved descriptor of any kind
#[derive(Debug, Clone)]
pub enum SchemaType {
    PropertyKey(Arc<PropertyKey>),
    EdgeLabel(Arc<EdgeLabel>),
    VertexLabel(Arc<VertexLabel>),
}

impl SchemaType {
    pub fn kind(&self) -> SchemaKind {
        match self {
            SchemaType::PropertyKey(_) => SchemaKind::PropertyKey,
            SchemaType::EdgeLabel(_) => SchemaKind::EdgeLabel,
            SchemaType::VertexLabel(_) => SchemaKind::VertexLabel,
        }
    }

    pub fn id(&self) -> SchemaId {
        match self {
            SchemaType::PropertyKey(k) => k.id,
            SchemaType::EdgeLabel(l) => l.id,
            SchemaType::VertexLabel(l) => l.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SchemaType::PropertyKey(k) => &k.name,
            SchemaType::EdgeLabel(l) => &l.name,
            SchemaType::VertexLabel(l) => &l.name,
        }
    }
}

/// Serializable image of a registry, the hand-off point to durable storage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub property_keys: Vec<PropertyKey>,
    pub edge_labels: Vec<EdgeLabel>,
    pub vertex_labels: Vec<VertexLabel>,
}

#[derive(Debug)]
struct Namespace<T> {
    by_name: FxHashMap<String, Arc<T>>,
    by_id: FxHashMap<SchemaId, Arc<T>>,
    next_id: u64,
}

impl<T: SchemaElement> Namespace<T> {
    fn new() -> Self {
        Self {
            by_name: FxHashMap::default(),
            by_id: FxHashMap::default(),
            next_id: 0,
        }
    }

    fn get(&self, name: &str) -> Option<Arc<T>> {
        self.by_name.get(name).cloned()
    }

    /// Id for the next insert; `insert` advances the counter
    fn allocate_id(&self) -> SchemaId {
        SchemaId(self.next_id)
    }

    fn insert(&mut self, element: T) -> GraphResult<Arc<T>> {
        if self.by_name.contains_key(element.schema_name())
            || self.by_id.contains_key(&element.schema_id())
        {
            return Err(GraphError::TypeAlreadyExists {
                kind: T::KIND,
                name: element.schema_name().to_string(),
            });
        }
        let id = element.schema_id();
        let after = id.0.checked_add(1).ok_or_else(|| {
            GraphError::Config(format!("{} id out of range: {}", T::KIND, id.0))
        })?;
        self.next_id = self.next_id.max(after);
        let element = Arc::new(element);
        self.by_name
            .insert(element.schema_name().to_string(), Arc::clone(&element));
        self.by_id.insert(id, Arc::clone(&element));
        Ok(element)
    }

    fn sorted(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut all: Vec<T> = self.by_id.values().map(|e| T::clone(e)).collect();
        all.sort_by_key(|e| e.schema_id());
        all
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn unknown<T: SchemaElement>(name: &str) -> GraphError {
    GraphError::UnknownType {
        kind: T::KIND,
        name: name.to_string(),
    }
}

/// Look up `name`, creating it with `make` when allowed
fn intern<T: SchemaElement>(
    lock: &RwLock<Namespace<T>>,
    name: &str,
    auto_create: bool,
    make: impl FnOnce(SchemaId) -> T,
) -> GraphResult<Arc<T>> {
    if let Some(found) = read(lock).get(name) {
        return Ok(found);
    }
    if !auto_create || name.is_empty() {
        return Err(unknown::<T>(name));
    }

    let mut namespace = write(lock);
    // Another writer may have created it between the two locks
    if let Some(found) = namespace.get(name) {
        return Ok(found);
    }
    let id = namespace.allocate_id();
    let created = namespace.insert(make(id))?;
    debug!(kind = %T::KIND, name, id = id.0, "auto-created schema type");
    Ok(created)
}

fn define<T: SchemaElement>(
    lock: &RwLock<Namespace<T>>,
    name: &str,
    make: impl FnOnce(SchemaId) -> T,
) -> GraphResult<Arc<T>> {
    if name.is_empty() {
        return Err(unknown::<T>(name));
    }
    let mut namespace = write(lock);
    if namespace.get(name).is_some() {
        return Err(GraphError::TypeAlreadyExists {
            kind: T::KIND,
            name: name.to_string(),
        });
    }
    let id = namespace.allocate_id();
    let defined = namespace.insert(make(id))?;
    info!(kind = %T::KIND, name, id = id.0, "defined schema type");
    Ok(defined)
}

/// Registry of property keys, edge labels and vertex labels
///
/// Shared between transactions through an `Arc`. Repeated resolution of a
/// name returns the same `Arc` instance.
#[derive(Debug)]
pub struct SchemaRegistry {
    property_keys: RwLock<Namespace<PropertyKey>>,
    edge_labels: RwLock<Namespace<EdgeLabel>>,
    vertex_labels: RwLock<Namespace<VertexLabel>>,
}

impl SchemaRegistry {
    /// Create a registry holding only the default vertex label
    pub fn new() -> Self {
        let registry = Self::empty();
        {
            let mut labels = write(&registry.vertex_labels);
            let id = labels.allocate_id();
            // Fresh namespace, the insert cannot collide
            let _ = labels.insert(VertexLabel {
                id,
                name: DEFAULT_VERTEX_LABEL.to_string(),
            });
        }
        registry
    }

    fn empty() -> Self {
        Self {
            property_keys: RwLock::new(Namespace::new()),
            edge_labels: RwLock::new(Namespace::new()),
            vertex_labels: RwLock::new(Namespace::new()),
        }
    }

    /// Resolve an existing descriptor by exact name
    pub fn resolve(&self, name: &str, kind: SchemaKind) -> GraphResult<SchemaType> {
        self.resolve_or_create(name, kind, &SchemaPolicy::strict())
    }

    /// Resolve a descriptor, creating it with policy defaults when permitted
    pub fn resolve_or_create(
        &self,
        name: &str,
        kind: SchemaKind,
        policy: &SchemaPolicy,
    ) -> GraphResult<SchemaType> {
        Ok(match kind {
            SchemaKind::PropertyKey => SchemaType::PropertyKey(self.property_key(name, policy)?),
            SchemaKind::EdgeLabel => SchemaType::EdgeLabel(self.edge_label(name, policy)?),
            SchemaKind::VertexLabel => SchemaType::VertexLabel(self.vertex_label(name, policy)?),
        })
    }

    pub fn property_key(&self, name: &str, policy: &SchemaPolicy) -> GraphResult<Arc<PropertyKey>> {
        intern(&self.property_keys, name, policy.auto_create, |id| PropertyKey {
            id,
            name: name.to_string(),
            data_type: policy.default_data_type,
            cardinality: policy.default_cardinality,
        })
    }

    pub fn edge_label(&self, name: &str, policy: &SchemaPolicy) -> GraphResult<Arc<EdgeLabel>> {
        intern(&self.edge_labels, name, policy.auto_create, |id| EdgeLabel {
            id,
            name: name.to_string(),
        })
    }

    pub fn vertex_label(&self, name: &str, policy: &SchemaPolicy) -> GraphResult<Arc<VertexLabel>> {
        intern(&self.vertex_labels, name, policy.auto_create, |id| VertexLabel {
            id,
            name: name.to_string(),
        })
    }

    /// Explicitly define a property key
    pub fn define_property_key(
        &self,
        name: &str,
        data_type: DataType,
        cardinality: Cardinality,
    ) -> GraphResult<Arc<PropertyKey>> {
        define(&self.property_keys, name, |id| PropertyKey {
            id,
            name: name.to_string(),
            data_type,
            cardinality,
        })
    }

    pub fn define_edge_label(&self, name: &str) -> GraphResult<Arc<EdgeLabel>> {
        define(&self.edge_labels, name, |id| EdgeLabel {
            id,
            name: name.to_string(),
        })
    }

    pub fn define_vertex_label(&self, name: &str) -> GraphResult<Arc<VertexLabel>> {
        define(&self.vertex_labels, name, |id| VertexLabel {
            id,
            name: name.to_string(),
        })
    }

    pub fn get_property_key(&self, name: &str) -> Option<Arc<PropertyKey>> {
        read(&self.property_keys).get(name)
    }

    pub fn get_edge_label(&self, name: &str) -> Option<Arc<EdgeLabel>> {
        read(&self.edge_labels).get(name)
    }

    pub fn get_vertex_label(&self, name: &str) -> Option<Arc<VertexLabel>> {
        read(&self.vertex_labels).get(name)
    }

    pub fn property_key_by_id(&self, id: SchemaId) -> Option<Arc<PropertyKey>> {
        read(&self.property_keys).by_id.get(&id).cloned()
    }

    pub fn edge_label_by_id(&self, id: SchemaId) -> Option<Arc<EdgeLabel>> {
        read(&self.edge_labels).by_id.get(&id).cloned()
    }

    pub fn vertex_label_by_id(&self, id: SchemaId) -> Option<Arc<VertexLabel>> {
        read(&self.vertex_labels).by_id.get(&id).cloned()
    }

    pub fn contains(&self, name: &str, kind: SchemaKind) -> bool {
        match kind {
            SchemaKind::PropertyKey => read(&self.property_keys).by_name.contains_key(name),
            SchemaKind::EdgeLabel => read(&self.edge_labels).by_name.contains_key(name),
            SchemaKind::VertexLabel => read(&self.vertex_labels).by_name.contains_key(name),
        }
    }

    /// Names registered under `kind`, sorted by id
    pub fn names(&self, kind: SchemaKind) -> Vec<String> {
        match kind {
            SchemaKind::PropertyKey => names_of(&read(&self.property_keys)),
            SchemaKind::EdgeLabel => names_of(&read(&self.edge_labels)),
            SchemaKind::VertexLabel => names_of(&read(&self.vertex_labels)),
        }
    }

    /// Number of descriptors in a kind
    pub fn len(&self, kind: SchemaKind) -> usize {
        match kind {
            SchemaKind::PropertyKey => read(&self.property_keys).by_id.len(),
            SchemaKind::EdgeLabel => read(&self.edge_labels).by_id.len(),
            SchemaKind::VertexLabel => read(&self.vertex_labels).by_id.len(),
        }
    }

    pub fn snapshot(&self) -> SchemaSnapshot {
        SchemaSnapshot {
            property_keys: read(&self.property_keys).sorted(),
            edge_labels: read(&self.edge_labels).sorted(),
            vertex_labels: read(&self.vertex_labels).sorted(),
        }
    }

    /// Rebuild a registry from a snapshot, preserving ids
    ///
    /// The default vertex label is added when the snapshot lacks it.
    pub fn from_snapshot(snapshot: SchemaSnapshot) -> GraphResult<Self> {
        let registry = Self::empty();
        {
            let mut keys = write(&registry.property_keys);
            for key in snapshot.property_keys {
                keys.insert(key)?;
            }
            let mut edge_labels = write(&registry.edge_labels);
            for label in snapshot.edge_labels {
                edge_labels.insert(label)?;
            }
            let mut vertex_labels = write(&registry.vertex_labels);
            for label in snapshot.vertex_labels {
                vertex_labels.insert(label)?;
            }
            if vertex_labels.get(DEFAULT_VERTEX_LABEL).is_none() {
                let id = vertex_labels.allocate_id();
                vertex_labels.insert(VertexLabel {
                    id,
                    name: DEFAULT_VERTEX_LABEL.to_string(),
                })?;
            }
        }
        Ok(registry)
    }
}

fn names_of<T: SchemaElement>(namespace: &Namespace<T>) -> Vec<String> {
    let mut entries: Vec<(SchemaId, &str)> = namespace
        .by_id
        .iter()
        .map(|(id, e)| (*id, e.schema_name()))
        .collect();
    entries.sort_by_key(|(id, _)| *id);
    entries.into_iter().map(|(_, name)| name.to_string()).collect()
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_resolve_unknown_fails() {
        let registry = SchemaRegistry::new();
        let err = registry.resolve("knows", SchemaKind::EdgeLabel).unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownType {
                kind: SchemaKind::EdgeLabel,
                name: "knows".to_string()
            }
        );
    }

    #[test]
    fn test_auto_create_interns() {
        let registry = SchemaRegistry::new();
        let policy = SchemaPolicy::default();

        let first = registry.edge_label("knows", &policy).unwrap();
        let second = registry.edge_label("knows", &policy).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(SchemaKind::EdgeLabel), 1);

        let resolved = registry.resolve("knows", SchemaKind::EdgeLabel).unwrap();
        assert_eq!(resolved.id(), first.id);
        assert_eq!(resolved.kind(), SchemaKind::EdgeLabel);
    }

    #[test]
    fn test_auto_created_key_uses_policy_defaults() {
        let registry = SchemaRegistry::new();
        let policy = SchemaPolicy {
            default_data_type: DataType::String,
            default_cardinality: Cardinality::List,
            ..SchemaPolicy::default()
        };
        let key = registry.property_key("name", &policy).unwrap();
        assert_eq!(key.data_type, DataType::String);
        assert_eq!(key.cardinality, Cardinality::List);
    }

    #[test]
    fn test_names_unique_within_kind_only() {
        let registry = SchemaRegistry::new();
        let policy = SchemaPolicy::default();
        registry.edge_label("name", &policy).unwrap();
        registry.property_key("name", &policy).unwrap();
        assert!(registry.contains("name", SchemaKind::EdgeLabel));
        assert!(registry.contains("name", SchemaKind::PropertyKey));
        assert!(!registry.contains("name", SchemaKind::VertexLabel));
    }

    #[test]
    fn test_define_duplicate_fails() {
        let registry = SchemaRegistry::new();
        registry
            .define_property_key("age", DataType::Integer, Cardinality::Single)
            .unwrap();
        let err = registry
            .define_property_key("age", DataType::String, Cardinality::Single)
            .unwrap_err();
        assert!(matches!(err, GraphError::TypeAlreadyExists { .. }));
        assert_eq!(
            registry.get_property_key("age").unwrap().data_type,
            DataType::Integer
        );
    }

    #[test]
    fn test_empty_name_never_created() {
        let registry = SchemaRegistry::new();
        assert!(registry.edge_label("", &SchemaPolicy::default()).is_err());
        assert!(registry.define_edge_label("").is_err());
    }

    #[test]
    fn test_default_vertex_label_present() {
        let registry = SchemaRegistry::new();
        let label = registry.get_vertex_label(DEFAULT_VERTEX_LABEL).unwrap();
        assert_eq!(registry.vertex_label_by_id(label.id).unwrap().name, "vertex");
    }

    #[test]
    fn test_lookup_by_id() {
        let registry = SchemaRegistry::new();
        let key = registry
            .define_property_key("age", DataType::Integer, Cardinality::Single)
            .unwrap();
        let label = registry.define_edge_label("knows").unwrap();
        assert!(Arc::ptr_eq(&registry.property_key_by_id(key.id).unwrap(), &key));
        assert!(Arc::ptr_eq(&registry.edge_label_by_id(label.id).unwrap(), &label));
        assert!(registry.edge_label_by_id(SchemaId(99)).is_none());
    }

    #[test]
    fn test_concurrent_first_use_creates_once() {
        let registry = Arc::new(SchemaRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry
                        .edge_label("knows", &SchemaPolicy::default())
                        .unwrap()
                })
            })
            .collect();

        let labels: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for label in &labels[1..] {
            assert!(Arc::ptr_eq(&labels[0], label));
        }
        assert_eq!(registry.names(SchemaKind::EdgeLabel), vec!["knows".to_string()]);
    }

    #[test]
    fn test_snapshot_round_trip_preserves_ids() {
        let registry = SchemaRegistry::new();
        let policy = SchemaPolicy::default();
        registry.edge_label("a", &policy).unwrap();
        let b = registry.edge_label("b", &policy).unwrap();
        registry
            .define_property_key("age", DataType::Integer, Cardinality::Single)
            .unwrap();

        let json = serde_json::to_string(&registry.snapshot()).unwrap();
        let snapshot: SchemaSnapshot = serde_json::from_str(&json).unwrap();
        let restored = SchemaRegistry::from_snapshot(snapshot).unwrap();

        assert_eq!(restored.get_edge_label("b").unwrap().id, b.id);
        assert_eq!(
            restored.get_property_key("age").unwrap().data_type,
            DataType::Integer
        );
        assert_eq!(restored.snapshot(), registry.snapshot());

        // New ids continue past the restored ones
        let c = restored.edge_label("c", &policy).unwrap();
        assert!(c.id > b.id);
    }

    #[test]
    fn test_snapshot_with_exhausted_id_rejected() {
        let snapshot = SchemaSnapshot {
            property_keys: vec![PropertyKey {
                id: SchemaId(u64::MAX),
                name: "age".into(),
                data_type: DataType::Integer,
                cardinality: Cardinality::Single,
            }],
            ..SchemaSnapshot::default()
        };
        assert!(matches!(
            SchemaRegistry::from_snapshot(snapshot),
            Err(GraphError::Config(_))
        ));
    }

    #[test]
    fn test_snapshot_with_duplicate_name_rejected() {
        let snapshot = SchemaSnapshot {
            edge_labels: vec![
                EdgeLabel { id: SchemaId(0), name: "x".into() },
                EdgeLabel { id: SchemaId(1), name: "x".into() },
            ],
            ..SchemaSnapshot::default()
        };
        assert!(SchemaRegistry::from_snapshot(snapshot).is_err());
    }
}
