//! Entity store
//!
//! Owns the entity records, the scene graph their nodes live in and the
//! current selection. Every parameter edit funnels through
//! [`EntityStore::rebuild_entity`], so records and visuals never diverge.

mod entity_ops;
mod param_ops;
mod persistence;
mod selection_ops;
mod transform_ops;

pub use param_ops::EditError;
pub use persistence::{id_suffix, LoadReport, PersistenceError};

use std::collections::HashMap;
use std::sync::Arc;

use shared::{EntityId, ParamRecord, Transform};

use crate::events::{EditorEvent, EventBus};
use crate::registry::{EntityTypeDescriptor, TypeRegistry};
use crate::scene_graph::{NodeId, SceneGraph};
use crate::viewport::gizmo::{ManipulationGizmo, TransformGizmo};

/// Offset applied to duplicates so they do not overlap the source
pub const DEFAULT_DUPLICATE_OFFSET: [f64; 3] = [1.0, 0.0, 1.0];

/// A parametric entity. The transform lives on `node`, not in `params`.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub type_name: String,
    pub params: ParamRecord,
    pub node: NodeId,
}

pub struct EntityStore {
    registry: Arc<TypeRegistry>,
    graph: SceneGraph,
    entities: HashMap<EntityId, Entity>,
    /// Insertion order for the outliner
    order: Vec<EntityId>,
    /// node → owning entity (entity → node is `Entity::node`)
    node_owner: HashMap<NodeId, EntityId>,
    selected: Option<EntityId>,
    gizmo: Box<dyn ManipulationGizmo>,
    bus: EventBus,
    next_id: u64,
    duplicate_offset: [f64; 3],
    /// Monotonically increasing version counter for cache invalidation
    version: u64,
}

impl EntityStore {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_gizmo(registry, Box::new(TransformGizmo::new()))
    }

    pub fn with_gizmo(registry: Arc<TypeRegistry>, gizmo: Box<dyn ManipulationGizmo>) -> Self {
        Self {
            registry,
            graph: SceneGraph::new(),
            entities: HashMap::new(),
            order: Vec::new(),
            node_owner: HashMap::new(),
            selected: None,
            gizmo,
            bus: EventBus::new(),
            next_id: 1,
            duplicate_offset: DEFAULT_DUPLICATE_OFFSET,
            version: 0,
        }
    }

    pub fn set_duplicate_offset(&mut self, offset: [f64; 3]) {
        self.duplicate_offset = offset;
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Mutable graph access for collaborators that add their own nodes
    /// (helpers, imported meshes). Entity nodes must only be touched through
    /// the store.
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn gizmo(&self) -> &dyn ManipulationGizmo {
        self.gizmo.as_ref()
    }

    /// Current version (increments on every mutation)
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Entities in insertion order
    pub fn get_entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    pub fn get_entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entity owning `node` or its nearest owned ancestor (hit-testing)
    pub fn entity_for_node(&self, node: NodeId) -> Option<&Entity> {
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(id) = self.node_owner.get(&n) {
                return self.entities.get(id);
            }
            current = self.graph.parent_of(n);
        }
        None
    }

    pub fn entity_transform(&self, id: &str) -> Option<Transform> {
        let entity = self.entities.get(id)?;
        self.graph.transform(entity.node).cloned()
    }

    /// Display name for outliner rows, e.g. `Tower (entity_3)`
    pub fn entity_display_name(&self, id: &str) -> Option<String> {
        let entity = self.entities.get(id)?;
        let label = self
            .registry
            .get(&entity.type_name)
            .map(|d| d.label.as_str())
            .unwrap_or(entity.type_name.as_str());
        Some(format!("{} ({})", label, entity.id))
    }

    pub fn emit(&mut self, event: EditorEvent) {
        self.bus.emit(event);
    }

    /// Next free `entity_N`. `None` once the counter is exhausted.
    fn allocate_id(&mut self) -> Option<EntityId> {
        loop {
            let n = self.next_id;
            self.next_id = n.checked_add(1)?;
            let id = format!("entity_{}", n);
            if !self.entities.contains_key(&id) {
                return Some(id);
            }
        }
    }

    /// Bring a raw record in line with the type's schema, logging repairs
    fn normalize_params(
        descriptor: &EntityTypeDescriptor,
        raw: &ParamRecord,
        context: &str,
    ) -> ParamRecord {
        let (params, issues) = descriptor.schema.normalize(raw);
        for issue in issues {
            tracing::warn!("{}: {}", context, issue);
        }
        params
    }

    /// Register a freshly instantiated node as the entity's live node
    fn register_entity(&mut self, id: EntityId, type_name: String, params: ParamRecord, node: NodeId) {
        self.node_owner.insert(node, id.clone());
        if !self.entities.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.entities.insert(
            id.clone(),
            Entity {
                id,
                type_name,
                params,
                node,
            },
        );
    }

    /// Drop an entity's bookkeeping. The node must already be removed.
    fn forget_entity(&mut self, id: &str) {
        if let Some(entity) = self.entities.remove(id) {
            self.node_owner.remove(&entity.node);
        }
        self.order.retain(|o| o != id);
    }

    /// Entities whose nodes lie in the subtree of `node`, outermost first
    fn entities_in_subtree(&self, node: NodeId) -> Vec<EntityId> {
        self.graph
            .subtree(node)
            .into_iter()
            .filter_map(|n| self.node_owner.get(&n).cloned())
            .collect()
    }
}
