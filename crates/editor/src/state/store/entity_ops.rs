//! Entity create / rebuild / delete / duplicate

use std::sync::Arc;

use shared::{EntityId, EntityRecord, Transform};

use super::EntityStore;
use crate::build::preset_overrides;
use crate::events::EditorEvent;
use crate::scene_graph::NodeId;

impl EntityStore {
    /// Create an entity of a registered type.
    ///
    /// With `restore`, the record's id, params and transform are kept and no
    /// history entry or selection change happens (deserialization path).
    /// Otherwise a fresh id and schema defaults are used, `preset` overrides
    /// are applied, history is pushed and the new entity is selected.
    ///
    /// Returns `None` (and logs) when the type is unknown or the builder fails.
    pub fn add_entity(
        &mut self,
        type_name: &str,
        preset: Option<&str>,
        restore: Option<&EntityRecord>,
    ) -> Option<EntityId> {
        let registry = Arc::clone(&self.registry);
        let Some(descriptor) = registry.get(type_name) else {
            tracing::warn!("cannot add entity: type '{}' is not registered", type_name);
            return None;
        };

        if let Some(record) = restore {
            if self.entities.contains_key(&record.id) {
                tracing::warn!("cannot restore entity: id '{}' already exists", record.id);
                return None;
            }
        }

        let raw = match restore {
            Some(record) => record.params.clone(),
            None => {
                let mut params = descriptor.default_params();
                if let Some(key) = preset {
                    match preset_overrides(type_name, key) {
                        Some(overrides) => {
                            for (name, value) in overrides {
                                params.insert(name.to_string(), value);
                            }
                        }
                        None => tracing::debug!("no preset '{}' for '{}'", key, type_name),
                    }
                }
                params
            }
        };
        let params = Self::normalize_params(descriptor, &raw, type_name);

        let data = match descriptor.build(&params) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("cannot add entity: '{}' builder failed: {}", type_name, e);
                return None;
            }
        };

        let id = match restore {
            Some(record) => record.id.clone(),
            None => match self.allocate_id() {
                Some(id) => id,
                None => {
                    tracing::warn!("cannot add entity: id counter exhausted");
                    return None;
                }
            },
        };

        let node = self.graph.instantiate(&data);
        if let Some(record) = restore {
            if record.transform.is_finite() {
                self.graph.set_transform(node, record.transform.clone());
            } else {
                tracing::warn!("'{}': non-finite transform replaced by identity", record.id);
            }
        }
        let root = self.graph.root();
        self.graph.attach(root, node);
        self.register_entity(id.clone(), type_name.to_string(), params, node);
        self.version += 1;
        tracing::debug!("added {} ({}) as {}", id, type_name, node);

        self.emit(EditorEvent::StateChanged);
        if restore.is_none() {
            self.emit(EditorEvent::HistoryPush(format!("Add {}", descriptor.label)));
            self.select_entity(Some(&id));
        }
        Some(id)
    }

    /// Regenerate an entity's node from its current params.
    ///
    /// The replacement is built first; only when the builder succeeds is the
    /// old node released. Transform, parent, position among siblings and
    /// nested child entities carry over, and the gizmo follows the new node
    /// if the entity is selected. Returns `false` for unknown ids and
    /// builder failures (the old node stays in place).
    pub fn rebuild_entity(&mut self, id: &str) -> bool {
        let registry = Arc::clone(&self.registry);
        let Some(entity) = self.entities.get(id) else {
            tracing::warn!("rebuild: unknown entity '{}'", id);
            return false;
        };
        let Some(descriptor) = registry.get(&entity.type_name) else {
            tracing::warn!("rebuild: '{}' has unregistered type '{}'", id, entity.type_name);
            return false;
        };

        let old_node = entity.node;
        let params = Self::normalize_params(descriptor, &entity.params, id);
        let data = match descriptor.build(&params) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("rebuild of '{}' failed, keeping previous node: {}", id, e);
                return false;
            }
        };

        let transform = self.graph.transform(old_node).cloned().unwrap_or_default();
        let parent = self.graph.parent_of(old_node).unwrap_or(self.graph.root());
        let index = self
            .graph
            .children(parent)
            .iter()
            .position(|c| *c == old_node)
            .unwrap_or(usize::MAX);

        // Nested entities hang off the old node; move them out before release
        let nested: Vec<NodeId> = self
            .graph
            .children(old_node)
            .iter()
            .copied()
            .filter(|c| self.node_owner.contains_key(c))
            .collect();
        for child in &nested {
            self.graph.detach(*child);
        }

        self.graph.remove_subtree(old_node);
        self.node_owner.remove(&old_node);

        let new_node = self.graph.instantiate(&data);
        self.graph.set_transform(new_node, transform);
        self.graph.attach_at(parent, new_node, index);
        for child in nested {
            self.graph.attach(new_node, child);
        }

        self.node_owner.insert(new_node, id.to_string());
        if let Some(entity) = self.entities.get_mut(id) {
            entity.params = params;
            entity.node = new_node;
        }
        self.version += 1;
        tracing::debug!("rebuilt {}: {} -> {}", id, old_node, new_node);

        if self.selected.as_deref() == Some(id) {
            self.gizmo.attach(new_node);
            self.emit(EditorEvent::GizmoAttach(new_node));
        }
        self.emit(EditorEvent::StateChanged);
        true
    }

    /// Delete an entity and any entities nested under it.
    /// Selection is cleared first when it points into the deleted subtree.
    pub fn delete_entity(&mut self, id: &str) -> bool {
        let Some(entity) = self.entities.get(id) else {
            tracing::warn!("delete: unknown entity '{}'", id);
            return false;
        };
        let node = entity.node;
        let label = self
            .registry
            .get(&entity.type_name)
            .map(|d| d.label.clone())
            .unwrap_or_else(|| entity.type_name.clone());

        let doomed = self.entities_in_subtree(node);
        if self
            .selected
            .as_ref()
            .is_some_and(|s| doomed.contains(s))
        {
            self.select_entity(None);
        }

        let removed = self.graph.remove_subtree(node);
        for eid in &doomed {
            self.forget_entity(eid);
        }
        self.version += 1;
        tracing::debug!("deleted {} ({} nodes, {} entities)", id, removed, doomed.len());

        self.emit(EditorEvent::StateChanged);
        self.emit(EditorEvent::HistoryPush(format!("Delete {}", label)));
        true
    }

    /// Delete every entity. Does not push history: callers (load, reset,
    /// history restore) manage history themselves.
    pub fn delete_all_entities(&mut self) {
        self.select_entity(None);

        let nodes: Vec<NodeId> = self
            .order
            .iter()
            .filter_map(|id| self.entities.get(id))
            .map(|e| e.node)
            .collect();
        for node in nodes {
            // Nested entity nodes are gone once their parent is removed
            if self.graph.contains(node) {
                self.graph.remove_subtree(node);
            }
        }

        self.entities.clear();
        self.order.clear();
        self.node_owner.clear();
        self.version += 1;
        self.emit(EditorEvent::StateChanged);
    }

    /// Remove every entity and every foreign node under the scene root
    pub fn clear_scene(&mut self) {
        self.delete_all_entities();
        let root = self.graph.root();
        self.graph.clear_children(root);
    }

    /// Copy an entity: deep-copied params, source rotation/scale, position
    /// shifted by the duplicate offset, same parent. The copy is selected.
    pub fn duplicate_entity(&mut self, id: &str) -> Option<EntityId> {
        let registry = Arc::clone(&self.registry);
        let Some(source) = self.entities.get(id) else {
            tracing::warn!("duplicate: unknown entity '{}'", id);
            return None;
        };
        let Some(descriptor) = registry.get(&source.type_name) else {
            tracing::warn!("duplicate: '{}' has unregistered type '{}'", id, source.type_name);
            return None;
        };

        let type_name = source.type_name.clone();
        let params = source.params.clone();
        let source_node = source.node;

        let data = match descriptor.build(&params) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("duplicate of '{}' failed: {}", id, e);
                return None;
            }
        };

        let transform: Transform = self
            .graph
            .transform(source_node)
            .cloned()
            .unwrap_or_default()
            .translated(self.duplicate_offset);
        let parent = self
            .graph
            .parent_of(source_node)
            .unwrap_or(self.graph.root());

        let Some(new_id) = self.allocate_id() else {
            tracing::warn!("duplicate of '{}' failed: id counter exhausted", id);
            return None;
        };
        let node = self.graph.instantiate(&data);
        self.graph.set_transform(node, transform);
        self.graph.attach(parent, node);
        self.register_entity(new_id.clone(), type_name, params, node);
        self.version += 1;
        tracing::debug!("duplicated {} as {}", id, new_id);

        self.emit(EditorEvent::StateChanged);
        self.select_entity(Some(&new_id));
        self.emit(EditorEvent::HistoryPush(format!("Duplicate {}", descriptor.label)));
        Some(new_id)
    }
}
