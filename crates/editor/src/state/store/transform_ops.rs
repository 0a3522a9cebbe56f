use shared::Transform;

use super::EntityStore;
use crate::events::EditorEvent;

impl EntityStore {
    /// Gizmo drag path: write the node transform and request a debounced
    /// history entry. Transforms with NaN or infinite components are refused.
    pub fn set_entity_transform(&mut self, id: &str, transform: Transform) -> bool {
        let Some(node) = self.entities.get(id).map(|e| e.node) else {
            tracing::warn!("set transform: unknown entity '{}'", id);
            return false;
        };
        if !transform.is_finite() {
            tracing::warn!("set transform: non-finite transform for '{}' ignored", id);
            return false;
        }
        if self.graph.transform(node) == Some(&transform) {
            return false;
        }
        self.graph.set_transform(node, transform);
        self.version += 1;

        self.emit(EditorEvent::TransformChangedByGizmo {
            id: id.to_string(),
            node,
        });
        self.emit(EditorEvent::HistoryPushDebounced("Transform".into()));
        true
    }

    pub fn translate_entity(&mut self, id: &str, delta: [f64; 3]) -> bool {
        let Some(current) = self.entity_transform(id) else {
            tracing::warn!("translate: unknown entity '{}'", id);
            return false;
        };
        self.set_entity_transform(id, current.translated(delta))
    }

    /// Nest `child` under `parent`, or move it back to the scene root.
    /// Cycles are refused by the graph.
    pub fn attach_entity_to(&mut self, child: &str, parent: Option<&str>) -> bool {
        let Some(child_node) = self.entities.get(child).map(|e| e.node) else {
            tracing::warn!("reparent: unknown entity '{}'", child);
            return false;
        };
        let parent_node = match parent {
            Some(p) => match self.entities.get(p) {
                Some(e) => e.node,
                None => {
                    tracing::warn!("reparent: unknown parent '{}'", p);
                    return false;
                }
            },
            None => self.graph.root(),
        };
        if self.graph.parent_of(child_node) == Some(parent_node) {
            return false;
        }
        if !self.graph.attach(parent_node, child_node) {
            return false;
        }
        self.version += 1;

        self.emit(EditorEvent::StateChanged);
        self.emit(EditorEvent::HistoryPush("Reparent".into()));
        true
    }

    /// Owning entity of the node an entity is nested under
    pub fn parent_entity(&self, id: &str) -> Option<&str> {
        let node = self.entities.get(id)?.node;
        let parent = self.graph.parent_of(node)?;
        self.node_owner.get(&parent).map(String::as_str)
    }
}
