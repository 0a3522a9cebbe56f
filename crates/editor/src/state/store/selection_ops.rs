use super::{Entity, EntityStore};
use crate::events::EditorEvent;

impl EntityStore {
    /// Change the selection. Returns `true` when it actually changed.
    pub fn select_entity(&mut self, id: Option<&str>) -> bool {
        if self.selected.as_deref() == id {
            return false;
        }

        let node = match id {
            Some(id) => match self.entities.get(id) {
                Some(entity) => Some(entity.node),
                None => {
                    tracing::warn!("select: unknown entity '{}'", id);
                    return false;
                }
            },
            None => None,
        };

        self.selected = id.map(str::to_string);
        match node {
            Some(node) => {
                self.gizmo.attach(node);
                self.emit(EditorEvent::GizmoAttach(node));
            }
            None => {
                self.gizmo.detach();
                self.emit(EditorEvent::GizmoDetach);
            }
        }

        let snapshot = self.get_selected().cloned();
        self.emit(EditorEvent::SelectionChanged(snapshot));
        true
    }

    pub fn get_selected(&self) -> Option<&Entity> {
        self.selected.as_ref().and_then(|id| self.entities.get(id))
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}
