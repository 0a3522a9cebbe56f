//! Notification bus between the entity store, history and UI panels.
//!
//! Listeners are called synchronously on `emit`, after the emitting mutation
//! has completed. With queueing enabled (the owning [`crate::state::AppState`]
//! does this), events are also kept until drained so history requests can be
//! routed once the current operation returns.

use std::collections::VecDeque;

use shared::EntityId;

use crate::scene_graph::NodeId;
use crate::state::store::Entity;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    StateChanged,
    SelectionChanged(Option<Entity>),
    HistoryPush(String),
    HistoryPushDebounced(String),
    HistoryUndo,
    HistoryRedo,
    SceneUpdated,
    GizmoAttach(NodeId),
    GizmoDetach,
    TransformChangedByGizmo { id: EntityId, node: NodeId },
}

impl EditorEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            EditorEvent::StateChanged => "state-changed",
            EditorEvent::SelectionChanged(_) => "selection-changed",
            EditorEvent::HistoryPush(_) => "history-push",
            EditorEvent::HistoryPushDebounced(_) => "history-push-debounced",
            EditorEvent::HistoryUndo => "history-undo",
            EditorEvent::HistoryRedo => "history-redo",
            EditorEvent::SceneUpdated => "scene-updated",
            EditorEvent::GizmoAttach(_) => "gizmo-attach",
            EditorEvent::GizmoDetach => "gizmo-detach",
            EditorEvent::TransformChangedByGizmo { .. } => "transform-changed-by-gizmo",
        }
    }
}

pub type Listener = Box<dyn FnMut(&EditorEvent)>;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Listener)>,
    queue: VecDeque<EditorEvent>,
    queueing: bool,
    next_listener: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event
    pub fn subscribe(&mut self, listener: impl FnMut(&EditorEvent) + 'static) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Receive only events with the given wire name
    pub fn on(
        &mut self,
        name: &'static str,
        mut handler: impl FnMut(&EditorEvent) + 'static,
    ) -> ListenerId {
        self.subscribe(move |event| {
            if event.name() == name {
                handler(event);
            }
        })
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    /// Keep emitted events until [`EventBus::drain`]. Off by default, so a
    /// bus nobody drains does not grow.
    pub fn enable_queue(&mut self) {
        self.queueing = true;
    }

    pub fn is_queueing(&self) -> bool {
        self.queueing
    }

    pub fn emit(&mut self, event: EditorEvent) {
        tracing::trace!("event {}", event.name());
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
        if self.queueing {
            self.queue.push_back(event);
        }
    }

    /// Take all queued events in emission order
    pub fn drain(&mut self) -> Vec<EditorEvent> {
        self.queue.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
