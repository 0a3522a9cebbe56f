pub mod history;
pub mod settings;
pub mod store;

use std::sync::Arc;
use std::time::Instant;

pub use history::{HistoryManager, HistorySnapshot};
pub use settings::{EditorSettings, HistorySettings};
pub use store::{EditError, Entity, EntityStore, LoadReport, PersistenceError};

use crate::events::EditorEvent;
use crate::registry::TypeRegistry;

/// What one `process_events` pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Events taken off the bus
    pub routed: usize,
    pub undone: bool,
    pub redone: bool,
}

/// Combined editor state: the entity store and the history that observes it
pub struct AppState {
    pub store: EntityStore,
    pub history: HistoryManager,
    pub settings: EditorSettings,
}

impl AppState {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_settings(registry, EditorSettings::default())
    }

    /// Fresh state with an "Initial" baseline history entry
    pub fn with_settings(registry: Arc<TypeRegistry>, settings: EditorSettings) -> Self {
        let mut store = EntityStore::new(registry);
        store.bus_mut().enable_queue();
        store.set_duplicate_offset(settings.duplicate_offset);
        let mut history =
            HistoryManager::new(settings.history.capacity, settings.history.debounce());
        history.push("Initial", &store);
        Self {
            store,
            history,
            settings,
        }
    }

    /// Route queued history requests from the bus. Restores triggered here
    /// emit their own events, which are drained in the same call.
    pub fn process_events(&mut self, now: Instant) -> ProcessOutcome {
        let mut outcome = ProcessOutcome::default();
        loop {
            let events = self.store.bus_mut().drain();
            if events.is_empty() {
                break;
            }
            outcome.routed += events.len();
            for event in events {
                match event {
                    EditorEvent::HistoryPush(label) => {
                        self.history.push(&label, &self.store);
                        if self.settings.autosave {
                            self.store.autosave();
                        }
                    }
                    EditorEvent::HistoryPushDebounced(label) => {
                        self.history.push_debounced(&label, now);
                    }
                    EditorEvent::HistoryUndo => {
                        outcome.undone |= self.history.undo(&mut self.store);
                    }
                    EditorEvent::HistoryRedo => {
                        outcome.redone |= self.history.redo(&mut self.store);
                    }
                    _ => {}
                }
            }
        }
        outcome
    }

    /// Route pending events, then fire the debounced push if it is due
    pub fn tick(&mut self, now: Instant) -> bool {
        self.process_events(now);
        let fired = self.history.poll(now, &self.store);
        if fired && self.settings.autosave {
            self.store.autosave();
        }
        fired
    }

    pub fn undo(&mut self) -> bool {
        self.store.emit(EditorEvent::HistoryUndo);
        self.process_events(Instant::now()).undone
    }

    pub fn redo(&mut self) -> bool {
        self.store.emit(EditorEvent::HistoryRedo);
        self.process_events(Instant::now()).redone
    }

    /// Replace the scene with a project payload and restart history from it.
    /// On a malformed payload the scene is left empty.
    pub fn load_project(&mut self, text: &str) -> Result<LoadReport, PersistenceError> {
        let result = self.store.deserialize_state(text);
        self.store.bus_mut().drain();
        self.history.reset("Load project", &self.store);
        result
    }

    /// Remove every entity as an undoable edit
    pub fn clear_entities(&mut self, now: Instant) {
        self.store.delete_all_entities();
        self.store.emit(EditorEvent::HistoryPush("Clear scene".into()));
        self.process_events(now);
    }

    /// Empty scene with a fresh history
    pub fn reset(&mut self) {
        self.store.clear_scene();
        self.store.bus_mut().drain();
        self.history.reset("New scene", &self.store);
    }
}
