//! Headless test harness for programmatic scene manipulation.
//!
//! Wraps an [`AppState`] with a synthetic clock so debounced history can be
//! driven deterministically. Every mutating call routes the events it
//! produced, the way the frame loop does after each UI interaction.

use std::sync::Arc;
use std::time::{Duration, Instant};

use shared::{ParamValue, SceneNodeData, Transform};

use crate::registry::TypeRegistry;
use crate::state::{AppState, EditError, EditorSettings, Entity, LoadReport, PersistenceError};

/// Headless test harness — owns the editor state and a fake clock
pub struct TestHarness {
    pub state: AppState,
    now: Instant,
}

impl TestHarness {
    /// Harness over the built-in entity types
    pub fn new() -> Self {
        Self::with_registry(TypeRegistry::with_builtin_types())
    }

    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self::with_settings(registry, EditorSettings::default())
    }

    pub fn with_settings(registry: TypeRegistry, settings: EditorSettings) -> Self {
        Self {
            state: AppState::with_settings(Arc::new(registry), settings),
            now: Instant::now(),
        }
    }

    fn route(&mut self) {
        self.state.process_events(self.now);
    }

    // ── Clock ─────────────────────────────────────────────────

    /// Move the fake clock forward and fire anything that became due
    pub fn advance(&mut self, ms: u64) -> bool {
        self.now += Duration::from_millis(ms);
        self.state.tick(self.now)
    }

    /// Advance past the debounce window
    pub fn settle(&mut self) -> bool {
        let window = self.state.history.debounce().as_millis() as u64;
        self.advance(window + 1)
    }

    // ── Entities ──────────────────────────────────────────────

    /// Add an entity with default params
    pub fn add(&mut self, type_name: &str) -> Option<String> {
        self.add_preset(type_name, None)
    }

    pub fn add_preset(&mut self, type_name: &str, preset: Option<&str>) -> Option<String> {
        let id = self.state.store.add_entity(type_name, preset, None);
        self.route();
        id
    }

    pub fn set_param(&mut self, id: &str, name: &str, value: impl Into<ParamValue>) -> Result<(), EditError> {
        let result = self.state.store.set_param(id, name, value.into());
        self.route();
        result
    }

    pub fn set_param_text(&mut self, id: &str, name: &str, text: &str) -> Result<(), EditError> {
        let result = self.state.store.set_param_from_text(id, name, text);
        self.route();
        result
    }

    pub fn rebuild(&mut self, id: &str) -> bool {
        let ok = self.state.store.rebuild_entity(id);
        self.route();
        ok
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let ok = self.state.store.delete_entity(id);
        self.route();
        ok
    }

    /// Remove every entity; undo brings them back
    pub fn delete_all(&mut self) {
        self.state.clear_entities(self.now);
    }

    pub fn duplicate(&mut self, id: &str) -> Option<String> {
        let copy = self.state.store.duplicate_entity(id);
        self.route();
        copy
    }

    pub fn select(&mut self, id: Option<&str>) -> bool {
        let changed = self.state.store.select_entity(id);
        self.route();
        changed
    }

    pub fn set_transform(&mut self, id: &str, transform: Transform) -> bool {
        let ok = self.state.store.set_entity_transform(id, transform);
        self.route();
        ok
    }

    pub fn nest(&mut self, child: &str, parent: Option<&str>) -> bool {
        let ok = self.state.store.attach_entity_to(child, parent);
        self.route();
        ok
    }

    pub fn undo(&mut self) -> bool {
        self.state.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.state.redo()
    }

    /// Clear the entire scene and history
    pub fn clear(&mut self) {
        self.state.reset();
    }

    // ── Project ───────────────────────────────────────────────

    pub fn load_project_json(&mut self, json: &str) -> Result<LoadReport, PersistenceError> {
        self.state.load_project(json)
    }

    pub fn export_project_json(&self) -> Result<String, PersistenceError> {
        self.state.store.serialize_state()
    }

    /// Visual graph under the scene root
    pub fn export_scene_graph(&self) -> Vec<SceneNodeData> {
        let graph = self.state.store.graph();
        graph.export_children(graph.root())
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.state.store.get_entity(id)
    }

    pub fn entity_count(&self) -> usize {
        self.state.store.entity_count()
    }

    pub fn entity_ids(&self) -> Vec<String> {
        self.state.store.get_entities().map(|e| e.id.clone()).collect()
    }

    pub fn param(&self, id: &str, name: &str) -> Option<&ParamValue> {
        self.entity(id)?.params.get(name)
    }

    pub fn transform(&self, id: &str) -> Option<Transform> {
        self.state.store.entity_transform(id)
    }

    pub fn selected(&self) -> Option<&str> {
        self.state.store.selected_id()
    }

    pub fn history_labels(&self) -> Vec<&str> {
        self.state.history.labels()
    }

    /// Live geometry + material handles
    pub fn live_resources(&self) -> usize {
        let stats = self.state.store.graph().resource_stats();
        stats.geometries + stats.materials
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
