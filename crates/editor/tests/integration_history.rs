//! Integration tests for undo/redo through the harness.

use scene_editor_lib::fixtures::stub_registry;
use scene_editor_lib::harness::TestHarness;
use shared::{ParamValue, SceneNodeData, Transform};

#[test]
fn test_single_push_cannot_undo() {
    let mut h = TestHarness::new();
    assert_eq!(h.history_labels().len(), 1);
    assert!(!h.undo());
    assert!(!h.redo());
}

#[test]
fn test_rapid_edits_make_one_entry() {
    let mut h = TestHarness::new();
    let id = h.add("truss").unwrap();
    let before = h.history_labels().len();

    for i in 0..10 {
        h.set_param(&id, "length", 6.0 + i as f64).unwrap();
        h.advance(20);
    }
    assert_eq!(h.history_labels().len(), before);
    assert!(h.settle());
    assert_eq!(h.history_labels().len(), before + 1);
    assert!(!h.settle());
}

#[test]
fn test_gizmo_drag_coalesces_into_transform_entry() {
    let mut h = TestHarness::new();
    let id = h.add("box").unwrap();
    for step in 1..=5 {
        h.set_transform(&id, Transform::from_position(step as f64, 0.0, 0.0));
        h.advance(50);
    }
    h.settle();
    assert_eq!(h.history_labels(), ["Initial", "Add Box", "Transform"]);

    assert!(h.undo());
    assert!(h.transform(&id).unwrap().is_identity());
    assert!(h.redo());
    assert_eq!(h.transform(&id).unwrap().position, [5.0, 0.0, 0.0]);
}

#[test]
fn test_drag_to_infinity_is_ignored() {
    let mut h = TestHarness::new();
    let id = h.add("box").unwrap();
    assert!(h.set_transform(&id, Transform::from_position(2.0, 0.0, 0.0)));
    assert!(!h.set_transform(&id, Transform::from_position(f64::INFINITY, 0.0, 0.0)));
    h.settle();
    h.add("sphere");

    assert!(h.undo());
    assert_eq!(h.entity_count(), 1);
    assert_eq!(h.transform(&id).unwrap().position, [2.0, 0.0, 0.0]);

    let json = h.export_project_json().unwrap();
    let mut reloaded = TestHarness::new();
    assert_eq!(reloaded.load_project_json(&json).unwrap().loaded, 1);
    assert_eq!(reloaded.transform(&id).unwrap().position, [2.0, 0.0, 0.0]);
}

#[test]
fn test_delete_cancels_pending_edit() {
    let mut h = TestHarness::new();
    let a = h.add("box").unwrap();
    let b = h.add("sphere").unwrap();
    h.set_param(&a, "width", 3.0).unwrap();
    h.delete(&b);
    h.settle();

    // The edit is captured by the delete snapshot, not as its own entry
    assert_eq!(
        h.history_labels(),
        ["Initial", "Add Box", "Add Sphere", "Delete Sphere"]
    );
    assert_eq!(h.param(&a, "width"), Some(&ParamValue::Number(3.0)));
}

#[test]
fn test_undo_walks_back_to_baseline() {
    let mut h = TestHarness::new();
    let id = h.add("tower").unwrap();
    h.set_param(&id, "roof", "dome").unwrap();
    h.settle();
    let copy = h.duplicate(&id).unwrap();
    h.delete(&id);

    assert!(h.undo());
    assert!(h.entity(&id).is_some());
    assert!(h.undo());
    assert!(h.entity(&copy).is_none());
    assert!(h.undo());
    assert_eq!(h.param(&id, "roof"), Some(&ParamValue::Text("pyramid".into())));
    assert!(h.undo());
    assert_eq!(h.entity_count(), 0);
    assert!(!h.undo());
    assert_eq!(h.live_resources(), 0);

    while h.redo() {}
    assert!(h.entity(&id).is_none());
    assert!(h.entity(&copy).is_some());
}

#[test]
fn test_undo_restores_selection_free_scene() {
    let mut h = TestHarness::new();
    let id = h.add("door").unwrap();
    assert_eq!(h.selected(), Some(id.as_str()));
    h.add("window");
    h.undo();
    assert_eq!(h.selected(), None);
    assert_eq!(h.state.store.gizmo().attached(), None);
}

#[test]
fn test_ids_not_reused_after_undo() {
    let mut h = TestHarness::new();
    let first = h.add("box").unwrap();
    let second = h.add("box").unwrap();
    h.undo();
    let third = h.add("box").unwrap();
    assert_ne!(third, first);
    assert_ne!(third, second);
}

#[test]
fn test_redo_cleared_by_new_action() {
    let mut h = TestHarness::new();
    h.add("box");
    h.undo();
    h.add("sphere");
    assert!(!h.redo());
}

#[test]
fn test_restore_drops_foreign_nodes() {
    let mut h = TestHarness::with_registry(stub_registry());
    h.add("block");
    let root = h.state.store.graph().root();
    let helper = h
        .state
        .store
        .graph_mut()
        .instantiate(&SceneNodeData::group("grid helper"));
    h.state.store.graph_mut().attach(root, helper);
    h.add("block");

    assert!(h.undo());
    assert!(!h.state.store.graph().contains(helper));
    assert_eq!(h.state.store.graph().children(root).len(), 1);
}

#[test]
fn test_nested_entities_survive_undo() {
    let mut h = TestHarness::with_registry(stub_registry());
    let parent = h.add("block").unwrap();
    let child = h.add("fragile").unwrap();
    h.nest(&child, Some(&parent));
    h.add("block");

    assert!(h.undo());
    assert_eq!(h.state.store.parent_entity(&child), Some(parent.as_str()));
}

#[test]
fn test_capacity_from_settings() {
    let mut settings = scene_editor_lib::state::EditorSettings::default();
    settings.history.capacity = 3;
    let mut h = TestHarness::with_settings(stub_registry(), settings);
    for _ in 0..5 {
        h.add("block");
    }
    assert_eq!(h.history_labels().len(), 3);
    assert!(h.undo());
    assert!(h.undo());
    assert!(!h.undo());
    assert_eq!(h.entity_count(), 3);
}
