// Library crate: the headless editor core. Exposes every module for the
// CLI binary, the command protocol and integration tests.

pub mod build;
pub mod command;
pub mod events;
pub mod fixtures;
pub mod harness;
pub mod registry;
pub mod scene_graph;
pub mod state;

/// Manipulation gizmo seen by the store. Interaction math lives in the
/// viewport, outside this crate.
pub mod viewport {
    pub mod gizmo;
}
