//! Live scene graph: the visual side of every entity.
//!
//! Builders produce detached [`shared::SceneNodeData`] trees; the graph
//! instantiates them, owns their drawable resources and releases them when a
//! subtree is removed.

mod graph;
mod resources;

pub use graph::{Node, NodeId, NodeKind, SceneGraph};
pub use resources::{GeometryHandle, MaterialHandle, ResourcePool, ResourceStats};
