use crate::scene_graph::NodeId;

/// Transform-manipulation gizmo as seen by the entity store.
///
/// The store attaches it to the selected entity's node and re-attaches it
/// after every rebuild of that entity.
pub trait ManipulationGizmo {
    fn attach(&mut self, node: NodeId);
    fn detach(&mut self);
    fn attached(&self) -> Option<NodeId>;
}

/// Which axis a gizmo handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}

impl GizmoAxis {
    /// World-space translation of `amount` along this axis
    pub fn delta(self, amount: f64) -> [f64; 3] {
        match self {
            GizmoAxis::X => [amount, 0.0, 0.0],
            GizmoAxis::Y => [0.0, amount, 0.0],
            GizmoAxis::Z => [0.0, 0.0, amount],
        }
    }
}

/// State of the translation gizmo
#[derive(Debug, Default)]
pub struct TransformGizmo {
    target: Option<NodeId>,
    /// Currently dragged axis
    pub active_axis: Option<GizmoAxis>,
    /// Whether a gizmo drag is in progress
    pub dragging: bool,
    /// Number of attach calls, for diagnostics
    attach_count: u64,
}

impl TransformGizmo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_drag(&mut self, axis: GizmoAxis) -> bool {
        if self.target.is_none() {
            return false;
        }
        self.active_axis = Some(axis);
        self.dragging = true;
        true
    }

    pub fn end_drag(&mut self) {
        self.active_axis = None;
        self.dragging = false;
    }

    pub fn attach_count(&self) -> u64 {
        self.attach_count
    }
}

impl ManipulationGizmo for TransformGizmo {
    fn attach(&mut self, node: NodeId) {
        self.target = Some(node);
        self.attach_count += 1;
    }

    fn detach(&mut self) {
        self.target = None;
        self.end_drag();
    }

    fn attached(&self) -> Option<NodeId> {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::SceneGraph;

    #[test]
    fn test_attach_detach() {
        let g = SceneGraph::new();
        let mut gizmo = TransformGizmo::new();
        assert!(gizmo.attached().is_none());

        gizmo.attach(g.root());
        assert_eq!(gizmo.attached(), Some(g.root()));
        assert_eq!(gizmo.attach_count(), 1);

        gizmo.detach();
        assert!(gizmo.attached().is_none());
    }

    #[test]
    fn test_drag_requires_target() {
        let g = SceneGraph::new();
        let mut gizmo = TransformGizmo::new();
        assert!(!gizmo.begin_drag(GizmoAxis::X));

        gizmo.attach(g.root());
        assert!(gizmo.begin_drag(GizmoAxis::Y));
        assert!(gizmo.dragging);

        // Detaching mid-drag ends the drag
        gizmo.detach();
        assert!(!gizmo.dragging);
        assert!(gizmo.active_axis.is_none());
    }

    #[test]
    fn test_axis_delta() {
        assert_eq!(GizmoAxis::Z.delta(2.5), [0.0, 0.0, 2.5]);
    }
}
