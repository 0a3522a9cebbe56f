//! Arena-backed scene graph with a single root

use std::collections::HashMap;

use glam::{DMat4, DQuat, DVec3, EulerRot};
use shared::{NodeKindDesc, SceneNodeData, Transform};

use super::resources::{GeometryHandle, MaterialHandle, ResourcePool, ResourceStats};

/// Identifier of a node in the scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Live node payload
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh {
        geometry: GeometryHandle,
        material: MaterialHandle,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Scene graph: the root is the sole ancestor of every attached node.
/// Detached subtrees live in the arena until removed.
pub struct SceneGraph {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
    resources: ResourcePool,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                name: "Scene".to_string(),
                transform: Transform::new(),
                kind: NodeKind::Group,
                parent: None,
                children: Vec::new(),
            },
        );
        Self {
            nodes,
            root,
            next_id: 1,
            resources: ResourcePool::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn transform(&self, id: NodeId) -> Option<&Transform> {
        self.nodes.get(&id).map(|n| &n.transform)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.transform = transform;
                true
            }
            None => false,
        }
    }

    pub fn resource_stats(&self) -> ResourceStats {
        self.resources.stats()
    }

    pub fn resources(&self) -> &ResourcePool {
        &self.resources
    }

    /// Create a detached subtree from builder output, allocating resources
    pub fn instantiate(&mut self, data: &SceneNodeData) -> NodeId {
        let kind = match &data.kind {
            NodeKindDesc::Group => NodeKind::Group,
            NodeKindDesc::Mesh { geometry, material } => NodeKind::Mesh {
                geometry: self.resources.alloc_geometry(geometry.clone()),
                material: self.resources.alloc_material(material.clone()),
            },
        };

        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                name: data.name.clone(),
                transform: data.transform.clone(),
                kind,
                parent: None,
                children: Vec::with_capacity(data.children.len()),
            },
        );

        for child in &data.children {
            let child_id = self.instantiate(child);
            self.link(id, child_id);
        }

        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(child);
        }
    }

    /// Is `ancestor` on the parent chain of `id` (or `id` itself)?
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent_of(n);
        }
        false
    }

    /// Attach `child` under `parent`, detaching it from any previous parent.
    /// Refuses to attach the root or to create a cycle.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> bool {
        if child == self.root
            || !self.contains(parent)
            || !self.contains(child)
            || self.is_ancestor(child, parent)
        {
            tracing::warn!("refusing to attach {} under {}", child, parent);
            return false;
        }
        self.detach(child);
        self.link(parent, child);
        true
    }

    /// Attach at a given position among the parent's children (clamped)
    pub fn attach_at(&mut self, parent: NodeId, child: NodeId, index: usize) -> bool {
        if !self.attach(parent, child) {
            return false;
        }
        if let Some(p) = self.nodes.get_mut(&parent) {
            if let Some(last) = p.children.pop() {
                let i = index.min(p.children.len());
                p.children.insert(i, last);
            }
        }
        true
    }

    /// Detach a node from its parent. The subtree stays alive in the arena.
    pub fn detach(&mut self, child: NodeId) -> bool {
        let Some(parent) = self.parent_of(child) else {
            return false;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|c| *c != child);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = None;
        }
        true
    }

    /// All node ids in the subtree rooted at `id` (pre-order)
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let Some(node) = self.nodes.get(&n) {
                out.push(n);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Detach and destroy a subtree, releasing every geometry and material in it.
    /// Returns the number of nodes removed.
    pub fn remove_subtree(&mut self, id: NodeId) -> usize {
        if id == self.root {
            return self.clear_children(id);
        }
        self.detach(id);

        let ids = self.subtree(id);
        for n in &ids {
            if let Some(node) = self.nodes.remove(n) {
                if let NodeKind::Mesh { geometry, material } = node.kind {
                    self.resources.release_geometry(geometry);
                    self.resources.release_material(material);
                }
            }
        }
        ids.len()
    }

    /// Remove every child subtree of `parent`
    pub fn clear_children(&mut self, parent: NodeId) -> usize {
        let children = self.children(parent).to_vec();
        children.into_iter().map(|c| self.remove_subtree(c)).sum()
    }

    /// Local transform as a matrix (scale, then XYZ rotation, then translation)
    pub fn local_matrix(transform: &Transform) -> DMat4 {
        let [rx, ry, rz] = transform.rotation;
        DMat4::from_scale_rotation_translation(
            DVec3::from_array(transform.scale),
            DQuat::from_euler(EulerRot::XYZ, rx, ry, rz),
            DVec3::from_array(transform.position),
        )
    }

    /// World matrix of a node, composed along its parent chain
    pub fn world_matrix(&self, id: NodeId) -> Option<DMat4> {
        let mut node = self.nodes.get(&id)?;
        let mut matrix = Self::local_matrix(&node.transform);
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            matrix = Self::local_matrix(&node.transform) * matrix;
        }
        Some(matrix)
    }

    /// World-space position of a node's origin
    pub fn world_position(&self, id: NodeId) -> Option<DVec3> {
        self.world_matrix(id)
            .map(|m| m.transform_point3(DVec3::ZERO))
    }

    /// Serialize a subtree back into builder-style data
    pub fn export_subtree(&self, id: NodeId) -> Option<SceneNodeData> {
        let node = self.nodes.get(&id)?;
        let kind = match &node.kind {
            NodeKind::Group => NodeKindDesc::Group,
            NodeKind::Mesh { geometry, material } => NodeKindDesc::Mesh {
                geometry: self.resources.geometry(*geometry)?.clone(),
                material: self.resources.material(*material)?.clone(),
            },
        };
        Some(SceneNodeData {
            name: node.name.clone(),
            transform: node.transform.clone(),
            kind,
            children: node
                .children
                .iter()
                .filter_map(|c| self.export_subtree(*c))
                .collect(),
        })
    }

    /// Serialize every child of `parent`
    pub fn export_children(&self, parent: NodeId) -> Vec<SceneNodeData> {
        self.children(parent)
            .iter()
            .filter_map(|c| self.export_subtree(*c))
            .collect()
    }

    /// Instantiate and attach a list of subtrees under `parent`
    pub fn import_children(&mut self, parent: NodeId, data: &[SceneNodeData]) -> Vec<NodeId> {
        data.iter()
            .map(|d| {
                let id = self.instantiate(d);
                self.attach(parent, id);
                id
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{GeometryDesc, MaterialDesc};

    fn cube(name: &str) -> SceneNodeData {
        SceneNodeData::mesh(
            name,
            GeometryDesc::Box {
                width: 1.0,
                height: 1.0,
                depth: 1.0,
            },
            MaterialDesc::solid([200, 200, 200]),
        )
    }

    fn two_cubes() -> SceneNodeData {
        SceneNodeData::group("pair")
            .with_child(cube("a"))
            .with_child(cube("b").at(2.0, 0.0, 0.0))
    }

    #[test]
    fn test_new_graph_has_only_root() {
        let g = SceneGraph::new();
        assert_eq!(g.node_count(), 1);
        assert!(g.children(g.root()).is_empty());
        assert!(g.resource_stats().is_empty());
    }

    #[test]
    fn test_instantiate_is_detached() {
        let mut g = SceneGraph::new();
        let id = g.instantiate(&two_cubes());
        assert_eq!(g.node_count(), 4);
        assert!(g.parent_of(id).is_none());
        assert_eq!(g.children(id).len(), 2);
        assert_eq!(g.resource_stats().geometries, 2);
        assert_eq!(g.resource_stats().materials, 2);
    }

    #[test]
    fn test_attach_and_detach() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let id = g.instantiate(&cube("c"));
        assert!(g.attach(root, id));
        assert_eq!(g.parent_of(id), Some(root));
        assert_eq!(g.children(root), &[id]);

        assert!(g.detach(id));
        assert!(g.children(root).is_empty());
        assert!(!g.detach(id));
    }

    #[test]
    fn test_attach_moves_between_parents() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let a = g.instantiate(&SceneNodeData::group("a"));
        let b = g.instantiate(&SceneNodeData::group("b"));
        let c = g.instantiate(&cube("c"));
        g.attach(root, a);
        g.attach(root, b);
        g.attach(a, c);
        assert!(g.attach(b, c));
        assert!(g.children(a).is_empty());
        assert_eq!(g.children(b), &[c]);
    }

    #[test]
    fn test_attach_at_keeps_position() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let ids = g.import_children(root, &[cube("a"), cube("b"), cube("c")]);
        let d = g.instantiate(&cube("d"));
        assert!(g.attach_at(root, d, 1));
        assert_eq!(g.children(root), &[ids[0], d, ids[1], ids[2]]);

        let e = g.instantiate(&cube("e"));
        assert!(g.attach_at(root, e, 99));
        assert_eq!(*g.children(root).last().unwrap(), e);
    }

    #[test]
    fn test_attach_rejects_cycles_and_root() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let a = g.instantiate(&SceneNodeData::group("a"));
        let b = g.instantiate(&SceneNodeData::group("b"));
        g.attach(root, a);
        g.attach(a, b);
        assert!(!g.attach(b, a));
        assert!(!g.attach(a, a));
        assert!(!g.attach(a, root));
    }

    #[test]
    fn test_remove_subtree_releases_resources() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let id = g.instantiate(&two_cubes());
        g.attach(root, id);

        assert_eq!(g.remove_subtree(id), 3);
        assert_eq!(g.node_count(), 1);
        assert!(g.resource_stats().is_empty());
        assert!(g.children(root).is_empty());
    }

    #[test]
    fn test_clear_children_keeps_root() {
        let mut g = SceneGraph::new();
        let root = g.root();
        g.import_children(root, &[two_cubes(), cube("x")]);
        assert_eq!(g.children(root).len(), 2);

        assert_eq!(g.remove_subtree(root), 4);
        assert!(g.contains(root));
        assert_eq!(g.node_count(), 1);
        assert!(g.resource_stats().is_empty());
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let mut parent = SceneNodeData::group("parent").at(1.0, 0.0, 0.0);
        parent.transform.scale = [2.0, 2.0, 2.0];
        let parent = parent.with_child(cube("child").at(1.0, 1.0, 0.0));
        let ids = g.import_children(root, &[parent]);
        let child = g.children(ids[0])[0];

        let p = g.world_position(child).unwrap();
        assert!((p - DVec3::new(3.0, 2.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_world_matrix_rotation() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let parent = SceneNodeData::group("p")
            .rotated(0.0, 0.0, std::f64::consts::FRAC_PI_2)
            .with_child(cube("c").at(1.0, 0.0, 0.0));
        let ids = g.import_children(root, &[parent]);
        let child = g.children(ids[0])[0];

        let p = g.world_position(child).unwrap();
        assert!((p - DVec3::new(0.0, 1.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut g = SceneGraph::new();
        let root = g.root();
        g.import_children(root, &[two_cubes(), cube("solo").at(0.0, 3.0, 0.0)]);
        let exported = g.export_children(root);
        assert_eq!(exported, vec![two_cubes(), cube("solo").at(0.0, 3.0, 0.0)]);

        let mut other = SceneGraph::new();
        let other_root = other.root();
        other.import_children(other_root, &exported);
        assert_eq!(other.export_children(other_root), exported);
        assert_eq!(other.node_count(), g.node_count());
    }
}
