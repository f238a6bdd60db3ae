use boxscene_common::{Color, NodeId, Transform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Axis-aligned box centred on the local origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxGeometry {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl BoxGeometry {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn cube(size: f32) -> Self {
        Self::new(size, size, size)
    }
}

/// Unlit material: the colour is drawn as-is, lights do not affect it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasicMaterial {
    pub color: Color,
    pub depth_test: bool,
}

impl BasicMaterial {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            depth_test: true,
        }
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Mesh {
        geometry: BoxGeometry,
        material: BasicMaterial,
    },
    /// Marks where the camera was attached to the graph.
    Camera,
    /// Red/green/blue lines along +X/+Y/+Z.
    AxesHelper { size: f32, depth_test: bool },
    /// Square line grid on the XZ plane.
    GridHelper {
        size: f32,
        divisions: u32,
        center_color: Color,
        grid_color: Color,
        depth_test: bool,
    },
    AmbientLight { color: Color, intensity: f32 },
    HemisphereLight {
        sky_color: Color,
        ground_color: Color,
        intensity: f32,
    },
}

impl NodeKind {
    /// Whether the node produces geometry when rendered.
    pub fn is_drawable(&self) -> bool {
        matches!(
            self,
            Self::Mesh { .. } | Self::AxesHelper { .. } | Self::GridHelper { .. }
        )
    }

    pub fn is_light(&self) -> bool {
        matches!(self, Self::AmbientLight { .. } | Self::HemisphereLight { .. })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Mesh { .. } => "Mesh",
            Self::Camera => "Camera",
            Self::AxesHelper { .. } => "AxesHelper",
            Self::GridHelper { .. } => "GridHelper",
            Self::AmbientLight { .. } => "AmbientLight",
            Self::HemisphereLight { .. } => "HemisphereLight",
        }
    }
}

/// A single entry in the scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub visible: bool,
    /// Draw order among drawables; lower draws first.
    pub render_order: i32,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            kind,
            transform: Transform::default(),
            visible: true,
            render_order: 0,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_render_order(mut self, order: i32) -> Self {
        self.render_order = order;
        self
    }
}

/// Insertion-ordered, append-only scene graph.
///
/// No removal API. Membership is fixed once assembly finishes; node
/// properties stay editable through [`Scene::get_mut`].
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    index: BTreeMap<NodeId, usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its id.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = node.id;
        tracing::debug!(node = %id, name = %node.name, kind = node.kind.type_name(), "node added");
        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.index.get(&id).map(|&i| &mut self.nodes[i])
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    /// First node with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Position of a node in insertion order.
    pub fn position_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn mesh(name: &str) -> Node {
        Node::new(
            name,
            NodeKind::Mesh {
                geometry: BoxGeometry::cube(0.5),
                material: BasicMaterial::new(Color::WHITE),
            },
        )
    }

    #[test]
    fn add_preserves_insertion_order() {
        let mut scene = Scene::new();
        let a = scene.add(mesh("a"));
        let b = scene.add(mesh("b"));
        let c = scene.add(Node::new("light", NodeKind::AmbientLight {
            color: Color::WHITE,
            intensity: 1.0,
        }));

        assert_eq!(scene.ids(), vec![a, b, c]);
        assert_eq!(scene.position_of(c), Some(2));
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut scene = Scene::new();
        let id = scene.add(mesh("box"));
        scene.get_mut(id).unwrap().transform.position = Vec3::new(0.0, 2.0, 0.0);
        scene.get_mut(id).unwrap().visible = false;

        let node = scene.get(id).unwrap();
        assert_eq!(node.transform.position.y, 2.0);
        assert!(!node.visible);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn unknown_id_is_none() {
        let scene = Scene::new();
        assert!(scene.get(NodeId::new()).is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn find_by_name_returns_first_match() {
        let mut scene = Scene::new();
        let first = scene.add(mesh("dup"));
        scene.add(mesh("dup"));
        assert_eq!(scene.find_by_name("dup").unwrap().id, first);
        assert!(scene.find_by_name("missing").is_none());
    }

    #[test]
    fn kind_classification() {
        assert!(mesh("m").kind.is_drawable());
        assert!(!NodeKind::Camera.is_drawable());
        let light = NodeKind::HemisphereLight {
            sky_color: Color::WHITE,
            ground_color: Color::BLACK,
            intensity: 1.0,
        };
        assert!(light.is_light());
        assert!(!light.is_drawable());
        assert_eq!(light.type_name(), "HemisphereLight");
    }
}
