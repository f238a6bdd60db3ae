use boxscene_common::NodeId;
use boxscene_scene::{Node, NodeKind, Scene};
use glam::Mat4;

/// One visible drawable, resolved for a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub kind: NodeKind,
    pub model: Mat4,
    pub render_order: i32,
    pub depth_test: bool,
}

impl DrawItem {
    fn from_node(node: &Node) -> Self {
        let depth_test = match &node.kind {
            NodeKind::Mesh { material, .. } => material.depth_test,
            NodeKind::AxesHelper { depth_test, .. } | NodeKind::GridHelper { depth_test, .. } => {
                *depth_test
            }
            _ => true,
        };
        Self {
            node: node.id,
            kind: node.kind.clone(),
            model: node.transform.matrix(),
            render_order: node.render_order,
            depth_test,
        }
    }
}

/// Visible drawables of a scene, in draw order.
///
/// Sorted by `render_order`, ties keep insertion order. Hidden nodes, lights
/// and the camera marker are left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderList {
    items: Vec<DrawItem>,
}

impl RenderList {
    pub fn collect(scene: &Scene) -> Self {
        let mut items: Vec<DrawItem> = scene
            .iter()
            .filter(|n| n.visible && n.kind.is_drawable())
            .map(DrawItem::from_node)
            .collect();
        // Stable sort keeps insertion order within a render_order bucket.
        items.sort_by_key(|item| item.render_order);
        Self { items }
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.items.iter().any(|item| item.node == id)
    }

    /// Mesh items only.
    pub fn meshes(&self) -> impl Iterator<Item = &DrawItem> {
        self.items
            .iter()
            .filter(|item| matches!(item.kind, NodeKind::Mesh { .. }))
    }
}
