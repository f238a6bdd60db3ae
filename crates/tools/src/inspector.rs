use boxscene_common::NodeId;
use boxscene_scene::Scene;

/// Read-only queries against the scene for debugging and the developer UI.
pub struct SceneInspector;

impl SceneInspector {
    pub fn summary(scene: &Scene) -> SceneSummary {
        SceneSummary {
            node_count: scene.len(),
            drawable_count: scene.iter().filter(|n| n.kind.is_drawable()).count(),
            visible_drawables: scene
                .iter()
                .filter(|n| n.visible && n.kind.is_drawable())
                .count(),
            light_count: scene.iter().filter(|n| n.kind.is_light()).count(),
        }
    }

    pub fn inspect_node(scene: &Scene, id: NodeId) -> Option<NodeInfo> {
        scene.get(id).map(|node| {
            let p = node.transform.position;
            let s = node.transform.scale;
            NodeInfo {
                id,
                name: node.name.clone(),
                kind: node.kind.type_name(),
                position: [p.x, p.y, p.z],
                scale: [s.x, s.y, s.z],
                visible: node.visible,
                render_order: node.render_order,
            }
        })
    }

    /// Every node, in insertion order.
    pub fn list_nodes(scene: &Scene) -> Vec<NodeInfo> {
        scene
            .iter()
            .filter_map(|n| Self::inspect_node(scene, n.id))
            .collect()
    }
}

/// Counts for the inspector header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSummary {
    pub node_count: usize,
    pub drawable_count: usize,
    pub visible_drawables: usize,
    pub light_count: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: nodes={} drawables={} visible={} lights={}",
            self.node_count, self.drawable_count, self.visible_drawables, self.light_count
        )
    }
}

#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub kind: &'static str,
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub visible: bool,
    pub render_order: i32,
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {:<16} {:<16} pos=({:.2}, {:.2}, {:.2}) visible={} order={}",
            self.id,
            self.name,
            self.kind,
            self.position[0],
            self.position[1],
            self.position[2],
            self.visible,
            self.render_order,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxscene_scene::{SceneConfig, assemble};

    #[test]
    fn summary_empty_scene() {
        let summary = SceneInspector::summary(&Scene::new());
        assert_eq!(summary.node_count, 0);
        assert_eq!(summary.light_count, 0);
    }

    #[test]
    fn summary_demo_scene() {
        let (mut scene, _, h) = assemble(&SceneConfig::default());
        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.node_count, 7);
        assert_eq!(summary.drawable_count, 4);
        assert_eq!(summary.visible_drawables, 4);
        assert_eq!(summary.light_count, 2);

        scene.get_mut(h.box1).unwrap().visible = false;
        assert_eq!(SceneInspector::summary(&scene).visible_drawables, 3);
    }

    #[test]
    fn inspect_node_found() {
        let (scene, _, h) = assemble(&SceneConfig::default());
        let info = SceneInspector::inspect_node(&scene, h.box2).unwrap();
        assert_eq!(info.position, [1.5, 0.0, 0.0]);
        assert_eq!(info.kind, "Mesh");
        assert_eq!(info.name, "Box 2");
    }

    #[test]
    fn inspect_node_not_found() {
        let scene = Scene::new();
        assert!(SceneInspector::inspect_node(&scene, NodeId::new()).is_none());
    }

    #[test]
    fn list_nodes_in_order() {
        let (scene, _, h) = assemble(&SceneConfig::default());
        let nodes = SceneInspector::list_nodes(&scene);
        assert_eq!(nodes.len(), 7);
        assert_eq!(nodes[0].id, h.box1);
        assert_eq!(nodes[4].id, h.grid);
    }

    #[test]
    fn displays() {
        let (scene, _, h) = assemble(&SceneConfig::default());
        let s = SceneInspector::summary(&scene).to_string();
        assert!(s.contains("nodes=7"));
        let info = SceneInspector::inspect_node(&scene, h.box1).unwrap().to_string();
        assert!(info.contains("Box 1"));
        assert!(info.contains("visible=true"));
    }
}
