use crate::camera::PerspectiveCamera;
use crate::config::SceneConfig;
use crate::scene::{BasicMaterial, BoxGeometry, Node, NodeKind, Scene};
use boxscene_common::{Color, NodeId, Transform};
use glam::Vec3;

/// Ids of the nodes created by [`assemble`], for callers that bind to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneHandles {
    pub box1: NodeId,
    pub box2: NodeId,
    pub camera: NodeId,
    pub axes: NodeId,
    pub grid: NodeId,
    pub ambient_light: NodeId,
    pub hemisphere_light: NodeId,
}

/// Build the demo scene and its camera.
///
/// Two cubes sharing one geometry (orange at the origin, blue offset along
/// +X), the camera marker, axes and grid helpers drawn on top of everything,
/// then an ambient and a hemisphere light.
pub fn assemble(config: &SceneConfig) -> (Scene, PerspectiveCamera, SceneHandles) {
    let mut scene = Scene::new();
    let geometry = BoxGeometry::cube(config.box_size);

    let box1 = scene.add(Node::new(
        "Box 1",
        NodeKind::Mesh {
            geometry,
            material: BasicMaterial::new(config.box1_color),
        },
    ));

    let mut box2_transform = Transform::default();
    box2_transform.position.x += config.box2_offset_x;
    let box2 = scene.add(
        Node::new(
            "Box 2",
            NodeKind::Mesh {
                geometry,
                material: BasicMaterial::new(config.box2_color),
            },
        )
        .with_transform(box2_transform),
    );

    let mut camera = PerspectiveCamera::new(config.camera_fov_degrees, config.initial_aspect());
    camera.near = config.camera_near;
    camera.far = config.camera_far;
    camera.position = Vec3::new(0.0, 0.0, config.camera_distance);
    camera.update_projection_matrix();

    let camera_node = scene.add(
        Node::new("Camera", NodeKind::Camera).with_transform(Transform::from_position(camera.position)),
    );

    let axes = scene.add(
        Node::new(
            "Axes",
            NodeKind::AxesHelper {
                size: config.axes_size,
                depth_test: false,
            },
        )
        .with_render_order(2),
    );

    let grid = scene.add(
        Node::new(
            "Grid",
            NodeKind::GridHelper {
                size: config.grid_size,
                divisions: config.grid_divisions,
                center_color: Color::from_hex(0x444444),
                grid_color: Color::from_hex(0x888888),
                depth_test: false,
            },
        )
        .with_render_order(1),
    );

    let ambient_light = scene.add(Node::new(
        "Ambient Light",
        NodeKind::AmbientLight {
            color: config.light_color,
            intensity: config.light_intensity,
        },
    ));

    let hemisphere_light = scene.add(Node::new(
        "Hemisphere Light",
        NodeKind::HemisphereLight {
            sky_color: config.sky_color,
            ground_color: config.ground_color,
            intensity: config.light_intensity,
        },
    ));

    tracing::info!(nodes = scene.len(), "scene assembled");

    let handles = SceneHandles {
        box1,
        box2,
        camera: camera_node,
        axes,
        grid,
        ambient_light,
        hemisphere_light,
    };
    (scene, camera, handles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxes_are_placed() {
        let (scene, _, handles) = assemble(&SceneConfig::default());
        let box1 = scene.get(handles.box1).unwrap();
        let box2 = scene.get(handles.box2).unwrap();
        assert_eq!(box1.transform.position, Vec3::ZERO);
        assert_eq!(box2.transform.position.x, 1.5);
        assert!(box1.visible && box2.visible);
    }

    #[test]
    fn assembly_order_is_fixed() {
        let (scene, _, h) = assemble(&SceneConfig::default());
        assert_eq!(
            scene.ids(),
            vec![h.box1, h.box2, h.camera, h.axes, h.grid, h.ambient_light, h.hemisphere_light]
        );
        let names: Vec<&str> = scene.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names[0], "Box 1");
        assert_eq!(names[6], "Hemisphere Light");
    }

    #[test]
    fn boxes_share_geometry_with_distinct_materials() {
        let (scene, _, h) = assemble(&SceneConfig::default());
        let parts = |id| match &scene.get(id).unwrap().kind {
            NodeKind::Mesh { geometry, material } => (*geometry, *material),
            other => panic!("expected mesh, got {other:?}"),
        };
        let (g1, m1) = parts(h.box1);
        let (g2, m2) = parts(h.box2);
        assert_eq!(g1, g2);
        assert_eq!(g1, BoxGeometry::cube(0.5));
        assert_eq!(m1.color.to_hex(), 0xffa500);
        assert_eq!(m2.color.to_hex(), 0x0000ff);
    }

    #[test]
    fn helpers_skip_depth_test_and_draw_last() {
        let (scene, _, h) = assemble(&SceneConfig::default());
        let axes = scene.get(h.axes).unwrap();
        let grid = scene.get(h.grid).unwrap();
        assert_eq!(axes.render_order, 2);
        assert_eq!(grid.render_order, 1);
        assert!(matches!(axes.kind, NodeKind::AxesHelper { depth_test: false, .. }));
        assert!(matches!(grid.kind, NodeKind::GridHelper { depth_test: false, .. }));
    }

    #[test]
    fn lights_are_present() {
        let (scene, _, h) = assemble(&SceneConfig::default());
        match scene.get(h.hemisphere_light).unwrap().kind {
            NodeKind::HemisphereLight {
                sky_color,
                ground_color,
                intensity,
            } => {
                assert_eq!(sky_color.to_hex(), 0xb1e1ff);
                assert_eq!(ground_color.to_hex(), 0xb97a20);
                assert_eq!(intensity, 1.0);
            }
            ref other => panic!("expected hemisphere light, got {other:?}"),
        }
        assert_eq!(scene.iter().filter(|n| n.kind.is_light()).count(), 2);
    }

    #[test]
    fn camera_frames_the_scene() {
        let (scene, camera, h) = assemble(&SceneConfig::default());
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(camera.fov_degrees, 75.0);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(scene.get(h.camera).unwrap().transform.position, camera.position);
    }

    #[test]
    fn config_changes_flow_through() {
        let config = SceneConfig {
            box2_offset_x: -2.0,
            camera_distance: 5.0,
            ..SceneConfig::default()
        };
        let (scene, camera, h) = assemble(&config);
        assert_eq!(scene.get(h.box2).unwrap().transform.position.x, -2.0);
        assert_eq!(camera.position.z, 5.0);
    }
}
