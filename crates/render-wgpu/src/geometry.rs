//! CPU-side vertex generation for the drawables.

use bytemuck::{Pod, Zeroable};
use boxscene_common::Color;
use glam::{Mat4, Vec3};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct MeshVertex {
    pub position: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Unit cube centred on the origin: 8 corners, 12 counter-clockwise triangles.
pub(crate) fn unit_cube() -> (Vec<MeshVertex>, Vec<u16>) {
    let p = 0.5_f32;
    let vertices = [
        [-p, -p, -p],
        [p, -p, -p],
        [p, p, -p],
        [-p, p, -p],
        [-p, -p, p],
        [p, -p, p],
        [p, p, p],
        [-p, p, p],
    ]
    .into_iter()
    .map(|position| MeshVertex { position })
    .collect();
    #[rustfmt::skip]
    let indices = vec![
        4, 5, 6, 6, 7, 4, // +Z
        1, 0, 3, 3, 2, 1, // -Z
        5, 1, 2, 2, 6, 5, // +X
        0, 4, 7, 7, 3, 0, // -X
        7, 6, 2, 2, 3, 7, // +Y
        0, 1, 5, 5, 4, 0, // -Y
    ];
    (vertices, indices)
}

fn line(out: &mut Vec<LineVertex>, model: &Mat4, a: Vec3, b: Vec3, color_a: [f32; 4], color_b: [f32; 4]) {
    out.push(LineVertex {
        position: model.transform_point3(a).to_array(),
        color: color_a,
    });
    out.push(LineVertex {
        position: model.transform_point3(b).to_array(),
        color: color_b,
    });
}

/// Square grid on the XZ plane. The two centre lines use `center`, the rest
/// `grid`.
pub(crate) fn grid_lines(
    out: &mut Vec<LineVertex>,
    model: &Mat4,
    size: f32,
    divisions: u32,
    center: [f32; 4],
    grid: [f32; 4],
) {
    let divisions = divisions.max(1);
    let center_index = divisions / 2;
    let step = size / divisions as f32;
    let half = size / 2.0;

    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let color = if i == center_index { center } else { grid };
        line(out, model, Vec3::new(-half, 0.0, k), Vec3::new(half, 0.0, k), color, color);
        line(out, model, Vec3::new(k, 0.0, -half), Vec3::new(k, 0.0, half), color, color);
    }
}

/// X red, Y green, Z blue, each fading slightly towards its tip.
pub(crate) fn axes_lines(out: &mut Vec<LineVertex>, model: &Mat4, size: f32, to_rgba: impl Fn(Color) -> [f32; 4]) {
    let axes = [
        (Vec3::X, Color::rgb(1.0, 0.0, 0.0), Color::rgb(1.0, 0.6, 0.0)),
        (Vec3::Y, Color::rgb(0.0, 1.0, 0.0), Color::rgb(0.6, 1.0, 0.0)),
        (Vec3::Z, Color::rgb(0.0, 0.0, 1.0), Color::rgb(0.0, 0.6, 1.0)),
    ];
    for (axis, base, tip) in axes {
        line(out, model, Vec3::ZERO, axis * size, to_rgba(base), to_rgba(tip));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_indices_are_in_range() {
        let (vertices, indices) = unit_cube();
        assert_eq!(vertices.len(), 8);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn cube_faces_wind_outwards() {
        let (vertices, indices) = unit_cube();
        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(vertices[i as usize].position));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "triangle {tri:?} faces inwards");
        }
    }

    #[test]
    fn grid_line_count_and_colours() {
        let mut out = Vec::new();
        let center = [1.0, 0.0, 0.0, 1.0];
        let grid = [0.0, 1.0, 0.0, 1.0];
        grid_lines(&mut out, &Mat4::IDENTITY, 10.0, 10, center, grid);
        // (divisions + 1) * 2 lines * 2 vertices
        assert_eq!(out.len(), 44);
        assert_eq!(out.iter().filter(|v| v.color == center).count(), 4);
        assert!(out.iter().all(|v| v.position[1] == 0.0));
        assert!(out.iter().all(|v| v.position[0].abs() <= 5.0 && v.position[2].abs() <= 5.0));
    }

    #[test]
    fn axes_follow_model_matrix() {
        let mut out = Vec::new();
        let model = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
        axes_lines(&mut out, &model, 2.0, |c| [c.r, c.g, c.b, 1.0]);
        assert_eq!(out.len(), 6);
        assert_eq!(out[0].position, [0.0, 1.0, 0.0]);
        assert_eq!(out[1].position, [2.0, 1.0, 0.0]);
        assert_eq!(out[1].color, [1.0, 0.6, 0.0, 1.0]);
    }
}
