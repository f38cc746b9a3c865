//! # Primitive Shape Generation
//!
//! Boxes and quads are emitted directly as triangle lists. Round shapes are
//! built as indexed [`GeometryData`] and flattened afterwards.

use super::GeometryData;
use crate::gfx::scene::vertex::Vertex;
use std::f32::consts::PI;

/// Counter-clockwise quad corners as seen from outside, with the face normal
struct Face {
    normal: [f32; 3],
    corners: [[f32; 3]; 4],
}

const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

fn push_quad(out: &mut Vec<Vertex>, face: &Face) {
    for i in [0, 1, 2, 2, 3, 0] {
        out.push(Vertex::new(face.corners[i], face.normal, QUAD_UVS[i]));
    }
}

/// Axis-aligned box between `min` and `max`: 6 faces, 36 vertices.
///
/// Every face maps the full 0..1 texture range.
pub fn box_mesh(min: [f32; 3], max: [f32; 3]) -> Vec<Vertex> {
    let [x0, y0, z0] = min;
    let [x1, y1, z1] = max;

    #[rustfmt::skip]
    let faces = [
        Face { normal: [0.0, 0.0, 1.0],  corners: [[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]] },
        Face { normal: [0.0, 0.0, -1.0], corners: [[x1, y0, z0], [x0, y0, z0], [x0, y1, z0], [x1, y1, z0]] },
        Face { normal: [-1.0, 0.0, 0.0], corners: [[x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0]] },
        Face { normal: [1.0, 0.0, 0.0],  corners: [[x1, y0, z1], [x1, y0, z0], [x1, y1, z0], [x1, y1, z1]] },
        Face { normal: [0.0, 1.0, 0.0],  corners: [[x0, y1, z1], [x1, y1, z1], [x1, y1, z0], [x0, y1, z0]] },
        Face { normal: [0.0, -1.0, 0.0], corners: [[x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]] },
    ];

    let mut vertices = Vec::with_capacity(36);
    for face in &faces {
        push_quad(&mut vertices, face);
    }
    vertices
}

/// Unit cube centred at the origin
pub fn textured_cube() -> Vec<Vertex> {
    box_mesh([-0.5, -0.5, -0.5], [0.5, 0.5, 0.5])
}

/// Blackboard panel: a unit square 0.01 deep, front face at z = 0
pub fn blackboard_slab() -> Vec<Vertex> {
    box_mesh([-0.5, -0.5, -0.01], [0.5, 0.5, 0.0])
}

/// Upward facing unit quad at y = 0.5 (the top face of the unit cube)
pub fn ground_quad() -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    push_quad(
        &mut vertices,
        &Face {
            normal: [0.0, 1.0, 0.0],
            corners: [
                [-0.5, 0.5, 0.5],
                [0.5, 0.5, 0.5],
                [0.5, 0.5, -0.5],
                [-0.5, 0.5, -0.5],
            ],
        },
    );
    vertices
}

/// Compass wedge: a thin strip at z = 0.5 fanned out to an apex at (0, 0, 1)
#[rustfmt::skip]
pub const COMPASS_VERTICES: [Vertex; 18] = [
    Vertex::new([0.49, -0.5, 0.5], [0.0, 0.0, -1.0], [0.0, 0.0]),
    Vertex::new([0.5, -0.5, 0.5],  [0.0, -1.0, 0.0], [0.0, 1.0]),
    Vertex::new([0.49, 0.5, 0.5],  [0.0, 0.0, -1.0], [1.0, 0.0]),
    Vertex::new([0.5, 0.5, 0.5],   [0.0, 0.0, -1.0], [1.0, 1.0]),
    Vertex::new([0.5, -0.5, 0.5],  [0.0, 0.0, -1.0], [0.0, 1.0]),
    Vertex::new([0.49, 0.5, 0.5],  [0.0, 0.0, 1.0],  [1.0, 0.0]),
    Vertex::new([0.0, 0.0, 1.0],   [0.0, 0.0, 1.0],  [0.5, 0.5]),
    Vertex::new([0.49, -0.5, 0.5], [0.0, 0.0, 1.0],  [0.0, 0.0]),
    Vertex::new([0.49, 0.5, 0.5],  [0.0, 0.0, 1.0],  [1.0, 0.0]),
    Vertex::new([0.0, 0.0, 1.0],   [0.0, 0.0, 1.0],  [0.5, 0.5]),
    Vertex::new([0.49, 0.5, 0.5],  [-1.0, 0.0, 0.0], [0.0, 0.0]),
    Vertex::new([0.5, 0.5, 0.5],   [-1.0, 0.0, 0.0], [1.0, 0.0]),
    Vertex::new([0.0, 0.0, 1.0],   [-1.0, 0.0, 0.0], [0.5, 0.5]),
    Vertex::new([0.5, 0.5, 0.5],   [-1.0, 0.0, 0.0], [0.0, 0.0]),
    Vertex::new([0.5, -0.5, 0.5],  [-1.0, 0.0, 0.0], [1.0, 0.0]),
    Vertex::new([0.0, 0.0, 1.0],   [1.0, 0.0, 0.0],  [0.5, 0.5]),
    Vertex::new([0.5, -0.5, 0.5],  [1.0, 0.0, 0.0],  [0.0, 0.0]),
    Vertex::new([0.49, -0.5, 0.5], [1.0, 0.0, 0.0],  [1.0, 0.0]),
];

/// Generate a UV sphere of radius 1.0 centered at the origin
///
/// # Arguments
/// * `longitude_segments` - Number of vertical segments (longitude lines)
/// * `latitude_segments` - Number of horizontal segments (latitude lines)
pub fn generate_sphere(longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            let position = [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi];
            data.vertices.push(position);
            data.normals.push(position);
            data.tex_coords
                .push([long as f32 / long_segs as f32, lat as f32 / lat_segs as f32]);
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.extend_from_slice(&[first, second, first + 1]);
            data.indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    data
}

/// Generate a capped cylinder along the Z axis
///
/// # Arguments
/// * `radius` - Radius of the cylinder
/// * `height` - Length along Z, centred on the origin
/// * `segments` - Number of circular segments
pub fn generate_cylinder(radius: f32, height: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = segments.max(3);
    let half_height = height * 0.5;

    for i in 0..=segs {
        let angle = i as f32 * 2.0 * PI / segs as f32;
        let (sin_a, cos_a) = angle.sin_cos();
        let (x, y) = (radius * cos_a, radius * sin_a);
        let u = i as f32 / segs as f32;

        data.vertices.push([x, y, -half_height]);
        data.normals.push([cos_a, sin_a, 0.0]);
        data.tex_coords.push([u, 0.0]);

        data.vertices.push([x, y, half_height]);
        data.normals.push([cos_a, sin_a, 0.0]);
        data.tex_coords.push([u, 1.0]);
    }

    for i in 0..segs {
        let bottom_current = i * 2;
        let top_current = bottom_current + 1;
        let bottom_next = (i + 1) * 2;
        let top_next = bottom_next + 1;

        data.indices
            .extend_from_slice(&[bottom_current, bottom_next, top_current]);
        data.indices
            .extend_from_slice(&[top_current, bottom_next, top_next]);
    }

    add_cap(&mut data, radius, -half_height, segs, false);
    add_cap(&mut data, radius, half_height, segs, true);

    data
}

/// Generate a cone along the Z axis: base disc at z = 0, apex at z = `height`
pub fn generate_cone(radius: f32, height: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = segments.max(3);
    let slope = radius / height;

    for i in 0..segs {
        let a0 = i as f32 * 2.0 * PI / segs as f32;
        let a1 = (i + 1) as f32 * 2.0 * PI / segs as f32;
        let mid = (a0 + a1) * 0.5;
        let base = data.vertices.len() as u32;

        for angle in [a0, a1] {
            let (sin_a, cos_a) = angle.sin_cos();
            data.vertices.push([radius * cos_a, radius * sin_a, 0.0]);
            data.normals.push(normalized([cos_a, sin_a, slope]));
            data.tex_coords.push([angle / (2.0 * PI), 0.0]);
        }

        let (sin_m, cos_m) = mid.sin_cos();
        data.vertices.push([0.0, 0.0, height]);
        data.normals.push(normalized([cos_m, sin_m, slope]));
        data.tex_coords.push([mid / (2.0 * PI), 1.0]);

        data.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    add_cap(&mut data, radius, 0.0, segs, false);

    data
}

fn normalized(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

/// Disc in the plane `z`, facing +Z when `facing_up` and -Z otherwise
fn add_cap(data: &mut GeometryData, radius: f32, z: f32, segs: u32, facing_up: bool) {
    let normal = if facing_up { [0.0, 0.0, 1.0] } else { [0.0, 0.0, -1.0] };

    let center = data.vertices.len() as u32;
    data.vertices.push([0.0, 0.0, z]);
    data.normals.push(normal);
    data.tex_coords.push([0.5, 0.5]);

    let ring = data.vertices.len() as u32;
    for i in 0..=segs {
        let angle = i as f32 * 2.0 * PI / segs as f32;
        let (sin_a, cos_a) = angle.sin_cos();
        data.vertices.push([radius * cos_a, radius * sin_a, z]);
        data.normals.push(normal);
        data.tex_coords.push([0.5 + 0.5 * cos_a, 0.5 + 0.5 * sin_a]);
    }

    for i in 0..segs {
        let (current, next) = (ring + i, ring + i + 1);
        if facing_up {
            data.indices.extend_from_slice(&[center, current, next]);
        } else {
            data.indices.extend_from_slice(&[center, next, current]);
        }
    }
}
