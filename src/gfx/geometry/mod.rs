//! # Procedural Geometry Generation
//!
//! Every mesh in the classroom is generated here rather than loaded from
//! model files. Boxes, the ground quad and the compass are emitted as
//! triangle lists directly; the pen is built from indexed primitives which
//! are posed on the desk top and flattened.
//!
//! ## Usage
//!
//! ```rust
//! use classroom::gfx::geometry::mesh_vertices;
//! use classroom::gfx::scene::MeshId;
//!
//! let cube = mesh_vertices(MeshId::Cube);
//! assert_eq!(cube.len(), 36);
//! ```

pub mod primitives;

pub use primitives::*;

use cgmath::{Deg, Matrix, Matrix3, Matrix4, SquareMatrix, Vector3, Vector4};

use crate::gfx::scene::{vertex::Vertex, MeshId};

/// Represents generated indexed geometry before flattening
#[derive(Debug, Clone)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            tex_coords: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Applies `transform` to positions and its normal matrix to normals
    pub fn transformed(mut self, transform: Matrix4<f32>) -> Self {
        let linear = Matrix3::from_cols(
            transform.x.truncate(),
            transform.y.truncate(),
            transform.z.truncate(),
        );
        let normal_matrix = linear
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or(linear);

        for p in &mut self.vertices {
            let moved = transform * Vector4::new(p[0], p[1], p[2], 1.0);
            *p = [moved.x, moved.y, moved.z];
        }
        for n in &mut self.normals {
            let turned = normal_matrix * Vector3::from(*n);
            let len = (turned.x * turned.x + turned.y * turned.y + turned.z * turned.z).sqrt();
            if len > 0.0 {
                *n = [turned.x / len, turned.y / len, turned.z / len];
            }
        }
        self
    }

    /// Expands the index buffer into a non-indexed triangle list
    pub fn to_triangle_list(&self) -> Vec<Vertex> {
        self.indices
            .iter()
            .map(|&i| {
                let i = i as usize;
                Vertex::new(
                    self.vertices[i],
                    self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                    self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
                )
            })
            .collect()
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}

/// Height of the desk top: the unit desk cube scaled by 1.2 in y
const DESK_TOP: f32 = 0.6;

const PEN_RADIUS: f32 = 0.012;
const PEN_LENGTH: f32 = 0.16;
const PEN_CENTER: [f32; 3] = [0.55, DESK_TOP + PEN_RADIUS, 0.3];

/// Turns a +Z aligned part so it lies along +X, then moves it to `offset`
/// from the pen centre
fn pen_pose(offset_x: f32) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(
        PEN_CENTER[0] + offset_x,
        PEN_CENTER[1],
        PEN_CENTER[2],
    )) * Matrix4::from_angle_y(Deg(90.0))
}

fn pen_body() -> Vec<Vertex> {
    generate_cylinder(PEN_RADIUS, PEN_LENGTH, 16)
        .transformed(pen_pose(0.0))
        .to_triangle_list()
}

fn pen_clip() -> Vec<Vertex> {
    let [cx, cy, cz] = PEN_CENTER;
    let x0 = cx - PEN_LENGTH * 0.5 + 0.02;
    box_mesh(
        [x0, cy + PEN_RADIUS - 0.001, cz - 0.004],
        [x0 + 0.07, cy + PEN_RADIUS + 0.003, cz + 0.004],
    )
}

fn pen_accent() -> Vec<Vertex> {
    let r = PEN_RADIUS + 0.001;
    generate_sphere(12, 8)
        .transformed(pen_pose(-PEN_LENGTH * 0.5) * Matrix4::from_scale(r))
        .to_triangle_list()
}

fn pen_point() -> Vec<Vertex> {
    generate_cone(PEN_RADIUS, 0.03, 16)
        .transformed(pen_pose(PEN_LENGTH * 0.5))
        .to_triangle_list()
}

/// Vertex data for a scene mesh
pub fn mesh_vertices(mesh: MeshId) -> Vec<Vertex> {
    match mesh {
        MeshId::Cube | MeshId::LightCube => textured_cube(),
        MeshId::Blackboard => blackboard_slab(),
        MeshId::Ground => ground_quad(),
        MeshId::Compass => COMPASS_VERTICES.to_vec(),
        MeshId::PenBody => pen_body(),
        MeshId::PenClip => pen_clip(),
        MeshId::PenAccent => pen_accent(),
        MeshId::PenPoint => pen_point(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_meshes_have_expected_counts() {
        assert_eq!(mesh_vertices(MeshId::Cube).len(), 36);
        assert_eq!(mesh_vertices(MeshId::LightCube).len(), 36);
        assert_eq!(mesh_vertices(MeshId::Blackboard).len(), 36);
        assert_eq!(mesh_vertices(MeshId::Ground).len(), 6);
        assert_eq!(mesh_vertices(MeshId::Compass).len(), 18);
    }

    #[test]
    fn pen_parts_are_whole_triangles() {
        for mesh in [
            MeshId::PenBody,
            MeshId::PenClip,
            MeshId::PenAccent,
            MeshId::PenPoint,
        ] {
            let vertices = mesh_vertices(mesh);
            assert!(!vertices.is_empty(), "{} is empty", mesh.label());
            assert_eq!(vertices.len() % 3, 0, "{} is ragged", mesh.label());
        }
    }

    #[test]
    fn pen_rests_on_the_desk() {
        let body = mesh_vertices(MeshId::PenBody);
        let lowest = body
            .iter()
            .map(|v| v.position[1])
            .fold(f32::INFINITY, f32::min);
        assert!((lowest - DESK_TOP).abs() < 1e-4);

        // Lies along X once posed
        let (min_x, max_x) = body.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v.position[0]), hi.max(v.position[0]))
        });
        assert!((max_x - min_x - PEN_LENGTH).abs() < 1e-4);
    }

    #[test]
    fn transformed_keeps_normals_unit_length() {
        let data = generate_sphere(6, 4)
            .transformed(Matrix4::from_nonuniform_scale(1.0, 3.0, 0.5));
        for n in &data.normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4);
        }
    }
}
