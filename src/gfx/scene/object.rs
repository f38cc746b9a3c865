//! Scene object descriptors
//!
//! A [`SceneObject`] names the mesh and texture it draws with and carries an
//! ordered transform recipe. The model matrix is built by post-multiplying
//! each operation onto the identity in recipe order, so the operation listed
//! last is the first one applied to the vertices.

use cgmath::{Deg, InnerSpace, Matrix4, SquareMatrix, Vector3};

/// Meshes uploaded at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshId {
    Cube,
    Blackboard,
    Ground,
    Compass,
    PenBody,
    PenClip,
    PenAccent,
    PenPoint,
    /// Cube drawn by the flat program for light markers
    LightCube,
}

impl MeshId {
    pub const COUNT: usize = 9;

    pub const ALL: [MeshId; Self::COUNT] = [
        MeshId::Cube,
        MeshId::Blackboard,
        MeshId::Ground,
        MeshId::Compass,
        MeshId::PenBody,
        MeshId::PenClip,
        MeshId::PenAccent,
        MeshId::PenPoint,
        MeshId::LightCube,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            MeshId::Cube => "Cube",
            MeshId::Blackboard => "Blackboard",
            MeshId::Ground => "Ground",
            MeshId::Compass => "Compass",
            MeshId::PenBody => "Pen Body",
            MeshId::PenClip => "Pen Clip",
            MeshId::PenAccent => "Pen Accent",
            MeshId::PenPoint => "Pen Point",
            MeshId::LightCube => "Light Cube",
        }
    }
}

/// Material textures, one image file each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureId {
    Red,
    Blue,
    LightGrey,
    Protractor,
    Wall,
    Blackboard,
    Ground,
    Grey,
    Purple,
    Metal,
    Desk,
    Ballpoint,
}

impl TextureId {
    pub const COUNT: usize = 12;

    pub const ALL: [TextureId; Self::COUNT] = [
        TextureId::Red,
        TextureId::Blue,
        TextureId::LightGrey,
        TextureId::Protractor,
        TextureId::Wall,
        TextureId::Blackboard,
        TextureId::Ground,
        TextureId::Grey,
        TextureId::Purple,
        TextureId::Metal,
        TextureId::Desk,
        TextureId::Ballpoint,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// File name inside the texture directory
    pub fn file_name(self) -> &'static str {
        match self {
            TextureId::Red => "red.jpg",
            TextureId::Blue => "blue.jpg",
            TextureId::LightGrey => "lightgrey.jpg",
            TextureId::Protractor => "protractor2.jpg",
            TextureId::Wall => "wall.jpg",
            TextureId::Blackboard => "blackboard.jpg",
            TextureId::Ground => "AdobeStock_321846439.png",
            TextureId::Grey => "grey.jpg",
            TextureId::Purple => "purple.jpg",
            TextureId::Metal => "damkier.png",
            // The desk grain doubles as the ballpoint texture
            TextureId::Desk | TextureId::Ballpoint => "AdobeStock_372442505.png",
        }
    }
}

/// One step of a transform recipe
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    /// Rotation by `degrees` around `axis`; the axis need not be unit length
    Rotate { degrees: f32, axis: [f32; 3] },
    Translate([f32; 3]),
    Scale([f32; 3]),
}

impl TransformOp {
    pub const fn rotate(degrees: f32, axis: [f32; 3]) -> Self {
        TransformOp::Rotate { degrees, axis }
    }

    pub const fn translate(x: f32, y: f32, z: f32) -> Self {
        TransformOp::Translate([x, y, z])
    }

    pub const fn scale(x: f32, y: f32, z: f32) -> Self {
        TransformOp::Scale([x, y, z])
    }

    pub const fn uniform_scale(s: f32) -> Self {
        TransformOp::Scale([s, s, s])
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        match *self {
            TransformOp::Rotate { degrees, axis } => {
                let axis = Vector3::from(axis);
                if axis.magnitude2() == 0.0 {
                    return Matrix4::identity();
                }
                Matrix4::from_axis_angle(axis.normalize(), Deg(degrees))
            }
            TransformOp::Translate(v) => Matrix4::from_translation(Vector3::from(v)),
            TransformOp::Scale([x, y, z]) => Matrix4::from_nonuniform_scale(x, y, z),
        }
    }
}

/// Composes a recipe into a model matrix
pub fn compose(recipe: &[TransformOp]) -> Matrix4<f32> {
    recipe
        .iter()
        .fold(Matrix4::identity(), |model, op| model * op.matrix())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: &'static str,
    pub mesh: MeshId,
    pub texture: TextureId,
    pub recipe: Vec<TransformOp>,
    /// Vertices submitted by the draw call, from the start of the mesh
    pub vertex_count: u32,
    /// Tinted by the accent colour
    pub accent: bool,
}

impl SceneObject {
    pub fn new(
        name: &'static str,
        mesh: MeshId,
        texture: TextureId,
        recipe: Vec<TransformOp>,
        vertex_count: u32,
    ) -> Self {
        Self {
            name,
            mesh,
            texture,
            recipe,
            vertex_count,
            accent: false,
        }
    }

    pub fn with_accent(mut self) -> Self {
        self.accent = true;
        self
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        compose(&self.recipe)
    }
}
