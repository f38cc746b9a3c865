//! Recorded render commands
//!
//! The frame renderer never touches the GPU. It records what a frame needs,
//! in order, into a [`CommandList`] that the render engine replays. Uniforms
//! are addressed by name and persist per program until overwritten, so the
//! order of the list is what decides which values a draw sees.

use std::borrow::Cow;

use cgmath::{Matrix4, Vector3};

use crate::gfx::resources::{
    global_bindings::{PROJECTION_OFFSET, VIEW_OFFSET},
    MeshHandle, TextureHandle,
};

/// The two shader programs in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    /// Textured Phong shading with the scene lights
    Lit,
    /// Unlit solid colour, used for the light markers
    Flat,
}

impl ProgramKind {
    pub fn label(self) -> &'static str {
        match self {
            ProgramKind::Lit => "lit",
            ProgramKind::Flat => "flat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([[f32; 4]; 4]),
}

impl UniformValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            UniformValue::Int(_) => "int",
            UniformValue::Float(_) => "float",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Mat4(_) => "mat4",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    SetViewport {
        width: u32,
        height: u32,
    },
    Clear {
        color: [f32; 4],
    },
    UseProgram(ProgramKind),
    SetUniform {
        name: Cow<'static, str>,
        value: UniformValue,
    },
    BindTexture {
        unit: u32,
        texture: TextureHandle,
    },
    /// Non-indexed triangle list draw of the first `vertex_count` vertices
    Draw {
        mesh: MeshHandle,
        vertex_count: u32,
    },
    /// Overwrite one matrix of the shared block at binding 0
    WriteSharedBlock {
        offset: u64,
        matrix: [[f32; 4]; 4],
    },
    Present,
}

#[derive(Debug, Default, Clone)]
pub struct CommandList {
    commands: Vec<RenderCommand>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.push(RenderCommand::SetViewport { width, height });
    }

    pub fn clear_color(&mut self, color: [f32; 4]) {
        self.push(RenderCommand::Clear { color });
    }

    pub fn use_program(&mut self, program: ProgramKind) {
        self.push(RenderCommand::UseProgram(program));
    }

    pub fn set_uniform(&mut self, name: impl Into<Cow<'static, str>>, value: UniformValue) {
        self.push(RenderCommand::SetUniform {
            name: name.into(),
            value,
        });
    }

    pub fn set_int(&mut self, name: impl Into<Cow<'static, str>>, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }

    pub fn set_float(&mut self, name: impl Into<Cow<'static, str>>, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    pub fn set_vec3(&mut self, name: impl Into<Cow<'static, str>>, value: Vector3<f32>) {
        self.set_uniform(name, UniformValue::Vec3(value.into()));
    }

    pub fn set_vec4(&mut self, name: impl Into<Cow<'static, str>>, value: [f32; 4]) {
        self.set_uniform(name, UniformValue::Vec4(value));
    }

    pub fn set_mat4(&mut self, name: impl Into<Cow<'static, str>>, value: Matrix4<f32>) {
        self.set_uniform(name, UniformValue::Mat4(value.into()));
    }

    pub fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        self.push(RenderCommand::BindTexture { unit, texture });
    }

    pub fn draw(&mut self, mesh: MeshHandle, vertex_count: u32) {
        self.push(RenderCommand::Draw { mesh, vertex_count });
    }

    pub fn write_shared_projection(&mut self, projection: Matrix4<f32>) {
        self.push(RenderCommand::WriteSharedBlock {
            offset: PROJECTION_OFFSET,
            matrix: projection.into(),
        });
    }

    pub fn write_shared_view(&mut self, view: Matrix4<f32>) {
        self.push(RenderCommand::WriteSharedBlock {
            offset: VIEW_OFFSET,
            matrix: view.into(),
        });
    }

    pub fn present(&mut self) {
        self.push(RenderCommand::Present);
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Forgets every recorded command, keeping the allocation
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// Every value written to the uniform `name`, in recording order
    pub fn uniform_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a UniformValue> + 'a {
        self.commands.iter().filter_map(move |command| match command {
            RenderCommand::SetUniform { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }

    /// Number of draw commands recorded
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, RenderCommand::Draw { .. }))
            .count()
    }
}

impl<'a> IntoIterator for &'a CommandList {
    type Item = &'a RenderCommand;
    type IntoIter = std::slice::Iter<'a, RenderCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;

    #[test]
    fn uniform_values_filters_by_name() {
        let mut commands = CommandList::new();
        commands.set_float("material.shininess", 32.0);
        commands.set_int("material.diffuse", 0);
        commands.set_float("material.shininess", 16.0);

        let values: Vec<_> = commands.uniform_values("material.shininess").collect();
        assert_eq!(
            values,
            vec![&UniformValue::Float(32.0), &UniformValue::Float(16.0)]
        );
    }

    #[test]
    fn shared_block_writes_use_fixed_offsets() {
        let mut commands = CommandList::new();
        commands.write_shared_projection(Matrix4::identity());
        commands.write_shared_view(Matrix4::identity());

        let offsets: Vec<u64> = commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::WriteSharedBlock { offset, .. } => Some(*offset),
                _ => None,
            })
            .collect();
        assert_eq!(offsets, vec![0, 64]);
    }

    #[test]
    fn reset_empties_list() {
        let mut commands = CommandList::new();
        commands.draw(MeshHandle::from_raw(1), 36);
        commands.present();
        assert_eq!(commands.draw_count(), 1);

        commands.reset();
        assert!(commands.is_empty());
    }

    #[test]
    fn dynamic_names_are_accepted() {
        let mut commands = CommandList::new();
        commands.set_float(format!("pointLights[{}].linear", 2), 0.09);
        assert_eq!(
            commands.uniform_values("pointLights[2].linear").count(),
            1
        );
    }
}
