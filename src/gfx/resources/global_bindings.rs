//! Shared matrix block
//!
//! A uniform buffer at group 0, binding 0, visible to every pipeline. It
//! holds the projection matrix at byte offset 0 and the view matrix at byte
//! offset 64, matching the `Matrices` struct declared by both shaders.
//! Projection is written once at startup; the view is rewritten every frame.

use crate::wgpu_utils::{
    binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
    UniformBuffer,
};

pub const MATRIX_SIZE: u64 = std::mem::size_of::<[[f32; 4]; 4]>() as u64;
pub const PROJECTION_OFFSET: u64 = 0;
pub const VIEW_OFFSET: u64 = MATRIX_SIZE;

/// CPU image of the shared block. MUST match `Matrices` in the shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SharedMatrixBlock {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BlockError {
    #[error("offset {0} is not a matrix slot of the shared block")]
    InvalidOffset(u64),
}

impl SharedMatrixBlock {
    pub fn identity() -> Self {
        let identity = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        Self {
            projection: identity,
            view: identity,
        }
    }

    /// Writes a matrix into the slot at `offset`
    pub fn write(&mut self, offset: u64, matrix: [[f32; 4]; 4]) -> Result<(), BlockError> {
        match offset {
            PROJECTION_OFFSET => self.projection = matrix,
            VIEW_OFFSET => self.view = matrix,
            other => return Err(BlockError::InvalidOffset(other)),
        }
        Ok(())
    }
}

/// GPU side of the shared block plus its bind group
pub struct GlobalBindings {
    buffer: UniformBuffer<SharedMatrixBlock>,
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = UniformBuffer::new_with_data(device, &SharedMatrixBlock::identity());

        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Matrices Bind Group Layout");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(buffer.binding_resource())
            .create(device, "Matrices Bind Group");

        GlobalBindings {
            buffer,
            bind_group_layout,
            bind_group,
        }
    }

    /// Overwrites one matrix slot, leaving the other untouched
    pub fn write_matrix(
        &mut self,
        queue: &wgpu::Queue,
        offset: u64,
        matrix: &[[f32; 4]; 4],
    ) -> Result<(), BlockError> {
        if offset != PROJECTION_OFFSET && offset != VIEW_OFFSET {
            return Err(BlockError::InvalidOffset(offset));
        }
        self.buffer
            .update_range(queue, offset, bytemuck::bytes_of(matrix));
        Ok(())
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_shader_block() {
        assert_eq!(std::mem::size_of::<SharedMatrixBlock>(), 128);
        assert_eq!(PROJECTION_OFFSET, 0);
        assert_eq!(VIEW_OFFSET, 64);

        let mut block = SharedMatrixBlock::identity();
        block.view[3][0] = 7.0;
        let bytes = bytemuck::bytes_of(&block);
        let view_translation_x = f32::from_ne_bytes(
            bytes[VIEW_OFFSET as usize + 48..VIEW_OFFSET as usize + 52]
                .try_into()
                .unwrap(),
        );
        assert_eq!(view_translation_x, 7.0);
    }

    #[test]
    fn write_targets_matching_slot() {
        let mut block = SharedMatrixBlock::identity();
        let m = [[2.0; 4]; 4];

        block.write(VIEW_OFFSET, m).unwrap();
        assert_eq!(block.view, m);
        assert_eq!(block.projection, SharedMatrixBlock::identity().projection);

        block.write(PROJECTION_OFFSET, m).unwrap();
        assert_eq!(block.projection, m);
    }

    #[test]
    fn misaligned_offset_is_rejected() {
        let mut block = SharedMatrixBlock::identity();
        assert_eq!(block.write(32, [[0.0; 4]; 4]), Err(BlockError::InvalidOffset(32)));
        assert_eq!(block, SharedMatrixBlock::identity());
    }
}
