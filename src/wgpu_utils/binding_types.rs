// src/wgpu_utils/binding_types.rs
//! WGPU binding type utilities

pub fn uniform() -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size: None,
    }
}

/// Uniform buffer bound with a per-draw dynamic offset.
///
/// `min_binding_size` is the size of one slot, which lets wgpu validate the
/// offsets passed to `set_bind_group` against the buffer length.
pub fn dynamic_uniform(slot_size: u64) -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: true,
        min_binding_size: wgpu::BufferSize::new(slot_size),
    }
}

pub fn sampler(filtering: wgpu::SamplerBindingType) -> wgpu::BindingType {
    wgpu::BindingType::Sampler(filtering)
}

pub fn texture_2d() -> wgpu::BindingType {
    wgpu::BindingType::Texture {
        sample_type: wgpu::TextureSampleType::Float { filterable: true },
        view_dimension: wgpu::TextureViewDimension::D2,
        multisampled: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_uniform_carries_slot_size() {
        match dynamic_uniform(256) {
            wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset,
                min_binding_size,
            } => {
                assert!(has_dynamic_offset);
                assert_eq!(min_binding_size.map(|s| s.get()), Some(256));
            }
            other => panic!("unexpected binding type {:?}", other),
        }
    }

    #[test]
    fn zero_slot_size_leaves_binding_unchecked() {
        match dynamic_uniform(0) {
            wgpu::BindingType::Buffer {
                min_binding_size, ..
            } => assert!(min_binding_size.is_none()),
            other => panic!("unexpected binding type {:?}", other),
        }
    }
}
