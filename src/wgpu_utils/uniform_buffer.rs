// src/wgpu_utils/uniform_buffer.rs - Whole-buffer and per-draw uniform buffers
use std::marker::PhantomData;

fn type_label<Content>() -> &'static str {
    let type_name = std::any::type_name::<Content>();
    let pos = type_name.rfind(':').unwrap_or(0);
    if pos > 0 {
        &type_name[(pos + 1)..]
    } else {
        type_name
    }
}

/// Rounds `value` up to the next multiple of `alignment`
pub fn align_to(value: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}

/// Uniform buffer holding exactly one `Content`
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    previous_content: Vec<u8>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    /// Create buffer with initial data
    pub fn new_with_data(device: &wgpu::Device, initial_content: &Content) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBuffer: {}", type_label::<Content>())),
            size: std::mem::size_of::<Content>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: true,
        });

        let mapped_memory = buffer.slice(..);
        mapped_memory
            .get_mapped_range_mut()
            .clone_from_slice(bytemuck::bytes_of(initial_content));
        buffer.unmap();

        UniformBuffer {
            buffer,
            content_type: PhantomData,
            previous_content: bytemuck::bytes_of(initial_content).to_vec(),
        }
    }

    /// Update buffer content (skips the write when nothing changed)
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) {
        let new_content = bytemuck::bytes_of(&content);
        if self.previous_content == new_content {
            return;
        }
        queue.write_buffer(&self.buffer, 0, new_content);
        self.previous_content = new_content.to_vec();
    }

    /// Overwrite `bytes.len()` bytes starting at `offset`, leaving the rest
    /// of the buffer untouched.
    ///
    /// # Panics
    /// Panics if the range does not fit inside `Content`
    pub fn update_range(&mut self, queue: &wgpu::Queue, offset: u64, bytes: &[u8]) {
        let start = offset as usize;
        let end = start + bytes.len();
        assert!(
            end <= self.previous_content.len(),
            "range {}..{} outside {}",
            start,
            end,
            type_label::<Content>()
        );
        if self.previous_content[start..end] == *bytes {
            return;
        }
        queue.write_buffer(&self.buffer, offset, bytes);
        self.previous_content[start..end].copy_from_slice(bytes);
    }

    /// Get binding resource
    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }

    /// Get the underlying buffer
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

/// Uniform buffer holding one `Content` slot per draw call.
///
/// Slots are spaced by the device's dynamic offset alignment. Each frame the
/// caller pushes one slot per draw, flushes once before the render pass and
/// binds the buffer with the offset returned by [`push`](Self::push).
pub struct DynamicUniformBuffer<Content> {
    buffer: wgpu::Buffer,
    stride: u64,
    capacity: usize,
    staging: Vec<u8>,
    len: usize,
    content_type: PhantomData<Content>,
}

impl<Content: bytemuck::Pod> DynamicUniformBuffer<Content> {
    /// Size of one slot as seen by the shader
    pub fn slot_size() -> u64 {
        std::mem::size_of::<Content>() as u64
    }

    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = align_to(Self::slot_size(), alignment);
        let capacity = capacity.max(1);

        DynamicUniformBuffer {
            buffer: Self::create_buffer(device, stride, capacity),
            stride,
            capacity,
            staging: Vec::with_capacity(stride as usize * capacity),
            len: 0,
            content_type: PhantomData,
        }
    }

    fn create_buffer(device: &wgpu::Device, stride: u64, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("DynamicUniformBuffer: {}", type_label::<Content>())),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Appends a slot and returns its dynamic offset
    pub fn push(&mut self, content: &Content) -> u32 {
        let offset = self.len as u64 * self.stride;
        let start = offset as usize;
        self.staging.resize(start + self.stride as usize, 0);
        self.staging[start..start + Self::slot_size() as usize]
            .copy_from_slice(bytemuck::bytes_of(content));
        self.len += 1;
        offset as u32
    }

    /// Uploads every slot pushed since the last [`clear`](Self::clear).
    ///
    /// Returns `true` when the buffer had to grow; bind groups created from
    /// the old buffer are stale after that and must be rebuilt.
    pub fn flush(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> bool {
        let mut grown = false;
        if self.len > self.capacity {
            self.capacity = self.len.next_power_of_two();
            self.buffer = Self::create_buffer(device, self.stride, self.capacity);
            log::debug!(
                "{} grown to {} slots",
                type_label::<Content>(),
                self.capacity
            );
            grown = true;
        }
        if !self.staging.is_empty() {
            queue.write_buffer(&self.buffer, 0, &self.staging);
        }
        grown
    }

    pub fn clear(&mut self) {
        self.staging.clear();
        self.len = 0;
    }

    /// Binding covering a single slot; the slot is picked by the dynamic offset
    pub fn binding_resource(&self) -> wgpu::BindingResource {
        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: &self.buffer,
            offset: 0,
            size: wgpu::BufferSize::new(Self::slot_size()),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_rounds_up_to_multiple() {
        assert_eq!(align_to(0, 256), 0);
        assert_eq!(align_to(1, 256), 256);
        assert_eq!(align_to(192, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(624, 256), 768);
    }

    #[test]
    fn zero_alignment_is_identity() {
        assert_eq!(align_to(624, 0), 624);
    }

    #[test]
    fn type_label_strips_module_path() {
        assert_eq!(type_label::<UniformBuffer<[f32; 4]>>(), "UniformBuffer<[f32; 4]>");
        assert_eq!(type_label::<u32>(), "u32");
    }
}
