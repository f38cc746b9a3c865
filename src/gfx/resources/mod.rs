// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, vertex buffers, uniform layouts and bind groups.

pub mod global_bindings;
pub mod mesh_resource;
pub mod program_uniforms;
pub mod resource_cache;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{GlobalBindings, SharedMatrixBlock};
pub use mesh_resource::MeshResource;
pub use resource_cache::{ResourceCache, ResourceHandle};
pub use texture_resource::{DecodedTexture, TextureError, TextureResource};

pub type TextureHandle = ResourceHandle<TextureResource>;
pub type MeshHandle = ResourceHandle<MeshResource>;
