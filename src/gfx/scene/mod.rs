//! # Scene Description
//!
//! The classroom as data: which mesh and texture each object draws with and
//! how its model matrix is composed. Nothing here touches the GPU; the
//! [`SceneHandles`] table maps ids onto uploaded resources.

pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{compose, MeshId, SceneObject, TextureId, TransformOp};
pub use scene::{Scene, SceneError, SceneHandles};
pub use vertex::Vertex;
