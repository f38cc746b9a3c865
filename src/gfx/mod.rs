//! # Graphics Module
//!
//! Everything between the input handler and the screen.
//!
//! ## Architecture Overview
//!
//! - **Camera** ([`camera`]) - Free-fly camera driven by keyboard and mouse
//! - **Lighting** ([`lighting`]) - Light table and the blackboard accent mode
//! - **Scene** ([`scene`]) - The classroom object table and transform recipes
//! - **Geometry** ([`geometry`]) - Procedural vertex data for every mesh
//! - **Frame** ([`frame`]) - Records each frame as an ordered command list
//! - **Rendering** ([`rendering`]) - Replays command lists with wgpu
//! - **Resources** ([`resources`]) - Textures, meshes and uniform layouts
//!
//! The frame layer never touches the GPU, so the draw protocol can be tested
//! without a device.

pub mod camera;
pub mod frame;
pub mod geometry;
pub mod lighting;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::FlyCamera;
pub use frame::{CommandList, FrameContext, FrameRenderer};
pub use rendering::RenderEngine;
