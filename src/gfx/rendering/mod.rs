// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Render pipelines, the WGSL programs and the engine that replays recorded
//! frames on the GPU.

pub mod pipeline_manager;
pub mod render_engine;

// Re-export main types
pub use pipeline_manager::{PipelineConfig, PipelineError, PipelineManager, PipelineStats};
pub use render_engine::{RenderEngine, RenderError};
