//! # Frame Recording
//!
//! Per-frame state ([`FrameContext`]), the recorded command stream
//! ([`CommandList`]) and the [`FrameRenderer`] that turns one into the other.

pub mod commands;
pub mod context;
pub mod frame_renderer;

pub use commands::{CommandList, ProgramKind, RenderCommand, UniformValue};
pub use context::{FrameClock, FrameContext, ScreenSize};
pub use frame_renderer::{marker_model, FrameRenderer, CLEAR_COLOR};
