// src/lib.rs
//! Classroom
//!
//! A textured, lit 3D classroom rendered with wgpu and explored with a
//! free-fly camera.

pub mod app;
pub mod config;
pub mod gfx;
pub mod input;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ClassroomApp;
pub use config::AppConfig;
