pub mod fly_camera;

// Re-export main types
pub use fly_camera::{CameraMovement, FlyCamera};
