//! Free-fly camera
//!
//! A yaw/pitch camera that moves along its own front and right vectors.
//! Movement is scaled by the frame delta so speed does not depend on frame
//! rate, mouse offsets rotate the view, and the scroll wheel narrows or widens
//! the field of view.

use cgmath::{perspective, Deg, InnerSpace, Matrix4, Point3, Vector3};

use crate::config::CameraConfig;

/// Converts OpenGL clip-space depth (-1..1) to wgpu depth (0..1)
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

pub const PITCH_LIMIT: f32 = 89.0;
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 45.0;

/// Direction of a keyboard-driven camera move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub position: Vector3<f32>,
    pub front: Vector3<f32>,
    pub up: Vector3<f32>,
    pub right: Vector3<f32>,
    pub world_up: Vector3<f32>,
    /// Degrees, -90 looks down -Z
    pub yaw: f32,
    /// Degrees
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees
    pub zoom: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl FlyCamera {
    /// Creates a camera at `position` looking along the direction given by
    /// `yaw` and `pitch` (degrees), with +Y as world up.
    pub fn new(position: Vector3<f32>, yaw: f32, pitch: f32) -> Self {
        let defaults = CameraConfig::default();
        let mut camera = Self {
            position,
            front: Vector3::new(0.0, 0.0, -1.0),
            up: Vector3::unit_y(),
            right: Vector3::unit_x(),
            world_up: Vector3::unit_y(),
            yaw,
            pitch,
            movement_speed: defaults.speed,
            mouse_sensitivity: defaults.sensitivity,
            zoom: defaults.zoom,
        };
        camera.update_camera_vectors();
        camera
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::new(Vector3::from(config.position), config.yaw, config.pitch);
        camera.movement_speed = config.speed;
        camera.mouse_sensitivity = config.sensitivity;
        camera.zoom = config.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        camera
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::new(self.position.x, self.position.y, self.position.z);
        Matrix4::look_at_rh(eye, eye + self.front, self.up)
    }

    /// Perspective projection for the current zoom, in wgpu clip space
    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(Deg(self.zoom), aspect, NEAR_PLANE, FAR_PLANE)
    }

    /// Moves the camera by `movement_speed * delta_time` in the given direction
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Rotates the camera by mouse offsets.
    ///
    /// Positive `y_offset` looks up. With `constrain_pitch` the pitch stays
    /// within ±89° so the view never flips over the pole.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_camera_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    fn update_camera_vectors(&mut self) {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();

        self.front = Vector3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};
    use proptest::prelude::*;

    const EPSILON: f32 = 1e-5;

    fn approx_vec(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < EPSILON
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = FlyCamera::default();
        assert_eq!(camera.position, Vector3::new(0.0, 0.0, 3.0));
        assert!(approx_vec(camera.front, Vector3::new(0.0, 0.0, -1.0)));
        assert!(approx_vec(camera.right, Vector3::new(1.0, 0.0, 0.0)));
        assert!(approx_vec(camera.up, Vector3::new(0.0, 1.0, 0.0)));
        assert_eq!(camera.zoom, 45.0);
    }

    #[test]
    fn view_matrix_moves_camera_to_origin() {
        let camera = FlyCamera::default();
        let eye = camera.view_matrix() * Vector4::new(0.0, 0.0, 3.0, 1.0);
        assert!(eye.truncate().magnitude() < EPSILON);

        let ahead = camera.view_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((ahead.z + 3.0).abs() < EPSILON);
    }

    #[test]
    fn forward_movement_scales_with_delta() {
        let mut camera = FlyCamera::default();
        camera.process_keyboard(CameraMovement::Forward, 0.5);
        assert!(approx_vec(camera.position, Vector3::new(0.0, 0.0, 3.0 - 1.25)));

        camera.process_keyboard(CameraMovement::Right, 1.0);
        assert!(approx_vec(camera.position, Vector3::new(2.5, 0.0, 1.75)));
    }

    #[test]
    fn pitch_is_clamped_when_constrained() {
        let mut camera = FlyCamera::default();
        camera.process_mouse_movement(0.0, 10_000.0, true);
        assert_eq!(camera.pitch, PITCH_LIMIT);

        camera.process_mouse_movement(0.0, -20_000.0, true);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn pitch_is_free_when_unconstrained() {
        let mut camera = FlyCamera::default();
        camera.process_mouse_movement(0.0, 1000.0, false);
        assert!((camera.pitch - 100.0).abs() < EPSILON);
    }

    #[test]
    fn yaw_offset_turns_camera() {
        let mut camera = FlyCamera::default();
        // 900 * 0.1 = 90 degrees, from -90 to 0: looking down +X
        camera.process_mouse_movement(900.0, 0.0, true);
        assert!(approx_vec(camera.front, Vector3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn zoom_stays_within_limits() {
        let mut camera = FlyCamera::default();
        camera.process_mouse_scroll(-10.0);
        assert_eq!(camera.zoom, MAX_ZOOM);

        camera.process_mouse_scroll(30.0);
        assert_eq!(camera.zoom, 15.0);

        camera.process_mouse_scroll(100.0);
        assert_eq!(camera.zoom, MIN_ZOOM);
    }

    #[test]
    fn projection_encodes_aspect_ratio() {
        let camera = FlyCamera::default();
        let projection = camera.projection_matrix(16.0 / 9.0);
        let aspect = projection[1][1] / projection[0][0];
        assert!((aspect - 16.0 / 9.0).abs() < EPSILON);
    }

    #[test]
    fn projection_maps_near_plane_to_zero_depth() {
        let camera = FlyCamera::default();
        let projection = camera.projection_matrix(1.0);
        let clip = projection * Vector4::new(0.0, 0.0, -NEAR_PLANE, 1.0);
        assert!((clip.z / clip.w).abs() < 1e-4);

        let clip = projection * Vector4::new(0.0, 0.0, -FAR_PLANE, 1.0);
        assert!((clip.z / clip.w - 1.0).abs() < 1e-4);
        assert!(projection.invert().is_some());
    }

    fn movement() -> impl Strategy<Value = CameraMovement> {
        prop_oneof![
            Just(CameraMovement::Forward),
            Just(CameraMovement::Backward),
            Just(CameraMovement::Left),
            Just(CameraMovement::Right),
        ]
    }

    proptest! {
        #[test]
        fn zero_delta_never_moves_camera(
            moves in proptest::collection::vec(movement(), 0..32),
            yaw in -360.0f32..360.0,
            pitch in -89.0f32..89.0,
            x in -50.0f32..50.0,
            y in -50.0f32..50.0,
            z in -50.0f32..50.0,
        ) {
            let start = Vector3::new(x, y, z);
            let mut camera = FlyCamera::new(start, yaw, pitch);
            for direction in moves {
                camera.process_keyboard(direction, 0.0);
            }
            prop_assert_eq!(camera.position, start);
        }
    }
}
