//! Keyboard and mouse handling
//!
//! Translates winit events into camera movement, accent mode changes and the
//! close request, all applied to the [`FrameContext`].

use std::collections::HashSet;

use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::gfx::{camera::CameraMovement, frame::FrameContext, lighting::AccentMode};

/// Pixel scroll deltas are divided by this to match one wheel notch
const PIXELS_PER_LINE: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    AccentRedPulse,
    AccentBluePulse,
    AccentOff,
    Close,
}

impl InputAction {
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::KeyW => Some(InputAction::MoveForward),
            KeyCode::KeyS => Some(InputAction::MoveBackward),
            KeyCode::KeyA => Some(InputAction::MoveLeft),
            KeyCode::KeyD => Some(InputAction::MoveRight),
            KeyCode::Digit1 => Some(InputAction::AccentRedPulse),
            KeyCode::Digit2 => Some(InputAction::AccentBluePulse),
            KeyCode::Digit0 => Some(InputAction::AccentOff),
            KeyCode::Escape => Some(InputAction::Close),
            _ => None,
        }
    }

    fn movement(self) -> Option<CameraMovement> {
        match self {
            InputAction::MoveForward => Some(CameraMovement::Forward),
            InputAction::MoveBackward => Some(CameraMovement::Backward),
            InputAction::MoveLeft => Some(CameraMovement::Left),
            InputAction::MoveRight => Some(CameraMovement::Right),
            _ => None,
        }
    }
}

/// Tracks held movement keys between frames.
///
/// Movement is polled once per frame from the held set so it scales with the
/// frame delta; everything else acts on the key press itself.
#[derive(Debug, Default)]
pub struct InputHandler {
    held: HashSet<InputAction>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_keyed_event(&mut self, event: &KeyEvent, ctx: &mut FrameContext) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        if let Some(action) = InputAction::from_key_code(code) {
            self.key(action, event.state == ElementState::Pressed, ctx);
        }
    }

    pub fn process_device_event(&mut self, event: &DeviceEvent, ctx: &mut FrameContext) {
        match event {
            DeviceEvent::MouseMotion { delta } => {
                self.mouse_motion(delta.0 as f32, delta.1 as f32, ctx);
            }
            DeviceEvent::MouseWheel { delta } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => *lines,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                        *y as f32 / PIXELS_PER_LINE
                    }
                };
                self.scroll(scroll, ctx);
            }
            _ => (),
        }
    }

    /// Applies a key transition
    pub fn key(&mut self, action: InputAction, pressed: bool, ctx: &mut FrameContext) {
        if action.movement().is_some() {
            if pressed {
                self.held.insert(action);
            } else {
                self.held.remove(&action);
            }
            return;
        }
        if !pressed {
            return;
        }

        match action {
            InputAction::AccentRedPulse => {
                ctx.lighting.set_accent(AccentMode::RedPulse);
            }
            InputAction::AccentBluePulse => {
                ctx.lighting.set_accent(AccentMode::BluePulse);
            }
            InputAction::AccentOff => {
                ctx.lighting.set_accent(AccentMode::Off);
            }
            InputAction::Close => {
                log::info!("Close requested");
                ctx.request_close();
            }
            _ => (),
        }
    }

    /// Moves the camera for every held movement key
    pub fn apply_held(&self, ctx: &mut FrameContext, delta_time: f32) {
        for action in &self.held {
            if let Some(direction) = action.movement() {
                ctx.camera.process_keyboard(direction, delta_time);
            }
        }
    }

    /// Forgets held keys, e.g. when focus is lost before their release
    pub fn release_held(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.contains(&action)
    }

    /// Screen y grows downward, so the vertical delta is inverted before it
    /// reaches the camera
    pub fn mouse_motion(&mut self, dx: f32, dy: f32, ctx: &mut FrameContext) {
        ctx.camera.process_mouse_movement(dx, -dy, true);
    }

    pub fn scroll(&mut self, dy: f32, ctx: &mut FrameContext) {
        ctx.camera.process_mouse_scroll(dy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        camera::FlyCamera,
        frame::ScreenSize,
        lighting::LightingState,
    };
    use cgmath::InnerSpace;
    use proptest::prelude::*;

    fn context() -> FrameContext {
        FrameContext::new(
            FlyCamera::default(),
            LightingState::classroom(),
            ScreenSize::new(800, 600),
        )
    }

    #[test]
    fn key_codes_map_to_actions() {
        assert_eq!(InputAction::from_key_code(KeyCode::KeyW), Some(InputAction::MoveForward));
        assert_eq!(InputAction::from_key_code(KeyCode::Digit0), Some(InputAction::AccentOff));
        assert_eq!(InputAction::from_key_code(KeyCode::Escape), Some(InputAction::Close));
        assert_eq!(InputAction::from_key_code(KeyCode::KeyQ), None);
    }

    #[test]
    fn held_forward_moves_along_front() {
        let mut ctx = context();
        let mut input = InputHandler::new();
        let start = ctx.camera.position;

        input.key(InputAction::MoveForward, true, &mut ctx);
        input.apply_held(&mut ctx, 1.0);

        let moved = ctx.camera.position - start;
        assert!((moved.magnitude() - ctx.camera.movement_speed).abs() < 1e-5);
        assert!(moved.dot(ctx.camera.front) > 0.0);
    }

    #[test]
    fn released_key_stops_moving() {
        let mut ctx = context();
        let mut input = InputHandler::new();

        input.key(InputAction::MoveLeft, true, &mut ctx);
        input.key(InputAction::MoveLeft, false, &mut ctx);
        assert!(!input.is_held(InputAction::MoveLeft));

        let start = ctx.camera.position;
        input.apply_held(&mut ctx, 0.5);
        assert_eq!(ctx.camera.position, start);
    }

    #[test]
    fn focus_loss_stops_held_movement() {
        let mut ctx = context();
        let mut input = InputHandler::new();

        input.key(InputAction::MoveForward, true, &mut ctx);
        input.key(InputAction::MoveRight, true, &mut ctx);
        input.release_held();
        assert!(!input.is_held(InputAction::MoveForward));

        let start = ctx.camera.position;
        input.apply_held(&mut ctx, 1.0);
        assert_eq!(ctx.camera.position, start);
    }

    #[test]
    fn escape_requests_close() {
        let mut ctx = context();
        let mut input = InputHandler::new();
        assert!(!ctx.should_close());
        input.key(InputAction::Close, true, &mut ctx);
        assert!(ctx.should_close());
    }

    #[test]
    fn mouse_up_looks_up() {
        let mut ctx = context();
        let mut input = InputHandler::new();
        // Moving the mouse up gives a negative screen delta
        input.mouse_motion(0.0, -50.0, &mut ctx);
        assert!(ctx.camera.pitch > 0.0);
        assert!(ctx.camera.front.y > 0.0);
    }

    #[test]
    fn scrolling_up_zooms_in() {
        let mut ctx = context();
        let mut input = InputHandler::new();
        input.scroll(5.0, &mut ctx);
        assert_eq!(ctx.camera.zoom, 40.0);
    }

    fn accent_action() -> impl Strategy<Value = InputAction> {
        prop_oneof![
            Just(InputAction::AccentRedPulse),
            Just(InputAction::AccentBluePulse),
            Just(InputAction::AccentOff),
        ]
    }

    proptest! {
        #[test]
        fn exactly_one_accent_mode_after_any_presses(
            presses in proptest::collection::vec(accent_action(), 0..32)
        ) {
            let mut ctx = context();
            let mut input = InputHandler::new();
            for &action in &presses {
                input.key(action, true, &mut ctx);
            }

            let accent = ctx.lighting.accent;
            let active = [accent.is_red_pulse(), accent.is_blue_pulse(), accent.is_off()]
                .iter()
                .filter(|&&on| on)
                .count();
            prop_assert_eq!(active, 1);

            let expected = match presses.last() {
                Some(InputAction::AccentRedPulse) => AccentMode::RedPulse,
                Some(InputAction::AccentBluePulse) => AccentMode::BluePulse,
                _ => AccentMode::Off,
            };
            prop_assert_eq!(accent, expected);
        }
    }
}
