//! Per-frame state shared by the input handler and the frame renderer

use std::time::Instant;

use crate::gfx::{camera::FlyCamera, lighting::LightingState};

use super::commands::CommandList;

/// Drawable surface size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Monotonic clock started when the application starts
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds since the clock was created
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Everything a frame depends on besides the fixed scene.
///
/// The input handler mutates it between frames; the frame renderer only
/// reads it.
#[derive(Debug, Clone)]
pub struct FrameContext {
    pub camera: FlyCamera,
    pub lighting: LightingState,
    pub screen: ScreenSize,
    /// Seconds since startup at the beginning of this frame
    pub elapsed: f64,
    /// Seconds since the previous frame
    pub delta_time: f32,
    should_close: bool,
}

impl FrameContext {
    pub fn new(camera: FlyCamera, lighting: LightingState, screen: ScreenSize) -> Self {
        Self {
            camera,
            lighting,
            screen,
            elapsed: 0.0,
            delta_time: 0.0,
            should_close: false,
        }
    }

    /// Starts a new frame at `elapsed` seconds and returns the frame delta
    pub fn advance(&mut self, elapsed: f64) -> f32 {
        self.delta_time = (elapsed - self.elapsed).max(0.0) as f32;
        self.elapsed = elapsed;
        self.delta_time
    }

    /// Records a surface resize.
    ///
    /// Zero-sized surfaces (a minimised window) are ignored so the projection
    /// never sees a degenerate aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32, commands: &mut CommandList) {
        let size = ScreenSize::new(width, height);
        if size.is_empty() || size == self.screen {
            return;
        }
        log::debug!("Viewport {}x{}", width, height);
        self.screen = size;
        commands.set_viewport(width, height);
    }

    pub fn request_close(&mut self) {
        self.should_close = true;
    }

    pub fn should_close(&self) -> bool {
        self.should_close
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::frame::commands::RenderCommand;

    fn context() -> FrameContext {
        FrameContext::new(
            FlyCamera::default(),
            LightingState::classroom(),
            ScreenSize::new(800, 600),
        )
    }

    #[test]
    fn advance_reports_delta() {
        let mut ctx = context();
        assert_eq!(ctx.advance(0.5), 0.5);
        assert_eq!(ctx.advance(0.75), 0.25);
        assert_eq!(ctx.elapsed, 0.75);
    }

    #[test]
    fn advance_never_goes_negative() {
        let mut ctx = context();
        ctx.advance(2.0);
        assert_eq!(ctx.advance(1.0), 0.0);
    }

    #[test]
    fn resize_records_viewport() {
        let mut ctx = context();
        let mut commands = CommandList::new();
        ctx.resize(1920, 1080, &mut commands);

        assert_eq!(ctx.screen, ScreenSize::new(1920, 1080));
        assert_eq!(
            commands.commands(),
            &[RenderCommand::SetViewport {
                width: 1920,
                height: 1080
            }]
        );
    }

    #[test]
    fn minimised_window_is_ignored() {
        let mut ctx = context();
        let mut commands = CommandList::new();
        ctx.resize(0, 0, &mut commands);
        ctx.resize(800, 600, &mut commands);

        assert_eq!(ctx.screen, ScreenSize::new(800, 600));
        assert!(commands.is_empty());
    }

    #[test]
    fn close_request_is_sticky() {
        let mut ctx = context();
        assert!(!ctx.should_close());
        ctx.request_close();
        assert!(ctx.should_close());
    }
}
