//! Scene lighting
//!
//! One directional light, a fixed table of point lights, a spotlight that
//! follows the camera like a flashlight, and the blackboard accent mode.
//! The values here are uploaded to the lit program every frame by the
//! [`FrameRenderer`](crate::gfx::frame::FrameRenderer).

use cgmath::Vector3;

/// Number of point lights the lit shader declares
pub const MAX_POINT_LIGHTS: usize = 4;

/// Number of point-light positions that get a marker cube
pub const LIGHT_MARKER_COUNT: usize = 6;

/// Edge length of a marker cube relative to the unit cube
pub const LIGHT_MARKER_SCALE: f32 = 0.4;

pub const MATERIAL_SHININESS: f32 = 32.0;

#[rustfmt::skip]
pub const POINT_LIGHT_POSITIONS: [[f32; 3]; 8] = [
    [-3.0, 3.0, -3.0],
    [ 3.0, 3.0,  3.0],
    [ 3.0, 3.0, -3.0],
    [-3.0, 3.0,  3.0],
    [ 0.0, 3.0,  0.0],
    [-3.0, 3.0, -3.0],
    [ 0.0, 3.0, -2.0],
    [-2.0, 3.0, -2.0],
];

/// Colour the blackboard is multiplied by while no accent is active
pub const NEUTRAL_ACCENT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Pulsing colour applied to the blackboard.
///
/// Exactly one mode is active at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccentMode {
    RedPulse,
    BluePulse,
    #[default]
    Off,
}

impl AccentMode {
    /// Accent colour after `elapsed` seconds of runtime
    pub fn color(self, elapsed: f64) -> [f32; 4] {
        let pulse = (elapsed.sin() / 2.0 + 0.5) as f32;
        match self {
            AccentMode::RedPulse => [pulse, 0.0, pulse, 1.0],
            AccentMode::BluePulse => [0.0, 0.0, pulse, 1.0],
            AccentMode::Off => NEUTRAL_ACCENT,
        }
    }

    pub fn is_red_pulse(self) -> bool {
        self == AccentMode::RedPulse
    }

    pub fn is_blue_pulse(self) -> bool {
        self == AccentMode::BluePulse
    }

    pub fn is_off(self) -> bool {
        self == AccentMode::Off
    }
}

/// Distance falloff `1 / (constant + linear*d + quadratic*d^2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    /// Covers roughly 50 units
    pub const MEDIUM_RANGE: Attenuation = Attenuation {
        constant: 1.0,
        linear: 0.09,
        quadratic: 0.032,
    };

    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vector3::new(-0.2, -1.0, -0.3),
            ambient: Vector3::new(0.05, 0.05, 0.05),
            diffuse: Vector3::new(0.4, 0.4, 0.4),
            specular: Vector3::new(0.5, 0.5, 0.5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub attenuation: Attenuation,
}

impl PointLight {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ambient: Vector3::new(0.05, 0.05, 0.05),
            diffuse: Vector3::new(0.8, 0.8, 0.8),
            specular: Vector3::new(1.0, 1.0, 1.0),
            attenuation: Attenuation::MEDIUM_RANGE,
        }
    }
}

/// Spotlight parameters. Position and direction are taken from the camera
/// each frame, so only the cone and colours live here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub attenuation: Attenuation,
    /// Full-intensity cone half angle in degrees
    pub inner_cutoff_deg: f32,
    /// Half angle in degrees where the light has faded out
    pub outer_cutoff_deg: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            ambient: Vector3::new(0.0, 0.0, 0.0),
            diffuse: Vector3::new(1.0, 1.0, 1.0),
            specular: Vector3::new(1.0, 1.0, 1.0),
            attenuation: Attenuation::MEDIUM_RANGE,
            inner_cutoff_deg: 12.5,
            outer_cutoff_deg: 15.0,
        }
    }
}

impl SpotLight {
    /// Cosine of the inner cone angle, as the shader compares it
    pub fn cut_off(&self) -> f32 {
        self.inner_cutoff_deg.to_radians().cos()
    }

    pub fn outer_cut_off(&self) -> f32 {
        self.outer_cutoff_deg.to_radians().cos()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightingState {
    pub directional: DirectionalLight,
    /// Lights uploaded to the lit shader, at most [`MAX_POINT_LIGHTS`]
    pub point_lights: Vec<PointLight>,
    /// Positions that get a flat-shaded marker cube
    pub marker_positions: Vec<Vector3<f32>>,
    pub spot: SpotLight,
    pub accent: AccentMode,
}

impl Default for LightingState {
    fn default() -> Self {
        Self::classroom()
    }
}

impl LightingState {
    pub fn classroom() -> Self {
        let positions: Vec<Vector3<f32>> = POINT_LIGHT_POSITIONS
            .iter()
            .map(|&p| Vector3::from(p))
            .collect();

        Self {
            directional: DirectionalLight::default(),
            point_lights: positions
                .iter()
                .take(MAX_POINT_LIGHTS)
                .map(|&p| PointLight::at(p))
                .collect(),
            marker_positions: positions.into_iter().take(LIGHT_MARKER_COUNT).collect(),
            spot: SpotLight::default(),
            accent: AccentMode::default(),
        }
    }

    /// Changes the accent mode, returning whether it actually changed
    pub fn set_accent(&mut self, mode: AccentMode) -> bool {
        if self.accent == mode {
            return false;
        }
        log::info!("Accent mode {:?} -> {:?}", self.accent, mode);
        self.accent = mode;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const EPSILON: f32 = 1e-6;

    fn approx(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < EPSILON)
    }

    #[test]
    fn red_pulse_follows_sine() {
        assert!(approx(AccentMode::RedPulse.color(PI), [0.5, 0.0, 0.5, 1.0]));
        assert!(approx(AccentMode::RedPulse.color(PI / 2.0), [1.0, 0.0, 1.0, 1.0]));
        assert!(approx(AccentMode::RedPulse.color(3.0 * PI / 2.0), [0.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn blue_pulse_only_drives_blue() {
        assert!(approx(AccentMode::BluePulse.color(PI / 2.0), [0.0, 0.0, 1.0, 1.0]));
        assert!(approx(AccentMode::BluePulse.color(0.0), [0.0, 0.0, 0.5, 1.0]));
    }

    #[test]
    fn off_is_white_at_any_time() {
        for t in [0.0, 1.0, PI, 1234.5] {
            assert_eq!(AccentMode::Off.color(t), NEUTRAL_ACCENT);
        }
    }

    #[test]
    fn spotlight_cutoffs_are_cosines() {
        let spot = SpotLight::default();
        assert!((spot.cut_off() - 0.976_296).abs() < 1e-5);
        assert!((spot.outer_cut_off() - 0.965_926).abs() < 1e-5);
        assert!(spot.cut_off() > spot.outer_cut_off());
    }

    #[test]
    fn classroom_lights_match_tables() {
        let lighting = LightingState::classroom();
        assert_eq!(lighting.point_lights.len(), MAX_POINT_LIGHTS);
        assert_eq!(lighting.marker_positions.len(), LIGHT_MARKER_COUNT);
        for (light, expected) in lighting.point_lights.iter().zip(POINT_LIGHT_POSITIONS.iter()) {
            assert_eq!(light.position, Vector3::from(*expected));
            assert_eq!(light.attenuation, Attenuation::MEDIUM_RANGE);
        }
        assert_eq!(lighting.accent, AccentMode::Off);
    }

    #[test]
    fn attenuation_is_one_at_the_light() {
        assert_eq!(Attenuation::MEDIUM_RANGE.factor(0.0), 1.0);
        assert!(Attenuation::MEDIUM_RANGE.factor(10.0) < 0.25);
    }

    #[test]
    fn set_accent_reports_changes() {
        let mut lighting = LightingState::classroom();
        assert!(!lighting.set_accent(AccentMode::Off));
        assert!(lighting.set_accent(AccentMode::BluePulse));
        assert!(lighting.accent.is_blue_pulse());
    }
}
