//! Per-program uniform state
//!
//! Each shader program keeps a CPU copy of its uniform struct that is
//! updated by name, the way `glUniform*` calls would address a GL program.
//! The render engine snapshots the struct into a dynamic uniform slot for
//! every draw. The `#[repr(C)]` layouts below MUST match the WGSL structs in
//! `lit.wgsl` and `flat.wgsl`; vec3 members are followed by a scalar or an
//! explicit pad so every vec3 starts on a 16-byte boundary.

use crate::gfx::frame::commands::UniformValue;
use crate::gfx::lighting::MAX_POINT_LIGHTS;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum UniformError {
    #[error("program '{program}' has no uniform named '{name}'")]
    Unknown { program: &'static str, name: String },

    #[error("uniform '{name}' expects {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("uniform '{name}' needs a texture unit of 0 or 1, got {unit}")]
    InvalidTextureUnit { name: String, unit: i32 },
}

const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirLightUniform {
    pub direction: [f32; 3],
    _pad0: f32,
    pub ambient: [f32; 3],
    _pad1: f32,
    pub diffuse: [f32; 3],
    _pad2: f32,
    pub specular: [f32; 3],
    _pad3: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 3],
    pub constant: f32,
    pub ambient: [f32; 3],
    pub linear: f32,
    pub diffuse: [f32; 3],
    pub quadratic: f32,
    pub specular: [f32; 3],
    _pad: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightUniform {
    pub position: [f32; 3],
    pub constant: f32,
    pub direction: [f32; 3],
    pub linear: f32,
    pub ambient: [f32; 3],
    pub quadratic: f32,
    pub diffuse: [f32; 3],
    pub cut_off: f32,
    pub specular: [f32; 3],
    pub outer_cut_off: f32,
}

/// Uniforms of the textured, lit program
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LitUniforms {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    pub shininess: f32,
    pub accent_color: [f32; 4],
    pub dir_light: DirLightUniform,
    pub point_lights: [PointLightUniform; MAX_POINT_LIGHTS],
    pub spot_light: SpotLightUniform,
}

impl Default for LitUniforms {
    fn default() -> Self {
        Self {
            projection: IDENTITY,
            view: IDENTITY,
            model: IDENTITY,
            view_pos: [0.0; 3],
            shininess: 1.0,
            accent_color: [1.0; 4],
            dir_light: DirLightUniform::default(),
            point_lights: [PointLightUniform::default(); MAX_POINT_LIGHTS],
            spot_light: SpotLightUniform::default(),
        }
    }
}

/// Uniforms of the flat colour program
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FlatUniforms {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
}

impl Default for FlatUniforms {
    fn default() -> Self {
        Self {
            projection: IDENTITY,
            view: IDENTITY,
            model: IDENTITY,
        }
    }
}

/// A shader program's named-uniform interface
pub trait ShaderProgram {
    type Uniforms: bytemuck::Pod;

    /// Assigns `value` to the uniform called `name`
    fn set_uniform(&mut self, name: &str, value: &UniformValue) -> Result<(), UniformError>;

    /// Current values, as uploaded for the next draw
    fn uniforms(&self) -> &Self::Uniforms;
}

/// Lit program state: uniform values plus which texture unit feeds each
/// material sampler
#[derive(Debug, Clone, PartialEq)]
pub struct LitProgram {
    pub uniforms: LitUniforms,
    pub diffuse_unit: u32,
    pub specular_unit: u32,
}

impl Default for LitProgram {
    fn default() -> Self {
        Self {
            uniforms: LitUniforms::default(),
            diffuse_unit: 0,
            specular_unit: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatProgram {
    pub uniforms: FlatUniforms,
}

fn mismatch(name: &str, expected: &'static str, value: &UniformValue) -> UniformError {
    UniformError::TypeMismatch {
        name: name.to_string(),
        expected,
        actual: value.type_name(),
    }
}

fn as_float(name: &str, value: &UniformValue) -> Result<f32, UniformError> {
    match value {
        UniformValue::Float(v) => Ok(*v),
        other => Err(mismatch(name, "float", other)),
    }
}

fn as_vec3(name: &str, value: &UniformValue) -> Result<[f32; 3], UniformError> {
    match value {
        UniformValue::Vec3(v) => Ok(*v),
        other => Err(mismatch(name, "vec3", other)),
    }
}

fn as_vec4(name: &str, value: &UniformValue) -> Result<[f32; 4], UniformError> {
    match value {
        UniformValue::Vec4(v) => Ok(*v),
        other => Err(mismatch(name, "vec4", other)),
    }
}

fn as_mat4(name: &str, value: &UniformValue) -> Result<[[f32; 4]; 4], UniformError> {
    match value {
        UniformValue::Mat4(v) => Ok(*v),
        other => Err(mismatch(name, "mat4", other)),
    }
}

fn as_texture_unit(name: &str, value: &UniformValue) -> Result<u32, UniformError> {
    match value {
        UniformValue::Int(unit @ 0..=1) => Ok(*unit as u32),
        UniformValue::Int(unit) => Err(UniformError::InvalidTextureUnit {
            name: name.to_string(),
            unit: *unit,
        }),
        other => Err(mismatch(name, "int", other)),
    }
}

/// Splits `array[index].field`
fn split_indexed(name: &str) -> Option<(&str, usize, &str)> {
    let (array, rest) = name.split_once('[')?;
    let (index, field) = rest.split_once("].")?;
    Some((array, index.parse().ok()?, field))
}

/// Handles the uniforms every program declares. Returns `None` for names
/// that are not among them.
fn set_transform(
    projection: &mut [[f32; 4]; 4],
    view: &mut [[f32; 4]; 4],
    model: &mut [[f32; 4]; 4],
    name: &str,
    value: &UniformValue,
) -> Option<Result<(), UniformError>> {
    let slot = match name {
        "projection" => projection,
        "view" => view,
        "model" => model,
        _ => return None,
    };
    Some(as_mat4(name, value).map(|m| *slot = m))
}

impl LitProgram {
    fn unknown(name: &str) -> UniformError {
        UniformError::Unknown {
            program: "lit",
            name: name.to_string(),
        }
    }

    fn set_dir_light(&mut self, name: &str, field: &str, value: &UniformValue) -> Result<(), UniformError> {
        let light = &mut self.uniforms.dir_light;
        match field {
            "direction" => light.direction = as_vec3(name, value)?,
            "ambient" => light.ambient = as_vec3(name, value)?,
            "diffuse" => light.diffuse = as_vec3(name, value)?,
            "specular" => light.specular = as_vec3(name, value)?,
            _ => return Err(Self::unknown(name)),
        }
        Ok(())
    }

    fn set_point_light(
        &mut self,
        name: &str,
        index: usize,
        field: &str,
        value: &UniformValue,
    ) -> Result<(), UniformError> {
        let light = self
            .uniforms
            .point_lights
            .get_mut(index)
            .ok_or_else(|| Self::unknown(name))?;
        match field {
            "position" => light.position = as_vec3(name, value)?,
            "ambient" => light.ambient = as_vec3(name, value)?,
            "diffuse" => light.diffuse = as_vec3(name, value)?,
            "specular" => light.specular = as_vec3(name, value)?,
            "constant" => light.constant = as_float(name, value)?,
            "linear" => light.linear = as_float(name, value)?,
            "quadratic" => light.quadratic = as_float(name, value)?,
            _ => return Err(Self::unknown(name)),
        }
        Ok(())
    }

    fn set_spot_light(&mut self, name: &str, field: &str, value: &UniformValue) -> Result<(), UniformError> {
        let light = &mut self.uniforms.spot_light;
        match field {
            "position" => light.position = as_vec3(name, value)?,
            "direction" => light.direction = as_vec3(name, value)?,
            "ambient" => light.ambient = as_vec3(name, value)?,
            "diffuse" => light.diffuse = as_vec3(name, value)?,
            "specular" => light.specular = as_vec3(name, value)?,
            "constant" => light.constant = as_float(name, value)?,
            "linear" => light.linear = as_float(name, value)?,
            "quadratic" => light.quadratic = as_float(name, value)?,
            "cutOff" => light.cut_off = as_float(name, value)?,
            "outerCutOff" => light.outer_cut_off = as_float(name, value)?,
            _ => return Err(Self::unknown(name)),
        }
        Ok(())
    }
}

impl ShaderProgram for LitProgram {
    type Uniforms = LitUniforms;

    fn set_uniform(&mut self, name: &str, value: &UniformValue) -> Result<(), UniformError> {
        let u = &mut self.uniforms;
        if let Some(result) = set_transform(&mut u.projection, &mut u.view, &mut u.model, name, value) {
            return result;
        }

        match name {
            "viewPos" => u.view_pos = as_vec3(name, value)?,
            "accentColor" => u.accent_color = as_vec4(name, value)?,
            "material.shininess" => u.shininess = as_float(name, value)?,
            "material.diffuse" => self.diffuse_unit = as_texture_unit(name, value)?,
            "material.specular" => self.specular_unit = as_texture_unit(name, value)?,
            _ => {
                if let Some(field) = name.strip_prefix("dirLight.") {
                    return self.set_dir_light(name, field, value);
                }
                if let Some(field) = name.strip_prefix("spotLight.") {
                    return self.set_spot_light(name, field, value);
                }
                return match split_indexed(name) {
                    Some(("pointLights", index, field)) => {
                        self.set_point_light(name, index, field, value)
                    }
                    _ => Err(Self::unknown(name)),
                };
            }
        }
        Ok(())
    }

    fn uniforms(&self) -> &LitUniforms {
        &self.uniforms
    }
}

impl ShaderProgram for FlatProgram {
    type Uniforms = FlatUniforms;

    fn set_uniform(&mut self, name: &str, value: &UniformValue) -> Result<(), UniformError> {
        let u = &mut self.uniforms;
        set_transform(&mut u.projection, &mut u.view, &mut u.model, name, value).unwrap_or_else(
            || {
                Err(UniformError::Unknown {
                    program: "flat",
                    name: name.to_string(),
                })
            },
        )
    }

    fn uniforms(&self) -> &FlatUniforms {
        &self.uniforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_match_wgsl_sizes() {
        assert_eq!(std::mem::size_of::<DirLightUniform>(), 64);
        assert_eq!(std::mem::size_of::<PointLightUniform>(), 64);
        assert_eq!(std::mem::size_of::<SpotLightUniform>(), 80);
        assert_eq!(std::mem::size_of::<LitUniforms>(), 624);
        assert_eq!(std::mem::size_of::<FlatUniforms>(), 192);
    }

    #[test]
    fn point_light_fields_are_addressable() {
        let mut program = LitProgram::default();
        program
            .set_uniform("pointLights[2].linear", &UniformValue::Float(0.09))
            .unwrap();
        program
            .set_uniform("pointLights[3].position", &UniformValue::Vec3([1.0, 2.0, 3.0]))
            .unwrap();

        assert_eq!(program.uniforms.point_lights[2].linear, 0.09);
        assert_eq!(program.uniforms.point_lights[3].position, [1.0, 2.0, 3.0]);
        assert_eq!(program.uniforms.point_lights[0].linear, 0.0);
    }

    #[test]
    fn point_light_index_past_array_is_unknown() {
        let mut program = LitProgram::default();
        let err = program
            .set_uniform("pointLights[4].linear", &UniformValue::Float(1.0))
            .unwrap_err();
        assert!(matches!(err, UniformError::Unknown { .. }));
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let mut program = LitProgram::default();
        let err = program
            .set_uniform("viewPos", &UniformValue::Float(1.0))
            .unwrap_err();
        assert_eq!(
            err,
            UniformError::TypeMismatch {
                name: "viewPos".to_string(),
                expected: "vec3",
                actual: "float",
            }
        );
        assert_eq!(program.uniforms.view_pos, [0.0; 3]);
    }

    #[test]
    fn spotlight_and_directional_fields() {
        let mut program = LitProgram::default();
        program
            .set_uniform("spotLight.outerCutOff", &UniformValue::Float(0.5))
            .unwrap();
        program
            .set_uniform("dirLight.direction", &UniformValue::Vec3([0.0, -1.0, 0.0]))
            .unwrap();
        assert_eq!(program.uniforms.spot_light.outer_cut_off, 0.5);
        assert_eq!(program.uniforms.dir_light.direction, [0.0, -1.0, 0.0]);

        assert!(program
            .set_uniform("dirLight.cutOff", &UniformValue::Float(0.5))
            .is_err());
    }

    #[test]
    fn material_samplers_select_texture_units() {
        let mut program = LitProgram::default();
        program
            .set_uniform("material.specular", &UniformValue::Int(1))
            .unwrap();
        assert_eq!(program.diffuse_unit, 0);
        assert_eq!(program.specular_unit, 1);

        let err = program
            .set_uniform("material.diffuse", &UniformValue::Int(3))
            .unwrap_err();
        assert!(matches!(err, UniformError::InvalidTextureUnit { unit: 3, .. }));
    }

    #[test]
    fn flat_program_only_knows_transforms() {
        let mut program = FlatProgram::default();
        let m = [[3.0; 4]; 4];
        program.set_uniform("model", &UniformValue::Mat4(m)).unwrap();
        assert_eq!(program.uniforms().model, m);

        let err = program
            .set_uniform("viewPos", &UniformValue::Vec3([0.0; 3]))
            .unwrap_err();
        assert!(matches!(err, UniformError::Unknown { program: "flat", .. }));
    }
}
