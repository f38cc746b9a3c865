//! The per-frame draw protocol
//!
//! [`FrameRenderer::render`] records one frame into a [`CommandList`]. The
//! recording is a pure function of the [`FrameContext`] and the fixed scene,
//! which is what lets the tests check the protocol without a GPU.

use cgmath::{Matrix4, Vector3};

use super::{
    commands::{CommandList, ProgramKind},
    context::FrameContext,
};
use crate::gfx::{
    lighting::{LIGHT_MARKER_SCALE, MATERIAL_SHININESS, NEUTRAL_ACCENT},
    scene::{MeshId, Scene, SceneHandles},
};

pub const CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.1, 1.0];

/// Vertices drawn per light marker cube
const MARKER_VERTEX_COUNT: u32 = 36;

pub struct FrameRenderer {
    scene: Scene,
    handles: SceneHandles,
}

impl FrameRenderer {
    pub fn new(scene: Scene, handles: SceneHandles) -> Self {
        Self { scene, handles }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// One-time program setup: sampler units, neutral accent and the shared
    /// projection. The shared projection is never written again.
    pub fn init(&self, ctx: &FrameContext, out: &mut CommandList) {
        out.use_program(ProgramKind::Lit);
        out.set_int("material.diffuse", 0);
        out.set_int("material.specular", 1);
        out.set_vec4("accentColor", NEUTRAL_ACCENT);
        out.write_shared_projection(ctx.camera.projection_matrix(ctx.screen.aspect()));
    }

    /// Records one frame
    pub fn render(&self, ctx: &FrameContext, out: &mut CommandList) {
        out.clear_color(CLEAR_COLOR);

        out.use_program(ProgramKind::Lit);
        self.upload_lighting(ctx, out);

        let projection = ctx.camera.projection_matrix(ctx.screen.aspect());
        let view = ctx.camera.view_matrix();
        out.set_mat4("projection", projection);
        out.set_mat4("view", view);

        self.draw_objects(ctx, out);

        out.write_shared_view(view);

        self.draw_light_markers(ctx, projection, view, out);

        out.present();
    }

    fn upload_lighting(&self, ctx: &FrameContext, out: &mut CommandList) {
        let lighting = &ctx.lighting;

        out.set_vec3("viewPos", ctx.camera.position);
        out.set_float("material.shininess", MATERIAL_SHININESS);

        let dir = &lighting.directional;
        out.set_vec3("dirLight.direction", dir.direction);
        out.set_vec3("dirLight.ambient", dir.ambient);
        out.set_vec3("dirLight.diffuse", dir.diffuse);
        out.set_vec3("dirLight.specular", dir.specular);

        for (i, light) in lighting.point_lights.iter().enumerate() {
            let field = |name: &str| format!("pointLights[{}].{}", i, name);
            out.set_vec3(field("position"), light.position);
            out.set_vec3(field("ambient"), light.ambient);
            out.set_vec3(field("diffuse"), light.diffuse);
            out.set_vec3(field("specular"), light.specular);
            out.set_float(field("constant"), light.attenuation.constant);
            out.set_float(field("linear"), light.attenuation.linear);
            out.set_float(field("quadratic"), light.attenuation.quadratic);
        }

        // The spotlight is a flashlight held by the camera
        let spot = &lighting.spot;
        out.set_vec3("spotLight.position", ctx.camera.position);
        out.set_vec3("spotLight.direction", ctx.camera.front);
        out.set_vec3("spotLight.ambient", spot.ambient);
        out.set_vec3("spotLight.diffuse", spot.diffuse);
        out.set_vec3("spotLight.specular", spot.specular);
        out.set_float("spotLight.constant", spot.attenuation.constant);
        out.set_float("spotLight.linear", spot.attenuation.linear);
        out.set_float("spotLight.quadratic", spot.attenuation.quadratic);
        out.set_float("spotLight.cutOff", spot.cut_off());
        out.set_float("spotLight.outerCutOff", spot.outer_cut_off());
    }

    fn draw_objects(&self, ctx: &FrameContext, out: &mut CommandList) {
        for object in &self.scene.objects {
            out.set_mat4("model", object.model_matrix());
            if object.accent {
                out.set_vec4("accentColor", ctx.lighting.accent.color(ctx.elapsed));
            }
            out.bind_texture(0, self.handles.texture(object.texture));
            out.draw(self.handles.mesh(object.mesh), object.vertex_count);
            if object.accent {
                out.set_vec4("accentColor", NEUTRAL_ACCENT);
            }
        }
    }

    fn draw_light_markers(
        &self,
        ctx: &FrameContext,
        projection: Matrix4<f32>,
        view: Matrix4<f32>,
        out: &mut CommandList,
    ) {
        out.use_program(ProgramKind::Flat);
        let cube = self.handles.mesh(MeshId::LightCube);

        for &position in &ctx.lighting.marker_positions {
            // The flat program keeps its own uniform state
            out.set_mat4("projection", projection);
            out.set_mat4("view", view);
            out.set_mat4("model", marker_model(position));
            out.draw(cube, MARKER_VERTEX_COUNT);
        }
    }
}

/// Model matrix of a light marker: translate to the light, then shrink
pub fn marker_model(position: Vector3<f32>) -> Matrix4<f32> {
    Matrix4::from_translation(position) * Matrix4::from_scale(LIGHT_MARKER_SCALE)
}
