//! WGPU-based executor for recorded frames
//!
//! The [`RenderEngine`] owns the surface, the device, both pipelines and every
//! uploaded texture and mesh. It replays a [`CommandList`] in two phases:
//! first the commands are walked on the CPU, updating each program's
//! persistent uniform state and snapshotting it into a dynamic uniform slot
//! per draw; then one render pass issues the draws with their slot offsets.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::Arc,
};

use thiserror::Error;
use wgpu::TextureFormat;

use crate::gfx::{
    frame::{CommandList, ProgramKind, RenderCommand},
    resources::{
        global_bindings::{BlockError, GlobalBindings},
        program_uniforms::{FlatProgram, LitProgram, ShaderProgram},
        DecodedTexture, MeshHandle, MeshResource, ResourceCache, TextureError, TextureHandle,
        TextureResource,
    },
    scene::vertex::Vertex,
};
use crate::wgpu_utils::{
    binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
    DynamicUniformBuffer,
};

use super::pipeline_manager::{PipelineConfig, PipelineError, PipelineManager};

/// Texture units the lit program can sample from
const TEXTURE_UNITS: usize = 2;

/// Initial per-frame draw capacity of each program's uniform slots
const INITIAL_DRAW_SLOTS: usize = 32;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface does not support this adapter")]
    UnsupportedSurface,
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    SharedBlock(#[from] BlockError),
}

/// The diffuse/specular pair a lit draw samples from
type TexturePair = [TextureHandle; TEXTURE_UNITS];

/// A program's persistent uniform state and its per-draw slots
struct ProgramSlots<P: ShaderProgram> {
    label: &'static str,
    program: P,
    slots: DynamicUniformBuffer<P::Uniforms>,
    layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl<P: ShaderProgram + Default> ProgramSlots<P> {
    fn new(device: &wgpu::Device, label: &'static str) -> Self {
        let slots = DynamicUniformBuffer::new(device, INITIAL_DRAW_SLOTS);
        let layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::dynamic_uniform(
                DynamicUniformBuffer::<P::Uniforms>::slot_size(),
            ))
            .create(device, &format!("{} Uniforms Layout", label));
        let bind_group = Self::create_bind_group(device, &layout, &slots, label);

        Self {
            label,
            program: P::default(),
            slots,
            layout,
            bind_group,
        }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        slots: &DynamicUniformBuffer<P::Uniforms>,
        label: &str,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .resource(slots.binding_resource())
            .create(device, &format!("{} Uniforms", label))
    }

    /// Records the current uniform values for one draw
    fn snapshot(&mut self) -> u32 {
        self.slots.push(self.program.uniforms())
    }

    fn flush(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.slots.flush(device, queue) {
            self.bind_group = Self::create_bind_group(device, &self.layout, &self.slots, self.label);
        }
    }
}

struct PreparedDraw {
    program: ProgramKind,
    mesh: MeshHandle,
    vertex_count: u32,
    slot: u32,
    textures: Option<TexturePair>,
}

#[derive(Default)]
struct PreparedFrame {
    draws: Vec<PreparedDraw>,
    clear: Option<[f32; 4]>,
    present: bool,
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    pipeline_manager: PipelineManager,
    global_bindings: GlobalBindings,

    textures: ResourceCache<TextureResource>,
    meshes: ResourceCache<MeshResource>,
    /// Sampled by units nothing was bound to
    fallback_texture: TextureResource,
    texture_layout: BindGroupLayoutWithDesc,
    texture_bind_groups: HashMap<TexturePair, wgpu::BindGroup>,

    lit: ProgramSlots<LitProgram>,
    flat: ProgramSlots<FlatProgram>,
    active_program: Option<ProgramKind>,
    bound_textures: TexturePair,

    warned: HashSet<String>,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    /// * `vsync` - Whether presentation waits for vertical blank
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("Adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        // Textures are plain Rgba8Unorm, so the swapchain must not convert to sRGB
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(RenderError::UnsupportedSurface)?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .ok_or(RenderError::UnsupportedSurface)?;
        log::info!("Surface format {:?}, {}x{}", format, width, height);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_bindings = GlobalBindings::new(&device);
        let lit = ProgramSlots::<LitProgram>::new(&device, "Lit");
        let flat = ProgramSlots::<FlatProgram>::new(&device, "Flat");

        let texture_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(&device, "Material Bind Group Layout");

        let fallback_texture = TextureResource::from_decoded(
            &device,
            &queue,
            &DecodedTexture::solid([0, 0, 0, 255]),
            "Unbound Texture",
        );

        let device: Arc<wgpu::Device> = device.into();
        let queue: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device.clone());

        pipeline_manager.load_shader("lit.wgsl", include_str!("lit.wgsl"));
        pipeline_manager.load_shader("flat.wgsl", include_str!("flat.wgsl"));

        let color_targets = vec![Some(wgpu::ColorTargetState {
            format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        pipeline_manager.register_pipeline(
            ProgramKind::Lit.label(),
            PipelineConfig::default_with_shader("lit.wgsl")
                .with_label("Lit Pipeline")
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    lit.layout.layout.clone(),
                    texture_layout.layout.clone(),
                ])
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_color_targets(color_targets.clone()),
        );
        pipeline_manager.register_pipeline(
            ProgramKind::Flat.label(),
            PipelineConfig::default_with_shader("flat.wgsl")
                .with_label("Flat Pipeline")
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    flat.layout.layout.clone(),
                ])
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_color_targets(color_targets),
        );
        pipeline_manager.create_all_pipelines()?;
        log::debug!("{:?}", pipeline_manager.get_stats());

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            pipeline_manager,
            global_bindings,
            textures: ResourceCache::new("texture"),
            meshes: ResourceCache::new("mesh"),
            fallback_texture,
            texture_layout,
            texture_bind_groups: HashMap::new(),
            lit,
            flat,
            active_program: None,
            bound_textures: [TextureHandle::INVALID; TEXTURE_UNITS],
            warned: HashSet::new(),
        })
    }

    /// Decodes an image file and uploads it
    pub fn load_texture(&mut self, path: &Path) -> Result<TextureHandle, TextureError> {
        let decoded = DecodedTexture::load(path)?;
        let label = path.display().to_string();
        let texture = TextureResource::from_decoded(&self.device, &self.queue, &decoded, &label);
        log::debug!(
            "Loaded {} ({}x{}, {:?})",
            label,
            decoded.width,
            decoded.height,
            decoded.layout
        );
        Ok(self.textures.insert(texture))
    }

    /// Uploads a 1x1 texture of a single colour
    pub fn create_solid_texture(&mut self, rgba: [u8; 4], label: &str) -> TextureHandle {
        let texture = TextureResource::from_decoded(
            &self.device,
            &self.queue,
            &DecodedTexture::solid(rgba),
            label,
        );
        self.textures.insert(texture)
    }

    pub fn upload_mesh(&mut self, vertices: &[Vertex], label: &str) -> MeshHandle {
        self.meshes
            .insert(MeshResource::upload(&self.device, vertices, label))
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Zero-sized requests are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width == self.config.width && height == self.config.height {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Returns current surface dimensions
    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.config.format
    }

    /// Replays a recorded command list.
    ///
    /// Uniform and texture state persists across calls, as program state does
    /// in immediate-mode APIs. Draws reach the screen only if the list ends
    /// the frame with `Present`. Writes to the shared block apply to the
    /// whole submitted frame.
    pub fn execute(&mut self, commands: &CommandList) -> Result<(), RenderError> {
        self.lit.slots.clear();
        self.flat.slots.clear();

        let frame = self.prepare(commands)?;
        self.lit.flush(&self.device, &self.queue);
        self.flat.flush(&self.device, &self.queue);

        if frame.present {
            self.submit(&frame)
        } else {
            if !frame.draws.is_empty() {
                log::debug!("{} draws recorded without present", frame.draws.len());
            }
            Ok(())
        }
    }

    /// Walks the commands, applying state changes and snapshotting uniforms
    fn prepare(&mut self, commands: &CommandList) -> Result<PreparedFrame, RenderError> {
        let mut frame = PreparedFrame::default();

        for command in commands {
            match command {
                RenderCommand::SetViewport { width, height } => self.resize(*width, *height),
                RenderCommand::Clear { color } => frame.clear = Some(*color),
                RenderCommand::UseProgram(program) => self.active_program = Some(*program),
                RenderCommand::SetUniform { name, value } => {
                    let result = match self.active_program {
                        Some(ProgramKind::Lit) => self.lit.program.set_uniform(name, value),
                        Some(ProgramKind::Flat) => self.flat.program.set_uniform(name, value),
                        None => {
                            self.warn_once(format!("uniform '{}' set with no program in use", name));
                            continue;
                        }
                    };
                    if let Err(e) = result {
                        self.warn_once(e.to_string());
                    }
                }
                RenderCommand::BindTexture { unit, texture } => {
                    match self.bound_textures.get_mut(*unit as usize) {
                        Some(slot) => *slot = *texture,
                        None => self.warn_once(format!("texture unit {} does not exist", unit)),
                    }
                }
                RenderCommand::Draw { mesh, vertex_count } => {
                    if let Some(draw) = self.prepare_draw(*mesh, *vertex_count) {
                        frame.draws.push(draw);
                    }
                }
                RenderCommand::WriteSharedBlock { offset, matrix } => {
                    self.global_bindings
                        .write_matrix(&self.queue, *offset, matrix)?;
                }
                RenderCommand::Present => frame.present = true,
            }
        }

        Ok(frame)
    }

    fn prepare_draw(&mut self, mesh: MeshHandle, vertex_count: u32) -> Option<PreparedDraw> {
        let Some(program) = self.active_program else {
            self.warn_once("draw issued with no program in use".to_string());
            return None;
        };
        let Some(available) = self.meshes.get(mesh).map(MeshResource::vertex_count) else {
            self.warn_once(format!("draw of unknown mesh {:?}", mesh));
            return None;
        };
        if vertex_count > available {
            self.warn_once(format!(
                "draw of {} vertices from {:?} clamped to {}",
                vertex_count, mesh, available
            ));
        }
        let vertex_count = vertex_count.min(available);

        let (slot, textures) = match program {
            ProgramKind::Lit => {
                let pair = [
                    self.bound_textures[self.lit.program.diffuse_unit as usize],
                    self.bound_textures[self.lit.program.specular_unit as usize],
                ];
                self.ensure_texture_bind_group(pair);
                (self.lit.snapshot(), Some(pair))
            }
            ProgramKind::Flat => (self.flat.snapshot(), None),
        };

        Some(PreparedDraw {
            program,
            mesh,
            vertex_count,
            slot,
            textures,
        })
    }

    fn ensure_texture_bind_group(&mut self, pair: TexturePair) {
        if self.texture_bind_groups.contains_key(&pair) {
            return;
        }

        let diffuse = resolve_texture(&self.textures, &self.fallback_texture, pair[0]);
        let specular = resolve_texture(&self.textures, &self.fallback_texture, pair[1]);
        let bind_group = BindGroupBuilder::new(&self.texture_layout)
            .texture(&diffuse.view)
            .texture(&specular.view)
            .sampler(&diffuse.sampler)
            .create(&self.device, "Material Bind Group");

        self.texture_bind_groups.insert(pair, bind_group);
    }

    fn submit(&mut self, frame: &PreparedFrame) -> Result<(), RenderError> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timed out, skipping frame");
                return Ok(());
            }
            Err(e @ wgpu::SurfaceError::OutOfMemory) => return Err(e.into()),
            Err(e) => {
                log::warn!("Skipping frame: {}", e);
                return Ok(());
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let lit_pipeline = self.pipeline_manager.pipeline(ProgramKind::Lit.label())?;
            let flat_pipeline = self.pipeline_manager.pipeline(ProgramKind::Flat.label())?;

            let (color_load, depth_load) = match frame.clear {
                Some(color) => (wgpu::LoadOp::Clear(to_wgpu_color(color)), wgpu::LoadOp::Clear(1.0)),
                None => (wgpu::LoadOp::Load, wgpu::LoadOp::Load),
            };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_viewport(
                0.0,
                0.0,
                self.config.width as f32,
                self.config.height as f32,
                0.0,
                1.0,
            );
            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            let mut active = None;
            for draw in &frame.draws {
                let Some(mesh) = self.meshes.get(draw.mesh) else {
                    continue;
                };

                if active != Some(draw.program) {
                    render_pass.set_pipeline(match draw.program {
                        ProgramKind::Lit => lit_pipeline,
                        ProgramKind::Flat => flat_pipeline,
                    });
                    active = Some(draw.program);
                }

                match draw.program {
                    ProgramKind::Lit => {
                        let Some(material) = draw
                            .textures
                            .and_then(|pair| self.texture_bind_groups.get(&pair))
                        else {
                            continue;
                        };
                        render_pass.set_bind_group(1, &self.lit.bind_group, &[draw.slot]);
                        render_pass.set_bind_group(2, material, &[]);
                    }
                    ProgramKind::Flat => {
                        render_pass.set_bind_group(1, &self.flat.bind_group, &[draw.slot]);
                    }
                }

                render_pass.set_vertex_buffer(0, mesh.buffer().slice(..));
                render_pass.draw(0..draw.vertex_count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Drops every texture and mesh, returning how many of each were released
    pub fn release_all(&mut self) -> (usize, usize) {
        self.texture_bind_groups.clear();
        (self.textures.release_all(), self.meshes.release_all())
    }

    fn warn_once(&mut self, message: String) {
        if !self.warned.contains(&message) {
            log::warn!("{}", message);
            self.warned.insert(message);
        }
    }
}

fn resolve_texture<'a>(
    textures: &'a ResourceCache<TextureResource>,
    fallback: &'a TextureResource,
    handle: TextureHandle,
) -> &'a TextureResource {
    textures.get(handle).unwrap_or(fallback)
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

fn to_wgpu_color(color: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: color[0] as f64,
        g: color[1] as f64,
        b: color[2] as f64,
        a: color[3] as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_picks_present_mode() {
        assert_eq!(present_mode(true), wgpu::PresentMode::AutoVsync);
        assert_eq!(present_mode(false), wgpu::PresentMode::AutoNoVsync);
    }

    #[test]
    fn clear_color_converts_exactly() {
        let color = to_wgpu_color([0.1, 0.1, 0.1, 1.0]);
        assert_eq!(color.r, 0.1f32 as f64);
        assert_eq!(color.a, 1.0);
    }
}
