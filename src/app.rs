use anyhow::Context;
use std::{collections::HashMap, path::Path, sync::Arc};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowAttributes, WindowId},
};

use crate::{
    config::{AppConfig, AssetConfig, MissingTexturePolicy},
    gfx::{
        camera::FlyCamera,
        frame::{CommandList, FrameClock, FrameContext, FrameRenderer, ScreenSize},
        geometry::mesh_vertices,
        lighting::LightingState,
        rendering::RenderEngine,
        resources::{TextureError, TextureHandle},
        scene::{MeshId, Scene, SceneHandles, TextureId},
    },
    input::InputHandler,
};

/// Substituted for textures that fail to load
const PLACEHOLDER_RGBA: [u8; 4] = [255, 0, 255, 255];

pub struct ClassroomApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: AppConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    renderer: Option<FrameRenderer>,
    ctx: FrameContext,
    input: InputHandler,
    /// Commands recorded since the last execute, e.g. a viewport change
    commands: CommandList,
    clock: FrameClock,
    fatal_error: Option<anyhow::Error>,
}

impl ClassroomApp {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;

        let ctx = FrameContext::new(
            FlyCamera::from_config(&config.camera),
            LightingState::classroom(),
            ScreenSize::new(config.window.width, config.window.height),
        );

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                renderer: None,
                ctx,
                input: InputHandler::new(),
                commands: CommandList::new(),
                clock: FrameClock::new(),
                fatal_error: None,
            },
        })
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .context("event loop failed")?;

        match self.app_state.fatal_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_config = &self.config.window;
        let mut attributes = WindowAttributes::default().with_title(window_config.title.clone());
        attributes = match event_loop.primary_monitor() {
            Some(monitor) if window_config.use_monitor_resolution => {
                attributes.with_inner_size(monitor.size())
            }
            _ => attributes.with_inner_size(LogicalSize::new(
                window_config.width,
                window_config.height,
            )),
        };

        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create window")?,
        );
        grab_cursor(&window);

        let PhysicalSize { width, height } = window.inner_size();
        let mut engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            window_config.vsync,
        ))
        .context("failed to initialise graphics")?;

        let textures = load_textures(&mut engine, &self.config.assets)?;
        let meshes = MeshId::ALL.map(|id| engine.upload_mesh(&mesh_vertices(id), id.label()));

        let scene = Scene::classroom().context("invalid scene table")?;
        log::info!("Scene validated: {} objects", scene.len());
        let renderer = FrameRenderer::new(scene, SceneHandles { textures, meshes });

        self.ctx.resize(width, height, &mut self.commands);
        renderer.init(&self.ctx, &mut self.commands);
        engine
            .execute(&self.commands)
            .context("failed to initialise shader programs")?;
        self.commands.reset();

        self.clock = FrameClock::new();
        self.window = Some(window);
        self.render_engine = Some(engine);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(engine), Some(renderer)) = (self.render_engine.as_mut(), self.renderer.as_ref())
        else {
            return;
        };

        let delta_time = self.ctx.advance(self.clock.elapsed());
        self.input.apply_held(&mut self.ctx, delta_time);

        renderer.render(&self.ctx, &mut self.commands);
        let result = engine.execute(&self.commands);
        self.commands.reset();

        if let Err(e) = result {
            log::error!("Rendering failed: {}", e);
            self.fatal_error = Some(e.into());
            event_loop.exit();
        }
    }
}

/// Where startup textures come from
trait TextureLoader {
    fn load_texture(&mut self, path: &Path) -> Result<TextureHandle, TextureError>;
    fn create_solid_texture(&mut self, rgba: [u8; 4], label: &str) -> TextureHandle;
}

impl TextureLoader for RenderEngine {
    fn load_texture(&mut self, path: &Path) -> Result<TextureHandle, TextureError> {
        RenderEngine::load_texture(self, path)
    }

    fn create_solid_texture(&mut self, rgba: [u8; 4], label: &str) -> TextureHandle {
        RenderEngine::create_solid_texture(self, rgba, label)
    }
}

/// Loads every scene texture, applying the missing-texture policy.
///
/// Files shared by several textures are loaded once. All failures share one
/// placeholder.
fn load_textures(
    engine: &mut impl TextureLoader,
    assets: &AssetConfig,
) -> anyhow::Result<[TextureHandle; TextureId::COUNT]> {
    let mut by_file: HashMap<&'static str, TextureHandle> = HashMap::new();
    let mut placeholder = None;
    let mut handles = [TextureHandle::INVALID; TextureId::COUNT];

    for id in TextureId::ALL {
        let file = id.file_name();
        if let Some(&handle) = by_file.get(file) {
            handles[id.index()] = handle;
            continue;
        }

        let handle = match engine.load_texture(&assets.texture_dir.join(file)) {
            Ok(handle) => handle,
            Err(e) => match assets.missing_texture {
                MissingTexturePolicy::Abort => {
                    log::error!("{}", e);
                    return Err(e).with_context(|| format!("failed to load {:?} texture", id));
                }
                MissingTexturePolicy::Placeholder => {
                    log::warn!("{}; using placeholder", e);
                    *placeholder.get_or_insert_with(|| {
                        engine.create_solid_texture(PLACEHOLDER_RGBA, "Missing Texture")
                    })
                }
            },
        };
        by_file.insert(file, handle);
        handles[id.index()] = handle;
    }

    Ok(handles)
}

/// Hides the cursor and keeps it in the window for mouse look
fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(e) = grabbed {
        log::warn!("Could not grab cursor: {}", e);
    }
    window.set_cursor_visible(false);
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.initialize(event_loop) {
            log::error!("{:#}", e);
            self.fatal_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                self.input.process_keyed_event(&event, &mut self.ctx);
                if self.ctx.should_close() {
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.ctx.resize(width, height, &mut self.commands);
            }
            WindowEvent::CloseRequested => {
                self.ctx.request_close();
                event_loop.exit();
            }
            WindowEvent::Focused(false) => self.input.release_held(),
            WindowEvent::Focused(true) => {
                if let Some(ref window) = self.window {
                    grab_cursor(window);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if self.window.is_none() {
            return;
        }
        self.input.process_device_event(&event, &mut self.ctx);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.ctx.should_close() {
            event_loop.exit();
            return;
        }
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.renderer = None;
        if let Some(mut engine) = self.render_engine.take() {
            let (textures, meshes) = engine.release_all();
            log::info!("Released {} textures and {} meshes", textures, meshes);
        }
        self.window = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashSet, io, path::PathBuf};

    /// Hands out sequential handles and fails for the listed file names
    #[derive(Default)]
    struct FakeLoader {
        missing: HashSet<&'static str>,
        attempts: Vec<PathBuf>,
        solids: u32,
        next: u32,
    }

    impl FakeLoader {
        fn missing(files: &[&'static str]) -> Self {
            Self {
                missing: files.iter().copied().collect(),
                ..Self::default()
            }
        }

        fn attempts_of(&self, file: &str) -> usize {
            self.attempts
                .iter()
                .filter(|p| p.file_name().and_then(|n| n.to_str()) == Some(file))
                .count()
        }
    }

    impl TextureLoader for FakeLoader {
        fn load_texture(&mut self, path: &Path) -> Result<TextureHandle, TextureError> {
            self.attempts.push(path.to_path_buf());
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if self.missing.contains(name) {
                return Err(TextureError::Io {
                    path: path.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
                });
            }
            self.next += 1;
            Ok(TextureHandle::from_raw(self.next))
        }

        fn create_solid_texture(&mut self, _rgba: [u8; 4], _label: &str) -> TextureHandle {
            self.solids += 1;
            TextureHandle::from_raw(1000 + self.solids)
        }
    }

    fn assets(policy: MissingTexturePolicy) -> AssetConfig {
        AssetConfig {
            missing_texture: policy,
            ..AssetConfig::default()
        }
    }

    #[test]
    fn every_unique_file_is_loaded_once() {
        let mut loader = FakeLoader::default();
        let handles = load_textures(&mut loader, &assets(MissingTexturePolicy::Abort)).unwrap();

        assert_eq!(loader.attempts.len(), 11);
        assert_eq!(loader.solids, 0);
        assert_eq!(handles[TextureId::Desk.index()], handles[TextureId::Ballpoint.index()]);
        assert!(handles.iter().all(|h| h.is_valid()));
    }

    #[test]
    fn abort_fails_on_first_missing_file() {
        let mut loader = FakeLoader::missing(&["wall.jpg"]);
        let err = load_textures(&mut loader, &assets(MissingTexturePolicy::Abort)).unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("failed to load Wall texture"), "{}", message);
        assert!(message.contains("wall.jpg"), "{}", message);
        assert_eq!(loader.attempts_of("wall.jpg"), 1);
        let last = loader.attempts.last().and_then(|p| p.file_name());
        assert_eq!(last, Some(std::ffi::OsStr::new("wall.jpg")));
        assert_eq!(loader.solids, 0);
    }

    #[test]
    fn placeholder_is_shared_by_all_failures() {
        let mut loader = FakeLoader::missing(&["red.jpg", "wall.jpg", "damkier.png"]);
        let handles =
            load_textures(&mut loader, &assets(MissingTexturePolicy::Placeholder)).unwrap();

        assert_eq!(loader.solids, 1);
        let placeholder = handles[TextureId::Red.index()];
        assert_eq!(handles[TextureId::Wall.index()], placeholder);
        assert_eq!(handles[TextureId::Metal.index()], placeholder);
        assert_ne!(handles[TextureId::Blue.index()], placeholder);
        // One attempt, and so one warning, per failing file
        assert_eq!(loader.attempts_of("red.jpg"), 1);
        assert_eq!(loader.attempts_of("wall.jpg"), 1);
    }

    #[test]
    fn missing_shared_file_is_tried_once() {
        let mut loader = FakeLoader::missing(&["AdobeStock_372442505.png"]);
        let handles =
            load_textures(&mut loader, &assets(MissingTexturePolicy::Placeholder)).unwrap();

        assert_eq!(loader.attempts_of("AdobeStock_372442505.png"), 1);
        assert_eq!(loader.solids, 1);
        assert_eq!(handles[TextureId::Desk.index()], handles[TextureId::Ballpoint.index()]);
    }
}
