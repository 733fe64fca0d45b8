//! Window creation and the event-driven render loop.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]. The GPU context,
//! programs and scene are created on the first `resumed` call; every
//! `RedrawRequested` advances the animation, applies pending control-panel
//! requests, draws one frame and schedules the next.

use std::path::PathBuf;
use std::sync::Arc;

use orbis_config::{CliArgs, Config};
use orbis_geometry::GeometryError;
use orbis_render::{
    Camera, FrameParams, OrbitControls, RenderContext, RenderContextError, Renderer, ShaderError,
    ShaderKind, ShaderLibrary, SurfaceError, UniformLayouts, init_render_context_blocking,
};
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::clock::FrameClock;
use crate::controls::{ControlPanel, Controls};
use crate::input::OrbitInput;
use crate::scene::{ProgramSet, Scene, sphere_needs_rebuild};
use crate::stats::FrameStats;

/// Errors that end the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    RenderContext(#[from] RenderContextError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),
}

pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

fn clear_color_from_config(config: &Config) -> wgpu::Color {
    let [r, g, b, a] = config.render.clear_color.map(f64::from);
    wgpu::Color { r, g, b, a }
}

/// The part of a redraw that does not touch the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStep {
    /// Animation time after this frame.
    pub time: f32,
    pub rebuild_sphere: bool,
    pub reload_shaders: bool,
    pub tessellations: u32,
    pub shader: ShaderKind,
    pub params: FrameParams,
}

/// Advance animation time by `dt * speed` and drain the panel's pending requests.
///
/// `built_level` is the subdivision level of the icosphere currently on the GPU.
pub fn step_frame(panel: &mut ControlPanel, time: f32, dt: f32, built_level: u32) -> FrameStep {
    let controls = panel.controls();
    let time = time + dt * controls.speed;
    let tessellations = controls.tessellations;
    let shader = controls.shader;
    let params = controls.frame_params(time);

    let load_scene = panel.take_load_scene();
    FrameStep {
        time,
        rebuild_sphere: sphere_needs_rebuild(built_level, tessellations, load_scene),
        reload_shaders: panel.take_reload_shaders(),
        tessellations,
        shader,
        params,
    }
}

/// Everything that needs a live device.
struct GpuState {
    ctx: RenderContext,
    renderer: Renderer,
    layouts: UniformLayouts,
    library: ShaderLibrary,
    programs: ProgramSet,
    scene: Scene,
    cull_mode: Option<wgpu::Face>,
}

impl GpuState {
    fn new(window: Arc<Window>, config: &Config, controls: &Controls) -> Result<Self, AppError> {
        let ctx = init_render_context_blocking(window, config.window.vsync)?;

        let mut renderer = Renderer::new(&ctx.device, ctx.width(), ctx.height());
        renderer.set_clear_color(clear_color_from_config(config));

        let layouts = UniformLayouts::new(&ctx.device);
        let mut library = match &config.render.shader_dir {
            Some(dir) => {
                info!("Loading shader overrides from {}", dir.display());
                ShaderLibrary::new().with_shader_dir(dir)
            }
            None => ShaderLibrary::new(),
        };

        let cull_mode = config.render.cull_back_faces.then_some(wgpu::Face::Back);
        let programs = ProgramSet::build(
            &ctx.device,
            &mut library,
            &layouts,
            ctx.surface_format,
            cull_mode,
        )?;

        let scene = Scene::build(
            &ctx.device,
            &layouts,
            controls.tessellations,
            config.scene.show_cube,
            config.scene.show_square,
        )?;

        Ok(Self {
            ctx,
            renderer,
            layouts,
            library,
            programs,
            scene,
            cull_mode,
        })
    }

    /// Recompile every program. On failure the previous programs stay active.
    fn reload_shaders(&mut self) {
        if let Some(dir) = self.library.shader_dir() {
            info!("Reloading shaders from {}", dir.display());
        }
        match ProgramSet::build(
            &self.ctx.device,
            &mut self.library,
            &self.layouts,
            self.ctx.surface_format,
            self.cull_mode,
        ) {
            Ok(programs) => {
                self.programs = programs;
                info!("Shaders reloaded");
            }
            Err(e) => error!("Shader reload failed, keeping previous programs: {e}"),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
        self.renderer.resize(&self.ctx.device, width, height);
    }
}

/// Application state driven by the winit event loop.
pub struct AppState {
    config: Config,
    /// Directory holding `config.ron`, re-read on shader reload.
    config_dir: Option<PathBuf>,
    /// Re-applied over every reloaded config.
    overrides: CliArgs,
    panel: ControlPanel,
    camera: Camera,
    orbit: OrbitControls,
    orbit_input: OrbitInput,
    shift_held: bool,
    clock: FrameClock,
    stats: FrameStats,
    /// Animation time, advanced by `dt * speed`.
    time: f32,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    fatal: Option<AppError>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let controls = Controls::from_scene(&config.scene);
        let mut camera = Camera::default();
        camera.set_aspect_ratio(config.window.width as f32, config.window.height as f32);
        let orbit = OrbitControls::from_camera(&camera);
        let stats = FrameStats::new(config.debug.stats_interval_secs);

        Self {
            config,
            config_dir: None,
            overrides: CliArgs::default(),
            panel: ControlPanel::new(controls),
            camera,
            orbit,
            orbit_input: OrbitInput::new(),
            shift_held: false,
            clock: FrameClock::new(),
            stats,
            time: 0.0,
            window: None,
            gpu: None,
            fatal: None,
        }
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    pub fn with_overrides(mut self, overrides: CliArgs) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn controls(&self) -> &Controls {
        self.panel.controls()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        self.panel.handle_key(code, self.shift_held);
        if self.panel.quit_requested() {
            info!("Quit requested");
            event_loop.exit();
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect_ratio(width as f32, height as f32);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
        }
        info!("Window resized to {}x{}", width, height);
    }

    /// Re-read `config.ron` and re-apply the command-line overrides. Changed
    /// scene values reseed the controls; render values update the clear color
    /// and the shader directory.
    fn reload_config(&mut self) {
        let Some(dir) = &self.config_dir else {
            return;
        };
        match self.config.reload(dir) {
            Ok(None) => {}
            Ok(Some(mut fresh)) => {
                fresh.apply_cli_overrides(&self.overrides);
                if fresh.scene != self.config.scene {
                    *self.panel.controls_mut() = Controls::from_scene(&fresh.scene);
                    info!(controls = ?self.panel.controls(), "Controls reseeded from config");
                }
                if let Some(gpu) = &mut self.gpu {
                    gpu.renderer.set_clear_color(clear_color_from_config(&fresh));
                    gpu.library.set_shader_dir(fresh.render.shader_dir.clone());
                }
                self.config = fresh;
            }
            Err(e) => warn!("Config reload failed, keeping current settings: {e}"),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.clock.tick();
        self.stats.record(dt);

        let (drag, scroll) = self.orbit_input.take();
        self.orbit.update(&mut self.camera, drag, scroll);

        let Some(built_level) = self.gpu.as_ref().map(|g| g.scene.sphere_subdivisions()) else {
            return;
        };
        let step = step_frame(&mut self.panel, self.time, dt, built_level);
        self.time = step.time;

        if step.reload_shaders {
            self.reload_config();
        }

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        if step.reload_shaders {
            gpu.reload_shaders();
        }

        if step.rebuild_sphere
            && let Err(e) = gpu.scene.rebuild_sphere(&gpu.ctx.device, step.tessellations)
        {
            error!("Icosphere rebuild failed: {e}");
        }

        match gpu.renderer.render(
            &gpu.ctx,
            &self.camera,
            gpu.programs.get_mut(step.shader),
            gpu.scene.drawables(),
            &step.params,
        ) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => warn!("Skipping frame: {e}"),
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        };

        match GpuState::new(window.clone(), &self.config, self.panel.controls()) {
            Ok(gpu) => {
                self.camera
                    .set_aspect_ratio(gpu.ctx.width() as f32, gpu.ctx.height() as f32);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        }

        self.clock = FrameClock::new();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift_held = modifiers.state().shift_key();
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::CursorMoved { position, .. } => {
                self.orbit_input.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => self.orbit_input.on_cursor_left(),
            WindowEvent::MouseInput { state, button, .. } => {
                self.orbit_input.on_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => self.orbit_input.on_scroll(delta),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Open the window and run until it closes or a fatal error occurs.
///
/// `config_dir` is where `config.ron` lives; F5 re-reads it and applies
/// `overrides` on top.
#[instrument(skip(config, overrides))]
pub fn run(config: Config, config_dir: PathBuf, overrides: CliArgs) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config)
        .with_config_dir(config_dir)
        .with_overrides(overrides);
    event_loop.run_app(&mut app)?;
    info!("Rendered {} frames", app.stats.total_frames());
    app.fatal.take().map_or(Ok(()), Err)
}
