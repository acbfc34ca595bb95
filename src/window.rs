//! winit application wiring.
//!
//! [`FieldWindow`] creates the window and the [`GpuHost`] on resume, feeds
//! window events through [`Input`] into the [`FieldApp`], and keeps asking
//! for redraws while the app's frame loop is running.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::app::{AppConfig, FieldApp, FrameStatus};
use crate::error::{AppError, ConfigError, HostError};
use crate::geometry::GeometryKind;
use crate::gpu::GpuHost;
use crate::input::Input;
use crate::settings::Settings;

/// Window title shown by the binary.
const TITLE: &str = "Particle Field";

/// Launch parameters for [`FieldWindow::run`].
#[derive(Debug, Clone, Copy)]
pub struct Launch {
    pub geometry: GeometryKind,
    pub settings: Settings,
    pub config: AppConfig,
}

impl Launch {
    /// Parse `[GEOMETRY] [--settings FILE] [--config FILE]`.
    ///
    /// `args` excludes the program name. Geometry defaults to the sphere and
    /// files that are not given fall back to defaults.
    pub fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        let mut launch = Launch {
            geometry: GeometryKind::Sphere,
            settings: Settings::default(),
            config: AppConfig::default(),
        };

        if let Some(path) = flag_value(args, "--settings") {
            launch.settings = Settings::from_json_file(path)?;
            log::info!("loaded settings from {}", path);
        }
        if let Some(path) = flag_value(args, "--config") {
            launch.config = AppConfig::from_json_file(path)?;
            log::info!("loaded app config from {}", path);
        }
        if let Some(name) = positional(args) {
            launch.geometry = name.parse()?;
        }
        Ok(launch)
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|v| v == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn positional(args: &[String]) -> Option<&str> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            iter.next();
        } else {
            return Some(arg);
        }
    }
    None
}

/// Top-level winit handler.
pub struct FieldWindow {
    launch: Launch,
    window: Option<Arc<Window>>,
    app: Option<FieldApp<GpuHost>>,
    input: Input,
    /// First fatal error; returned from `run` after the loop exits.
    error: Option<AppError>,
}

impl FieldWindow {
    pub fn new(launch: Launch) -> Self {
        Self {
            launch,
            window: None,
            app: None,
            input: Input::new(),
            error: None,
        }
    }

    /// Open the window and block until it closes.
    pub fn run(launch: Launch) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut handler = Self::new(launch);
        event_loop.run_app(&mut handler)?;

        match handler.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        let host = pollster::block_on(GpuHost::new(window.clone()))?;

        let mut app = FieldApp::initialize(host, self.launch.config);
        app.resize(size.width, size.height);
        app.build_field(self.launch.geometry, self.launch.settings)?;

        self.input.set_viewport(size.width, size.height);
        window.request_redraw();
        self.window = Some(window);
        self.app = Some(app);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{}", error);
        self.error.get_or_insert(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for FieldWindow {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.start(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(app) = self.app.as_mut() else {
            return;
        };

        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                app.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                app.resize(physical_size.width, physical_size.height);
            }
            WindowEvent::RedrawRequested => {
                let running = app.handle_input(&self.input);
                self.input.begin_frame();
                if !running {
                    event_loop.exit();
                    return;
                }

                match app.frame() {
                    Ok(FrameStatus::Continue) => {
                        if let Some(window) = &self.window {
                            window.request_redraw();
                        }
                    }
                    Ok(FrameStatus::Stopped) => event_loop.exit(),
                    Err(HostError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                        app.host_mut().reconfigure();
                        if let Some(window) = &self.window {
                            window.request_redraw();
                        }
                    }
                    Err(HostError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                        log::error!("GPU out of memory");
                        app.shutdown();
                        event_loop.exit();
                    }
                    Err(e) => {
                        log::warn!("render error: {}", e);
                        if let Some(window) = &self.window {
                            window.request_redraw();
                        }
                    }
                }
            }
            _ => {}
        }
    }
}
