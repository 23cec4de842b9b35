use crate::config::BackdropConfig;
use crate::controller::{BackdropSession, LifecycleController, SessionDriver, ToggleAffordance};
use crate::page::{footer_year, DemoLog, RevealSet};
use crate::runtime::RenderRuntime;
use crate::session::SceneSession;
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

/// Builds real GPU sessions for the controller. Ensuring the runtime here
/// means an unsupported machine fails the start cleanly instead of
/// panicking deep in surface creation.
struct ShellDriver {
    window: Arc<Window>,
    config: BackdropConfig,
}

impl SessionDriver for ShellDriver {
    fn start(&mut self) -> Result<Box<dyn BackdropSession>> {
        let runtime = RenderRuntime::ensure()?;
        let session = SceneSession::start(runtime, self.window.clone(), &self.config)?;
        Ok(Box::new(session))
    }
}

/// Mirrors the toggle label into the window title.
struct TitleAffordance {
    window: Arc<Window>,
    base_title: String,
}

impl ToggleAffordance for TitleAffordance {
    fn set_label(&mut self, label: &str) {
        self.window.set_title(&format!("{} — {}", self.base_title, label));
    }
}

pub struct BackdropApp {
    config: BackdropConfig,
    window: Option<Arc<Window>>,
    controller: LifecycleController,
    demo: DemoLog,
    reveals: RevealSet,
    last_frame: Instant,
}

impl BackdropApp {
    pub fn new(config: BackdropConfig) -> Self {
        Self {
            config,
            window: None,
            controller: LifecycleController::new(),
            demo: DemoLog::new(),
            reveals: RevealSet::new(),
            last_frame: Instant::now(),
        }
    }

    fn handle_key(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match &event.logical_key {
            Key::Named(NamedKey::Escape) => event_loop.exit(),
            Key::Character(text) => match text.as_str() {
                "3" => {
                    let Some(window) = self.window.clone() else { return };
                    let mut driver = ShellDriver { window, config: self.config.clone() };
                    self.controller.toggle(&mut driver);
                }
                "d" | "D" => {
                    self.demo.restart();
                    log::info!("demo log restarted");
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn tick(&mut self) {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;

        for line in self.demo.advance(dt) {
            log::info!("{line}");
        }
        if self.reveals.mark("hero") {
            log::debug!("hero revealed");
        }
        self.controller.advance_frame();
    }
}

impl ApplicationHandler for BackdropApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title(&self.config.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        match event_loop.create_window(attrs) {
            Ok(window) => {
                let window = Arc::new(window);
                self.controller.register_affordance(Box::new(TitleAffordance {
                    window: window.clone(),
                    base_title: self.config.window.title.clone(),
                }));
                self.window = Some(window);
                self.last_frame = Instant::now();
            }
            Err(err) => {
                log::error!("window creation failed: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.controller.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let scale = self.window.as_ref().map(|w| w.scale_factor()).unwrap_or(1.0);
                self.controller.handle_resize(size, scale);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    self.controller.handle_resize(window.inner_size(), scale_factor);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event, event_loop),
            WindowEvent::RedrawRequested => self.tick(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

pub fn run(config: BackdropConfig) -> Result<()> {
    log::info!("{} (c) {}", config.window.title, footer_year());
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = BackdropApp::new(config);
    event_loop.run_app(&mut app)?;
    log::debug!("event loop finished (gpu runtime acquired: {})", RenderRuntime::ready());
    Ok(())
}
