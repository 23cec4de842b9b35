use crate::camera::BackdropCamera;
use crate::config::BackdropConfig;
use crate::controller::BackdropSession;
use crate::importer::ImporterHost;
use crate::renderer::{MountSurface, Renderer};
use crate::runtime::RenderRuntime;
use crate::scene::BackdropScene;
use crate::visual::resolve_visual;
use anyhow::Result;
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Everything one active backdrop owns: surface, renderer, scene and
/// camera. Exists only between a committed start and a stop; there is never
/// more than one.
pub struct SceneSession {
    runtime: Arc<RenderRuntime>,
    surface: MountSurface,
    renderer: Renderer,
    scene: BackdropScene,
    camera: BackdropCamera,
    window: Arc<Window>,
    frames_rendered: u64,
}

impl SceneSession {
    /// Builds a full session. The GPU runtime must already be ensured by
    /// the caller; the importer is ensured here, after the runtime, and its
    /// absence only downgrades the visual to the placeholder.
    pub fn start(
        runtime: Arc<RenderRuntime>,
        window: Arc<Window>,
        config: &BackdropConfig,
    ) -> Result<Self> {
        let importer = match ImporterHost::ensure(&config.importer.libraries) {
            Ok(host) => Some(host),
            Err(err) => {
                log::info!("model importer unavailable: {err}");
                None
            }
        };
        let visual = resolve_visual(
            importer.as_ref().map(|host| host.importer()),
            &config.asset.candidates,
            config.asset.target_size,
        );

        let surface = MountSurface::attach(runtime.clone(), window.clone(), config.window.vsync)?;
        let renderer = Renderer::new(&runtime, surface.format(), &visual)?;
        let camera = BackdropCamera::new(surface.size());
        let scene = BackdropScene::new(visual);
        log::debug!("backdrop session started at {}x{}", surface.size().width, surface.size().height);
        Ok(Self { runtime, surface, renderer, scene, camera, window, frames_rendered: 0 })
    }

    pub fn advance_frame(&mut self) {
        self.scene.advance();
        match self.surface.acquire() {
            Ok(frame) => {
                self.renderer.render(
                    &self.runtime,
                    frame.view(),
                    self.surface.depth_view(),
                    &self.camera,
                    &self.scene,
                );
                frame.present();
                self.frames_rendered += 1;
            }
            Err(err) => log::debug!("frame skipped: {err:#}"),
        }
    }

    pub fn resize(&mut self, physical: PhysicalSize<u32>, scale_factor: f64) {
        self.surface.resize(physical, scale_factor);
        self.camera.set_viewport(self.surface.size());
    }

    /// Tears the session down. Each owned resource is released here:
    /// pipelines and geometry buffers, then the swapchain and depth
    /// attachment, then the scene data. The window itself stays with the
    /// shell and is repainted bare.
    pub fn stop(self) {
        let Self { runtime: _, surface, renderer, scene, camera: _, window, frames_rendered } = self;
        drop(renderer);
        drop(surface);
        drop(scene);
        window.request_redraw();
        log::debug!("backdrop session stopped after {frames_rendered} frames");
    }
}

impl BackdropSession for SceneSession {
    fn advance_frame(&mut self) {
        SceneSession::advance_frame(self)
    }

    fn resize(&mut self, physical: PhysicalSize<u32>, scale_factor: f64) {
        SceneSession::resize(self, physical, scale_factor)
    }

    fn stop(self: Box<Self>) {
        SceneSession::stop(*self)
    }
}
