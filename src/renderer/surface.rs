use crate::runtime::RenderRuntime;
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::DEPTH_FORMAT;

/// Device pixel density cap. High-DPI displays above this render at a
/// reduced internal resolution.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Maps a physical window size to the render extent with the pixel-density
/// cap applied. At or below the cap the sizes are identical.
pub fn render_extent(physical: PhysicalSize<u32>, scale_factor: f64) -> PhysicalSize<u32> {
    let factor = if scale_factor > MAX_PIXEL_RATIO { MAX_PIXEL_RATIO / scale_factor } else { 1.0 };
    PhysicalSize::new(
        ((physical.width as f64 * factor).round() as u32).max(1),
        ((physical.height as f64 * factor).round() as u32).max(1),
    )
}

pub struct SurfaceFrame {
    view: wgpu::TextureView,
    surface: Option<wgpu::SurfaceTexture>,
}

impl SurfaceFrame {
    fn new(surface: wgpu::SurfaceTexture) -> Self {
        let view = surface.texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { view, surface: Some(surface) }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn present(mut self) {
        if let Some(surface) = self.surface.take() {
            surface.present();
        }
    }
}

/// Swapchain and depth attachment for one session. Dropping the value
/// releases the surface, so a stopped session leaves the window bare.
pub struct MountSurface {
    runtime: Arc<RenderRuntime>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    size: PhysicalSize<u32>,
}

impl MountSurface {
    pub fn attach(runtime: Arc<RenderRuntime>, window: Arc<Window>, vsync: bool) -> Result<Self> {
        let size = render_extent(window.inner_size(), window.scale_factor());
        let surface = runtime
            .instance()
            .create_surface(window)
            .context("Failed to create surface on the mount window")?;
        let caps = surface.get_capabilities(runtime.adapter());
        if caps.formats.is_empty() {
            return Err(anyhow!("Surface reports no supported formats"));
        }
        let format = caps.formats.iter().copied().find(|f| f.is_srgb()).unwrap_or(caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: if vsync { wgpu::PresentMode::Fifo } else { wgpu::PresentMode::AutoNoVsync },
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(runtime.device(), &config);
        let depth_view = create_depth_view(runtime.device(), size);
        Ok(Self { runtime, surface, config, depth_view, size })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    pub fn resize(&mut self, physical: PhysicalSize<u32>, scale_factor: f64) {
        let size = render_extent(physical, scale_factor);
        if size == self.size {
            return;
        }
        self.size = size;
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(self.runtime.device(), &self.config);
        self.depth_view = create_depth_view(self.runtime.device(), size);
    }

    pub fn acquire(&mut self) -> Result<SurfaceFrame> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(SurfaceFrame::new(frame)),
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                self.surface.configure(self.runtime.device(), &self.config);
                Err(anyhow!("Surface lost or outdated; reconfigured"))
            }
            Err(err) => Err(anyhow!("Surface acquisition failed: {err}")),
        }
    }
}

fn create_depth_view(device: &wgpu::Device, size: PhysicalSize<u32>) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Backdrop Depth Texture"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_extent_is_identity_at_or_below_the_cap() {
        let physical = PhysicalSize::new(1280, 720);
        assert_eq!(render_extent(physical, 1.0), physical);
        assert_eq!(render_extent(physical, 2.0), physical);
    }

    #[test]
    fn render_extent_caps_high_density_displays() {
        let physical = PhysicalSize::new(3000, 1500);
        let capped = render_extent(physical, 3.0);
        assert_eq!(capped, PhysicalSize::new(2000, 1000));
    }

    #[test]
    fn render_extent_never_collapses_to_zero() {
        let capped = render_extent(PhysicalSize::new(0, 0), 1.0);
        assert_eq!(capped, PhysicalSize::new(1, 1));
    }
}
