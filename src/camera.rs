use glam::{Mat4, Vec3};
use winit::dpi::PhysicalSize;

pub const CAMERA_FOV_RADIANS: f32 = 35.0 * std::f32::consts::PI / 180.0;
pub const CAMERA_STANDOFF: f32 = 6.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 100.0;

/// Fixed perspective camera looking at the origin from a standoff position
/// on the +Z axis. Only the aspect ratio changes over a session's lifetime.
#[derive(Debug, Clone)]
pub struct BackdropCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
}

impl BackdropCamera {
    pub fn new(viewport: PhysicalSize<u32>) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, CAMERA_STANDOFF),
            target: Vec3::ZERO,
            fov_y_radians: CAMERA_FOV_RADIANS,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            aspect: 1.0,
        };
        camera.set_viewport(viewport);
        camera
    }

    pub fn set_viewport(&mut self, viewport: PhysicalSize<u32>) {
        self.aspect = if viewport.height > 0 {
            viewport.width as f32 / viewport.height as f32
        } else {
            1.0
        };
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, self.aspect.max(0.0001), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_tracks_viewport() {
        let mut camera = BackdropCamera::new(PhysicalSize::new(1280, 720));
        assert!((camera.aspect() - 1280.0 / 720.0).abs() < 1e-6);
        camera.set_viewport(PhysicalSize::new(640, 640));
        assert!((camera.aspect() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_height_viewport_keeps_a_sane_aspect() {
        let camera = BackdropCamera::new(PhysicalSize::new(800, 0));
        assert_eq!(camera.aspect(), 1.0);
    }

    #[test]
    fn view_projection_is_finite() {
        let camera = BackdropCamera::new(PhysicalSize::new(1920, 1080));
        let vp = camera.view_projection();
        assert!(!vp.to_cols_array().iter().any(|v| v.is_nan() || v.is_infinite()));
    }
}
