use crate::visual::{rgb, VisualObject};
use glam::Vec3;

#[derive(Clone, Copy, Debug)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    /// Light position; the light points from here toward the origin.
    pub position: Vec3,
}

impl DirectionalLight {
    pub fn direction_to_origin(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

/// Per-frame rotation increments. These are per rendered frame, matching
/// the original animation-frame semantics, not time-scaled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinRates {
    pub yaw_per_frame: f32,
    pub pitch_per_frame: f32,
}

impl Default for SpinRates {
    fn default() -> Self {
        Self { yaw_per_frame: 0.0045, pitch_per_frame: 0.0015 }
    }
}

/// Scene graph of one backdrop session: the visual object plus the fixed
/// two-light rig.
pub struct BackdropScene {
    pub visual: VisualObject,
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub spin: SpinRates,
}

impl BackdropScene {
    pub fn new(visual: VisualObject) -> Self {
        Self {
            visual,
            ambient: AmbientLight { color: rgb(0xffffff), intensity: 0.7 },
            directional: DirectionalLight {
                color: rgb(0x9be7f5),
                intensity: 0.8,
                position: Vec3::new(3.0, 4.0, 5.0),
            },
            spin: SpinRates::default(),
        }
    }

    /// Advances the visual's rotation by one frame.
    pub fn advance(&mut self) {
        self.visual.rotation_y += self.spin.yaw_per_frame;
        self.visual.rotation_x += self.spin.pitch_per_frame;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual;

    #[test]
    fn spin_advances_yaw_three_times_faster_than_pitch() {
        let mut scene = BackdropScene::new(visual::placeholder());
        for _ in 0..100 {
            scene.advance();
        }
        assert!((scene.visual.rotation_y - 0.45).abs() < 1e-5);
        assert!((scene.visual.rotation_x - 0.15).abs() < 1e-5);
        assert!((scene.visual.rotation_y / scene.visual.rotation_x - 3.0).abs() < 1e-4);
    }

    #[test]
    fn light_rig_matches_the_hero_look() {
        let scene = BackdropScene::new(visual::placeholder());
        assert!((scene.ambient.intensity - 0.7).abs() < 1e-6);
        assert!((scene.directional.intensity - 0.8).abs() < 1e-6);
        let dir = scene.directional.direction_to_origin();
        assert!((dir.length() - 1.0).abs() < 1e-5);
    }
}
