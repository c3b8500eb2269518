use glam::{Mat4, Vec3};

use super::Viewport;

/// Orthographic projection + view for the world (sprite) layer.
///
/// `zoom` is pixels per world unit; the origin is the centre of the screen.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WorldCamera {
    pub zoom: f32,
    pub eye_offset: Vec3,
}

impl Default for WorldCamera {
    fn default() -> Self {
        Self {
            zoom: 500.0,
            eye_offset: Vec3::new(0.0, 0.0, -3.0),
        }
    }
}

impl WorldCamera {
    pub const NEAR: f32 = -0.1;
    pub const FAR: f32 = 100.0;

    pub fn projection(&self, viewport: Viewport) -> Mat4 {
        let zoom = self.zoom.max(f32::EPSILON);
        let half_w = viewport.width / (2.0 * zoom);
        let half_h = viewport.height / (2.0 * zoom);
        Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, Self::NEAR, Self::FAR)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(self.eye_offset)
    }
}

/// Pixel-space projection for the text layer: origin bottom-left, +Y up.
pub fn screen_projection(viewport: Viewport) -> Mat4 {
    Mat4::orthographic_rh(0.0, viewport.width.max(1.0), 0.0, viewport.height.max(1.0), -1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn world_extent_follows_zoom() {
        let cam = WorldCamera::default();
        let vp = Viewport::new(1920.0, 1080.0);
        let clip = cam.projection(vp) * cam.view();
        // Right edge of the screen is at x = 1920 / (2 * 500) world units.
        let edge = clip.project_point3(Vec3::new(1.92, 1.08, 0.0));
        assert_relative_eq!(edge.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(edge.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn sprite_plane_is_inside_depth_range() {
        let cam = WorldCamera::default();
        let clip = cam.projection(Viewport::new(800.0, 600.0)) * cam.view();
        let p = clip.project_point3(Vec3::ZERO);
        assert!((0.0..=1.0).contains(&p.z), "depth {}", p.z);
    }

    #[test]
    fn screen_projection_maps_pixels_to_ndc() {
        let proj = screen_projection(Viewport::new(200.0, 100.0));
        let bl = proj.project_point3(Vec3::ZERO);
        let tr = proj.project_point3(Vec3::new(200.0, 100.0, 0.0));
        assert_relative_eq!(bl.x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(bl.y, -1.0, epsilon = 1e-6);
        assert_relative_eq!(tr.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(tr.y, 1.0, epsilon = 1e-6);
    }
}
