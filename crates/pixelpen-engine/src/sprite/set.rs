use glam::{Mat4, Vec3};

use crate::input::{Key, KeyInput};

use super::geometry::SpriteGeometry;
use super::transform::Transform;

/// Held-key bindings and the direction each one pushes the sprite.
const MOVE_BINDINGS: [(Key, Vec3); 4] = [
    (Key::W, Vec3::Y),
    (Key::S, Vec3::NEG_Y),
    (Key::A, Vec3::NEG_X),
    (Key::D, Vec3::X),
];

/// The single player-controlled sprite: geometry, transform and speed.
#[derive(Debug, Clone)]
pub struct SpriteInstanceSet {
    geometry: SpriteGeometry,
    transform: Transform,
    /// World units per second.
    speed: f32,
}

impl SpriteInstanceSet {
    pub fn new(geometry: SpriteGeometry, transform: Transform, speed: f32) -> Self {
        Self { geometry, transform, speed }
    }

    /// Integrates movement for every held direction key over `dt` seconds.
    ///
    /// Plain additive integration: no acceleration, clamping or collision.
    /// Rotation and scale are left untouched.
    pub fn update_from_input<I>(&mut self, input: &I, dt: f32) -> Transform
    where
        I: KeyInput + ?Sized,
    {
        let step = self.speed * dt;
        for (key, dir) in MOVE_BINDINGS {
            if input.is_key_held(key) {
                self.transform.position += dir * step;
            }
        }
        self.transform
    }

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[inline]
    pub fn model_matrix(&self) -> Mat4 {
        self.transform.to_mat4()
    }

    #[inline]
    pub fn geometry(&self) -> &SpriteGeometry {
        &self.geometry
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    fn held(keys: &[Key]) -> HashSet<Key> {
        keys.iter().copied().collect()
    }

    fn sprite(speed: f32) -> SpriteInstanceSet {
        SpriteInstanceSet::new(SpriteGeometry::default(), Transform::default(), speed)
    }

    #[test]
    fn holding_d_moves_right_by_speed_times_dt() {
        let mut s = sprite(100.0);
        let keys = held(&[Key::D]);
        let dt = 1.0 / 60.0;
        for _ in 0..30 {
            s.update_from_input(&keys, dt);
        }
        let p = s.transform().position;
        assert_relative_eq!(p.x, 100.0 * 30.0 * dt, epsilon = 1e-3);
        assert_eq!(p.y, 0.0);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn each_key_maps_to_its_axis() {
        let cases = [
            (Key::W, Vec3::new(0.0, 2.0, 0.0)),
            (Key::S, Vec3::new(0.0, -2.0, 0.0)),
            (Key::A, Vec3::new(-2.0, 0.0, 0.0)),
            (Key::D, Vec3::new(2.0, 0.0, 0.0)),
        ];
        for (key, expected) in cases {
            let mut s = sprite(4.0);
            let t = s.update_from_input(&held(&[key]), 0.5);
            assert_eq!(t.position, expected, "{key}");
        }
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut s = sprite(3.0);
        let t = s.update_from_input(&held(&[Key::A, Key::D, Key::W, Key::S]), 0.25);
        assert_eq!(t.position, Vec3::ZERO);
    }

    #[test]
    fn no_keys_no_motion_and_rotation_scale_untouched() {
        let mut s = SpriteInstanceSet::new(
            SpriteGeometry::default(),
            Transform {
                position: Vec3::new(1.0, 1.0, 0.0),
                rotation: Vec3::new(0.0, 0.0, 0.5),
                scale: Vec3::splat(2.0),
            },
            10.0,
        );
        let before = *s.transform();
        let after = s.update_from_input(&held(&[Key::Space, Key::Escape]), 1.0);
        assert_eq!(before, after);
    }

    #[test]
    fn model_matrix_follows_position() {
        let mut s = sprite(1.0);
        s.update_from_input(&held(&[Key::W]), 0.5);
        assert_eq!(s.model_matrix().w_axis.truncate(), Vec3::new(0.0, 0.5, 0.0));
    }
}
