use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position / rotation / scale of a sprite in world units.
///
/// `rotation` holds Euler angles in radians (X, Y, Z), converted through a
/// quaternion when the matrix is built.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    #[inline]
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::ZYX, self.rotation.z, self.rotation.y, self.rotation.x)
    }

    /// Model matrix: translate · rotate · scale.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_quat(self.rotation_quat())
            * Mat4::from_scale(self.scale)
    }
}
