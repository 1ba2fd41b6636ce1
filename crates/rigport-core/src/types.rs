//! Spatial types and coordinate conversion

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A local TRS transform as stored by the engine
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f32; 3],
    /// Quaternion rotation [x, y, z, w]
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0, 1.0, 1.0],
    };

    pub fn new(position: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn from_position(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// Rotation as a normalized quaternion; degenerate input falls back to identity
    pub fn quat(&self) -> Quat {
        let q = Quat::from_array(self.rotation);
        if q.length_squared() > f32::EPSILON {
            q.normalize()
        } else {
            Quat::IDENTITY
        }
    }

    pub fn scale_vec(&self) -> Vec3 {
        Vec3::from_array(self.scale)
    }

    /// Convert to a 4x4 matrix in engine coordinates
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale_vec(), self.quat(), self.translation())
    }

    /// Convert to a 4x4 matrix in host coordinates
    pub fn to_host_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            swizzle_scale(self.scale_vec()),
            swizzle_rotation(self.quat()),
            swizzle_position(self.translation()),
        )
    }

    pub fn is_identity(&self) -> bool {
        let t = self.translation();
        let s = self.scale_vec();
        t.abs_diff_eq(Vec3::ZERO, 1e-6)
            && s.abs_diff_eq(Vec3::ONE, 1e-6)
            && self.quat().abs_diff_eq(Quat::IDENTITY, 1e-6)
    }
}

// Engine space is left-handed Y-up, host space is right-handed Z-up.
// The swizzle S maps (x, y, z) to (-x, -z, y); det(S) = -1.

/// Convert an engine-space position to host space
pub fn swizzle_position(v: Vec3) -> Vec3 {
    Vec3::new(-v.x, -v.z, v.y)
}

/// Convert an engine-space rotation to host space.
///
/// Conjugating a rotation by a reflection keeps the angle and maps the axis
/// through `det(S) * S`, which works out to `(x, y, z) -> (x, z, -y)`.
pub fn swizzle_rotation(q: Quat) -> Quat {
    Quat::from_xyzw(q.x, q.z, -q.y, q.w)
}

/// Convert an engine-space scale to host space
pub fn swizzle_scale(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, v.y)
}
