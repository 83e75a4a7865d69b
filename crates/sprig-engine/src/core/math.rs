// core/math.rs
//
// Transform composition for the node hierarchy.
// Rotations are in degrees everywhere outside this module.

use glam::Vec2;

/// Position / rotation / scale triple. Used for both local and global space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub position: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D {
        position: Vec2::ZERO,
        rotation: 0.0,
        scale: Vec2::ONE,
    };

    pub fn new(position: Vec2, rotation: f32, scale: Vec2) -> Self {
        Self { position, rotation, scale }
    }

    /// Compose a child's local state with this (parent, global) transform.
    ///
    /// `origin` and `size` shift the pivot before composition:
    /// the local offset is `position - origin * size * scale`, which is then
    /// scaled by the parent's scale, rotated by the parent's rotation and
    /// translated by the parent's position. Rotation adds, scale multiplies.
    pub fn compose(&self, local: &Transform2D, origin: Vec2, size: Vec2) -> Transform2D {
        let offset = local.position - origin * size * local.scale;
        let rotated = rotate_deg(offset * self.scale, self.rotation);
        Transform2D {
            position: self.position + rotated,
            rotation: self.rotation + local.rotation,
            scale: self.scale * local.scale,
        }
    }
}

/// Rotate `v` counter-clockwise (in a y-up frame) by `degrees`.
/// In y-down screen space this turns +x towards +y.
#[inline]
pub fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
}

/// Wrap an angle difference into (-180, 180].
#[inline]
pub fn wrap_degrees(mut delta: f32) -> f32 {
    delta %= 360.0;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta <= -180.0 {
        delta += 360.0;
    }
    delta
}

/// Unit direction for a rotation in degrees.
#[inline]
pub fn heading(degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(cos, sin)
}
