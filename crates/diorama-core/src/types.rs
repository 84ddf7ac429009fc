//! Spatial types

use glam::{EulerRot, Quat, Vec3};

/// The spatial state of a live object.
///
/// Position and rotation are world-space, scale is local. Rotation is held as
/// a proper rotation; Euler degrees only exist at the serialization boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_euler_degrees(mut self, euler: Vec3) -> Self {
        self.rotation = Self::rotation_from_euler_degrees(euler);
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Build a rotation from Euler degrees (x = pitch, y = yaw, z = roll).
    ///
    /// Composition order is Y, then X, then Z, so a record written by
    /// `euler_degrees` rebuilds the same rotation.
    pub fn rotation_from_euler_degrees(euler: Vec3) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            euler.y.to_radians(),
            euler.x.to_radians(),
            euler.z.to_radians(),
        )
    }

    /// Decompose the rotation into Euler degrees (x, y, z), un-normalized
    pub fn euler_degrees(&self) -> Vec3 {
        let (y, x, z) = self.rotation.to_euler(EulerRot::YXZ);
        Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
    }
}
