//! Rounding and angle normalization applied to every captured value

use diorama_core::{Transform, Vec3};

/// Decimal places kept for positions, rotations and scales
pub const DIGITS: i32 = 3;

/// Round to `digits` decimal places, halves away from zero.
///
/// `-0.0` comes back as `0.0` so the serialized form is stable.
pub fn round(value: f32, digits: i32) -> f32 {
    let factor = 10f64.powi(digits);
    let rounded = ((value as f64) * factor).round() / factor;
    rounded as f32 + 0.0
}

/// Map an angle in degrees into `[0, 360)`
pub fn normalize_360(degrees: f32) -> f32 {
    let mut wrapped = degrees % 360.0;
    if wrapped < 0.0 {
        wrapped += 360.0;
    }
    // Tiny negatives land on 360 after the add
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped + 0.0
    }
}

/// Normalize then round an angle. A value that rounds up to 360 folds back to 0.
pub fn canonical_angle(degrees: f32) -> f32 {
    let rounded = round(normalize_360(degrees), DIGITS);
    if rounded >= 360.0 {
        0.0
    } else {
        rounded
    }
}

pub fn round_vec3(v: Vec3) -> Vec3 {
    Vec3::new(round(v.x, DIGITS), round(v.y, DIGITS), round(v.z, DIGITS))
}

pub fn canonical_euler(v: Vec3) -> Vec3 {
    Vec3::new(canonical_angle(v.x), canonical_angle(v.y), canonical_angle(v.z))
}

/// True when two transforms produce the same captured record.
///
/// Rotations also match when the quaternions agree, since one rotation can
/// decompose into different Euler triples near gimbal lock.
pub fn equivalent(a: &Transform, b: &Transform) -> bool {
    let same_rotation = canonical_euler(a.euler_degrees()) == canonical_euler(b.euler_degrees())
        || a.rotation.dot(b.rotation).abs() >= 1.0 - 1e-7;
    round_vec3(a.position) == round_vec3(b.position)
        && round_vec3(a.scale) == round_vec3(b.scale)
        && same_rotation
}
