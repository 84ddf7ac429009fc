//! Placement constraints applied to incoming transforms

use diorama_core::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box objects are kept inside (X and Z only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementBounds {
    pub center: [f32; 3],
    pub size: [f32; 3],
}

/// Optional limits on where objects may be placed. Every rule is off by default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementRules {
    #[serde(default)]
    pub bounds: Option<PlacementBounds>,
    /// `[min, max]` for the Y coordinate
    #[serde(default)]
    pub y_range: Option<[f32; 2]>,
    #[serde(default)]
    pub position_step: Option<f32>,
    /// Degrees
    #[serde(default)]
    pub rotation_step: Option<f32>,
    /// `[min, max]` for every scale component
    #[serde(default)]
    pub scale_range: Option<[f32; 2]>,
}

fn snap(value: f32, step: f32) -> f32 {
    (value / step).round() * step
}

impl PlacementRules {
    pub fn is_disabled(&self) -> bool {
        *self == Self::default()
    }

    /// Clamp into bounds and Y range, then snap to the position grid
    pub fn position(&self, mut p: Vec3) -> Vec3 {
        if let Some(bounds) = self.bounds {
            let center = Vec3::from_array(bounds.center);
            let half = Vec3::from_array(bounds.size) * 0.5;
            let (min, max) = (center - half, center + half);
            p.x = p.x.clamp(min.x, max.x);
            p.z = p.z.clamp(min.z, max.z);
        }
        if let Some([lo, hi]) = self.y_range {
            p.y = p.y.clamp(lo, hi);
        }
        match self.position_step {
            Some(step) if step > 0.0 => Vec3::new(snap(p.x, step), snap(p.y, step), snap(p.z, step)),
            _ => p,
        }
    }

    /// Snap Euler degrees to the rotation step
    pub fn rotation(&self, euler: Vec3) -> Vec3 {
        match self.rotation_step {
            Some(step) if step > 0.0 => Vec3::new(
                snap(euler.x, step),
                snap(euler.y, step),
                snap(euler.z, step),
            ),
            _ => euler,
        }
    }

    pub fn scale(&self, s: Vec3) -> Vec3 {
        match self.scale_range {
            Some([lo, hi]) => s.clamp(Vec3::splat(lo), Vec3::splat(hi)),
            None => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_is_identity() {
        let rules = PlacementRules::default();
        assert!(rules.is_disabled());
        let p = Vec3::new(100.0, -3.0, 7.123);
        assert_eq!(rules.position(p), p);
        assert_eq!(rules.rotation(Vec3::new(13.0, 0.0, 0.0)), Vec3::new(13.0, 0.0, 0.0));
        assert_eq!(rules.scale(Vec3::splat(9.0)), Vec3::splat(9.0));
    }

    #[test]
    fn test_bounds_clamp_xz_only() {
        let rules = PlacementRules {
            bounds: Some(PlacementBounds {
                center: [0.0, 0.0, 0.0],
                size: [20.0, 10.0, 20.0],
            }),
            ..Default::default()
        };
        let p = rules.position(Vec3::new(15.0, 50.0, -12.0));
        assert_eq!(p, Vec3::new(10.0, 50.0, -10.0));
    }

    #[test]
    fn test_y_clamp_and_snap() {
        let rules = PlacementRules {
            y_range: Some([0.0, 5.0]),
            position_step: Some(0.25),
            ..Default::default()
        };
        let p = rules.position(Vec3::new(1.1, 7.0, -0.3));
        assert_eq!(p, Vec3::new(1.0, 5.0, -0.25));
    }

    #[test]
    fn test_rotation_snap() {
        let rules = PlacementRules {
            rotation_step: Some(15.0),
            ..Default::default()
        };
        assert_eq!(rules.rotation(Vec3::new(8.0, 44.0, 0.0)), Vec3::new(15.0, 45.0, 0.0));
    }

    #[test]
    fn test_scale_clamp() {
        let rules = PlacementRules {
            scale_range: Some([0.5, 2.0]),
            ..Default::default()
        };
        assert_eq!(rules.scale(Vec3::new(0.1, 1.0, 3.0)), Vec3::new(0.5, 1.0, 2.0));
    }

    #[test]
    fn test_rules_from_toml() {
        let rules: PlacementRules = toml::from_str(
            r#"
y_range = [0.0, 5.0]
scale_range = [0.5, 2.0]
bounds = { center = [0.0, 0.0, 0.0], size = [20.0, 10.0, 20.0] }
"#,
        )
        .unwrap();
        assert!(rules.bounds.is_some());
        assert!(rules.position_step.is_none());
    }
}
