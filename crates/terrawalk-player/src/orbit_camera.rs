//! Orbit camera: spherical coordinates around a look-at target.

use glam::DVec3;

/// Where the camera is and what it looks at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    /// Eye position in world space.
    pub position: DVec3,
    /// Look-at point in world space.
    pub target: DVec3,
}

impl CameraPose {
    /// Unit vector from the eye towards the target, or `-Z` if they coincide.
    pub fn forward(&self) -> DVec3 {
        (self.target - self.position)
            .try_normalize()
            .unwrap_or(DVec3::NEG_Z)
    }
}

/// Camera orbiting a target point.
///
/// `azimuth` is measured around +Y from +Z towards +X; `polar` is the angle
/// down from +Y. Distance and polar angle are clamped on every change.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    /// Look-at point.
    pub target: DVec3,
    /// Distance from the target.
    pub distance: f64,
    /// Horizontal angle in radians.
    pub azimuth: f64,
    /// Angle from straight up in radians.
    pub polar: f64,
    /// Closest allowed distance.
    pub min_distance: f64,
    /// Farthest allowed distance.
    pub max_distance: f64,
    /// Largest allowed polar angle; just under `π/2` keeps the eye above the horizon.
    pub max_polar: f64,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let mut cam = Self {
            target: DVec3::ZERO,
            distance: 0.0,
            azimuth: 0.0,
            polar: 0.0,
            min_distance: 20.0,
            max_distance: 200.0,
            max_polar: std::f64::consts::PI * 0.495,
        };
        cam.look_from(DVec3::new(30.0, 30.0, 100.0), DVec3::new(0.0, 10.0, 0.0));
        cam
    }
}

impl OrbitCamera {
    /// Re-derive the spherical coordinates so the eye sits at `eye` and looks
    /// at `target`, then apply the limits.
    pub fn look_from(&mut self, eye: DVec3, target: DVec3) {
        let offset = eye - target;
        let distance = offset.length();
        self.target = target;
        if distance > f64::EPSILON {
            self.distance = distance;
            self.azimuth = offset.x.atan2(offset.z);
            self.polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
        } else {
            self.distance = self.min_distance;
        }
        self.clamp();
    }

    /// Orbit by the given angle deltas in radians.
    pub fn rotate(&mut self, d_azimuth: f64, d_polar: f64) {
        self.azimuth += d_azimuth;
        self.polar += d_polar;
        self.clamp();
    }

    /// Multiply the distance by `factor` (`< 1` zooms in).
    pub fn zoom(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.distance *= factor;
            self.clamp();
        }
    }

    /// Current eye position and target.
    pub fn pose(&self) -> CameraPose {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        let offset = DVec3::new(sin_p * sin_a, cos_p, sin_p * cos_a) * self.distance;
        CameraPose {
            position: self.target + offset,
            target: self.target,
        }
    }

    fn clamp(&mut self) {
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
        self.polar = self.polar.clamp(0.0, self.max_polar);
    }
}
