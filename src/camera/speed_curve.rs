use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Distance-adaptive translation throttle.
///
/// Navigation is fast far away from `center` and fine-grained close to it:
///
/// ```text
/// distance = clamp(|position - center|, threshold, horizon)
/// factor   = throttle * sin(distance / horizon * pi / 2)
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Speed Curve", inline)]
#[serde(default)]
pub struct SpeedCurve {
    /// Distances below this are treated as this distance.
    #[schemars(title = "Threshold", range(min = 0.1, max = 100.0), extend("step" = 0.5))]
    pub threshold: f32,
    /// Distance at which the curve reaches full throttle.
    #[schemars(title = "Horizon", range(min = 10.0, max = 20000.0), extend("step" = 10.0))]
    pub horizon: f32,
    /// Maximum speed factor.
    #[schemars(title = "Throttle", range(min = 0.5, max = 10.0), extend("step" = 0.1))]
    pub throttle: f32,
    /// Reference point distances are measured from.
    #[schemars(skip)]
    pub center: [f32; 3],
}

impl Default for SpeedCurve {
    fn default() -> Self {
        Self {
            threshold: 10.0,
            horizon: 1000.0,
            throttle: 5.0,
            center: [0.0; 3],
        }
    }
}

impl SpeedCurve {
    /// Speed factor for a camera `distance` away from the center.
    #[must_use]
    pub fn factor(&self, distance: f32) -> f32 {
        let horizon = self.horizon.max(f32::EPSILON);
        let threshold = self.threshold.clamp(0.0, horizon);
        let distance = if distance.is_nan() { threshold } else { distance };
        let distance = distance.clamp(threshold, horizon);
        self.throttle * (distance / horizon * FRAC_PI_2).sin()
    }

    /// Speed factor for a camera at `position`.
    #[must_use]
    pub fn factor_at(&self, position: Vec3) -> f32 {
        self.factor(position.distance(Vec3::from(self.center)))
    }
}
