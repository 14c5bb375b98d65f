use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::camera::speed_curve::SpeedCurve;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Controls", inline)]
#[serde(default)]
/// Navigation speeds, input clamps and the distance speed curve.
pub struct ControlOptions {
    /// Translation speed for held movement keys (units per second before
    /// the speed curve).
    #[schemars(title = "Movement Speed", range(min = 10.0, max = 2000.0), extend("step" = 10.0))]
    pub movement_speed: f32,
    /// Rotation speed for held pitch/yaw/roll keys.
    #[schemars(title = "Rotation Speed", range(min = 0.05, max = 3.0), extend("step" = 0.05))]
    pub rotation_speed: f32,
    /// Rotation per pixel of pointer drag.
    #[schemars(title = "Drag Sensitivity", range(min = 0.0005, max = 0.01), extend("step" = 0.0005))]
    pub drag_sensitivity: f32,
    /// Largest per-event drag delta, in pixels per axis.
    #[schemars(skip)]
    pub drag_clamp: f32,
    /// Distance travelled per wheel notch before the speed curve.
    #[schemars(title = "Dolly Speed", range(min = 1.0, max = 100.0), extend("step" = 1.0))]
    pub dolly_speed: f32,
    /// Largest per-event wheel travel, in notches.
    #[schemars(skip)]
    pub wheel_clamp: f32,
    /// Notches per pixel of change in two-finger separation.
    #[schemars(title = "Pinch Sensitivity", range(min = 0.005, max = 0.5), extend("step" = 0.005))]
    pub pinch_sensitivity: f32,
    /// Largest per-event pinch travel, in notches.
    #[schemars(skip)]
    pub pinch_clamp: f32,
    /// Flip wheel direction.
    #[schemars(title = "Invert Wheel")]
    pub invert_wheel: bool,
    /// Distance-dependent throttle applied to all translation.
    pub speed_curve: SpeedCurve,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            movement_speed: 500.0,
            rotation_speed: 0.5,
            drag_sensitivity: 0.002,
            drag_clamp: 20.0,
            dolly_speed: 10.0,
            wheel_clamp: 5.0,
            pinch_sensitivity: 0.05,
            pinch_clamp: 5.0,
            invert_wheel: false,
            speed_curve: SpeedCurve::default(),
        }
    }
}

impl ControlOptions {
    /// Check that every scalar is finite and the clamps/curve are usable.
    pub(crate) fn validate(&self) -> Result<(), String> {
        let scalars = [
            ("movement_speed", self.movement_speed),
            ("rotation_speed", self.rotation_speed),
            ("drag_sensitivity", self.drag_sensitivity),
            ("drag_clamp", self.drag_clamp),
            ("dolly_speed", self.dolly_speed),
            ("wheel_clamp", self.wheel_clamp),
            ("pinch_sensitivity", self.pinch_sensitivity),
            ("pinch_clamp", self.pinch_clamp),
            ("speed_curve.threshold", self.speed_curve.threshold),
            ("speed_curve.horizon", self.speed_curve.horizon),
            ("speed_curve.throttle", self.speed_curve.throttle),
        ];
        if let Some((name, value)) =
            scalars.iter().find(|(_, v)| !v.is_finite() || *v < 0.0)
        {
            return Err(format!("{name} must be finite and >= 0, got {value}"));
        }
        let curve = &self.speed_curve;
        if curve.horizon <= 0.0 || curve.threshold > curve.horizon {
            return Err(format!(
                "speed curve needs 0 <= threshold <= horizon, got {} / {}",
                curve.threshold, curve.horizon
            ));
        }
        Ok(())
    }
}
