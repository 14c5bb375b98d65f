use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Navigation actions that can be bound to keys. Each one drives exactly
/// one [`MoveState`] flag.
///
/// Serde serializes as `snake_case` strings so TOML presets stay readable:
/// ```toml
/// [keybindings.bindings]
/// forward = "KeyW"
/// roll_left = "KeyQ"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavAction {
    /// Translate up.
    Up,
    /// Translate down.
    Down,
    /// Strafe left.
    Left,
    /// Strafe right.
    Right,
    /// Move forward.
    Forward,
    /// Move back.
    Back,
    /// Pitch the nose up.
    PitchUp,
    /// Pitch the nose down.
    PitchDown,
    /// Turn left.
    YawLeft,
    /// Turn right.
    YawRight,
    /// Roll counter-clockwise.
    RollLeft,
    /// Roll clockwise.
    RollRight,
}

impl NavAction {
    /// Every action, in flag order.
    pub const ALL: [Self; 12] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::Forward,
        Self::Back,
        Self::PitchUp,
        Self::PitchDown,
        Self::YawLeft,
        Self::YawRight,
        Self::RollLeft,
        Self::RollRight,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// The twelve held navigation flags.
///
/// Pressing sets a flag, releasing clears it; repeated presses are no-ops.
/// The move and rotation vectors are derived on demand so they can never
/// drift from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveState {
    pressed: [bool; 12],
}

impl MoveState {
    /// Set or clear the flag for `action`. Returns `true` if the flag
    /// changed.
    pub fn set(&mut self, action: NavAction, pressed: bool) -> bool {
        let flag = &mut self.pressed[action.index()];
        let changed = *flag != pressed;
        *flag = pressed;
        changed
    }

    /// Whether the flag for `action` is held.
    #[must_use]
    pub fn is_pressed(&self, action: NavAction) -> bool {
        self.pressed[action.index()]
    }

    /// Release every flag.
    pub fn clear(&mut self) {
        self.pressed = [false; 12];
    }

    fn axis(&self, positive: NavAction, negative: NavAction) -> f32 {
        f32::from(u8::from(self.is_pressed(positive)))
            - f32::from(u8::from(self.is_pressed(negative)))
    }

    /// `(right - left, up - down, back - forward)` in camera-local axes.
    #[must_use]
    pub fn move_vector(&self) -> Vec3 {
        Vec3::new(
            self.axis(NavAction::Right, NavAction::Left),
            self.axis(NavAction::Up, NavAction::Down),
            self.axis(NavAction::Back, NavAction::Forward),
        )
    }

    /// `(pitch_up - pitch_down, yaw_left - yaw_right, roll_left -
    /// roll_right)`.
    #[must_use]
    pub fn rotation_vector(&self) -> Vec3 {
        Vec3::new(
            self.axis(NavAction::PitchUp, NavAction::PitchDown),
            self.axis(NavAction::YawLeft, NavAction::YawRight),
            self.axis(NavAction::RollLeft, NavAction::RollRight),
        )
    }
}
