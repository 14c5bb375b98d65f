//! Converts platform-agnostic events into controller input state.
//!
//! `InputCapture` owns all transient input state (held key flags, drag and
//! pinch trackers) plus the one-shot impulses waiting for the next
//! integrator step. Handlers registered on the input surface only ever
//! write here; [`CruiseControls::update`](crate::CruiseControls::update)
//! is the only reader and the only place impulses are cleared.

use glam::{Vec2, Vec3};

use super::{
    event::{Disposition, InputEvent, TouchPoint},
    gesture::{DragState, PinchState},
    keyboard::{MoveState, NavAction},
    platform::PlatformProfile,
};
use crate::options::{ControlOptions, KeybindingOptions};

/// The subset of options input capture needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSettings {
    /// Largest per-event drag delta, per axis.
    pub drag_clamp: f32,
    /// Largest per-event wheel travel, in notches.
    pub wheel_clamp: f32,
    /// Flip wheel direction.
    pub invert_wheel: bool,
    /// Notches per pixel of pinch separation change.
    pub pinch_sensitivity: f32,
    /// Largest per-event pinch travel, in notches.
    pub pinch_clamp: f32,
    /// Key code → action table.
    pub keybindings: KeybindingOptions,
}

impl CaptureSettings {
    /// Extract capture settings from the full option set.
    #[must_use]
    pub fn new(controls: &ControlOptions, keybindings: &KeybindingOptions) -> Self {
        let mut keybindings = keybindings.clone();
        keybindings.rebuild_reverse_map();
        Self {
            drag_clamp: controls.drag_clamp,
            wheel_clamp: controls.wheel_clamp,
            invert_wheel: controls.invert_wheel,
            pinch_sensitivity: controls.pinch_sensitivity,
            pinch_clamp: controls.pinch_clamp,
            keybindings,
        }
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self::new(&ControlOptions::default(), &KeybindingOptions::default())
    }
}

/// Input state shared between the surface's event handlers and the
/// controller.
#[derive(Debug, Clone, Default)]
pub struct InputCapture {
    moves: MoveState,
    drag: DragState,
    pinch: PinchState,
    /// Sum of clamped drag deltas since the last update.
    pending_drag: Vec2,
    /// Latest wheel/pinch travel since the last update, in notches.
    pending_travel: f32,
    profile: PlatformProfile,
    settings: CaptureSettings,
}

impl InputCapture {
    /// Create capture state for a platform.
    #[must_use]
    pub fn new(settings: CaptureSettings, profile: PlatformProfile) -> Self {
        Self {
            profile,
            settings,
            ..Self::default()
        }
    }

    /// Replace the capture settings.
    ///
    /// An action whose key changed is released: its keyup would arrive on
    /// the old code and never match again.
    pub fn set_settings(&mut self, settings: CaptureSettings) {
        for action in NavAction::ALL {
            let old = self.settings.keybindings.key_for(action);
            if old != settings.keybindings.key_for(action) {
                let _ = self.moves.set(action, false);
            }
        }
        self.settings = settings;
    }

    /// Replace the platform profile.
    pub fn set_profile(&mut self, profile: PlatformProfile) {
        self.profile = profile;
    }

    /// Platform profile used for normalization.
    #[must_use]
    pub fn profile(&self) -> PlatformProfile {
        self.profile
    }

    /// Held key flags.
    #[must_use]
    pub fn move_state(&self) -> MoveState {
        self.moves
    }

    /// Derived translation vector.
    #[must_use]
    pub fn move_vector(&self) -> Vec3 {
        self.moves.move_vector()
    }

    /// Derived keyboard rotation vector.
    #[must_use]
    pub fn rotation_vector(&self) -> Vec3 {
        self.moves.rotation_vector()
    }

    /// Whether a pointer or single-finger drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    /// Consume the accumulated drag delta.
    pub fn take_drag(&mut self) -> Option<Vec2> {
        let drag = std::mem::take(&mut self.pending_drag);
        (drag != Vec2::ZERO).then_some(drag)
    }

    /// Consume the pending travel distance.
    pub fn take_travel(&mut self) -> Option<f32> {
        let travel = std::mem::take(&mut self.pending_travel);
        (travel != 0.0).then_some(travel)
    }

    /// Drop pending drag and travel impulses. Held keys and an active drag
    /// stay.
    pub fn discard_impulses(&mut self) {
        self.pending_drag = Vec2::ZERO;
        self.pending_travel = 0.0;
    }

    /// Drop all held and pending input.
    pub fn reset(&mut self) {
        self.moves.clear();
        self.drag.end();
        self.pinch.end();
        self.pending_drag = Vec2::ZERO;
        self.pending_travel = 0.0;
    }

    /// Apply one event. Returns whether the platform default action should
    /// be suppressed.
    pub fn handle(&mut self, event: &InputEvent) -> Disposition {
        match event {
            InputEvent::KeyDown { code } => {
                self.handle_key(code, true);
                Disposition::Default
            }
            InputEvent::KeyUp { code } => {
                self.handle_key(code, false);
                Disposition::Default
            }
            InputEvent::PointerDown { x, y } => {
                self.drag.begin(Vec2::new(*x, *y));
                Disposition::Default
            }
            InputEvent::PointerMove { x, y } => {
                self.drag_to(Vec2::new(*x, *y));
                Disposition::Default
            }
            InputEvent::PointerUp | InputEvent::PointerLeave => {
                self.drag.end();
                Disposition::Default
            }
            InputEvent::Wheel { delta } => {
                let notches = self.profile.wheel_notches(*delta);
                let notches = if self.settings.invert_wheel {
                    -notches
                } else {
                    notches
                };
                let limit = self.settings.wheel_clamp.abs();
                self.set_travel(notches.clamp(-limit, limit));
                Disposition::PreventDefault
            }
            InputEvent::TouchStart { touches } => {
                self.touch_start(touches);
                Disposition::Default
            }
            InputEvent::TouchMove { touches } => {
                self.touch_move(touches);
                Disposition::PreventDefault
            }
            InputEvent::TouchEnd { touches } => {
                self.touch_end(touches);
                Disposition::Default
            }
            InputEvent::ContextMenu => Disposition::PreventDefault,
        }
    }

    fn handle_key(&mut self, code: &str, pressed: bool) {
        match self.settings.keybindings.lookup(code) {
            Some(action) => {
                if self.moves.set(action, pressed) {
                    log::trace!("{action:?} {}", if pressed { "on" } else { "off" });
                }
            }
            None => log::trace!("ignoring unbound key {code}"),
        }
    }

    fn drag_to(&mut self, position: Vec2) {
        if let Some(delta) = self.drag.drag_to(position, self.settings.drag_clamp)
        {
            self.pending_drag += delta;
        }
    }

    fn set_travel(&mut self, notches: f32) {
        // Last event before an update wins.
        if notches != 0.0 {
            self.pending_travel = notches;
        }
    }

    fn touch_start(&mut self, touches: &[TouchPoint]) {
        match touches {
            [] => {}
            [one] => {
                self.pinch.end();
                self.drag.begin(Vec2::new(one.x, one.y));
            }
            [a, b, ..] => {
                self.drag.end();
                self.pinch.begin(*a, *b);
            }
        }
    }

    fn touch_move(&mut self, touches: &[TouchPoint]) {
        match touches {
            [] => {}
            [one] => self.drag_to(Vec2::new(one.x, one.y)),
            [a, b, ..] => {
                if let Some(amount) = self.pinch.pinch_to(
                    *a,
                    *b,
                    self.settings.pinch_sensitivity,
                    self.settings.pinch_clamp,
                ) {
                    self.set_travel(amount);
                }
            }
        }
    }

    fn touch_end(&mut self, remaining: &[TouchPoint]) {
        match remaining {
            [] => {
                self.drag.end();
                self.pinch.end();
            }
            // Re-anchor so the finger left behind does not jump.
            [one] => {
                self.pinch.end();
                self.drag.begin(Vec2::new(one.x, one.y));
            }
            [a, b, ..] => self.pinch.begin(*a, *b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{DeltaMode, WheelDelta};

    fn key_down(code: &str) -> InputEvent {
        InputEvent::KeyDown { code: code.into() }
    }

    fn key_up(code: &str) -> InputEvent {
        InputEvent::KeyUp { code: code.into() }
    }

    fn wheel(delta_y: f32) -> InputEvent {
        InputEvent::Wheel {
            delta: WheelDelta::Standard {
                delta_y,
                mode: DeltaMode::Pixel,
            },
        }
    }

    fn touches(points: &[(f32, f32)]) -> Vec<TouchPoint> {
        points.iter().map(|&(x, y)| TouchPoint::new(x, y)).collect()
    }

    #[test]
    fn keys_drive_move_state() {
        let mut input = InputCapture::default();
        let _ = input.handle(&key_down("KeyW"));
        let _ = input.handle(&key_down("ArrowLeft"));
        assert!(input.move_state().is_pressed(NavAction::Forward));
        assert_eq!(input.move_vector(), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(input.rotation_vector(), Vec3::new(0.0, 1.0, 0.0));

        let _ = input.handle(&key_up("KeyW"));
        let _ = input.handle(&key_up("ArrowLeft"));
        assert_eq!(input.move_vector(), Vec3::ZERO);
        assert_eq!(input.rotation_vector(), Vec3::ZERO);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut input = InputCapture::default();
        let before = input.move_state();
        assert_eq!(input.handle(&key_down("KeyZ")), Disposition::Default);
        assert_eq!(input.move_state(), before);
    }

    #[test]
    fn pointer_move_without_down_is_noop() {
        let mut input = InputCapture::default();
        let _ = input.handle(&InputEvent::PointerMove { x: 50.0, y: 50.0 });
        assert_eq!(input.take_drag(), None);
    }

    #[test]
    fn drag_accumulates_clamped_steps() {
        let mut input = InputCapture::default();
        let _ = input.handle(&InputEvent::PointerDown { x: 0.0, y: 0.0 });
        let _ = input.handle(&InputEvent::PointerMove { x: 15.0, y: 0.0 });
        let _ = input.handle(&InputEvent::PointerMove { x: 30.0, y: 0.0 });
        // Two steps of 15 px; a single (p2 - p0) delta would clamp to 20.
        assert_eq!(input.take_drag(), Some(Vec2::new(-30.0, 0.0)));
        assert_eq!(input.take_drag(), None);
    }

    #[test]
    fn pointer_up_and_leave_end_drag() {
        let mut input = InputCapture::default();
        for end in [InputEvent::PointerUp, InputEvent::PointerLeave] {
            let _ = input.handle(&InputEvent::PointerDown { x: 0.0, y: 0.0 });
            let _ = input.handle(&end);
            assert!(!input.is_dragging());
            let _ = input.handle(&InputEvent::PointerMove { x: 9.0, y: 9.0 });
            assert_eq!(input.take_drag(), None);
        }
    }

    #[test]
    fn wheel_is_clamped_and_last_wins() {
        let mut input = InputCapture::default();
        assert_eq!(input.handle(&wheel(-100.0)), Disposition::PreventDefault);
        let _ = input.handle(&wheel(-10_000.0));
        assert_eq!(input.take_travel(), Some(5.0));
        assert_eq!(input.take_travel(), None);

        let _ = input.handle(&wheel(-10_000.0));
        let _ = input.handle(&wheel(200.0));
        assert_eq!(input.take_travel(), Some(-2.0));
    }

    #[test]
    fn invert_wheel_flips_sign() {
        let settings = CaptureSettings {
            invert_wheel: true,
            ..CaptureSettings::default()
        };
        let mut input =
            InputCapture::new(settings, PlatformProfile::default());
        let _ = input.handle(&wheel(-100.0));
        assert_eq!(input.take_travel(), Some(-1.0));
    }

    #[test]
    fn single_finger_touch_drags() {
        let mut input = InputCapture::default();
        let _ = input.handle(&InputEvent::TouchStart {
            touches: touches(&[(10.0, 10.0)]),
        });
        assert_eq!(
            input.handle(&InputEvent::TouchMove {
                touches: touches(&[(14.0, 7.0)]),
            }),
            Disposition::PreventDefault
        );
        assert_eq!(input.take_drag(), Some(Vec2::new(-4.0, 3.0)));
    }

    #[test]
    fn touch_and_mouse_drags_match() {
        let mut mouse = InputCapture::default();
        let _ = mouse.handle(&InputEvent::PointerDown { x: 10.0, y: 10.0 });
        let _ = mouse.handle(&InputEvent::PointerMove { x: 22.0, y: 4.0 });

        let mut touch = InputCapture::default();
        let _ = touch.handle(&InputEvent::TouchStart {
            touches: touches(&[(10.0, 10.0)]),
        });
        let _ = touch.handle(&InputEvent::TouchMove {
            touches: touches(&[(22.0, 4.0)]),
        });
        assert_eq!(mouse.take_drag(), touch.take_drag());
    }

    #[test]
    fn two_finger_touch_pinches() {
        let mut input = InputCapture::default();
        let _ = input.handle(&InputEvent::TouchStart {
            touches: touches(&[(0.0, 0.0), (100.0, 0.0)]),
        });
        let _ = input.handle(&InputEvent::TouchMove {
            touches: touches(&[(0.0, 0.0), (140.0, 0.0)]),
        });
        assert_eq!(input.take_travel(), Some(2.0));
        assert_eq!(input.take_drag(), None);
    }

    #[test]
    fn lifting_one_finger_reanchors_drag() {
        let mut input = InputCapture::default();
        let _ = input.handle(&InputEvent::TouchStart {
            touches: touches(&[(0.0, 0.0), (100.0, 0.0)]),
        });
        let _ = input.handle(&InputEvent::TouchEnd {
            touches: touches(&[(100.0, 0.0)]),
        });
        let _ = input.handle(&InputEvent::TouchMove {
            touches: touches(&[(101.0, 0.0)]),
        });
        assert_eq!(input.take_drag(), Some(Vec2::new(-1.0, 0.0)));

        let _ = input.handle(&InputEvent::TouchEnd { touches: vec![] });
        let _ = input.handle(&InputEvent::TouchMove {
            touches: touches(&[(150.0, 0.0)]),
        });
        assert_eq!(input.take_drag(), None);
    }

    #[test]
    fn context_menu_is_suppressed() {
        let mut input = InputCapture::default();
        assert_eq!(
            input.handle(&InputEvent::ContextMenu),
            Disposition::PreventDefault
        );
    }

    #[test]
    fn rebinding_releases_moved_actions_only() {
        let mut input = InputCapture::default();
        let _ = input.handle(&key_down("KeyW"));
        let _ = input.handle(&key_down("KeyD"));

        let mut keys = KeybindingOptions::default();
        keys.bind(NavAction::Forward, "KeyI");
        input.set_settings(CaptureSettings::new(&ControlOptions::default(), &keys));
        assert!(!input.move_state().is_pressed(NavAction::Forward));
        assert!(input.move_state().is_pressed(NavAction::Right));

        let _ = input.handle(&key_up("KeyW"));
        let _ = input.handle(&key_up("KeyD"));
        assert_eq!(input.move_vector(), Vec3::ZERO);
    }

    #[test]
    fn reset_drops_everything() {
        let mut input = InputCapture::default();
        let _ = input.handle(&key_down("KeyD"));
        let _ = input.handle(&wheel(-100.0));
        let _ = input.handle(&InputEvent::PointerDown { x: 0.0, y: 0.0 });
        let _ = input.handle(&InputEvent::PointerMove { x: 5.0, y: 0.0 });
        input.reset();
        assert_eq!(input.move_vector(), Vec3::ZERO);
        assert_eq!(input.take_travel(), None);
        assert_eq!(input.take_drag(), None);
        assert!(!input.is_dragging());
    }
}
