use std::{cell::RefCell, rc::Rc};

use glam::{Quat, Vec3};

use super::{core::CameraRig, speed_curve::SpeedCurve};
use crate::{
    error::CruiseError,
    input::{
        CaptureSettings, Disposition, EventHandler, EventKind, InputCapture,
        InputSurface, ListenerId, MoveState, PlatformProfile,
    },
    options::{ControlOptions, KeybindingOptions, Options},
};

/// Whether the controller is still attached to its input surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Listeners attached, `update` integrates input.
    Registered,
    /// Listeners detached. Terminal.
    Disposed,
}

/// Free-flight "cruise" controller.
///
/// Keys translate along and rotate about the camera's local axes, a
/// pointer or single-finger drag steers pitch and yaw, and the wheel or a
/// two-finger pinch dollies along the view direction. All translation is
/// throttled by the [`SpeedCurve`] so the camera slows down near the
/// curve's center.
///
/// Event handlers only record input; nothing moves until
/// [`update`](Self::update) runs, once per rendered frame.
pub struct CruiseControls<C: CameraRig, S: InputSurface> {
    camera: C,
    surface: S,
    input: Rc<RefCell<InputCapture>>,
    listeners: Vec<ListenerId>,
    lifecycle: Lifecycle,
    options: ControlOptions,
    warned_disposed: bool,
}

impl<C: CameraRig, S: InputSurface> std::fmt::Debug for CruiseControls<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CruiseControls")
            .field("lifecycle", &self.lifecycle)
            .field("listeners", &self.listeners.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<C: CameraRig, S: InputSurface> CruiseControls<C, S> {
    /// Bind to `camera` and attach every input listener to `surface`.
    ///
    /// If any listener fails to attach, the ones already attached are
    /// removed again and the error is returned.
    pub fn new(
        camera: C,
        mut surface: S,
        options: &Options,
        profile: PlatformProfile,
    ) -> Result<Self, CruiseError> {
        options
            .controls
            .validate()
            .map_err(CruiseError::InvalidOptions)?;
        options
            .keybindings
            .validate()
            .map_err(CruiseError::InvalidOptions)?;

        let settings = CaptureSettings::new(&options.controls, &options.keybindings);
        let input = Rc::new(RefCell::new(InputCapture::new(settings, profile)));
        let listeners = register(&mut surface, &input)?;
        log::info!(
            "cruise controls attached ({} listeners, {:?})",
            listeners.len(),
            profile.browser
        );

        Ok(Self {
            camera,
            surface,
            input,
            listeners,
            lifecycle: Lifecycle::Registered,
            options: options.controls.clone(),
            warned_disposed: false,
        })
    }

    /// Integrate all input recorded since the last call and move the
    /// camera. `dt` is the frame time in seconds.
    ///
    /// Returns `true` if the camera pose changed. Always `false` once
    /// disposed.
    pub fn update(&mut self, dt: f32) -> bool {
        if self.lifecycle == Lifecycle::Disposed {
            if !self.warned_disposed {
                log::warn!("update called on disposed cruise controls");
                self.warned_disposed = true;
            }
            return false;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let (move_vector, rotation_vector, drag, travel) = {
            let mut input = self.input.borrow_mut();
            (
                input.move_vector(),
                input.rotation_vector(),
                input.take_drag(),
                input.take_travel(),
            )
        };

        let mut changed = false;

        // Held movement keys
        if move_vector != Vec3::ZERO {
            let speed = self.curved_speed();
            let offset = move_vector * dt * self.options.movement_speed * speed;
            if offset != Vec3::ZERO {
                self.camera.translate_local(offset);
                changed = true;
            }
        }

        // Held rotation keys
        changed |= self.rotate(rotation_vector * (self.options.rotation_speed * dt));

        // Pointer / single-finger drag: vertical drives pitch, horizontal
        // drives yaw.
        if let Some(drag) = drag {
            let steer = Vec3::new(drag.y, drag.x, 0.0) * self.options.drag_sensitivity;
            changed |= self.rotate(steer);
        }

        // Wheel / pinch dolly along the view direction
        if let Some(distance) = travel {
            let speed = self.curved_speed();
            let offset = Vec3::NEG_Z * (distance * self.options.dolly_speed * speed);
            if offset != Vec3::ZERO {
                self.camera.translate_local(offset);
                changed = true;
            }
        }

        changed
    }

    /// Apply a small rotation in the camera's local frame.
    ///
    /// `(x, y, z, 1)` is normalized rather than built from a proper axis
    /// angle. At per-frame magnitudes the two agree closely.
    fn rotate(&mut self, scaled: Vec3) -> bool {
        if scaled == Vec3::ZERO || !scaled.is_finite() {
            return false;
        }
        let delta = Quat::from_xyzw(scaled.x, scaled.y, scaled.z, 1.0).normalize();
        let orientation = (self.camera.orientation() * delta).normalize();
        self.camera.set_orientation(orientation);
        true
    }

    /// Speed multiplier at the camera's current position.
    #[must_use]
    pub fn curved_speed(&self) -> f32 {
        self.options.speed_curve.factor_at(self.camera.position())
    }

    /// Detach every listener and drop held input. Idempotent.
    pub fn dispose(&mut self) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        for id in self.listeners.drain(..) {
            if !self.surface.unlisten(id) {
                log::debug!("listener {} was already detached", id.raw());
            }
        }
        self.input.borrow_mut().reset();
        self.lifecycle = Lifecycle::Disposed;
        log::info!("cruise controls disposed");
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Shorthand for `lifecycle() == Lifecycle::Disposed`.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.lifecycle == Lifecycle::Disposed
    }

    /// The controlled camera.
    #[must_use]
    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// Mutable access to the controlled camera, e.g. to reset its pose.
    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    /// The input surface listeners are attached to.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Active control options.
    #[must_use]
    pub fn options(&self) -> &ControlOptions {
        &self.options
    }

    /// Held key flags.
    #[must_use]
    pub fn move_state(&self) -> MoveState {
        self.input.borrow().move_state()
    }

    /// Replace control options and key bindings. Held keys whose binding
    /// changed are released.
    pub fn set_options(
        &mut self,
        controls: &ControlOptions,
        keybindings: &KeybindingOptions,
    ) -> Result<(), CruiseError> {
        controls.validate().map_err(CruiseError::InvalidOptions)?;
        keybindings.validate().map_err(CruiseError::InvalidOptions)?;
        self.input
            .borrow_mut()
            .set_settings(CaptureSettings::new(controls, keybindings));
        self.options = controls.clone();
        Ok(())
    }

    /// Throw away drag and dolly input recorded since the last update,
    /// for frames where the host skips `update`.
    pub fn discard_impulses(&mut self) {
        self.input.borrow_mut().discard_impulses();
    }

    /// Replace the speed curve.
    pub fn set_speed_curve(&mut self, curve: SpeedCurve) {
        self.options.speed_curve = curve;
    }

    /// Translation speed for held movement keys. Ignored unless finite and
    /// non-negative.
    pub fn set_movement_speed(&mut self, speed: f32) {
        if speed.is_finite() && speed >= 0.0 {
            self.options.movement_speed = speed;
        }
    }

    /// Rotation speed for held rotation keys. Ignored unless finite and
    /// non-negative.
    pub fn set_rotation_speed(&mut self, speed: f32) {
        if speed.is_finite() && speed >= 0.0 {
            self.options.rotation_speed = speed;
        }
    }

    /// Rotation per pixel of drag. Ignored unless finite and non-negative.
    pub fn set_drag_sensitivity(&mut self, sensitivity: f32) {
        if sensitivity.is_finite() && sensitivity >= 0.0 {
            self.options.drag_sensitivity = sensitivity;
        }
    }

    /// Replace the platform profile used for wheel and touch normalization.
    pub fn set_platform_profile(&mut self, profile: PlatformProfile) {
        self.input.borrow_mut().set_profile(profile);
    }
}

impl<C: CameraRig, S: InputSurface> Drop for CruiseControls<C, S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Attach one handler per event kind, rolling back on failure.
fn register<S: InputSurface>(
    surface: &mut S,
    input: &Rc<RefCell<InputCapture>>,
) -> Result<Vec<ListenerId>, CruiseError> {
    let mut ids = Vec::with_capacity(EventKind::ALL.len());
    for kind in EventKind::ALL {
        let capture = Rc::clone(input);
        let handler: EventHandler = Rc::new(move |event| {
            match capture.try_borrow_mut() {
                Ok(mut capture) => capture.handle(event),
                Err(_) => {
                    log::warn!("dropping re-entrant {:?} event", event.kind());
                    Disposition::Default
                }
            }
        });
        match surface.listen(kind, handler) {
            Ok(id) => ids.push(id),
            Err(e) => {
                log::error!("attaching {} listener failed: {e}", kind.dom_name());
                for id in ids {
                    let _ = surface.unlisten(id);
                }
                return Err(e);
            }
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        camera::core::Camera,
        input::{DeltaMode, InputEvent, ListenerRegistry, WheelDelta},
    };

    type Controls = CruiseControls<Camera, ListenerRegistry>;

    fn controls_at(position: Vec3) -> (Controls, ListenerRegistry) {
        let mut camera = Camera::new(1.0);
        camera.set_position(position);
        camera.set_orientation(Quat::IDENTITY);
        let registry = ListenerRegistry::new();
        let controls = CruiseControls::new(
            camera,
            registry.clone(),
            &Options::default(),
            PlatformProfile::default(),
        )
        .unwrap();
        (controls, registry)
    }

    fn key(registry: &ListenerRegistry, code: &str, down: bool) {
        let code = code.to_owned();
        let event = if down {
            InputEvent::KeyDown { code }
        } else {
            InputEvent::KeyUp { code }
        };
        let _ = registry.dispatch(&event);
    }

    fn wheel(delta_y: f32) -> InputEvent {
        InputEvent::Wheel {
            delta: WheelDelta::Standard {
                delta_y,
                mode: DeltaMode::Pixel,
            },
        }
    }

    #[test]
    fn registers_every_event_kind() {
        let (controls, registry) = controls_at(Vec3::ZERO);
        assert_eq!(registry.listener_count(), EventKind::ALL.len());
        assert_eq!(controls.lifecycle(), Lifecycle::Registered);
    }

    #[test]
    fn forward_key_cruises_forward() {
        let (mut controls, registry) = controls_at(Vec3::new(0.0, 0.0, 1000.0));
        key(&registry, "KeyW", true);
        assert!(controls.update(0.016));
        // 1 * 0.016 * 500 * 5 = 40 units at full throttle
        let position = controls.camera().position();
        assert!(position.abs_diff_eq(Vec3::new(0.0, 0.0, 960.0), 1e-3));
    }

    #[test]
    fn released_key_stops_motion() {
        let (mut controls, registry) = controls_at(Vec3::new(0.0, 0.0, 1000.0));
        key(&registry, "KeyD", true);
        key(&registry, "KeyD", false);
        assert!(!controls.update(0.016));
        assert_eq!(controls.camera().position(), Vec3::new(0.0, 0.0, 1000.0));
    }

    #[test]
    fn zero_dt_moves_nothing() {
        let (mut controls, registry) = controls_at(Vec3::new(0.0, 0.0, 1000.0));
        key(&registry, "KeyW", true);
        key(&registry, "ArrowUp", true);
        assert!(!controls.update(0.0));
        assert_eq!(controls.camera().position(), Vec3::new(0.0, 0.0, 1000.0));
    }

    #[test]
    fn speed_curve_slows_near_center() {
        let (mut controls, registry) = controls_at(Vec3::new(0.0, 0.0, 5.0));
        key(&registry, "KeyW", true);
        let _ = controls.update(0.016);
        // Inside the threshold the curve bottoms out at its threshold value.
        let travelled = 5.0 - controls.camera().position().z;
        let expected = 0.016 * 500.0 * SpeedCurve::default().factor(10.0);
        assert!((travelled - expected).abs() < 1e-5);
        assert!(travelled < 1.0);
    }

    #[test]
    fn yaw_key_turns_left() {
        let (mut controls, registry) = controls_at(Vec3::ZERO);
        key(&registry, "ArrowLeft", true);
        assert!(controls.update(0.1));
        let forward = controls.camera().forward();
        assert!(forward.x < 0.0, "expected a left turn, got {forward}");
        assert_eq!(controls.camera().position(), Vec3::ZERO);
    }

    #[test]
    fn wheel_dolly_is_one_shot() {
        let (mut controls, registry) = controls_at(Vec3::new(0.0, 0.0, 1000.0));
        assert_eq!(
            registry.dispatch(&wheel(-100.0)),
            Disposition::PreventDefault
        );
        assert!(controls.update(0.016));
        // 1 notch * dolly 10 * factor 5
        let position = controls.camera().position();
        assert!(position.abs_diff_eq(Vec3::new(0.0, 0.0, 950.0), 1e-3));

        assert!(!controls.update(0.016));
        assert_eq!(controls.camera().position(), position);
    }

    #[test]
    fn drag_rotation_is_sum_of_steps() {
        let (mut stepped, registry) = controls_at(Vec3::ZERO);
        let _ = registry.dispatch(&InputEvent::PointerDown { x: 0.0, y: 0.0 });
        let _ = registry.dispatch(&InputEvent::PointerMove { x: 0.0, y: 10.0 });
        let _ = registry.dispatch(&InputEvent::PointerMove { x: 0.0, y: 18.0 });
        assert!(stepped.update(0.016));

        // Same total delta delivered as one in-range step.
        let (mut single, registry) = controls_at(Vec3::ZERO);
        let _ = registry.dispatch(&InputEvent::PointerDown { x: 0.0, y: 2.0 });
        let _ = registry.dispatch(&InputEvent::PointerMove { x: 0.0, y: 20.0 });
        let _ = single.update(0.016);

        let a = stepped.camera().orientation();
        let b = single.camera().orientation();
        assert!(a.abs_diff_eq(b, 1e-6));
        assert!(!stepped.update(0.016));
    }

    #[test]
    fn drag_down_pitches_down() {
        let (mut controls, registry) = controls_at(Vec3::ZERO);
        let _ = registry.dispatch(&InputEvent::PointerDown { x: 0.0, y: 0.0 });
        let _ = registry.dispatch(&InputEvent::PointerMove { x: 0.0, y: 20.0 });
        let _ = controls.update(0.016);
        assert!(controls.camera().forward().y < 0.0);
    }

    #[test]
    fn dispose_detaches_and_freezes() {
        let (mut controls, registry) = controls_at(Vec3::new(0.0, 0.0, 1000.0));
        controls.dispose();
        assert!(controls.is_disposed());
        assert_eq!(registry.listener_count(), 0);

        key(&registry, "KeyW", true);
        let _ = registry.dispatch(&wheel(-100.0));
        assert!(!controls.update(0.016));
        assert_eq!(controls.camera().position(), Vec3::new(0.0, 0.0, 1000.0));

        // Second dispose is a no-op.
        controls.dispose();
        assert_eq!(controls.lifecycle(), Lifecycle::Disposed);
    }

    #[test]
    fn dispose_releases_held_keys() {
        let (mut controls, registry) = controls_at(Vec3::new(0.0, 0.0, 1000.0));
        key(&registry, "KeyW", true);
        controls.dispose();
        assert_eq!(controls.move_state(), MoveState::default());
    }

    #[test]
    fn drop_detaches_listeners() {
        let (controls, registry) = controls_at(Vec3::ZERO);
        drop(controls);
        assert_eq!(registry.listener_count(), 0);
    }

    struct FailingSurface {
        inner: ListenerRegistry,
        fail_on: EventKind,
    }

    impl InputSurface for FailingSurface {
        fn listen(
            &mut self,
            kind: EventKind,
            handler: EventHandler,
        ) -> Result<ListenerId, CruiseError> {
            if kind == self.fail_on {
                return Err(CruiseError::Listener(kind.dom_name().into()));
            }
            self.inner.listen(kind, handler)
        }

        fn unlisten(&mut self, id: ListenerId) -> bool {
            self.inner.unlisten(id)
        }
    }

    #[test]
    fn failed_registration_rolls_back() {
        let registry = ListenerRegistry::new();
        let surface = FailingSurface {
            inner: registry.clone(),
            fail_on: EventKind::KeyDown,
        };
        let result = CruiseControls::new(
            Camera::default(),
            surface,
            &Options::default(),
            PlatformProfile::default(),
        );
        assert!(matches!(result, Err(CruiseError::Listener(_))));
        assert_eq!(registry.listener_count(), 0);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let mut options = Options::default();
        options.controls.movement_speed = f32::NAN;
        let result = CruiseControls::new(
            Camera::default(),
            ListenerRegistry::new(),
            &options,
            PlatformProfile::default(),
        );
        assert!(matches!(result, Err(CruiseError::InvalidOptions(_))));
    }

    #[test]
    fn speed_setters_apply_live() {
        let (mut controls, registry) = controls_at(Vec3::new(0.0, 0.0, 1000.0));
        controls.set_movement_speed(250.0);
        controls.set_movement_speed(f32::NAN);
        key(&registry, "KeyW", true);
        let _ = controls.update(0.016);
        let z = controls.camera().position().z;
        assert!((z - 980.0).abs() < 1e-3);

        controls.set_rotation_speed(-1.0);
        assert_eq!(controls.options().rotation_speed, 0.5);
    }

    #[test]
    fn rebinding_a_held_key_cannot_stick() {
        let (mut controls, registry) = controls_at(Vec3::new(0.0, 0.0, 1000.0));
        key(&registry, "KeyW", true);
        let mut keys = KeybindingOptions::default();
        keys.bind(crate::input::NavAction::Forward, "KeyI");
        controls
            .set_options(&ControlOptions::default(), &keys)
            .unwrap();
        key(&registry, "KeyW", false);
        assert!(!controls.update(0.016));
        assert_eq!(controls.camera().position().z, 1000.0);
    }

    #[test]
    fn rebinding_takes_effect() {
        let (mut controls, registry) = controls_at(Vec3::new(0.0, 0.0, 1000.0));
        let mut keys = KeybindingOptions::default();
        keys.bind(crate::input::NavAction::Forward, "KeyI");
        controls
            .set_options(&ControlOptions::default(), &keys)
            .unwrap();
        key(&registry, "KeyI", true);
        assert!(controls.update(0.016));
        assert!(controls.camera().position().z < 1000.0);
    }
}
