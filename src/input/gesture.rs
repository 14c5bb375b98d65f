//! Transient drag and pinch trackers.

use glam::Vec2;

use super::event::TouchPoint;

/// Single-pointer drag tracking.
///
/// Deltas are frame-to-frame: every move re-anchors the start point to the
/// current position, so a long drag is the sum of its clamped steps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    start: Option<Vec2>,
}

impl DragState {
    /// Begin tracking at `position`. Produces no motion.
    pub fn begin(&mut self, position: Vec2) {
        self.start = position.is_finite().then_some(position);
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }

    /// Move to `position` and return `clamp(start - position, -limit,
    /// limit)`, or `None` when not dragging.
    pub fn drag_to(&mut self, position: Vec2, limit: f32) -> Option<Vec2> {
        let start = self.start?;
        if !position.is_finite() {
            return None;
        }
        let limit = Vec2::splat(limit.abs());
        let delta = (start - position).clamp(-limit, limit);
        self.start = Some(position);
        Some(delta)
    }

    /// Stop tracking.
    pub fn end(&mut self) {
        self.start = None;
    }
}

/// Two-finger pinch tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PinchState {
    previous: Option<f32>,
}

fn separation(a: TouchPoint, b: TouchPoint) -> f32 {
    Vec2::new(a.x, a.y).distance(Vec2::new(b.x, b.y))
}

impl PinchState {
    /// Record the starting separation of two fingers.
    pub fn begin(&mut self, a: TouchPoint, b: TouchPoint) {
        let distance = separation(a, b);
        self.previous = distance.is_finite().then_some(distance);
    }

    /// Whether a pinch is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.previous.is_some()
    }

    /// Compare the new separation with the previous one and return the
    /// signed, clamped dolly amount (spreading fingers is positive).
    /// The first sample after [`end`](Self::end) only primes the tracker.
    pub fn pinch_to(
        &mut self,
        a: TouchPoint,
        b: TouchPoint,
        sensitivity: f32,
        limit: f32,
    ) -> Option<f32> {
        let distance = separation(a, b);
        if !distance.is_finite() {
            return None;
        }
        let previous = self.previous.replace(distance)?;
        let limit = limit.abs();
        Some(((distance - previous) * sensitivity).clamp(-limit, limit))
    }

    /// Stop tracking.
    pub fn end(&mut self) {
        self.previous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_without_begin_is_noop() {
        let mut drag = DragState::default();
        assert_eq!(drag.drag_to(Vec2::new(10.0, 10.0), 20.0), None);
    }

    #[test]
    fn drag_reanchors_each_step() {
        let mut drag = DragState::default();
        drag.begin(Vec2::new(0.0, 0.0));
        assert_eq!(
            drag.drag_to(Vec2::new(5.0, 0.0), 20.0),
            Some(Vec2::new(-5.0, 0.0))
        );
        assert_eq!(
            drag.drag_to(Vec2::new(8.0, 2.0), 20.0),
            Some(Vec2::new(-3.0, -2.0))
        );
    }

    #[test]
    fn drag_delta_is_clamped_per_axis() {
        let mut drag = DragState::default();
        drag.begin(Vec2::new(100.0, 100.0));
        assert_eq!(
            drag.drag_to(Vec2::new(0.0, 95.0), 20.0),
            Some(Vec2::new(20.0, 5.0))
        );
    }

    #[test]
    fn drag_ignores_non_finite_positions() {
        let mut drag = DragState::default();
        drag.begin(Vec2::new(f32::NAN, 0.0));
        assert!(!drag.is_active());

        drag.begin(Vec2::ZERO);
        assert_eq!(drag.drag_to(Vec2::new(f32::INFINITY, 0.0), 20.0), None);
        assert!(drag.is_active());
    }

    #[test]
    fn end_clears_drag() {
        let mut drag = DragState::default();
        drag.begin(Vec2::ZERO);
        drag.end();
        assert!(!drag.is_active());
    }

    #[test]
    fn pinch_spread_is_positive_and_clamped() {
        let mut pinch = PinchState::default();
        pinch.begin(TouchPoint::new(0.0, 0.0), TouchPoint::new(10.0, 0.0));

        let amount = pinch.pinch_to(
            TouchPoint::new(0.0, 0.0),
            TouchPoint::new(20.0, 0.0),
            0.1,
            5.0,
        );
        assert_eq!(amount, Some(1.0));

        let amount = pinch.pinch_to(
            TouchPoint::new(0.0, 0.0),
            TouchPoint::new(-480.0, 0.0),
            0.1,
            5.0,
        );
        assert_eq!(amount, Some(5.0));

        let amount = pinch.pinch_to(
            TouchPoint::new(0.0, 0.0),
            TouchPoint::new(10.0, 0.0),
            0.1,
            5.0,
        );
        assert_eq!(amount, Some(-5.0));
    }

    #[test]
    fn first_pinch_sample_primes_tracker() {
        let mut pinch = PinchState::default();
        let a = TouchPoint::new(0.0, 0.0);
        let b = TouchPoint::new(30.0, 40.0);
        assert_eq!(pinch.pinch_to(a, b, 0.1, 5.0), None);
        assert!(pinch.is_active());
        assert_eq!(pinch.pinch_to(a, b, 0.1, 5.0), Some(0.0));
    }
}
