//! winit adapter: translates `WindowEvent`s into [`InputEvent`]s and feeds
//! them to a [`ListenerRegistry`] the controller is attached to.

use winit::{
    dpi::PhysicalPosition,
    event::{
        ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent,
    },
    keyboard::{KeyCode, PhysicalKey},
};

use crate::input::{
    DeltaMode, Disposition, InputEvent, ListenerRegistry, TouchPoint,
    WheelDelta,
};

/// Browser-style code string for a physical key (`KeyW`, `ArrowUp`, ...).
///
/// winit's `KeyCode` variants are named after `KeyboardEvent.code`, so the
/// debug name is the code.
#[must_use]
pub fn key_code_name(code: KeyCode) -> String {
    format!("{code:?}")
}

/// Map a winit scroll delta onto the DOM wheel model (positive `delta_y`
/// scrolls down, three lines per notch).
#[must_use]
pub fn wheel_delta(delta: MouseScrollDelta) -> WheelDelta {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => WheelDelta::Standard {
            delta_y: -y * 3.0,
            mode: DeltaMode::Line,
        },
        MouseScrollDelta::PixelDelta(pos) => WheelDelta::Standard {
            delta_y: -pos.y as f32,
            mode: DeltaMode::Pixel,
        },
    }
}

/// Active touches in the order they went down.
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    active: Vec<(u64, TouchPoint)>,
}

impl TouchTracker {
    /// Apply one touch update and return the matching event.
    pub fn update(
        &mut self,
        id: u64,
        phase: TouchPhase,
        point: TouchPoint,
    ) -> InputEvent {
        let slot = self.active.iter().position(|(t, _)| *t == id);
        match phase {
            TouchPhase::Started => {
                match slot {
                    Some(i) => self.active[i].1 = point,
                    None => self.active.push((id, point)),
                }
                InputEvent::TouchStart {
                    touches: self.points(),
                }
            }
            TouchPhase::Moved => {
                if let Some(i) = slot {
                    self.active[i].1 = point;
                }
                InputEvent::TouchMove {
                    touches: self.points(),
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if let Some(i) = slot {
                    let _ = self.active.remove(i);
                }
                InputEvent::TouchEnd {
                    touches: self.points(),
                }
            }
        }
    }

    fn points(&self) -> Vec<TouchPoint> {
        self.active.iter().map(|(_, p)| *p).collect()
    }
}

/// Per-window input adapter.
#[derive(Debug, Clone)]
pub struct NativeInput {
    registry: ListenerRegistry,
    cursor: Option<TouchPoint>,
    touches: TouchTracker,
    scale_factor: f64,
}

impl NativeInput {
    /// Feed events into `registry`. Positions are divided by
    /// `scale_factor` so drag clamps work in logical pixels.
    #[must_use]
    pub fn new(registry: ListenerRegistry, scale_factor: f64) -> Self {
        Self {
            registry,
            cursor: None,
            touches: TouchTracker::default(),
            scale_factor: if scale_factor > 0.0 { scale_factor } else { 1.0 },
        }
    }

    /// The registry events are dispatched to.
    #[must_use]
    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    fn logical(&self, position: PhysicalPosition<f64>) -> TouchPoint {
        TouchPoint::new(
            (position.x / self.scale_factor) as f32,
            (position.y / self.scale_factor) as f32,
        )
    }

    /// Translate a window event. Returns `None` for events the controller
    /// does not use.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if *scale_factor > 0.0 {
                    self.scale_factor = *scale_factor;
                }
                None
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return None;
                };
                let code = key_code_name(code);
                Some(match event.state {
                    ElementState::Pressed => InputEvent::KeyDown { code },
                    ElementState::Released => InputEvent::KeyUp { code },
                })
            }
            WindowEvent::CursorMoved { position, .. } => {
                let point = self.logical(*position);
                self.cursor = Some(point);
                Some(InputEvent::PointerMove {
                    x: point.x,
                    y: point.y,
                })
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                Some(InputEvent::PointerLeave)
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    let cursor = self.cursor?;
                    Some(InputEvent::PointerDown {
                        x: cursor.x,
                        y: cursor.y,
                    })
                }
                ElementState::Released => Some(InputEvent::PointerUp),
            },
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Right,
                ..
            } => Some(InputEvent::ContextMenu),
            WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Wheel {
                delta: wheel_delta(*delta),
            }),
            WindowEvent::Touch(touch) => {
                let point = self.logical(touch.location);
                Some(self.touches.update(touch.id, touch.phase, point))
            }
            _ => None,
        }
    }

    /// Translate and dispatch. Returns `None` if the event was not for the
    /// controller.
    pub fn handle_window_event(
        &mut self,
        event: &WindowEvent,
    ) -> Option<Disposition> {
        let input = self.translate(event)?;
        log::trace!("native input {:?}", input.kind());
        Some(self.registry.dispatch(&input))
    }
}
