use serde::{Deserialize, Serialize};

/// Platform-agnostic input events.
///
/// Platform adapters (the `web` and `native` features, or a test harness)
/// translate raw window/DOM events into these and dispatch them through an
/// [`InputSurface`](super::InputSurface) to the registered handlers.
///
/// Serde uses an internal `type` tag so recorded sessions stay readable:
///
/// ```json
/// { "type": "key_down", "code": "KeyW" }
/// { "type": "pointer_move", "x": 120.0, "y": 48.5 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// A key went down. `code` is the physical key (`KeyboardEvent.code`
    /// format: `"KeyW"`, `"ArrowUp"`, ...).
    KeyDown {
        /// Physical key code.
        code: String,
    },
    /// A key was released.
    KeyUp {
        /// Physical key code.
        code: String,
    },
    /// Primary pointer pressed at a page position.
    PointerDown {
        /// Horizontal page position in CSS pixels.
        x: f32,
        /// Vertical page position in CSS pixels.
        y: f32,
    },
    /// Pointer moved to a page position.
    PointerMove {
        /// Horizontal page position in CSS pixels.
        x: f32,
        /// Vertical page position in CSS pixels.
        y: f32,
    },
    /// Primary pointer released.
    PointerUp,
    /// Pointer left the capture surface.
    PointerLeave,
    /// Mouse wheel or trackpad scroll, in the units the platform reported.
    Wheel {
        /// Raw delta and its source.
        delta: WheelDelta,
    },
    /// One or more fingers touched the surface. `touches` lists every
    /// finger currently on the surface.
    TouchStart {
        /// Active touch points.
        touches: Vec<TouchPoint>,
    },
    /// Fingers moved.
    TouchMove {
        /// Active touch points.
        touches: Vec<TouchPoint>,
    },
    /// A finger lifted. `touches` lists the fingers still down.
    TouchEnd {
        /// Remaining touch points.
        touches: Vec<TouchPoint>,
    },
    /// Context menu requested (right click / long press).
    ContextMenu,
}

impl InputEvent {
    /// The listener kind this event is delivered to.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::KeyDown { .. } => EventKind::KeyDown,
            Self::KeyUp { .. } => EventKind::KeyUp,
            Self::PointerDown { .. } => EventKind::PointerDown,
            Self::PointerMove { .. } => EventKind::PointerMove,
            Self::PointerUp => EventKind::PointerUp,
            Self::PointerLeave => EventKind::PointerLeave,
            Self::Wheel { .. } => EventKind::Wheel,
            Self::TouchStart { .. } => EventKind::TouchStart,
            Self::TouchMove { .. } => EventKind::TouchMove,
            Self::TouchEnd { .. } => EventKind::TouchEnd,
            Self::ContextMenu => EventKind::ContextMenu,
        }
    }
}

/// A single touch point in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Horizontal page position.
    pub x: f32,
    /// Vertical page position.
    pub y: f32,
}

impl TouchPoint {
    /// Create a touch point.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Raw wheel delta as reported by one of the browser wheel event flavours.
///
/// Normalization into a dolly distance happens in
/// [`PlatformProfile::wheel_notches`](super::PlatformProfile::wheel_notches).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum WheelDelta {
    /// Standard `wheel` event: positive `delta_y` scrolls down.
    Standard {
        /// Vertical delta.
        delta_y: f32,
        /// Unit of `delta_y`.
        mode: DeltaMode,
    },
    /// Legacy `mousewheel` event: positive `wheel_delta` scrolls up,
    /// 120 per notch.
    LegacyMouseWheel {
        /// Signed wheel delta.
        wheel_delta: f32,
    },
    /// Firefox `DOMMouseScroll`: positive `detail` scrolls down, in lines.
    DomMouseScroll {
        /// Signed line count.
        detail: f32,
    },
}

/// Unit of a standard wheel delta (`WheelEvent.deltaMode`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DeltaMode {
    /// `DOM_DELTA_PIXEL`.
    #[default]
    Pixel,
    /// `DOM_DELTA_LINE`.
    Line,
    /// `DOM_DELTA_PAGE`.
    Page,
}

impl DeltaMode {
    /// Map the numeric DOM `deltaMode` to a unit. Unknown values are
    /// treated as pixels.
    #[must_use]
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }
}

/// Every event type the controller listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `contextmenu` on the surface.
    ContextMenu,
    /// `pointerdown` on the surface.
    PointerDown,
    /// `pointermove` on the surface.
    PointerMove,
    /// `pointerup` on the surface.
    PointerUp,
    /// `pointerleave` on the surface.
    PointerLeave,
    /// `wheel` on the surface (`mousewheel`/`DOMMouseScroll` where `wheel`
    /// is unsupported).
    Wheel,
    /// `touchstart` on the surface.
    TouchStart,
    /// `touchmove` on the surface.
    TouchMove,
    /// `touchend` on the surface.
    TouchEnd,
    /// `keydown` on the window.
    KeyDown,
    /// `keyup` on the window.
    KeyUp,
}

impl EventKind {
    /// All kinds, in registration order.
    pub const ALL: [Self; 11] = [
        Self::ContextMenu,
        Self::PointerDown,
        Self::PointerMove,
        Self::PointerUp,
        Self::PointerLeave,
        Self::Wheel,
        Self::TouchStart,
        Self::TouchMove,
        Self::TouchEnd,
        Self::KeyDown,
        Self::KeyUp,
    ];

    /// DOM event name.
    #[must_use]
    pub fn dom_name(self) -> &'static str {
        match self {
            Self::ContextMenu => "contextmenu",
            Self::PointerDown => "pointerdown",
            Self::PointerMove => "pointermove",
            Self::PointerUp => "pointerup",
            Self::PointerLeave => "pointerleave",
            Self::Wheel => "wheel",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
        }
    }

    /// Where the listener is attached. Key events are window-scoped because
    /// focus is often not on the canvas.
    #[must_use]
    pub fn scope(self) -> ListenerScope {
        match self {
            Self::KeyDown | Self::KeyUp => ListenerScope::Window,
            _ => ListenerScope::Surface,
        }
    }
}

/// Target a listener is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerScope {
    /// The input-capturing element (canvas).
    Surface,
    /// The global window.
    Window,
}

/// What a handler asks the platform to do with the original event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// Let the browser run its default action.
    #[default]
    Default,
    /// Call `preventDefault()` on the original event.
    PreventDefault,
}
