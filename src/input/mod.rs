//! Input handling: platform-agnostic events, platform normalization, the
//! drag/pinch/key state machines, and the capture state the controller
//! integrates.

/// Platform-agnostic input events.
pub mod event;
/// Drag and pinch trackers.
pub mod gesture;
/// Navigation actions and held-key state.
pub mod keyboard;
/// Browser/OS detection and wheel normalization.
pub mod platform;
/// Converts events into controller input state.
pub mod processor;
/// Listener attachment seam.
pub mod surface;

pub use event::{
    DeltaMode, Disposition, EventKind, InputEvent, ListenerScope,
    TouchPoint, WheelDelta,
};
pub use keyboard::{MoveState, NavAction};
pub use platform::{BrowserFamily, PlatformProfile};
pub use processor::{CaptureSettings, InputCapture};
pub use surface::{EventHandler, InputSurface, ListenerId, ListenerRegistry};
