//! Browser/platform quirks isolated from the controller.
//!
//! Wheel events are reported in different units and signs depending on the
//! browser, the OS and the event flavour. [`PlatformProfile`] turns every
//! flavour into signed "notches" where `+1.0` is one wheel click pushing
//! the camera forward.

use serde::{Deserialize, Serialize};

use super::event::{DeltaMode, WheelDelta};

/// Pixels a typical wheel notch scrolls in pixel mode.
const PIXELS_PER_NOTCH: f32 = 100.0;
/// Lines a typical wheel notch scrolls in line mode.
const LINES_PER_NOTCH: f32 = 3.0;
/// Legacy `mousewheel` units per notch.
const WHEEL_DELTA_PER_NOTCH: f32 = 120.0;
/// macOS reports much finer deltas (trackpads, smooth scrolling).
const MAC_GAIN: f32 = 3.0;

/// Browser family, as far as wheel normalization cares.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BrowserFamily {
    /// Gecko: line-mode wheel deltas, `DOMMouseScroll` legacy event.
    Firefox,
    /// Blink-based browsers.
    Chromium,
    /// WebKit.
    Safari,
    /// Anything else (including native windows).
    #[default]
    Other,
}

impl BrowserFamily {
    /// Classify a `navigator.userAgent` string.
    #[must_use]
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if ua.contains("firefox") {
            Self::Firefox
        } else if ua.contains("chrome")
            || ua.contains("chromium")
            || ua.contains("edg/")
        {
            Self::Chromium
        } else if ua.contains("safari") {
            Self::Safari
        } else {
            Self::Other
        }
    }
}

/// Everything the input adapter needs to know about the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformProfile {
    /// Browser family.
    pub browser: BrowserFamily,
    /// Running on macOS.
    pub mac: bool,
    /// `window.devicePixelRatio` (1.0 when unknown).
    pub device_pixel_ratio: f32,
}

impl Default for PlatformProfile {
    fn default() -> Self {
        Self {
            browser: BrowserFamily::Other,
            mac: false,
            device_pixel_ratio: 1.0,
        }
    }
}

impl PlatformProfile {
    /// Build a profile from `navigator.userAgent`, `navigator.platform` and
    /// `window.devicePixelRatio`.
    #[must_use]
    pub fn detect(user_agent: &str, platform: &str, pixel_ratio: f64) -> Self {
        let device_pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0
        {
            pixel_ratio as f32
        } else {
            1.0
        };
        Self {
            browser: BrowserFamily::from_user_agent(user_agent),
            mac: platform.contains("Mac"),
            device_pixel_ratio,
        }
    }

    fn ratio(&self) -> f32 {
        self.device_pixel_ratio.max(f32::EPSILON)
    }

    /// Normalize a raw wheel delta into signed notches (positive = dolly
    /// forward). Not clamped; non-finite input yields `0.0`.
    #[must_use]
    pub fn wheel_notches(&self, delta: WheelDelta) -> f32 {
        let notches = match delta {
            WheelDelta::Standard { delta_y, mode } => match (mode, self.browser)
            {
                (DeltaMode::Pixel, _) => {
                    -delta_y / PIXELS_PER_NOTCH / self.ratio()
                }
                (DeltaMode::Line, BrowserFamily::Firefox) => {
                    -delta_y / LINES_PER_NOTCH
                }
                (DeltaMode::Line, _) => {
                    -delta_y / LINES_PER_NOTCH / self.ratio()
                }
                (DeltaMode::Page, _) => -delta_y,
            },
            WheelDelta::LegacyMouseWheel { wheel_delta } => {
                wheel_delta / WHEEL_DELTA_PER_NOTCH
            }
            WheelDelta::DomMouseScroll { detail } => -detail / LINES_PER_NOTCH,
        };
        let notches = if self.mac { notches * MAC_GAIN } else { notches };
        if notches.is_finite() {
            notches
        } else {
            0.0
        }
    }

    /// DOM event to listen on for wheel input: `wheel` where the element
    /// supports it, otherwise the browser's legacy event.
    #[must_use]
    pub fn wheel_event_name(&self, supports_wheel: bool) -> &'static str {
        match (supports_wheel, self.browser) {
            (true, _) => "wheel",
            (false, BrowserFamily::Firefox) => "DOMMouseScroll",
            (false, _) => "mousewheel",
        }
    }
}
