//! Headless replay of recorded input.
//!
//! A replay script is JSON: an optional starting pose, optional platform
//! profile, and a list of frames. Each frame delivers its events through
//! an in-memory [`ListenerRegistry`] and then integrates for `dt` seconds,
//! `repeat` times.
//!
//! ```json
//! {
//!   "start": { "position": [0, 0, 1000], "orientation": [0, 0, 0, 1] },
//!   "frames": [
//!     { "dt": 0.016, "events": [{ "type": "key_down", "code": "KeyW" }] },
//!     { "dt": 0.016, "repeat": 59 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    camera::{
        controller::CruiseControls,
        core::{Camera, CameraPose},
    },
    error::CruiseError,
    input::{InputEvent, ListenerRegistry, PlatformProfile},
    options::Options,
};

/// Upper bound on updates in one script, summed over every `repeat`.
pub const MAX_UPDATES: u64 = 1_000_000;

const fn one() -> u32 {
    1
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// Frame time in seconds.
    pub dt: f32,
    /// Events delivered before the first update of this step.
    #[serde(default)]
    pub events: Vec<InputEvent>,
    /// How many updates to run with this `dt`.
    #[serde(default = "one")]
    pub repeat: u32,
}

/// A complete replay script.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayScript {
    /// Starting pose (viewer default when absent).
    pub start: Option<CameraPose>,
    /// Platform used for wheel and touch normalization.
    pub profile: Option<PlatformProfile>,
    /// Steps to run.
    pub frames: Vec<ReplayFrame>,
}

impl ReplayScript {
    /// Parse and check a script.
    pub fn from_json(json: &str) -> Result<Self, CruiseError> {
        let script: Self = serde_json::from_str(json)
            .map_err(|e| CruiseError::Replay(e.to_string()))?;
        script.validate()?;
        Ok(script)
    }

    /// Total updates the script runs.
    #[must_use]
    pub fn total_updates(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.repeat)).sum()
    }

    /// Reject non-finite or negative `dt` and scripts longer than
    /// [`MAX_UPDATES`].
    pub fn validate(&self) -> Result<(), CruiseError> {
        if let Some((i, frame)) = self
            .frames
            .iter()
            .enumerate()
            .find(|(_, f)| !f.dt.is_finite() || f.dt < 0.0)
        {
            return Err(CruiseError::Replay(format!(
                "frame {i}: dt must be finite and >= 0, got {}",
                frame.dt
            )));
        }
        let total = self.total_updates();
        if total > MAX_UPDATES {
            return Err(CruiseError::Replay(format!(
                "{total} updates exceeds the limit of {MAX_UPDATES}"
            )));
        }
        Ok(())
    }
}

/// Camera state after one update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameRecord {
    /// Update counter, starting at 0.
    pub index: u32,
    /// Whether this update moved the camera.
    pub changed: bool,
    /// Pose after the update.
    pub pose: CameraPose,
    /// Euler angles (XYZ, radians) after the update.
    pub euler: [f32; 3],
}

/// Result of running a script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    /// One record per update.
    pub frames: Vec<FrameRecord>,
    /// Pose after the last update.
    pub end: CameraPose,
}

impl ReplayReport {
    /// Number of updates that moved the camera.
    #[must_use]
    pub fn moved_frames(&self) -> usize {
        self.frames.iter().filter(|f| f.changed).count()
    }
}

/// Run `script` through a fresh controller configured by `options`.
pub fn run(
    script: &ReplayScript,
    options: &Options,
) -> Result<ReplayReport, CruiseError> {
    script.validate()?;
    let mut camera = Camera::default();
    if let Some(start) = &script.start {
        start.apply_to(&mut camera);
    }
    let registry = ListenerRegistry::new();
    let mut controls = CruiseControls::new(
        camera,
        registry.clone(),
        options,
        script.profile.unwrap_or_default(),
    )?;

    let mut frames = Vec::with_capacity(script.total_updates() as usize);
    let mut index = 0;
    for step in &script.frames {
        for event in &step.events {
            let _ = registry.dispatch(event);
        }
        for _ in 0..step.repeat {
            let changed = controls.update(step.dt);
            let camera = controls.camera();
            frames.push(FrameRecord {
                index,
                changed,
                pose: CameraPose::of(camera),
                euler: camera.euler().to_array(),
            });
            index += 1;
        }
    }
    log::debug!("replayed {index} updates");

    Ok(ReplayReport {
        frames,
        end: CameraPose::of(controls.camera()),
    })
}
