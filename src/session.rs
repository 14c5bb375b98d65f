//! Render-on-demand viewer loop around a [`CruiseControls`].
//!
//! The session decides when a frame is worth drawing: never before the
//! model is loaded, always after a resize or a finished load, and
//! otherwise only when the controller moved the camera. It also survives
//! graphics context loss by disposing the controller and rebuilding it,
//! with the same camera pose, once the context comes back.

use web_time::Instant;

use crate::{
    camera::{
        controller::CruiseControls,
        core::{Camera, CameraRig},
    },
    error::CruiseError,
    input::{InputSurface, PlatformProfile},
    model::{LoadProgress, LoadStatus},
    options::{Options, SceneOptions},
    scene::SceneDescription,
    util::frame_timing::FrameTiming,
};

/// Handle of a scheduled animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(i32);

impl FrameHandle {
    /// Wrap a platform frame id (e.g. a `requestAnimationFrame` id).
    #[must_use]
    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Platform frame id.
    #[must_use]
    pub fn raw(self) -> i32 {
        self.0
    }
}

/// Source of animation-frame callbacks.
pub trait FrameScheduler {
    /// Ask for the next frame callback.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a pending request. Cancelling a fired handle is harmless.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// What the host should do with the current animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Nothing changed; keep the previous image.
    Idle,
    /// Draw the scene.
    Render,
}

/// Viewer session state.
#[derive(Debug)]
pub struct ViewerSession<C: CameraRig + Clone, S: InputSurface> {
    controls: Option<CruiseControls<C, S>>,
    /// Camera kept across a context loss.
    parked: Option<C>,
    options: Options,
    profile: PlatformProfile,
    scene: SceneDescription,
    status: LoadStatus,
    render_requested: bool,
    timing: FrameTiming,
    pending_frame: Option<FrameHandle>,
}

impl<C: CameraRig + Clone, S: InputSurface> ViewerSession<C, S> {
    /// Resolve the scene and attach the controller.
    pub fn new(
        camera: C,
        surface: S,
        options: Options,
        profile: PlatformProfile,
    ) -> Result<Self, CruiseError> {
        options.validate()?;
        let scene = SceneDescription::from_options(&options.scene)?;
        let controls = CruiseControls::new(camera, surface, &options, profile)?;
        Ok(Self {
            controls: Some(controls),
            parked: None,
            options,
            profile,
            scene,
            status: LoadStatus::Idle,
            render_requested: false,
            timing: FrameTiming::new(),
            pending_frame: None,
        })
    }

    /// Advance one animation frame. `dt` is seconds since the last frame,
    /// `now` timestamps rendered frames for the statistics.
    pub fn frame(&mut self, dt: f32, now: Instant) -> FrameOutcome {
        let Some(controls) = self.controls.as_mut() else {
            return FrameOutcome::Idle;
        };
        // Nothing to look at yet; keys stay held but impulses must not
        // pile up into one jump once the model appears.
        if !self.status.is_loaded() {
            controls.discard_impulses();
            return FrameOutcome::Idle;
        }

        let moved = controls.update(dt);
        let forced = std::mem::take(&mut self.render_requested);
        if moved || forced {
            self.timing.record_frame(now);
            FrameOutcome::Render
        } else {
            FrameOutcome::Idle
        }
    }

    /// Request the next animation frame, cancelling any still-pending one
    /// so at most one callback is ever outstanding.
    pub fn schedule_next(&mut self, scheduler: &mut impl FrameScheduler) {
        if let Some(handle) = self.pending_frame.take() {
            scheduler.cancel_frame(handle);
        }
        self.pending_frame = Some(scheduler.request_frame());
    }

    /// Stop the frame loop.
    pub fn cancel_frames(&mut self, scheduler: &mut impl FrameScheduler) {
        if let Some(handle) = self.pending_frame.take() {
            scheduler.cancel_frame(handle);
        }
    }

    /// Force one render on the next frame (resize, settings change).
    pub fn request_render(&mut self) {
        self.render_requested = true;
    }

    /// Model download started or progressed.
    pub fn load_progress(&mut self, progress: LoadProgress) {
        log::debug!("model loading: {progress}");
        self.status = LoadStatus::Loading(progress);
    }

    /// Model is in the scene; rendering may begin.
    pub fn load_finished(&mut self) {
        log::info!("model loaded");
        self.status = LoadStatus::Loaded;
        self.request_render();
    }

    /// Model failed to load. The session stays idle.
    pub fn load_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("model load failed: {message}");
        self.status = LoadStatus::Failed(message);
    }

    /// Current model load state.
    #[must_use]
    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Replace the scene look and redraw.
    pub fn set_scene(&mut self, scene: SceneOptions) -> Result<(), CruiseError> {
        self.scene = SceneDescription::from_options(&scene)?;
        self.options.scene = scene;
        self.request_render();
        Ok(())
    }

    /// Resolved scene.
    #[must_use]
    pub fn scene(&self) -> &SceneDescription {
        &self.scene
    }

    /// The graphics context was lost: detach input and keep the camera.
    pub fn context_lost(&mut self) {
        log::warn!("graphics context lost");
        if let Some(controls) = self.controls.take() {
            self.parked = Some(controls.camera().clone());
        }
    }

    /// The graphics context is back: rebuild the controller on `surface`.
    ///
    /// GPU-side meshes did not survive, so the load status returns to
    /// idle until the host reloads the model.
    pub fn context_restored(&mut self, surface: S) -> Result<(), CruiseError> {
        let Some(camera) = self.parked.clone() else {
            log::warn!("context restored without a prior loss, ignoring");
            return Ok(());
        };
        let controls =
            CruiseControls::new(camera, surface, &self.options, self.profile)?;
        log::warn!("graphics context restored");
        self.controls = Some(controls);
        self.parked = None;
        self.status = LoadStatus::Idle;
        self.request_render();
        Ok(())
    }

    /// Whether the session is waiting for a context restore.
    #[must_use]
    pub fn is_context_lost(&self) -> bool {
        self.controls.is_none()
    }

    /// Active controller, if the context is alive.
    #[must_use]
    pub fn controls(&self) -> Option<&CruiseControls<C, S>> {
        self.controls.as_ref()
    }

    /// Mutable controller access.
    pub fn controls_mut(&mut self) -> Option<&mut CruiseControls<C, S>> {
        self.controls.as_mut()
    }

    /// Current camera, whether attached or parked.
    #[must_use]
    pub fn camera(&self) -> Option<&C> {
        self.controls
            .as_ref()
            .map(CruiseControls::camera)
            .or(self.parked.as_ref())
    }

    /// Smoothed rendered-frame rate.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.timing.fps()
    }

    /// Frames rendered so far.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.timing.frames()
    }
}

impl<S: InputSurface> ViewerSession<Camera, S> {
    /// Update the projection for a new viewport size and redraw.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(controls) = self.controls.as_mut() {
            controls.camera_mut().resize(width, height);
        } else if let Some(camera) = self.parked.as_mut() {
            camera.resize(width, height);
        }
        self.request_render();
    }
}
