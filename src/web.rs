//! Browser host: DOM listeners, `requestAnimationFrame` scheduling and the
//! `CruiseViewer` JavaScript facade.
//!
//! The facade owns a [`ViewerSession`] and calls back into JavaScript with
//! the view-projection matrix whenever a frame needs drawing; the page's
//! renderer does the actual drawing.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    rc::{Rc, Weak},
    sync::Once,
};

use wasm_bindgen::{prelude::*, JsCast};
use web_sys::{
    AddEventListenerOptions, Event, EventTarget, HtmlElement, KeyboardEvent,
    PointerEvent, TouchEvent, TouchList, WheelEvent, Window,
};
use web_time::Instant;

use crate::{
    camera::core::{Camera, CameraRig},
    error::CruiseError,
    input::{
        DeltaMode, Disposition, EventHandler, EventKind, InputEvent,
        InputSurface, ListenerId, ListenerScope, PlatformProfile, TouchPoint,
        WheelDelta,
    },
    model::LoadProgress,
    options::{Options, SceneOptions},
    session::{FrameHandle, FrameOutcome, FrameScheduler, ViewerSession},
};

fn js_error(error: &CruiseError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn browser_window() -> Result<Window, CruiseError> {
    web_sys::window().ok_or_else(|| CruiseError::Listener("no window".into()))
}

/// Detect the platform from `navigator` and `devicePixelRatio`.
#[must_use]
pub fn detect_profile(window: &Window) -> PlatformProfile {
    let navigator = window.navigator();
    PlatformProfile::detect(
        &navigator.user_agent().unwrap_or_default(),
        &navigator.platform().unwrap_or_default(),
        window.device_pixel_ratio(),
    )
}

// ---------------------------------------------------------------------------
// DOM event conversion
// ---------------------------------------------------------------------------

fn number_property(event: &Event, name: &str) -> Option<f32> {
    js_sys::Reflect::get(event, &JsValue::from_str(name))
        .ok()?
        .as_f64()
        .map(|v| v as f32)
}

/// Read whichever wheel flavour `event` is.
fn wheel_delta(event: &Event) -> Option<WheelDelta> {
    if let Some(wheel) = event.dyn_ref::<WheelEvent>() {
        return Some(WheelDelta::Standard {
            delta_y: wheel.delta_y() as f32,
            mode: DeltaMode::from_dom(wheel.delta_mode()),
        });
    }
    if let Some(wheel_delta) = number_property(event, "wheelDelta") {
        return Some(WheelDelta::LegacyMouseWheel { wheel_delta });
    }
    number_property(event, "detail")
        .map(|detail| WheelDelta::DomMouseScroll { detail })
}

/// Touches in client CSS pixels, the same space as pointer positions.
fn touch_points(list: &TouchList) -> Vec<TouchPoint> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| TouchPoint::new(t.client_x() as f32, t.client_y() as f32))
        .collect()
}

/// Translate a DOM event into an [`InputEvent`]. Pointer events from touch
/// input are dropped; the touch listeners cover them.
fn convert(kind: EventKind, event: &Event) -> Option<InputEvent> {
    match kind {
        EventKind::KeyDown | EventKind::KeyUp => {
            let code = event.dyn_ref::<KeyboardEvent>()?.code();
            Some(if kind == EventKind::KeyDown {
                InputEvent::KeyDown { code }
            } else {
                InputEvent::KeyUp { code }
            })
        }
        EventKind::PointerDown
        | EventKind::PointerMove
        | EventKind::PointerUp
        | EventKind::PointerLeave => {
            let pointer = event.dyn_ref::<PointerEvent>()?;
            if pointer.pointer_type() == "touch" {
                return None;
            }
            let (x, y) = (pointer.client_x() as f32, pointer.client_y() as f32);
            Some(match kind {
                EventKind::PointerDown => InputEvent::PointerDown { x, y },
                EventKind::PointerMove => InputEvent::PointerMove { x, y },
                EventKind::PointerUp => InputEvent::PointerUp,
                _ => InputEvent::PointerLeave,
            })
        }
        EventKind::Wheel => Some(InputEvent::Wheel {
            delta: wheel_delta(event)?,
        }),
        EventKind::TouchStart | EventKind::TouchMove | EventKind::TouchEnd => {
            let touches = touch_points(&event.dyn_ref::<TouchEvent>()?.touches());
            Some(match kind {
                EventKind::TouchStart => InputEvent::TouchStart { touches },
                EventKind::TouchMove => InputEvent::TouchMove { touches },
                _ => InputEvent::TouchEnd { touches },
            })
        }
        EventKind::ContextMenu => Some(InputEvent::ContextMenu),
    }
}

// ---------------------------------------------------------------------------
// WebSurface
// ---------------------------------------------------------------------------

struct Attached {
    target: EventTarget,
    name: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// DOM-backed [`InputSurface`]: key listeners on `window`, everything else
/// on the canvas. Listeners are non-passive so handlers can suppress
/// scrolling and the context menu.
pub struct WebSurface {
    element: HtmlElement,
    window: Window,
    profile: PlatformProfile,
    next_id: u64,
    attached: BTreeMap<u64, Attached>,
}

impl std::fmt::Debug for WebSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSurface")
            .field("profile", &self.profile)
            .field("attached", &self.attached.len())
            .finish_non_exhaustive()
    }
}

impl WebSurface {
    /// Wrap a canvas (or any element) for input capture.
    pub fn new(element: HtmlElement) -> Result<Self, CruiseError> {
        let window = browser_window()?;
        let profile = detect_profile(&window);
        Ok(Self {
            element,
            window,
            profile,
            next_id: 0,
            attached: BTreeMap::new(),
        })
    }

    /// Detected platform.
    #[must_use]
    pub fn profile(&self) -> PlatformProfile {
        self.profile
    }

    /// The capturing element.
    #[must_use]
    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    /// DOM event name for `kind`. Wheel input falls back to `mousewheel`
    /// or `DOMMouseScroll` on engines without `onwheel`.
    fn dom_name(&self, kind: EventKind) -> &'static str {
        if kind != EventKind::Wheel {
            return kind.dom_name();
        }
        let supports_wheel =
            js_sys::Reflect::has(&self.element, &JsValue::from_str("onwheel"))
                .unwrap_or(true);
        let name = self.profile.wheel_event_name(supports_wheel);
        if name != "wheel" {
            log::info!("no wheel event support, listening for {name}");
        }
        name
    }
}

impl InputSurface for WebSurface {
    fn listen(
        &mut self,
        kind: EventKind,
        handler: EventHandler,
    ) -> Result<ListenerId, CruiseError> {
        let target: EventTarget = match kind.scope() {
            ListenerScope::Surface => self.element.clone().into(),
            ListenerScope::Window => self.window.clone().into(),
        };
        let name = self.dom_name(kind);
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Some(input) = convert(kind, &event) {
                if handler(&input) == Disposition::PreventDefault {
                    event.prevent_default();
                }
            }
        });

        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                name,
                closure.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|e| CruiseError::Listener(format!("{name}: {e:?}")))?;

        self.next_id += 1;
        let _ = self.attached.insert(
            self.next_id,
            Attached {
                target,
                name,
                closure,
            },
        );
        Ok(ListenerId::new(self.next_id))
    }

    fn unlisten(&mut self, id: ListenerId) -> bool {
        let Some(attached) = self.attached.remove(&id.raw()) else {
            return false;
        };
        if let Err(e) = attached.target.remove_event_listener_with_callback(
            attached.name,
            attached.closure.as_ref().unchecked_ref(),
        ) {
            log::warn!("removing {} listener failed: {e:?}", attached.name);
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Animation frames
// ---------------------------------------------------------------------------

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// [`FrameScheduler`] over `requestAnimationFrame`.
pub struct AnimationLoop {
    window: Window,
    callback: FrameCallback,
}

impl AnimationLoop {
    fn new(window: Window) -> Self {
        Self {
            window,
            callback: Rc::new(RefCell::new(None)),
        }
    }
}

impl FrameScheduler for AnimationLoop {
    fn request_frame(&mut self) -> FrameHandle {
        let callback = self.callback.borrow();
        let Some(closure) = callback.as_ref() else {
            return FrameHandle::new(0);
        };
        match self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
        {
            Ok(id) => FrameHandle::new(id),
            Err(e) => {
                log::error!("requestAnimationFrame failed: {e:?}");
                FrameHandle::new(0)
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if handle.raw() != 0 {
            let _ = self.window.cancel_animation_frame(handle.raw());
        }
    }
}

// ---------------------------------------------------------------------------
// JavaScript facade
// ---------------------------------------------------------------------------

struct ViewerState {
    session: ViewerSession<Camera, WebSurface>,
    frames: AnimationLoop,
    canvas: HtmlElement,
    last_tick: Option<Instant>,
    on_render: Option<js_sys::Function>,
}

static LOGGING: Once = Once::new();

fn init_logging() {
    LOGGING.call_once(|| {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
    });
}

/// Cruise-controlled viewer for a canvas element.
#[wasm_bindgen]
pub struct CruiseViewer {
    state: Rc<RefCell<ViewerState>>,
}

#[wasm_bindgen]
impl CruiseViewer {
    /// Attach to `canvas`. `options_toml` overrides the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlElement,
        options_toml: Option<String>,
    ) -> Result<CruiseViewer, JsValue> {
        init_logging();
        let options = match options_toml {
            Some(toml) => Options::from_toml(&toml).map_err(|e| js_error(&e))?,
            None => Options::default(),
        };
        let window = browser_window().map_err(|e| js_error(&e))?;
        let surface = WebSurface::new(canvas.clone()).map_err(|e| js_error(&e))?;
        let profile = surface.profile();

        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        let mut camera = Camera::default();
        camera.resize(width, height);

        let session = ViewerSession::new(camera, surface, options, profile)
            .map_err(|e| js_error(&e))?;
        let state = Rc::new(RefCell::new(ViewerState {
            session,
            frames: AnimationLoop::new(window),
            canvas,
            last_tick: None,
            on_render: None,
        }));
        install_frame_callback(&state);
        Ok(Self { state })
    }

    /// Called with the column-major view-projection matrix (16 floats) each
    /// time a frame should be drawn.
    #[wasm_bindgen(js_name = "setRenderCallback")]
    pub fn set_render_callback(&self, callback: js_sys::Function) {
        self.state.borrow_mut().on_render = Some(callback);
    }

    /// Start the animation loop.
    pub fn start(&self) {
        let mut state = self.state.borrow_mut();
        let ViewerState {
            session, frames, ..
        } = &mut *state;
        session.schedule_next(frames);
    }

    /// Stop the loop and detach all input listeners.
    pub fn dispose(&self) {
        let mut state = self.state.borrow_mut();
        let ViewerState {
            session, frames, ..
        } = &mut *state;
        session.cancel_frames(frames);
        if let Some(controls) = session.controls_mut() {
            controls.dispose();
        }
    }

    /// Viewport changed size.
    pub fn resize(&self, width: u32, height: u32) {
        self.state.borrow_mut().session.resize(width, height);
    }

    /// Report model download progress; returns the percent text.
    #[wasm_bindgen(js_name = "loadProgress")]
    pub fn load_progress(&self, loaded: f64, total: f64) -> String {
        let progress = LoadProgress {
            loaded: loaded.max(0.0) as u64,
            total: (total > 0.0).then_some(total as u64),
        };
        self.state.borrow_mut().session.load_progress(progress);
        progress.to_string()
    }

    /// The model is in the scene; rendering starts.
    #[wasm_bindgen(js_name = "loadFinished")]
    pub fn load_finished(&self) {
        self.state.borrow_mut().session.load_finished();
    }

    /// The model failed to load.
    #[wasm_bindgen(js_name = "loadFailed")]
    pub fn load_failed(&self, message: String) {
        self.state.borrow_mut().session.load_failed(message);
    }

    /// `webglcontextlost` fired.
    #[wasm_bindgen(js_name = "contextLost")]
    pub fn context_lost(&self) {
        self.state.borrow_mut().session.context_lost();
    }

    /// `webglcontextrestored` fired: listeners are re-attached.
    #[wasm_bindgen(js_name = "contextRestored")]
    pub fn context_restored(&self) -> Result<(), JsValue> {
        let mut state = self.state.borrow_mut();
        let surface =
            WebSurface::new(state.canvas.clone()).map_err(|e| js_error(&e))?;
        state
            .session
            .context_restored(surface)
            .map_err(|e| js_error(&e))
    }

    /// Apply a settings-editor JSON document.
    #[wasm_bindgen(js_name = "applySettings")]
    pub fn apply_settings(&self, json: &str) -> Result<(), JsValue> {
        let scene =
            SceneOptions::from_settings_json(json).map_err(|e| js_error(&e))?;
        self.apply_scene(scene)
    }

    /// Apply one of the built-in world presets.
    #[wasm_bindgen(js_name = "applyPreset")]
    pub fn apply_preset(&self, name: &str) -> Result<(), JsValue> {
        let options = Options::preset(name).map_err(|e| js_error(&e))?;
        self.apply_scene(options.scene)
    }

    /// Background color as `0xRRGGBB`.
    #[wasm_bindgen(js_name = "backgroundColor")]
    pub fn background_color(&self) -> u32 {
        crate::util::color::pack_rgb(self.state.borrow().session.scene().background)
    }

    /// Camera position `[x, y, z]`.
    #[wasm_bindgen(js_name = "cameraPosition")]
    pub fn camera_position(&self) -> Vec<f32> {
        self.state
            .borrow()
            .session
            .camera()
            .map(|c| c.position().to_array().to_vec())
            .unwrap_or_default()
    }

    /// Smoothed rendered-frame rate.
    pub fn fps(&self) -> f32 {
        self.state.borrow().session.fps()
    }
}

impl CruiseViewer {
    fn apply_scene(&self, scene: SceneOptions) -> Result<(), JsValue> {
        self.state
            .borrow_mut()
            .session
            .set_scene(scene)
            .map_err(|e| js_error(&e))
    }
}

/// Build the `requestAnimationFrame` callback. It holds only a weak
/// reference so dropping the viewer frees everything.
fn install_frame_callback(state: &Rc<RefCell<ViewerState>>) {
    let weak: Weak<RefCell<ViewerState>> = Rc::downgrade(state);
    let closure = Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
        let Some(state) = weak.upgrade() else {
            return;
        };
        let render = {
            let mut guard = state.borrow_mut();
            let ViewerState {
                session,
                frames,
                last_tick,
                on_render,
                ..
            } = &mut *guard;

            let now = Instant::now();
            let dt = last_tick
                .replace(now)
                .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
            let outcome = session.frame(dt, now);
            session.schedule_next(frames);

            match (outcome, on_render.as_ref(), session.camera()) {
                (FrameOutcome::Render, Some(callback), Some(camera)) => {
                    Some((callback.clone(), camera.build_matrix()))
                }
                _ => None,
            }
        };

        // Called with the state released so the callback may query it.
        if let Some((callback, matrix)) = render {
            let array = js_sys::Float32Array::from(&matrix.to_cols_array()[..]);
            if let Err(e) = callback.call1(&JsValue::NULL, &array) {
                log::error!("render callback failed: {e:?}");
            }
        }
    });
    *state.borrow().frames.callback.borrow_mut() = Some(closure);
}
