// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Six-degree-of-freedom "cruise" camera navigation for 3D mesh viewers.
//!
//! Cruise flies a camera freely through a scene: held keys translate and
//! rotate along the camera's own axes, a pointer or single-finger drag
//! steers, and the wheel or a pinch dollies along the view direction. All
//! translation is throttled by a distance-based speed curve, so the camera
//! slows down as it approaches the area of interest.
//!
//! # Key entry points
//!
//! - [`CruiseControls`] - the controller; call
//!   [`update`](CruiseControls::update) once per frame
//! - [`input::InputSurface`] - where listeners are attached (DOM, winit or
//!   the in-memory [`input::ListenerRegistry`])
//! - [`options::Options`] - speeds, clamps, key bindings and the scene
//!   look, with TOML presets
//! - [`session::ViewerSession`] - render-on-demand loop with model-load
//!   gating and graphics context recovery
//!
//! # Architecture
//!
//! Event handlers only write to a shared [`input::InputCapture`]; nothing
//! moves until the controller integrates the captured state. One-shot
//! impulses (drag, wheel, pinch) are consumed by exactly one update.

pub mod camera;
pub mod error;
pub mod input;
pub mod model;
#[cfg(feature = "native")]
pub mod native;
pub mod options;
pub mod replay;
pub mod scene;
pub mod session;
pub mod util;
#[cfg(feature = "web")]
pub mod web;

pub use camera::{
    controller::{CruiseControls, Lifecycle},
    core::{Camera, CameraPose, CameraRig},
    speed_curve::SpeedCurve,
};
pub use error::CruiseError;
