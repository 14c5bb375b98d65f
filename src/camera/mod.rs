//! Camera pose, distance-based speed throttling and the cruise controller
//! that flies the camera from user input.

/// Six-degree-of-freedom cruise controller.
pub mod controller;
/// Camera rig trait, perspective camera and GPU uniform.
pub mod core;
/// Distance-dependent speed multiplier.
pub mod speed_curve;
