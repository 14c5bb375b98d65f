//! Shared helpers: color decoding and frame statistics.

/// Hex color parsing and packing.
pub mod color;
/// Smoothed rendered-frame counter.
pub mod frame_timing;
