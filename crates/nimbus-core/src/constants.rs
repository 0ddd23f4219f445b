//! Single source of truth for shared constants.
//! These values are used by both Rust and WGSL. The render crate injects
//! them into the ray march shader as a preamble.

/// Half side length of the volume's local bounding box. The box spans
/// `[-BOX_HALF_EXTENT, BOX_HALF_EXTENT]` on every axis.
pub const BOX_HALF_EXTENT: f32 = 0.5;

/// Default number of march steps per unit of dominant-axis travel.
pub const DEFAULT_STEP_COUNT: u32 = 1000;

/// Smallest accepted step count. Zero would make the step infinite.
pub const MIN_STEP_COUNT: u32 = 1;

/// Largest accepted step count (upper end of the tuning range).
pub const MAX_STEP_COUNT: u32 = 5000;

/// Alpha multiplier applied to every sample before compositing.
/// Independent of the step size: more steps accumulate more opacity.
pub const OPACITY_PER_SAMPLE: f32 = 0.02;

/// Default value of the reserved classification cutoff. Not read by the march.
pub const DEFAULT_THRESHOLD: f32 = 0.0;

/// Central-difference offset for the gradient normal, in texture coordinates.
pub const NORMAL_SAMPLE_STEP: f32 = 0.01;

/// Distance from a texture face inside which the face normal is returned directly.
pub const NORMAL_FACE_EPSILON: f32 = 0.0001;

/// Color channels in transfer tables are stored in `[0, COLOR_CHANNEL_MAX]`.
pub const COLOR_CHANNEL_MAX: f32 = 255.0;

/// Compute workgroup edge for the per-pixel ray march dispatch (8x8 invocations).
pub const MARCH_WORKGROUP_SIZE: u32 = 8;

/// Horizontal scale the presentation transform applies to the unit box.
pub const PRESENTATION_SCALE_XY: f32 = 10.0;

/// Default vertical (z) scale of the presentation transform.
pub const DEFAULT_HEIGHT: f32 = 1.0;

/// Range of the presentation height exposed to the frame driver.
pub const MIN_HEIGHT: f32 = 1.0;
pub const MAX_HEIGHT: f32 = 10.0;
