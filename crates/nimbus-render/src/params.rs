use glam::Vec3;
use nimbus_core::constants::{
    DEFAULT_STEP_COUNT, DEFAULT_THRESHOLD, MAX_STEP_COUNT, MIN_STEP_COUNT, OPACITY_PER_SAMPLE,
};

/// Per-frame inputs to the ray march. Passed explicitly to every trace;
/// nothing in the march reads global state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayMarchParams {
    /// Always within `[MIN_STEP_COUNT, MAX_STEP_COUNT]`.
    step_count: u32,
    pub opacity_per_sample: f32,
    /// Reserved cutoff. Carried to the GPU, never read by the march.
    pub threshold: f32,
    /// Camera position in the volume's local box space. Recomputed each frame.
    pub camera_position_object_space: Vec3,
}

impl Default for RayMarchParams {
    fn default() -> Self {
        Self {
            step_count: DEFAULT_STEP_COUNT,
            opacity_per_sample: OPACITY_PER_SAMPLE,
            threshold: DEFAULT_THRESHOLD,
            camera_position_object_space: Vec3::ZERO,
        }
    }
}

impl RayMarchParams {
    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    /// Set the step count, clamped into the supported range.
    pub fn with_step_count(mut self, step_count: u32) -> Self {
        let clamped = step_count.clamp(MIN_STEP_COUNT, MAX_STEP_COUNT);
        if clamped != step_count {
            log::warn!("step count {step_count} clamped to {clamped}");
        }
        self.step_count = clamped;
        self
    }

    pub fn with_opacity_per_sample(mut self, opacity: f32) -> Self {
        self.opacity_per_sample = opacity;
        self
    }

    pub fn with_camera(mut self, camera_object: Vec3) -> Self {
        self.camera_position_object_space = camera_object;
        self
    }

    pub fn to_uniforms(&self) -> MarchUniforms {
        let c = self.camera_position_object_space;
        MarchUniforms {
            camera_object: [c.x, c.y, c.z],
            step_count: self.step_count,
            opacity_per_sample: self.opacity_per_sample,
            threshold: self.threshold,
            _pad: [0.0; 2],
        }
    }
}

/// GPU-uploadable march uniforms. Must match MarchUniforms in volume_march.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MarchUniforms {
    pub camera_object: [f32; 3],
    pub step_count: u32,
    pub opacity_per_sample: f32,
    pub threshold: f32,
    pub _pad: [f32; 2],
}

/// GPU-uploadable frame uniforms. Must match FrameUniforms in volume_march.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub inv_view_proj: [[f32; 4]; 4],
    pub inv_model: [[f32; 4]; 4],
    pub camera_world: [f32; 4],
    pub screen_size: [f32; 2],
    pub _pad: [f32; 2],
}
