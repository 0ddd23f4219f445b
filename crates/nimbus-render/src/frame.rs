use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use nimbus_core::constants::{DEFAULT_HEIGHT, MAX_HEIGHT, MIN_HEIGHT, PRESENTATION_SCALE_XY};
use nimbus_core::Rgba;

use crate::camera::Camera;
use crate::params::{FrameUniforms, RayMarchParams};

/// How the unit box sits in the world: scaled `(10, 10, height)` and
/// flipped half a turn about X.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presentation {
    height: f32,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
        }
    }
}

impl Presentation {
    pub fn with_height(height: f32) -> Self {
        Self {
            height: height.clamp(MIN_HEIGHT, MAX_HEIGHT),
        }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::new(PRESENTATION_SCALE_XY, PRESENTATION_SCALE_XY, self.height),
            Quat::from_rotation_x(std::f32::consts::PI),
            Vec3::ZERO,
        )
    }
}

/// Everything a frame needs to turn a pixel into a box-space ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub width: u32,
    pub height: u32,
    pub inv_view_proj: Mat4,
    pub inv_model: Mat4,
    pub camera_world: Vec3,
}

impl FrameParams {
    pub fn new(camera: &Camera, presentation: &Presentation, width: u32, height: u32) -> Self {
        let view_proj = camera.view_proj(width as f32, height as f32);
        Self {
            width,
            height,
            inv_view_proj: view_proj.inverse(),
            inv_model: presentation.model_matrix().inverse(),
            camera_world: camera.eye_position(),
        }
    }

    /// Camera position in the volume's local box space.
    pub fn camera_object(&self) -> Vec3 {
        self.inv_model.transform_point3(self.camera_world)
    }

    /// March parameters for this frame: `base` with the camera refreshed.
    pub fn march_params(&self, base: &RayMarchParams) -> RayMarchParams {
        base.with_camera(self.camera_object())
    }

    /// Box-space direction (unnormalized) from the camera through the
    /// center of pixel `(px, py)`. Row 0 is the top of the image.
    pub fn pixel_direction(&self, px: u32, py: u32) -> Vec3 {
        let size = Vec2::new(self.width as f32, self.height as f32);
        let uv = (Vec2::new(px as f32, py as f32) + 0.5) / size;
        let ndc = Vec2::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0);
        let near = self.inv_view_proj * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let near_world = near.truncate() / near.w;
        self.inv_model.transform_point3(near_world) - self.camera_object()
    }

    pub fn to_uniforms(&self) -> FrameUniforms {
        let c = self.camera_world;
        FrameUniforms {
            inv_view_proj: self.inv_view_proj.to_cols_array_2d(),
            inv_model: self.inv_model.to_cols_array_2d(),
            camera_world: [c.x, c.y, c.z, 1.0],
            screen_size: [self.width as f32, self.height as f32],
            _pad: [0.0; 2],
        }
    }
}

/// Straight-alpha "over": `src` drawn on top of `dst`. Matches
/// `wgpu::BlendState::ALPHA_BLENDING` used by the GPU blit.
pub fn blend_over(dst: Rgba, src: Rgba) -> Rgba {
    let k = 1.0 - src.a;
    Rgba::new(
        src.r * src.a + dst.r * k,
        src.g * src.a + dst.g * k,
        src.b * src.a + dst.b * k,
        src.a + dst.a * k,
    )
}
